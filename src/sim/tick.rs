//! Per-frame simulation step
//!
//! One call per animation frame. The step runs only while the run is live
//! (`Playing` with no modal open); every other mode/modal combination
//! freezes the world exactly where it stands.

use super::state::{GameMode, GameState, ModalState};
use super::{collision, kinematics, triggers};
use crate::level::Level;
use crate::tuning::Tuning;

/// Edge-and-level input sample for one frame. The driver sets the edge
/// flags (`jump_pressed`, `jump_released`, `pause`) for a single frame
/// and clears them after the tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump_pressed: bool,
    pub jump_held: bool,
    pub jump_released: bool,
    pub pause: bool,
}

/// What the driver must do after this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickEvents {
    /// A modal opened mid-frame; drop all held-input flags so motion does
    /// not resume by itself when it closes
    pub clear_input: bool,
}

/// Advance the simulation by one frame.
pub fn tick(state: &mut GameState, level: &Level, tuning: &Tuning, input: &TickInput) -> TickEvents {
    // Pause works from its own edge flag before anything else moves.
    // The toggle frame itself never simulates, so resuming is free.
    if input.pause {
        state.toggle_pause();
        return TickEvents::default();
    }
    if state.mode != GameMode::Playing || state.modal != ModalState::None {
        return TickEvents::default();
    }

    state.time_ticks += 1;
    state.effects.update();
    if let Some(warning) = state.warning.as_mut() {
        warning.frames_left = warning.frames_left.saturating_sub(1);
        if warning.frames_left == 0 {
            state.warning = None;
        }
    }

    for enemy in &mut state.enemies {
        enemy.advance();
    }

    let was_airborne = !state.player.grounded;
    kinematics::integrate(&mut state.player, input, tuning);
    let contacts = collision::resolve(&mut state.player, &level.platforms, level.world_width);
    if was_airborne && contacts.grounded {
        let feet = state.player.center() + glam::Vec2::new(0.0, crate::consts::PLAYER_HEIGHT / 2.0);
        state.effects.spawn_dust(feet, &mut state.rng);
    }

    state
        .camera
        .follow(state.player.center(), level, tuning.camera_lerp);

    let result = triggers::run(state, level);
    TickEvents {
        clear_input: result.clear_input,
    }
}
