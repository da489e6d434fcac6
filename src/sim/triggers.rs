//! Trigger engine: priority-ordered proximity/overlap events
//!
//! Scanned once per tick in a fixed order; the first state-changing trigger
//! short-circuits the rest of the frame so no two triggers ever fire
//! together. Checkpoint crossings and goal warnings are non-blocking and
//! fall through.
//!
//! All orb data is re-derived from the level tables plus the live
//! collected-ID set on every scan; nothing here caches per-orb state.

use glam::Vec2;

use super::state::{GameMode, GameState, LoreSource};
use crate::consts::*;
use crate::level::{compose_greeting, GateKind, Level, NpcGate};

/// What the driver needs to know about this frame's triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerResult {
    /// A trigger fired and the rest of the tick must not run
    pub halt: bool,
    /// Held-input flags must be dropped (a modal opened)
    pub clear_input: bool,
}

impl TriggerResult {
    fn halt() -> Self {
        Self {
            halt: true,
            clear_input: false,
        }
    }

    fn modal() -> Self {
        Self {
            halt: true,
            clear_input: true,
        }
    }
}

/// Run the full trigger scan for one frame.
pub fn run(state: &mut GameState, level: &Level) -> TriggerResult {
    // 1. Fatal fall, regardless of any other state
    if state.player.pos.y > level.death_y() {
        state.enter_grave(level);
        return TriggerResult::halt();
    }

    // 2. Checkpoint crossings: advance the respawn record, never block
    advance_checkpoints(state, level);

    // 3/4. NPC gates (story variant): identity gate first, then the warded
    // gate, in table order
    for gate in &level.gates {
        if let Some(result) = run_gate(state, gate) {
            return result;
        }
    }

    // 5. Orb collection, derived fresh from level orbs minus collected IDs
    let center = state.player.center();
    let reach = PLAYER_WIDTH / 2.0 + ORB_PICKUP_PAD;
    let hit = level
        .orbs
        .iter()
        .filter(|o| !state.collected.contains(&o.id) && !state.discarded.contains(&o.id))
        .find(|o| center.distance(o.pos) < o.radius + reach)
        .map(|o| o.id);
    if let Some(orb_id) = hit {
        state.player.vel = Vec2::ZERO;
        if state.seen_lore.contains(&orb_id) {
            // Lore already acknowledged: straight to the quiz or collection
            state.route_orb(level, orb_id);
        } else {
            state.open_lore(LoreSource::Orb(orb_id));
        }
        return TriggerResult::modal();
    }

    // 6. Enemy contact (patrol variant): no invulnerability window
    let player_rect = state.player.rect();
    if state.enemies.iter().any(|e| player_rect.overlaps(&e.rect())) {
        state.enter_grave(level);
        return TriggerResult::halt();
    }

    // 7. Goal
    if (center.x - level.goal.x).abs() < GOAL_RADIUS {
        if state.has_required_tools(level) {
            state.score += VICTORY_BONUS;
            state.final_score = Some(state.score);
            state.effects.set_flash(1.0);
            let goal = level.goal;
            state.effects.spawn_burst(goal, &mut state.rng);
            state.mode = GameMode::Victory;
            return TriggerResult::halt();
        }
        let missing = level
            .required_tools
            .iter()
            .filter(|id| !state.collected.contains(id))
            .count();
        state.show_warning(format!(
            "The door stands fast. {missing} working tool{} still wanting.",
            if missing == 1 { "" } else { "s" }
        ));
    }

    TriggerResult::default()
}

fn advance_checkpoints(state: &mut GameState, level: &Level) {
    let x = state.player.center().x;
    while let Some(cp) = level.checkpoints.get(state.checkpoints_passed) {
        if x <= cp.x {
            break;
        }
        state.respawn = cp.respawn(level.ground_y);
        state.checkpoints_passed += 1;
        let pos = state.player.center();
        state.effects.spawn_sparkle(pos, &mut state.rng);
    }
}

fn run_gate(state: &mut GameState, gate: &NpcGate) -> Option<TriggerResult> {
    match gate.kind {
        GateKind::Identity => {
            let complete = state
                .identity
                .as_ref()
                .map(|i| i.is_complete())
                .unwrap_or(false);
            if !complete {
                // Only ask for a name once the gate is actually in the way
                if state.player.pos.x + PLAYER_WIDTH > gate.block_x {
                    state.identity_requested = true;
                    block_at(state, gate.block_x);
                }
                return None;
            }
            let near = (state.player.center().x - gate.greet_x).abs() < GREET_RADIUS;
            if !state.greeted && near {
                state.greeted = true;
                // Identity is present: completeness was just checked
                let text = state
                    .identity
                    .as_ref()
                    .map(compose_greeting)
                    .unwrap_or_default();
                state.open_lore(LoreSource::Gate(text));
                return Some(TriggerResult::modal());
            }
        }
        GateKind::Item { required_item } => {
            if state.gate_opened {
                return None;
            }
            let passable = state.greeted && state.collected.contains(&required_item);
            if !passable {
                block_at(state, gate.block_x);
                return None;
            }
            if (state.player.center().x - gate.greet_x).abs() < GREET_RADIUS {
                state.gate_opened = true;
                state.open_lore(LoreSource::Gate(
                    "The warden draws back the bar. \"Pass, and mind the dark.\"".into(),
                ));
                return Some(TriggerResult::modal());
            }
        }
    }
    None
}

/// Stop forward motion at a closed gate.
fn block_at(state: &mut GameState, block_x: f32) {
    if state.player.pos.x + PLAYER_WIDTH > block_x {
        state.player.pos.x = block_x - PLAYER_WIDTH;
        state.player.vel.x = 0.0;
    }
}
