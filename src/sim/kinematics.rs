//! Per-frame kinematics integrator
//!
//! Semi-implicit Euler with exactly one substep per frame: velocities update
//! first, then `pos += vel`. All units are pixels per frame; the tuning
//! values assume one tick per animation callback.

use super::state::Player;
use super::tick::TickInput;
use crate::consts::{JUMP_BUFFER_FRAMES, VELOCITY_EPSILON};
use crate::tuning::Tuning;

/// Advance the player's velocity and position for one frame.
///
/// Coyote re-arming and decrement happen in the collision resolver, which is
/// where groundedness is decided; this step only consumes the window.
pub fn integrate(player: &mut Player, input: &TickInput, tuning: &Tuning) {
    // Horizontal: input acceleration, speed clamp, then unconditional friction
    if input.left {
        player.vel.x -= tuning.acceleration;
        player.facing = -1;
    }
    if input.right {
        player.vel.x += tuning.acceleration;
        player.facing = 1;
    }
    player.vel.x = player.vel.x.clamp(-tuning.move_speed, tuning.move_speed);
    player.vel.x *= tuning.friction;
    if player.vel.x.abs() < VELOCITY_EPSILON {
        player.vel.x = 0.0;
    }

    // Vertical: gravity accumulates every frame unconditionally
    player.vel.y += tuning.gravity;

    // Jump buffering: a fresh press arms the buffer, otherwise it drains
    if input.jump_pressed {
        player.jump_buffer = JUMP_BUFFER_FRAMES;
    } else if player.jump_buffer > 0 {
        player.jump_buffer -= 1;
    }

    // Jump fires while buffered and either grounded or inside coyote time
    if player.jump_buffer > 0 && (player.grounded || player.coyote > 0) {
        player.vel.y = tuning.jump_force;
        player.grounded = false;
        player.coyote = 0;
        player.jump_buffer = 0;
        player.jump_count = 1;
    }

    // Short-hop: releasing jump while still rising halves the impulse
    if input.jump_released && player.vel.y < 0.0 {
        player.vel.y *= 0.5;
    }

    player.pos += player.vel;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::COYOTE_FRAMES;
    use glam::Vec2;

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn grounded_player() -> Player {
        let mut p = Player::at_spawn(Vec2::new(100.0, 100.0));
        p.grounded = true;
        p
    }

    #[test]
    fn vx_clamped_to_move_speed() {
        let tuning = Tuning::default();
        let mut p = grounded_player();
        let input = TickInput {
            right: true,
            ..idle()
        };
        for _ in 0..120 {
            integrate(&mut p, &input, &tuning);
            assert!(p.vel.x.abs() <= tuning.move_speed);
        }
        assert!(p.vel.x > 0.0);
        assert_eq!(p.facing, 1);
    }

    #[test]
    fn friction_snaps_small_vx_to_zero() {
        let tuning = Tuning::default();
        let mut p = grounded_player();
        p.vel.x = 3.0;
        // No input held: friction alone must drain vx to exactly zero
        for _ in 0..200 {
            integrate(&mut p, &idle(), &tuning);
        }
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn gravity_accumulates_every_frame() {
        let tuning = Tuning::default();
        let mut p = Player::at_spawn(Vec2::ZERO);
        integrate(&mut p, &idle(), &tuning);
        integrate(&mut p, &idle(), &tuning);
        assert_eq!(p.vel.y, tuning.gravity * 2.0);
    }

    #[test]
    fn grounded_jump_fires() {
        let tuning = Tuning::default();
        let mut p = grounded_player();
        let input = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..idle()
        };
        integrate(&mut p, &input, &tuning);
        assert_eq!(p.vel.y, tuning.jump_force);
        assert!(!p.grounded);
        assert_eq!(p.jump_count, 1);
        assert_eq!(p.coyote, 0);
    }

    #[test]
    fn coyote_window_allows_late_jump() {
        let tuning = Tuning::default();
        let mut p = Player::at_spawn(Vec2::ZERO);
        p.grounded = false;
        p.coyote = 2;
        let input = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..idle()
        };
        integrate(&mut p, &input, &tuning);
        assert_eq!(p.vel.y, tuning.jump_force);
    }

    #[test]
    fn airborne_jump_outside_coyote_is_buffered() {
        let tuning = Tuning::default();
        let mut p = Player::at_spawn(Vec2::ZERO);
        p.grounded = false;
        p.coyote = 0;
        let press = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..idle()
        };
        integrate(&mut p, &press, &tuning);
        // No launch, but the request is armed
        assert!(p.vel.y > tuning.jump_force);
        assert_eq!(p.jump_buffer, JUMP_BUFFER_FRAMES);

        // Touchdown a couple frames later: the buffered jump fires
        let hold = TickInput {
            jump_held: true,
            ..idle()
        };
        integrate(&mut p, &hold, &tuning);
        p.grounded = true;
        p.coyote = COYOTE_FRAMES;
        p.vel.y = 0.0;
        integrate(&mut p, &hold, &tuning);
        assert_eq!(p.vel.y, tuning.jump_force);
    }

    #[test]
    fn buffer_expires_without_touchdown() {
        let tuning = Tuning::default();
        let mut p = Player::at_spawn(Vec2::ZERO);
        p.grounded = false;
        let press = TickInput {
            jump_pressed: true,
            ..idle()
        };
        integrate(&mut p, &press, &tuning);
        for _ in 0..JUMP_BUFFER_FRAMES {
            integrate(&mut p, &idle(), &tuning);
        }
        assert_eq!(p.jump_buffer, 0);
        p.grounded = true;
        p.vel.y = 0.0;
        integrate(&mut p, &idle(), &tuning);
        assert!(p.vel.y >= 0.0, "expired buffer must not launch a jump");
    }

    #[test]
    fn releasing_jump_halves_upward_velocity() {
        let tuning = Tuning::default();
        let mut p = Player::at_spawn(Vec2::ZERO);
        p.vel.y = -12.0;
        let release = TickInput {
            jump_released: true,
            ..idle()
        };
        integrate(&mut p, &release, &tuning);
        // Gravity applies first, then the cut
        assert_eq!(p.vel.y, (-12.0 + tuning.gravity) * 0.5);
    }

    #[test]
    fn release_while_falling_does_nothing() {
        let tuning = Tuning::default();
        let mut p = Player::at_spawn(Vec2::ZERO);
        p.vel.y = 5.0;
        let release = TickInput {
            jump_released: true,
            ..idle()
        };
        integrate(&mut p, &release, &tuning);
        assert_eq!(p.vel.y, 5.0 + tuning.gravity);
    }

    #[test]
    fn position_integrates_after_velocity() {
        let tuning = Tuning::default();
        let mut p = Player::at_spawn(Vec2::new(10.0, 20.0));
        integrate(&mut p, &idle(), &tuning);
        // Semi-implicit: the fresh gravity shows up in this frame's movement
        assert_eq!(p.pos.y, 20.0 + tuning.gravity);
    }
}
