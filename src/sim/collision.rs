//! AABB collision resolution against static platform geometry
//!
//! Minimum-translation-vector resolution, applied per platform in table
//! order. This is not a global solve: when the player overlaps several
//! platforms in one frame the corrections apply sequentially, an accepted
//! approximation for inner-corner cases.

use glam::Vec2;

use super::state::Player;
use crate::consts::{COYOTE_FRAMES, PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::level::{Platform, PlatformKind};

/// Side-contact flags produced by one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Landed on top of a platform this frame
    pub grounded: bool,
    /// Hit a platform's underside
    pub head: bool,
    /// Pushed out horizontally (platform or world edge)
    pub wall: bool,
}

/// Resolve the player's tentative position against the platform set and the
/// world bounds, updating velocity, grounded state, and the coyote timer.
pub fn resolve(player: &mut Player, platforms: &[Platform], world_width: f32) -> Contacts {
    let mut contacts = Contacts::default();
    let half_w = PLAYER_WIDTH / 2.0;
    let half_h = PLAYER_HEIGHT / 2.0;

    // World bounds on X first, so platform resolution sees the final column.
    // Falling past the bottom is the death trigger, not a collision.
    let max_x = world_width - PLAYER_WIDTH;
    if player.pos.x < 0.0 {
        player.pos.x = 0.0;
        player.vel.x = 0.0;
        contacts.wall = true;
    } else if player.pos.x > max_x {
        player.pos.x = max_x;
        player.vel.x = 0.0;
        contacts.wall = true;
    }

    for platform in platforms {
        // Gate slabs are scenery; the gate triggers do their blocking
        if platform.kind == PlatformKind::Gate {
            continue;
        }
        let rect = player.rect();
        if !rect.overlaps(&platform.rect) {
            continue;
        }

        let delta = rect.center() - platform.rect.center();
        let overlap_x = half_w + platform.rect.w / 2.0 - delta.x.abs();
        let overlap_y = half_h + platform.rect.h / 2.0 - delta.y.abs();

        if overlap_x < overlap_y {
            // Push out along X
            player.pos.x += overlap_x * delta.x.signum();
            player.vel.x = 0.0;
            contacts.wall = true;
        } else if delta.y < 0.0 {
            // Player center above platform center: land
            player.pos.y -= overlap_y;
            player.vel.y = 0.0;
            player.jump_count = 0;
            contacts.grounded = true;
        } else {
            // Bumped the underside: stop rising without grounding
            player.pos.y += overlap_y;
            player.vel.y = 0.0;
            contacts.head = true;
        }
    }

    player.grounded = contacts.grounded;
    if contacts.grounded {
        player.coyote = COYOTE_FRAMES;
    } else if player.coyote > 0 {
        player.coyote -= 1;
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::PlatformKind;
    use crate::Rect;
    use proptest::prelude::*;

    fn floor() -> Platform {
        Platform::new(Rect::new(0.0, 600.0, 2000.0, 200.0), PlatformKind::Floor)
    }

    fn falling_player(x: f32, y: f32) -> Player {
        let mut p = Player::at_spawn(Vec2::new(x, y));
        p.vel = Vec2::new(0.0, 8.0);
        p
    }

    #[test]
    fn landing_grounds_and_zeroes_vy() {
        let mut p = falling_player(100.0, 600.0 - PLAYER_HEIGHT + 6.0);
        p.jump_count = 1;
        let c = resolve(&mut p, &[floor()], 2000.0);
        assert!(c.grounded);
        assert_eq!(p.pos.y, 600.0 - PLAYER_HEIGHT);
        assert_eq!(p.vel.y, 0.0);
        assert_eq!(p.jump_count, 0);
        assert_eq!(p.coyote, COYOTE_FRAMES);
    }

    #[test]
    fn underside_hit_stops_rise_without_grounding() {
        let ceiling = Platform::new(Rect::new(0.0, 100.0, 400.0, 40.0), PlatformKind::Platform);
        let mut p = Player::at_spawn(Vec2::new(100.0, 140.0 - 4.0));
        p.vel.y = -10.0;
        let c = resolve(&mut p, &[ceiling], 2000.0);
        assert!(c.head);
        assert!(!c.grounded);
        assert_eq!(p.pos.y, 140.0);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn side_hit_zeroes_vx() {
        let wall = Platform::new(Rect::new(300.0, 500.0, 40.0, 200.0), PlatformKind::Rubble);
        let mut p = Player::at_spawn(Vec2::new(300.0 - PLAYER_WIDTH + 5.0, 560.0));
        p.vel.x = 6.0;
        let c = resolve(&mut p, &[wall], 2000.0);
        assert!(c.wall);
        assert_eq!(p.pos.x, 300.0 - PLAYER_WIDTH);
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn gate_slabs_do_not_collide() {
        let gate = Platform::new(Rect::new(300.0, 420.0, 28.0, 180.0), PlatformKind::Gate);
        let mut p = Player::at_spawn(Vec2::new(305.0, 500.0));
        p.vel.x = 6.0;
        let c = resolve(&mut p, &[gate], 2000.0);
        assert!(!c.wall);
        assert_eq!(p.pos.x, 305.0);
        assert_eq!(p.vel.x, 6.0);
    }

    #[test]
    fn world_bounds_clamp_x() {
        let mut p = Player::at_spawn(Vec2::new(-10.0, 0.0));
        p.vel.x = -5.0;
        resolve(&mut p, &[], 2000.0);
        assert_eq!(p.pos.x, 0.0);
        assert_eq!(p.vel.x, 0.0);

        let mut p = Player::at_spawn(Vec2::new(1990.0, 0.0));
        p.vel.x = 5.0;
        resolve(&mut p, &[], 2000.0);
        assert_eq!(p.pos.x, 2000.0 - PLAYER_WIDTH);
    }

    #[test]
    fn coyote_decrements_while_airborne() {
        let mut p = Player::at_spawn(Vec2::new(100.0, 100.0));
        p.coyote = 3;
        resolve(&mut p, &[], 2000.0);
        assert_eq!(p.coyote, 2);
        resolve(&mut p, &[], 2000.0);
        resolve(&mut p, &[], 2000.0);
        resolve(&mut p, &[], 2000.0);
        assert_eq!(p.coyote, 0);
    }

    proptest! {
        /// Resolver post-condition: after resolution the player no longer
        /// overlaps the platform (single-platform case, the resolved axis
        /// fully separates).
        #[test]
        fn resolved_player_does_not_overlap(
            px in -50.0f32..2050.0,
            py in 400.0f32..700.0,
            vx in -8.0f32..8.0,
            vy in -16.0f32..16.0,
        ) {
            let platform = floor();
            let mut p = Player::at_spawn(Vec2::new(px, py));
            p.vel = Vec2::new(vx, vy);
            resolve(&mut p, &[platform], 2000.0);
            prop_assert!(!p.rect().overlaps(&platform.rect));
        }

        #[test]
        fn x_always_inside_world(px in -500.0f32..2500.0) {
            let mut p = Player::at_spawn(Vec2::new(px, 0.0));
            resolve(&mut p, &[], 2000.0);
            prop_assert!(p.pos.x >= 0.0);
            prop_assert!(p.pos.x <= 2000.0 - PLAYER_WIDTH);
        }
    }
}
