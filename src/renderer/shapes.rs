//! Shape generation and per-frame scene assembly
//!
//! The whole frame is one triangle list in world coordinates; the pipeline
//! maps it through the camera. Geometry outside the camera view (with a
//! margin) is culled here before any vertices are emitted.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{colors, Vertex};
use crate::consts::{GOAL_RADIUS, LIGHT_RADIUS};
use crate::effects::ParticleKind;
use crate::level::{GateKind, Level, PlatformKind};
use crate::sim::state::GameState;
use crate::sim::Enemy;
use crate::Rect;

/// Cull margin around the camera view, in pixels
const CULL_PAD: f32 = 64.0;

/// Generate vertices for a filled axis-aligned rectangle
pub fn quad(rect: Rect, color: [f32; 4]) -> [Vertex; 6] {
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.x + rect.w, rect.y + rect.h);
    [
        Vertex::new(x0, y0, color),
        Vertex::new(x1, y0, color),
        Vertex::new(x1, y1, color),
        Vertex::new(x0, y0, color),
        Vertex::new(x1, y1, color),
        Vertex::new(x0, y1, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Generate vertices for a ring (hollow circle), with per-edge colors so
/// adjacent rings can fade into each other
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    inner_color: [f32; 4],
    outer_color: [f32; 4],
    segments: u32,
) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = center + Vec2::new(theta1.cos(), theta1.sin()) * inner_radius;
        let outer1 = center + Vec2::new(theta1.cos(), theta1.sin()) * outer_radius;
        let inner2 = center + Vec2::new(theta2.cos(), theta2.sin()) * inner_radius;
        let outer2 = center + Vec2::new(theta2.cos(), theta2.sin()) * outer_radius;

        out.push(Vertex::new(inner1.x, inner1.y, inner_color));
        out.push(Vertex::new(outer1.x, outer1.y, outer_color));
        out.push(Vertex::new(inner2.x, inner2.y, inner_color));

        out.push(Vertex::new(inner2.x, inner2.y, inner_color));
        out.push(Vertex::new(outer1.x, outer1.y, outer_color));
        out.push(Vertex::new(outer2.x, outer2.y, outer_color));
    }
}

/// Assemble the full frame in world space.
pub fn scene(state: &GameState, level: &Level) -> Vec<Vertex> {
    let cam = &state.camera;
    let view = Rect::new(
        cam.pos.x - CULL_PAD,
        cam.pos.y - CULL_PAD,
        cam.view.x + 2.0 * CULL_PAD,
        cam.view.y + 2.0 * CULL_PAD,
    );
    let mut out = Vec::with_capacity(2048);

    // Moon pinned near the top-right of the view, no parallax
    let moon = Vec2::new(cam.pos.x + cam.view.x * 0.82, cam.pos.y + 110.0);
    circle(&mut out, moon, 42.0, colors::MOON, 24);

    for platform in &level.platforms {
        if !platform.rect.overlaps(&view) {
            continue;
        }
        let color = match platform.kind {
            PlatformKind::Floor => colors::FLOOR,
            PlatformKind::Platform => colors::PLATFORM,
            PlatformKind::Rubble => colors::RUBBLE,
            PlatformKind::Stair => colors::STAIR,
            PlatformKind::Grave => colors::GRAVE_STONE,
            PlatformKind::Gate => gate_color(state, level, platform.rect.center().x),
        };
        out.extend_from_slice(&quad(platform.rect, color));
    }

    for (i, cp) in level.checkpoints.iter().enumerate() {
        let base = cp.respawn(level.ground_y);
        let marker = Rect::new(base.x - 6.0, base.y - 24.0, 12.0, 72.0);
        if !marker.overlaps(&view) {
            continue;
        }
        let lit = i < state.checkpoints_passed;
        let color = if lit {
            colors::CHECKPOINT_LIT
        } else {
            colors::CHECKPOINT
        };
        out.extend_from_slice(&quad(marker, color));
        if lit {
            circle(&mut out, Vec2::new(base.x, marker.y), 8.0, colors::SPARKLE, 10);
        }
    }

    // East gate door
    let door = Rect::new(
        level.goal.x - GOAL_RADIUS * 0.4,
        level.ground_y - 150.0,
        GOAL_RADIUS * 0.8,
        150.0,
    );
    if door.overlaps(&view) {
        out.extend_from_slice(&quad(door, colors::GOAL_DOOR));
    }

    // Uncollected orbs pulse on the frame counter
    let pulse = 1.0 + 0.12 * (state.time_ticks as f32 * 0.08).sin();
    for orb in &level.orbs {
        if state.collected.contains(&orb.id) || state.discarded.contains(&orb.id) {
            continue;
        }
        if (orb.pos.x - cam.pos.x - cam.view.x / 2.0).abs() > cam.view.x / 2.0 + CULL_PAD {
            continue;
        }
        let r = orb.radius * pulse;
        ring(
            &mut out,
            orb.pos,
            r,
            r * 1.9,
            colors::ORB_GLOW,
            [0.0, 0.0, 0.0, 0.0],
            16,
        );
        circle(&mut out, orb.pos, r, colors::ORB_CORE, 16);
    }

    for enemy in &state.enemies {
        let rect = enemy.rect();
        if !rect.overlaps(&view) {
            continue;
        }
        let color = match enemy.kind {
            crate::level::EnemyKind::Shade => colors::SHADE,
            crate::level::EnemyKind::Sentinel => colors::SENTINEL,
        };
        out.extend_from_slice(&quad(rect, color));
        // Eye toward the patrol direction
        let eye_x = rect.center().x + enemy.dir * Enemy::WIDTH * 0.2;
        let eye = Rect::new(eye_x - 3.0, rect.y + 10.0, 6.0, 6.0);
        out.extend_from_slice(&quad(eye, colors::PLAYER_TRIM));
    }

    // Player: body quad plus a facing trim strip
    let body = state.player.rect();
    out.extend_from_slice(&quad(body, colors::PLAYER));
    let trim_x = if state.player.facing >= 0 {
        body.x + body.w - 8.0
    } else {
        body.x + 2.0
    };
    let trim = Rect::new(trim_x, body.y + 8.0, 6.0, 10.0);
    out.extend_from_slice(&quad(trim, colors::PLAYER_TRIM));

    for p in &state.effects.particles {
        let color = match p.kind {
            ParticleKind::Dust => colors::DUST,
            ParticleKind::Sparkle => colors::SPARKLE,
            ParticleKind::Burst => colors::BURST,
        };
        let color = [color[0], color[1], color[2], color[3] * p.life];
        let s = p.size;
        out.extend_from_slice(&quad(Rect::new(p.pos.x - s / 2.0, p.pos.y - s / 2.0, s, s), color));
    }

    darkness(&mut out, state, view);

    if state.effects.flash > 0.01 {
        let mut flash = colors::FLASH;
        flash[3] = state.effects.flash.min(1.0);
        out.extend_from_slice(&quad(view, flash));
    }

    out
}

/// Lantern-light vignette around the player. Clear inside `LIGHT_RADIUS`,
/// fading bands out to twice that, solid darkness beyond.
fn darkness(out: &mut Vec<Vertex>, state: &GameState, view: Rect) {
    let center = state.player.center();
    let inner = LIGHT_RADIUS;
    let outer = LIGHT_RADIUS * 2.0;
    let dark = colors::DARKNESS;
    let clear = [dark[0], dark[1], dark[2], 0.0];

    const BANDS: u32 = 6;
    for i in 0..BANDS {
        let t0 = i as f32 / BANDS as f32;
        let t1 = (i + 1) as f32 / BANDS as f32;
        let a0 = [dark[0], dark[1], dark[2], dark[3] * t0 * t0];
        let a1 = [dark[0], dark[1], dark[2], dark[3] * t1 * t1];
        ring(
            out,
            center,
            inner + (outer - inner) * t0,
            inner + (outer - inner) * t1,
            if i == 0 { clear } else { a0 },
            a1,
            32,
        );
    }

    // Four quads cover everything past the outer ring
    let left = (center.x - outer).max(view.x);
    let right = (center.x + outer).min(view.x + view.w);
    let top = (center.y - outer).max(view.y);
    let bottom = (center.y + outer).min(view.y + view.h);
    if left > view.x {
        out.extend_from_slice(&quad(Rect::new(view.x, view.y, left - view.x, view.h), dark));
    }
    if right < view.x + view.w {
        out.extend_from_slice(&quad(
            Rect::new(right, view.y, view.x + view.w - right, view.h),
            dark,
        ));
    }
    if top > view.y {
        out.extend_from_slice(&quad(Rect::new(left, view.y, right - left, top - view.y), dark));
    }
    if bottom < view.y + view.h {
        out.extend_from_slice(&quad(
            Rect::new(left, bottom, right - left, view.y + view.h - bottom),
            dark,
        ));
    }
}

/// Closed gates are a heavy timber slab, cleared ones a faint afterimage.
fn gate_color(state: &GameState, level: &Level, slab_x: f32) -> [f32; 4] {
    let cleared = level
        .gates
        .iter()
        .min_by(|a, b| {
            let da = (a.block_x - slab_x).abs();
            let db = (b.block_x - slab_x).abs();
            da.total_cmp(&db)
        })
        .map(|gate| match gate.kind {
            GateKind::Identity => state.greeted,
            GateKind::Item { .. } => state.gate_opened,
        })
        .unwrap_or(false);
    if cleared {
        colors::GATE_OPEN
    } else {
        colors::GATE_CLOSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_emits_two_ccw_triangles() {
        let v = quad(Rect::new(10.0, 20.0, 30.0, 40.0), colors::FLOOR);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].position, [10.0, 20.0]);
        assert_eq!(v[2].position, [40.0, 60.0]);
    }

    #[test]
    fn scene_culls_far_geometry() {
        let level = Level::patrol();
        let state = {
            let mut s = GameState::new(&level, 7, None);
            s.start_run();
            s
        };
        let near = scene(&state, &level).len();

        // A camera at the far end of the world sees different geometry but
        // still a bounded amount of it
        let mut far_state = state.clone();
        far_state.player.pos.x = level.world_width - 200.0;
        far_state
            .camera
            .snap(far_state.player.center(), &level);
        let far = scene(&far_state, &level).len();

        assert!(near > 0 && far > 0);
        assert!(near < 20_000 && far < 20_000);
    }

    #[test]
    fn collected_orbs_disappear_from_the_scene() {
        let level = Level::patrol();
        let mut state = GameState::new(&level, 7, None);
        state.start_run();
        let before = scene(&state, &level).len();
        state.collect_orb(&level, 1);
        let after = scene(&state, &level).len();
        assert!(after < before);
    }
}
