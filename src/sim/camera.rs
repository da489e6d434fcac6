//! Smoothed follow camera
//!
//! Tracks the top-left corner of the visible world window. The target
//! centers the player; the actual position covers a fixed fraction of the
//! remaining distance each frame (exponential smoothing, no overshoot).

use glam::Vec2;

use crate::consts::DESIGN_HEIGHT;
use crate::level::Level;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Top-left world offset used by the render pass
    pub pos: Vec2,
    /// Visible world size; height is the letterboxed design height, width
    /// follows the surface aspect ratio
    pub view: Vec2,
}

impl Camera {
    pub fn at(target: Vec2) -> Self {
        let mut cam = Self {
            pos: Vec2::ZERO,
            view: Vec2::new(1280.0, DESIGN_HEIGHT),
        };
        cam.pos = target - cam.view / 2.0;
        cam
    }

    /// Called by the driver when the surface aspect ratio changes.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.view = Vec2::new(DESIGN_HEIGHT * aspect.max(0.1), DESIGN_HEIGHT);
    }

    /// Where the camera wants to be to center `target`, clamped so the view
    /// never leaves [0, world_width] horizontally or the level's vertical
    /// band.
    pub fn target_for(&self, target: Vec2, level: &Level) -> Vec2 {
        let mut t = target - self.view / 2.0;
        let max_x = (level.world_width - self.view.x).max(0.0);
        t.x = t.x.clamp(0.0, max_x);
        t.y = t.y.clamp(level.camera_min_y, level.camera_max_y);
        t
    }

    /// One frame of exponential smoothing toward the clamped target.
    pub fn follow(&mut self, target: Vec2, level: &Level, lerp: f32) {
        let t = self.target_for(target, level);
        self.pos += (t - self.pos) * lerp;
    }

    /// Jump straight to the clamped target (spawn, respawn).
    pub fn snap(&mut self, target: Vec2, level: &Level) {
        self.pos = self.target_for(target, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    #[test]
    fn clamps_to_world_left_edge() {
        let level = Level::story();
        let mut cam = Camera::at(Vec2::ZERO);
        cam.snap(Vec2::new(0.0, level.ground_y), &level);
        assert_eq!(cam.pos.x, 0.0);
    }

    #[test]
    fn clamps_to_world_right_edge() {
        let level = Level::story();
        let mut cam = Camera::at(Vec2::ZERO);
        cam.snap(Vec2::new(level.world_width, level.ground_y), &level);
        assert_eq!(cam.pos.x, level.world_width - cam.view.x);
    }

    #[test]
    fn vertical_band_holds() {
        let level = Level::story();
        let mut cam = Camera::at(Vec2::ZERO);
        cam.snap(Vec2::new(3000.0, -10_000.0), &level);
        assert_eq!(cam.pos.y, level.camera_min_y);
        cam.snap(Vec2::new(3000.0, 10_000.0), &level);
        assert_eq!(cam.pos.y, level.camera_max_y);
    }

    #[test]
    fn follow_approaches_without_overshoot() {
        let level = Level::story();
        let mut cam = Camera::at(Vec2::new(500.0, level.ground_y - 100.0));
        let target = Vec2::new(3000.0, level.ground_y - 100.0);
        let want = cam.target_for(target, &level);

        let mut last_dist = (want.x - cam.pos.x).abs();
        for _ in 0..300 {
            cam.follow(target, &level, 0.12);
            let dist = (want.x - cam.pos.x).abs();
            assert!(dist <= last_dist, "camera must never overshoot");
            last_dist = dist;
        }
        assert!(last_dist < 1.0, "camera converges asymptotically");
    }
}
