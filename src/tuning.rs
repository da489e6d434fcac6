//! Movement and physics tuning
//!
//! All per-frame movement constants live here so balance changes never touch
//! the simulation code. Values are in world pixels per frame (the tick runs
//! once per animation callback); they can be overridden from a JSON blob.

use serde::{Deserialize, Serialize};

/// Numeric tuning constants consumed read-only by the simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration added to vy every frame
    pub gravity: f32,
    /// Multiplier applied to vx every frame (< 1)
    pub friction: f32,
    /// Horizontal acceleration per held direction per frame
    pub acceleration: f32,
    /// Horizontal speed cap (|vx| clamp)
    pub move_speed: f32,
    /// Jump impulse (negative = up in Y-down world)
    pub jump_force: f32,
    /// Fraction of the remaining distance the camera covers per frame
    pub camera_lerp: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            friction: 0.85,
            acceleration: 1.2,
            move_speed: 6.0,
            jump_force: -15.0,
            camera_lerp: 0.12,
        }
    }
}

impl Tuning {
    /// Parse a tuning overlay from JSON; missing fields keep their defaults.
    /// A malformed blob is logged and ignored rather than aborting startup.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Bad tuning overlay, using defaults: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let t = Tuning::default();
        assert!(t.gravity > 0.0);
        assert!(t.friction > 0.0 && t.friction < 1.0);
        assert!(t.jump_force < 0.0);
        assert!(t.camera_lerp > 0.0 && t.camera_lerp < 1.0);
    }

    #[test]
    fn partial_overlay_keeps_defaults() {
        let t = Tuning::from_json(r#"{"gravity": 1.1}"#);
        assert_eq!(t.gravity, 1.1);
        assert_eq!(t.move_speed, Tuning::default().move_speed);
    }

    #[test]
    fn malformed_overlay_falls_back() {
        let t = Tuning::from_json("not json");
        assert_eq!(t.gravity, Tuning::default().gravity);
    }
}
