//! Lodge Runner - a side-scrolling quiz platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, triggers, game state)
//! - `level`: Static level/content tables (platforms, orbs, questions)
//! - `renderer`: WebGPU rendering pipeline
//! - `effects`: Visual feedback (particles, screen shake, flash)
//! - `leaderboard`: Fire-and-forget score submission
//! - `tuning`: Data-driven movement/physics balance

pub mod effects;
pub mod identity;
pub mod leaderboard;
pub mod level;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use identity::PlayerIdentity;
pub use tuning::Tuning;

use glam::Vec2;

/// Structural game constants. Movement feel lives in [`tuning::Tuning`];
/// these are the fixed frame-based values the state machine counts in.
pub mod consts {
    /// Player collision box (full extents, world pixels)
    pub const PLAYER_WIDTH: f32 = 36.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;

    /// Frames of post-ground-leave jump eligibility
    pub const COYOTE_FRAMES: u32 = 6;
    /// Frames an early jump request stays armed waiting for touchdown
    pub const JUMP_BUFFER_FRAMES: u32 = 8;
    /// Horizontal velocity below this snaps to zero after friction
    pub const VELOCITY_EPSILON: f32 = 0.05;

    /// Distance below the ground reference line that counts as a fatal fall
    pub const DEATH_DROP: f32 = 520.0;
    /// Extra tolerance on the orb pickup circle test
    pub const ORB_PICKUP_PAD: f32 = 8.0;
    /// Horizontal distance at which the goal trigger fires
    pub const GOAL_RADIUS: f32 = 60.0;
    /// Horizontal distance at which an NPC greeting fires
    pub const GREET_RADIUS: f32 = 70.0;

    /// Score awarded on top of the running total when the goal is reached
    pub const VICTORY_BONUS: u64 = 500;
    /// Frames a transient warning banner stays up (3s at 60fps)
    pub const WARNING_FRAMES: u32 = 180;

    /// Letterboxed design height; world pixels mapped to this vertically
    pub const DESIGN_HEIGHT: f32 = 720.0;
    /// Radius of the light halo around the player in the fog overlay
    pub const LIGHT_RADIUS: f32 = 260.0;
}

/// Axis-aligned rectangle, origin at top-left (screen-style Y-down world)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from a center point and full extents
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}
