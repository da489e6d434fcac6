//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per animation callback, frame-based units
//! - Seeded RNG only
//! - All abnormal states are game-state transitions, never errors
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod kinematics;
pub mod state;
pub mod tick;
pub mod triggers;

pub use camera::Camera;
pub use collision::{resolve, Contacts};
pub use state::{
    Enemy, GameMode, GameState, GravePrompt, LoreSource, ModalState, Player, QuizPrompt, Warning,
};
pub use tick::{tick, TickEvents, TickInput};
