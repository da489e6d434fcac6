//! WebGPU rendering module
//!
//! One vertex-color triangle list per frame: `shapes::scene` assembles the
//! world, `pipeline::RenderState` maps it through the camera and draws it.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{shake_jitter, RenderState};
