//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements. The palette is a moonlit quarry at night:
/// cold stone, warm lantern gold on anything collectible.
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.04, 0.04, 0.09, 1.0];
    pub const MOON: [f32; 4] = [0.92, 0.93, 0.85, 1.0];

    pub const FLOOR: [f32; 4] = [0.22, 0.21, 0.26, 1.0];
    pub const PLATFORM: [f32; 4] = [0.32, 0.30, 0.38, 1.0];
    pub const RUBBLE: [f32; 4] = [0.27, 0.24, 0.22, 1.0];
    pub const STAIR: [f32; 4] = [0.36, 0.34, 0.40, 1.0];
    pub const GRAVE_STONE: [f32; 4] = [0.45, 0.45, 0.50, 1.0];
    pub const GATE_CLOSED: [f32; 4] = [0.40, 0.28, 0.12, 1.0];
    pub const GATE_OPEN: [f32; 4] = [0.40, 0.28, 0.12, 0.25];

    pub const PLAYER: [f32; 4] = [0.25, 0.55, 0.95, 1.0];
    pub const PLAYER_TRIM: [f32; 4] = [0.85, 0.88, 0.95, 1.0];
    pub const SHADE: [f32; 4] = [0.55, 0.15, 0.20, 1.0];
    pub const SENTINEL: [f32; 4] = [0.45, 0.35, 0.60, 1.0];

    pub const ORB_CORE: [f32; 4] = [1.0, 0.85, 0.35, 1.0];
    pub const ORB_GLOW: [f32; 4] = [1.0, 0.75, 0.25, 0.30];
    pub const CHECKPOINT: [f32; 4] = [0.55, 0.60, 0.70, 1.0];
    pub const CHECKPOINT_LIT: [f32; 4] = [0.55, 0.95, 0.70, 1.0];
    pub const GOAL_DOOR: [f32; 4] = [0.75, 0.62, 0.25, 1.0];

    pub const DUST: [f32; 4] = [0.55, 0.52, 0.48, 0.7];
    pub const SPARKLE: [f32; 4] = [1.0, 0.9, 0.5, 0.9];
    pub const BURST: [f32; 4] = [0.85, 0.30, 0.25, 0.9];

    pub const DARKNESS: [f32; 4] = [0.01, 0.01, 0.03, 0.88];
    pub const FLASH: [f32; 4] = [1.0, 0.97, 0.85, 1.0];
}
