//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
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

/// Scale a color's alpha
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.02, 0.01, 0.06, 1.0];
    pub const STAR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const SHIP: [f32; 4] = [0.0, 0.95, 1.0, 1.0];
    pub const SHIP_COCKPIT: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
    pub const ENGINE_TRAIL: [f32; 4] = [1.0, 0.0, 0.6, 1.0];
    pub const BULLET: [f32; 4] = [1.0, 0.95, 0.3, 1.0];
    pub const ASTEROID: [f32; 4] = [0.45, 0.4, 0.5, 1.0];
    pub const SCOUT: [f32; 4] = [0.9, 0.3, 0.9, 1.0];
    pub const HEAVY: [f32; 4] = [0.35, 0.5, 0.35, 1.0];
    pub const VALUE_TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const SHIELD: [f32; 4] = [0.3, 0.6, 1.0, 1.0];
    pub const TRIPLE_SHOT: [f32; 4] = [1.0, 0.8, 0.1, 1.0];
    pub const NUKE: [f32; 4] = [1.0, 0.25, 0.1, 1.0];
    pub const BOSS_WING: [f32; 4] = [0.27, 0.04, 0.04, 1.0];
    pub const BOSS_HULL: [f32; 4] = [0.5, 0.11, 0.11, 1.0];
    pub const BOSS_THRUSTER: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BOSS_CORE: [f32; 4] = [0.6, 0.1, 0.1, 1.0];
    pub const BOSS_IRIS: [f32; 4] = [0.97, 0.44, 0.44, 1.0];
    pub const HEALTH_BACK: [f32; 4] = [0.0, 0.0, 0.0, 0.8];
    pub const HEALTH_FILL: [f32; 4] = [0.94, 0.27, 0.27, 1.0];
    pub const HEALTH_FRAME: [f32; 4] = [0.99, 0.65, 0.65, 1.0];
    pub const FLASH_CORRECT: [f32; 4] = [0.0, 1.0, 0.0, 0.25];
    pub const FLASH_WRONG: [f32; 4] = [1.0, 0.0, 0.0, 0.3];
}
