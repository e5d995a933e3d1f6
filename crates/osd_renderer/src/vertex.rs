//! Vertex type for overlay text quads.

use bytemuck::{Pod, Zeroable};

/// One corner of a glyph quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    /// NDC position (x, y) in -1..1
    pub position: [f32; 2],
    /// Atlas cell coordinate: x counts glyph columns (0..95), y is 0 at the
    /// glyph's bottom row and 1 at its top. The shader scales x by 1/95.
    pub cell: [f32; 2],
}

impl GlyphVertex {
    pub const fn new(x: f32, y: f32, cell_x: f32, cell_y: f32) -> Self {
        Self {
            position: [x, y],
            cell: [cell_x, cell_y],
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // Atlas cell
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}
