//! The graphics-device seam the frame renderer draws through.
//!
//! The renderer never talks to a GPU API directly. It saves the device's
//! state, applies [`OverlayState`], issues uploads and draws, then restores
//! what it saved so the host's own rendering is left untouched.

use glam::Vec2;

use crate::font::Atlas;
use crate::vertex::GlyphVertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcAlpha,
}

/// Separate color/alpha blend factors, additive equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFunc {
    pub src_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_color: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendFunc {
    /// Source-color modulated blend: the white/transparent atlas texel acts
    /// as a mask for the uniform color and destination alpha is preserved.
    pub const OVERLAY: BlendFunc = BlendFunc {
        src_color: BlendFactor::SrcColor,
        src_alpha: BlendFactor::Zero,
        dst_color: BlendFactor::OneMinusSrcAlpha,
        dst_alpha: BlendFactor::One,
    };
}

/// Device state the overlay needs while drawing: its atlas, vertex buffer
/// and pipeline bound, blending on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayState {
    pub blend: Option<BlendFunc>,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            blend: Some(BlendFunc::OVERLAY),
        }
    }
}

/// Stateful graphics device the overlay renders through.
///
/// Calls are synchronous and assumed to succeed once the device exists.
/// All calls come from the render thread.
pub trait GraphicsDevice {
    /// Opaque copy of whatever state `apply_state` will disturb.
    type SavedState;

    /// Upload the glyph atlas. Called exactly once per renderer lifetime;
    /// the texture is sampled nearest-neighbour with a single mip level.
    fn upload_atlas(&mut self, atlas: &Atlas);

    fn save_state(&mut self) -> Self::SavedState;

    /// Bind the overlay's texture, buffer and pipeline with `state`'s blend.
    fn apply_state(&mut self, state: &OverlayState);

    fn restore_state(&mut self, saved: Self::SavedState);

    /// Replace the whole geometry buffer with `vertices`.
    fn upload_vertices(&mut self, vertices: &[GlyphVertex]);

    /// Offset added to every vertex position, in NDC.
    fn set_offset(&mut self, offset: Vec2);

    /// Normalized RGBA multiplied into every sampled texel.
    fn set_color(&mut self, rgba: [f32; 4]);

    /// Draw the first `vertex_count` uploaded vertices as a triangle list.
    fn draw_triangles(&mut self, vertex_count: u32);
}
