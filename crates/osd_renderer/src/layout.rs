//! Text layout: strings to screen-space glyph quads.

use glam::Vec2;

use crate::font::{glyph_index, CHARACTER_HEIGHT, CHARACTER_WIDTH};
use crate::vertex::GlyphVertex;

/// Vertices emitted per visible glyph (two triangles).
pub const VERTICES_PER_GLYPH: usize = 6;

/// Framebuffer size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferSize {
    pub width: u32,
    pub height: u32,
}

impl FramebufferSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Per-frame glyph metrics in NDC, derived from the framebuffer size and
/// the density scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawInfo {
    /// Screen pixels per font pixel.
    pub scaled_density: f32,
    pub font_width: f32,
    pub font_height: f32,
    pub border_x: f32,
    pub border_y: f32,
    /// Drop-shadow offset: right a quarter glyph, down a sixth.
    pub shadow: Vec2,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Top-left cursor of the first line of the first message.
    pub start: Vec2,
}

impl DrawInfo {
    pub fn new(scaled_density: f32) -> Self {
        Self {
            scaled_density,
            font_width: 0.0,
            font_height: 0.0,
            border_x: 0.0,
            border_y: 0.0,
            shadow: Vec2::ZERO,
            screen_width: 0.0,
            screen_height: 0.0,
            start: Vec2::ZERO,
        }
    }

    /// Recompute metrics for the current framebuffer. Called every frame so
    /// a resize takes effect immediately.
    pub fn update(&mut self, framebuffer: FramebufferSize) {
        self.screen_width = framebuffer.width.max(1) as f32;
        self.screen_height = framebuffer.height.max(1) as f32;
        self.font_width = self.scaled_density * CHARACTER_WIDTH as f32 / self.screen_width * 2.0;
        self.font_height = self.scaled_density * CHARACTER_HEIGHT as f32 / self.screen_height * 2.0;
        self.border_x = self.font_width / 2.0;
        self.border_y = self.font_height / 2.0;
        self.shadow = Vec2::new(self.font_width / 4.0, -self.font_height / 6.0);
        self.start = Vec2::new(self.font_width - 1.0, 1.0 - self.font_height * 1.1);
    }

    /// Horizontal cursor advance per character cell.
    pub fn advance_x(&self) -> f32 {
        self.font_width + self.border_x
    }

    /// Vertical distance between lines.
    pub fn line_height(&self) -> f32 {
        self.font_height + self.border_y
    }
}

/// Geometry for one laid-out string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMesh {
    pub vertices: Vec<GlyphVertex>,
    /// Where the next message should start: the line below this one's last
    /// line, back at the left margin.
    pub next_start: Vec2,
}

impl TextMesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_GLYPH
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

/// Lay out `text` starting at `start`.
///
/// `'\n'` returns to `start.x` one line down, `' '` advances without
/// geometry, and characters outside printable ASCII are dropped without
/// advancing.
pub fn layout_text(text: &str, info: &DrawInfo, start: Vec2) -> TextMesh {
    let mut x = start.x;
    let mut y = start.y;
    let mut vertices = Vec::with_capacity(text.len() * VERTICES_PER_GLYPH);

    for ch in text.chars() {
        if ch == '\n' {
            x = start.x;
            y -= info.line_height();
            continue;
        }

        if ch == ' ' {
            x += info.advance_x();
            continue;
        }

        let Some(index) = glyph_index(ch) else {
            continue;
        };

        let u0 = index as f32;
        let u1 = u0 + 1.0;
        let x1 = x + info.font_width;
        let y1 = y + info.font_height;
        vertices.extend_from_slice(&[
            GlyphVertex::new(x, y, u0, 0.0),
            GlyphVertex::new(x1, y, u1, 0.0),
            GlyphVertex::new(x1, y1, u1, 1.0),
            GlyphVertex::new(x, y, u0, 0.0),
            GlyphVertex::new(x1, y1, u1, 1.0),
            GlyphVertex::new(x, y1, u0, 1.0),
        ]);

        x += info.advance_x();
    }

    TextMesh {
        vertices,
        next_start: Vec2::new(start.x, y - info.line_height()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn info_800x600() -> DrawInfo {
        let mut info = DrawInfo::new(1.8);
        info.update(FramebufferSize::new(800, 600));
        info
    }

    #[test]
    fn draw_info_metrics() {
        let info = info_800x600();
        assert!((info.font_width - 1.8 * 8.0 / 800.0 * 2.0).abs() < EPS);
        assert!((info.font_height - 1.8 * 13.0 / 600.0 * 2.0).abs() < EPS);
        assert!((info.border_x - info.font_width / 2.0).abs() < EPS);
        assert!((info.border_y - info.font_height / 2.0).abs() < EPS);
        assert!((info.shadow.x - info.font_width / 4.0).abs() < EPS);
        assert!((info.shadow.y + info.font_height / 6.0).abs() < EPS);
        assert!((info.start.x - (info.font_width - 1.0)).abs() < EPS);
        assert!((info.start.y - (1.0 - info.font_height * 1.1)).abs() < EPS);
    }

    #[test]
    fn draw_info_scales_inversely_with_framebuffer() {
        let mut small = DrawInfo::new(1.8);
        small.update(FramebufferSize::new(400, 300));
        let large = info_800x600();
        assert!((small.font_width - large.font_width * 2.0).abs() < EPS);
        assert!((small.font_height - large.font_height * 2.0).abs() < EPS);
    }

    #[test]
    fn draw_info_survives_zero_sized_framebuffer() {
        let mut info = DrawInfo::new(1.8);
        info.update(FramebufferSize::new(0, 0));
        assert!(info.font_width.is_finite());
        assert!(info.font_height.is_finite());
    }

    #[test]
    fn space_advances_without_geometry() {
        let info = info_800x600();
        let mesh = layout_text("A B", &info, info.start);
        assert_eq!(mesh.glyph_count(), 2);
        let a = mesh.vertices[0];
        let b = mesh.vertices[VERTICES_PER_GLYPH];
        assert!((b.position[0] - (a.position[0] + 2.0 * info.advance_x())).abs() < EPS);
        assert!((b.position[1] - a.position[1]).abs() < EPS);
    }

    #[test]
    fn newline_resets_x_and_moves_down() {
        let info = info_800x600();
        let mesh = layout_text("A\nB", &info, info.start);
        assert_eq!(mesh.glyph_count(), 2);
        let a = mesh.vertices[0];
        let b = mesh.vertices[VERTICES_PER_GLYPH];
        assert!((b.position[0] - a.position[0]).abs() < EPS);
        assert!((b.position[1] - (a.position[1] - info.line_height())).abs() < EPS);
    }

    #[test]
    fn quad_corners_and_cells() {
        let info = info_800x600();
        let start = Vec2::new(-0.5, 0.25);
        let mesh = layout_text("A", &info, start);
        let (x0, y0) = (start.x, start.y);
        let (x1, y1) = (x0 + info.font_width, y0 + info.font_height);
        let expected = [
            GlyphVertex::new(x0, y0, 33.0, 0.0),
            GlyphVertex::new(x1, y0, 34.0, 0.0),
            GlyphVertex::new(x1, y1, 34.0, 1.0),
            GlyphVertex::new(x0, y0, 33.0, 0.0),
            GlyphVertex::new(x1, y1, 34.0, 1.0),
            GlyphVertex::new(x0, y1, 33.0, 1.0),
        ];
        assert_eq!(mesh.vertices, expected);
    }

    #[test]
    fn empty_and_whitespace_yield_no_geometry() {
        let info = info_800x600();
        assert!(layout_text("", &info, info.start).is_empty());
        assert!(layout_text("  \n \n", &info, info.start).is_empty());
    }

    #[test]
    fn out_of_range_characters_are_dropped_without_advance() {
        let info = info_800x600();
        let mesh = layout_text("A\u{7f}é\tB", &info, info.start);
        assert_eq!(mesh.glyph_count(), 2);
        let a = mesh.vertices[0];
        let b = mesh.vertices[VERTICES_PER_GLYPH];
        assert!((b.position[0] - (a.position[0] + info.advance_x())).abs() < EPS);
    }

    #[test]
    fn next_start_stacks_below_last_line() {
        let info = info_800x600();
        let first = layout_text("one", &info, info.start);
        assert!((first.next_start.x - info.start.x).abs() < EPS);
        assert!((first.next_start.y - (info.start.y - info.line_height())).abs() < EPS);

        let two_lines = layout_text("a\nb", &info, info.start);
        assert!((two_lines.next_start.y - (info.start.y - 2.0 * info.line_height())).abs() < EPS);

        // Empty text still consumes a line.
        let empty = layout_text("", &info, info.start);
        assert!((empty.next_start.y - first.next_start.y).abs() < EPS);
    }
}
