//! Frame renderer: owns the message list and draws it through a device.

use glam::Vec2;
use osd_core::{Color, Message, MessageDuration, MessageRegistry, MessageType, PerfStats, PerfStatsSource};

use crate::device::{GraphicsDevice, OverlayState};
use crate::font::build_atlas;
use crate::layout::{layout_text, DrawInfo, FramebufferSize};

/// Screen pixels per font pixel.
pub const DEFAULT_DENSITY_SCALE: f32 = 1.8;
/// Minimum time between two refreshes of the perf line.
pub const PERF_REFRESH_INTERVAL_MS: u64 = 500;

/// Text of the perf line, metrics truncated to integers.
pub fn format_perf_line(stats: &PerfStats) -> String {
    format!(
        "FPS:{:>2} - VPS:{:>2} - SPD:{:>2}",
        stats.game_fps as i32,
        stats.system_fps as i32,
        (stats.emulation_speed * 100.0) as i32,
    )
}

pub struct RasterFont<D: GraphicsDevice> {
    device: D,
    draw_info: DrawInfo,
    state: OverlayState,
    messages: MessageRegistry,
    /// Clock reading of the last perf-line refresh; `None` until the first draw.
    last_perf_refresh: Option<u64>,
}

impl<D: GraphicsDevice> RasterFont<D> {
    /// Take ownership of `device` and upload the glyph atlas to it.
    pub fn new(mut device: D, scaled_density: f32) -> Self {
        let atlas = build_atlas();
        device.upload_atlas(&atlas);
        log::debug!("Uploaded {}x{} glyph atlas", atlas.width, atlas.height);

        Self {
            device,
            draw_info: DrawInfo::new(scaled_density),
            state: OverlayState::default(),
            messages: MessageRegistry::new(),
            last_perf_refresh: None,
        }
    }

    pub fn add_message(
        &mut self,
        text: impl Into<String>,
        kind: MessageType,
        duration: MessageDuration,
        color: Color,
        now_ms: u64,
    ) {
        self.messages.add_or_replace(text, kind, duration, color, now_ms);
    }

    /// Draw every live message onto the current framebuffer.
    ///
    /// Device state is saved first and restored last. In between: refresh
    /// the perf line if due, sweep expired messages, then lay out and draw
    /// the rest top to bottom.
    pub fn draw(&mut self, framebuffer: FramebufferSize, now_ms: u64, stats: &mut dyn PerfStatsSource) {
        self.draw_info.update(framebuffer);

        let saved = self.device.save_state();
        self.device.apply_state(&self.state);

        let refresh_due = self
            .last_perf_refresh
            .map_or(true, |last| now_ms.saturating_sub(last) > PERF_REFRESH_INTERVAL_MS);
        if refresh_due {
            self.refresh_perf_line(stats.take_perf_stats(), now_ms);
            self.last_perf_refresh = Some(now_ms);
        }

        self.messages.sweep_expired(now_ms);

        let mut start = self.draw_info.start;
        for message in &self.messages {
            start = draw_text(&mut self.device, &self.draw_info, message, start);
        }

        self.device.restore_state(saved);
    }

    fn refresh_perf_line(&mut self, stats: PerfStats, now_ms: u64) {
        let text = format_perf_line(&stats);
        self.messages
            .add_or_replace(text, MessageType::Fps, MessageDuration::Forever, Color::BLUE, now_ms);
    }

    pub fn messages(&self) -> &MessageRegistry {
        &self.messages
    }

    pub fn draw_info(&self) -> &DrawInfo {
        &self.draw_info
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

/// Upload one message's quads and draw them twice: shadow, then color.
/// Returns the start cursor for the next message.
fn draw_text<D: GraphicsDevice>(device: &mut D, info: &DrawInfo, message: &Message, start: Vec2) -> Vec2 {
    let mesh = layout_text(&message.text, info, start);
    if mesh.is_empty() {
        return mesh.next_start;
    }

    // Whole-buffer replace every message.
    device.upload_vertices(&mesh.vertices);

    device.set_offset(info.shadow);
    device.set_color(message.color.shadow_rgba_f32());
    device.draw_triangles(mesh.vertex_count());

    device.set_offset(Vec2::ZERO);
    device.set_color(message.color.to_rgba_f32());
    device.draw_triangles(mesh.vertex_count());

    mesh.next_start
}
