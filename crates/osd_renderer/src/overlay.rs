//! Overlay facade: the one object the host talks to.
//!
//! Holds the frame renderer between `initialize` and `shutdown` and gates
//! every call on the host's enablement switch.

use osd_core::{Clock, Color, MessageDuration, MessageType, OverlaySwitch, PerfStatsSource};

use crate::device::GraphicsDevice;
use crate::error::OverlayError;
use crate::layout::FramebufferSize;
use crate::raster_font::RasterFont;

pub struct Overlay<D: GraphicsDevice> {
    clock: Box<dyn Clock>,
    stats: Box<dyn PerfStatsSource>,
    switch: Box<dyn OverlaySwitch>,
    font: Option<RasterFont<D>>,
}

impl<D: GraphicsDevice> Overlay<D> {
    /// Wire up the host collaborators. Nothing is allocated on the device
    /// until [`Overlay::initialize`].
    pub fn new(
        clock: impl Clock + 'static,
        stats: impl PerfStatsSource + 'static,
        switch: impl OverlaySwitch + 'static,
    ) -> Self {
        Self {
            clock: Box::new(clock),
            stats: Box::new(stats),
            switch: Box::new(switch),
            font: None,
        }
    }

    /// Create the renderer on `device` and seed an empty perf line.
    pub fn initialize(&mut self, device: D, scaled_density: f32) -> Result<(), OverlayError> {
        if self.font.is_some() {
            return Err(OverlayError::AlreadyInitialized);
        }

        let mut font = RasterFont::new(device, scaled_density);
        font.add_message(
            "",
            MessageType::Fps,
            MessageDuration::Forever,
            Color::BLUE,
            self.clock.now_ms(),
        );
        self.font = Some(font);
        log::info!("Overlay initialized (density {:.2})", scaled_density);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.font.is_some()
    }

    /// Queue or update a message. No-op while the overlay is switched off.
    pub fn add_message(
        &mut self,
        text: impl Into<String>,
        kind: MessageType,
        duration: MessageDuration,
        color: Color,
    ) {
        if !self.switch.overlay_enabled() {
            return;
        }
        let Some(font) = self.font.as_mut() else {
            log::debug!("Overlay message dropped: not initialized");
            return;
        };
        font.add_message(text, kind, duration, color, self.clock.now_ms());
    }

    /// Draw all live messages. No-op while the overlay is switched off.
    pub fn draw_message(&mut self, framebuffer: FramebufferSize) {
        if !self.switch.overlay_enabled() {
            return;
        }
        let Some(font) = self.font.as_mut() else {
            return;
        };
        font.draw(framebuffer, self.clock.now_ms(), self.stats.as_mut());
    }

    /// Drop the renderer and everything it owns on the device.
    /// `initialize` may be called again afterwards.
    pub fn shutdown(&mut self) {
        if self.font.take().is_some() {
            log::info!("Overlay shut down");
        }
    }

    pub fn renderer(&self) -> Option<&RasterFont<D>> {
        self.font.as_ref()
    }

    /// Backend access, e.g. to submit the frame's recorded draws.
    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.font.as_mut().map(RasterFont::device_mut)
    }
}
