//! Window event handling for DemoState.

use osd_core::{Color, MessageDuration, MessageType};
use winit::event::WindowEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

impl crate::DemoState {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.gpu.resize(size);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() || event.repeat {
                    return false;
                }
                let PhysicalKey::Code(key) = event.physical_key else {
                    return false;
                };
                self.handle_key(key)
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    log::error!("Render error: {}", e);
                }
                self.gpu.window.request_redraw();
                false
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Escape => {
                self.running = false;
                true
            }
            KeyCode::F1 => {
                let text = format!("Frame {}", self.time.frame_count());
                self.overlay
                    .add_message(text, MessageType::Typeless, MessageDuration::NORMAL, Color::WHITE);
                false
            }
            KeyCode::F2 => {
                let text = format!("Compiling shaders... ({:.1}s)", self.time.elapsed_seconds());
                self.overlay
                    .add_message(text, MessageType::ShaderCache, MessageDuration::SHORT, Color::YELLOW);
                false
            }
            KeyCode::F3 => {
                self.toggle_overlay();
                false
            }
            _ => false,
        }
    }
}
