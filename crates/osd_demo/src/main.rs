//! osd-demo: a windowed host that drives the text overlay.

mod config;
mod events;
mod gpu;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use osd_core::{Clock, Color, FrameCounter, MessageDuration, MessageType, MonotonicClock, Time};
use osd_renderer::{Overlay, WgpuDevice};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use config::DemoConfig;
use gpu::GpuContext;

pub struct DemoState {
    gpu: GpuContext,
    overlay: Overlay<WgpuDevice>,
    config: DemoConfig,
    time: Time,
    clock: Rc<MonotonicClock>,
    counter: Rc<RefCell<FrameCounter>>,
    overlay_enabled: Rc<Cell<bool>>,
    running: bool,
}

impl DemoState {
    async fn new(window: Arc<Window>, config: DemoConfig) -> Result<Self> {
        let gpu = GpuContext::new(window, config.vsync).await?;

        let time = Time::new();
        let clock = Rc::new(MonotonicClock::new());
        let counter = Rc::new(RefCell::new(FrameCounter::new(time.fixed_rate(), clock.now_ms())));
        let overlay_enabled = Rc::new(Cell::new(config.show_overlay));

        let mut overlay = Overlay::new(clock.clone(), counter.clone(), overlay_enabled.clone());
        let device = WgpuDevice::new(gpu.device(), gpu.queue(), gpu.format());
        overlay.initialize(device, config.density_scale)?;
        overlay.add_message(
            "F1: message  F2: shader cache  F3: toggle overlay",
            MessageType::Typeless,
            MessageDuration::VERY_LONG,
            Color::CYAN,
        );

        Ok(Self {
            gpu,
            overlay,
            config,
            time,
            clock,
            counter,
            overlay_enabled,
            running: true,
        })
    }

    fn update(&mut self) {
        self.time.update();
        let now = self.clock.now_ms();
        while self.time.should_fixed_update() {
            self.counter.borrow_mut().update(now);
        }
    }

    fn render(&mut self) -> Result<()> {
        let (output, view, mut encoder) = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.overlay.draw_message(self.gpu.framebuffer_size());
        if let Some(device) = self.overlay.device_mut() {
            device.encode(&mut encoder, &view);
        }

        self.gpu.end_frame(output, encoder);
        self.counter.borrow_mut().frame(self.clock.now_ms());
        Ok(())
    }

    fn toggle_overlay(&mut self) {
        let enabled = !self.overlay_enabled.get();
        self.overlay_enabled.set(enabled);
        self.config.show_overlay = enabled;
        self.config.save();
        log::info!("Overlay {}", if enabled { "shown" } else { "hidden" });
    }
}

impl Drop for DemoState {
    fn drop(&mut self) {
        self.overlay.shutdown();
    }
}

struct App {
    state: Option<DemoState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let config = DemoConfig::load();
        let window_attrs = Window::default_attributes()
            .with_title("osd-demo")
            .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(DemoState::new(window.clone(), config)) {
            Ok(s) => {
                self.state = Some(s);
                window.request_redraw();
            }
            Err(e) => {
                log::error!("Failed to initialize demo: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
