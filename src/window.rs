//! Desktop host: runs a [`Backdrop`] in a winit window drawn with wgpu.
//!
//! Geometry is laid out in logical pixels, so a backdrop on a HiDPI display
//! picks the same device class a browser would for the same window.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::animator::{Backdrop, FrameLoop, FrameOutcome};
use crate::config::Settings;
use crate::error::RunError;
use crate::gpu::{GpuFrame, GpuState};

/// Open a window and animate `backdrop` until it is closed.
pub fn run_window<B: Backdrop>(backdrop: B, settings: &Settings) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = WindowApp::new(backdrop, settings);
    event_loop.run_app(&mut app)?;

    let stats = app.frames.stats();
    info!(
        rendered = stats.rendered,
        skipped = stats.skipped,
        dropped = stats.dropped,
        "window closed"
    );
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct WindowApp<B> {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    frames: FrameLoop<B>,
    background: Vec4,
    error: Option<RunError>,
}

impl<B: Backdrop> WindowApp<B> {
    fn new(backdrop: B, settings: &Settings) -> Self {
        Self {
            window: None,
            gpu_state: None,
            frames: FrameLoop::new(backdrop).with_diagnostics(settings.diagnostics),
            background: settings.network.background,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RunError) {
        error!(error = %err, "cannot start window");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let mut frame = GpuFrame::new();
        let outcome = if self.gpu_state.is_some() {
            self.frames.frame(Some(&mut frame))
        } else {
            self.frames.frame(None)
        };

        if outcome == FrameOutcome::Rendered {
            if let Some(gpu_state) = &mut self.gpu_state {
                match gpu_state.render(&frame) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu_state.reconfigure()
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("gpu out of memory");
                        event_loop.exit();
                    }
                    Err(e) => warn!(error = %e, "render error"),
                }
            }
        }

        if self.frames.is_visible() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl<B: Backdrop> ApplicationHandler for WindowApp<B> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let title = format!("driftnet - {}", self.frames.backdrop().name());
        let window_attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(1280.0, 720.0));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let gpu_state = match pollster::block_on(GpuState::new(window.clone(), self.background)) {
            Ok(gpu_state) => gpu_state,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = gpu_state.viewport();
        self.frames.notify_ready(size.x, size.y);
        info!(width = size.x, height = size.y, "window ready");

        window.request_redraw();
        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                let Some(window) = &self.window else { return };
                let logical = physical_size.to_logical::<f32>(window.scale_factor());
                let logical = Vec2::new(logical.width, logical.height);
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size, logical);
                }
                self.frames.resize(logical.x, logical.y);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let Some(window) = &self.window else { return };
                let position = position.to_logical::<f32>(window.scale_factor());
                self.frames.pointer_moved(Vec2::new(position.x, position.y));
            }
            WindowEvent::Occluded(occluded) => {
                self.frames.set_visible(!occluded);
                if !occluded {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
