//! The per-frame scheduling contract.
//!
//! A host (browser shim, winit window, headless renderer) owns the actual
//! frame callback. It drives a [`FrameLoop`] with four calls:
//!
//! - [`FrameLoop::notify_ready`] once, when its drawing surface is attached;
//! - [`FrameLoop::resize`] whenever the viewport changes;
//! - [`FrameLoop::set_visible`] when the surface is hidden or shown;
//! - [`FrameLoop::frame`] on every display refresh.
//!
//! Frames before the ready notification, without a surface, or while hidden
//! are skipped. A frame whose drawing fails, or whose backdrop panics, is
//! dropped and reported to the loop's [`DiagnosticSink`]; the next frame runs
//! as usual.
//!
//! Everything happens on the host's single thread, one callback at a time,
//! so there is no locking.

use glam::Vec2;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

use crate::cascade::Cascade;
use crate::config::DiagnosticsConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{DrawError, FrameError};
use crate::field::ParticleField;
use crate::surface::Surface;
use crate::time::FrameClock;
use crate::viewport::Viewport;

/// An animated effect a [`FrameLoop`] can drive.
pub trait Backdrop {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Start over at `size`: reconfigure and reseed.
    fn reset(&mut self, size: Vec2);

    /// The surface changed size.
    fn resize(&mut self, size: Vec2);

    /// Simulate one frame.
    fn advance(&mut self);

    /// Draw the current state.
    fn draw(&self, surface: &mut dyn Surface) -> Result<(), DrawError>;

    /// The pointer moved to `position` in surface pixels.
    fn pointer_moved(&mut self, _position: Vec2) {}

    /// Number of live particles, for diagnostics.
    fn population(&self) -> usize;
}

impl Backdrop for ParticleField {
    fn name(&self) -> &'static str {
        "network"
    }

    fn reset(&mut self, size: Vec2) {
        ParticleField::reset(self, size.x, size.y);
    }

    fn resize(&mut self, size: Vec2) {
        ParticleField::resize(self, size.x, size.y);
    }

    fn advance(&mut self) {
        self.step();
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), DrawError> {
        self.render(surface)
    }

    fn population(&self) -> usize {
        self.particles().len()
    }
}

impl Backdrop for Cascade {
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn reset(&mut self, size: Vec2) {
        Cascade::reset(self, size.x, size.y);
    }

    fn resize(&mut self, size: Vec2) {
        Cascade::resize(self, size.x, size.y);
    }

    fn advance(&mut self) {
        self.step();
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), DrawError> {
        self.render(surface)
    }

    fn pointer_moved(&mut self, position: Vec2) {
        self.set_pointer(position);
    }

    fn population(&self) -> usize {
        self.drops().len()
    }
}

impl<B: Backdrop + ?Sized> Backdrop for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn reset(&mut self, size: Vec2) {
        (**self).reset(size)
    }

    fn resize(&mut self, size: Vec2) {
        (**self).resize(size)
    }

    fn advance(&mut self) {
        (**self).advance()
    }

    fn draw(&self, surface: &mut dyn Surface) -> Result<(), DrawError> {
        (**self).draw(surface)
    }

    fn pointer_moved(&mut self, position: Vec2) {
        (**self).pointer_moved(position)
    }

    fn population(&self) -> usize {
        (**self).population()
    }
}

/// What happened to a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The backdrop advanced and drew.
    Rendered,
    /// Nothing ran: not ready, no surface, or hidden.
    Skipped,
    /// The frame failed and was reported to the sink.
    Dropped,
}

/// Counters for each [`FrameOutcome`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub rendered: u64,
    pub skipped: u64,
    pub dropped: u64,
}

/// Drives a [`Backdrop`] from host callbacks.
pub struct FrameLoop<B, D = TracingSink> {
    backdrop: B,
    sink: D,
    viewport: Viewport,
    clock: FrameClock,
    diagnostics: DiagnosticsConfig,
    ready: bool,
    visible: bool,
    stats: FrameStats,
}

impl<B: Backdrop> FrameLoop<B, TracingSink> {
    pub fn new(backdrop: B) -> Self {
        Self::with_sink(backdrop, TracingSink)
    }
}

impl<B: Backdrop, D: DiagnosticSink> FrameLoop<B, D> {
    pub fn with_sink(backdrop: B, sink: D) -> Self {
        Self {
            backdrop,
            sink,
            viewport: Viewport::new(),
            clock: FrameClock::new(),
            diagnostics: DiagnosticsConfig::default(),
            ready: false,
            visible: true,
            stats: FrameStats::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The host's drawing surface is attached and `width × height`.
    ///
    /// Seeds the backdrop. Only the first call has an effect; returns
    /// whether this call made the loop ready.
    pub fn notify_ready(&mut self, width: f32, height: f32) -> bool {
        if self.ready {
            return false;
        }
        let size = self.viewport.observe(width, height);
        self.backdrop.reset(size);
        self.ready = true;
        debug!(
            backdrop = self.backdrop.name(),
            width = size.x,
            height = size.y,
            population = self.backdrop.population(),
            "frame loop ready"
        );
        true
    }

    /// The viewport changed. Before the ready notification only the size is
    /// remembered.
    pub fn resize(&mut self, width: f32, height: f32) {
        let size = self.viewport.observe(width, height);
        if self.ready {
            self.backdrop.resize(size);
        }
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.backdrop.pointer_moved(position);
    }

    /// Hidden loops skip frames and stop the clock.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.clock.resume();
        } else {
            self.clock.pause();
        }
        debug!(backdrop = self.backdrop.name(), visible, "visibility changed");
    }

    /// Run one frame callback.
    ///
    /// `surface` is `None` when the host has nothing to draw into yet.
    pub fn frame(&mut self, surface: Option<&mut dyn Surface>) -> FrameOutcome {
        let surface = match surface {
            Some(surface) if self.ready && self.visible => surface,
            _ => {
                self.stats.skipped += 1;
                return FrameOutcome::Skipped;
            }
        };

        let frame = self.clock.tick().unwrap_or_else(|| self.clock.frame());
        let backdrop = &mut self.backdrop;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            backdrop.advance();
            backdrop.draw(surface)
        }));

        let error = match result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(FrameError::Draw(e)),
            Err(payload) => Some(FrameError::Panicked(panic_message(payload.as_ref()))),
        };

        if self.diagnostics.debug
            && self.diagnostics.frame_log_interval > 0
            && frame % self.diagnostics.frame_log_interval == 0
        {
            debug!(
                backdrop = self.backdrop.name(),
                frame,
                population = self.backdrop.population(),
                fps = self.clock.fps(),
                running_secs = self.clock.elapsed().as_secs_f32(),
                dropped = self.stats.dropped,
                "frame heartbeat"
            );
        }

        match error {
            None => {
                self.stats.rendered += 1;
                FrameOutcome::Rendered
            }
            Some(error) => {
                self.stats.dropped += 1;
                self.sink.frame_failed(frame, &error);
                FrameOutcome::Dropped
            }
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Effective surface size after degenerate-size filtering.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.viewport.size()
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[inline]
    pub fn backdrop(&self) -> &B {
        &self.backdrop
    }

    #[inline]
    pub fn backdrop_mut(&mut self) -> &mut B {
        &mut self.backdrop
    }

    #[inline]
    pub fn sink(&self) -> &D {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
