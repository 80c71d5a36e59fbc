//! Viewport size tracking.
//!
//! Hosts occasionally report a 0×0 viewport mid-transition (minimised
//! windows, tab switches). [`Viewport`] keeps the last known-good extent per
//! axis so a degenerate report never reaches the simulation.

use glam::Vec2;

/// Extent used before any valid size has been observed.
pub const FALLBACK_SIZE: Vec2 = Vec2::new(1920.0, 1080.0);

/// Last known-good drawing surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: FALLBACK_SIZE,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known size; degenerate axes use [`FALLBACK_SIZE`].
    pub fn with_size(width: f32, height: f32) -> Self {
        let mut viewport = Self::default();
        viewport.observe(width, height);
        viewport
    }

    /// Record a reported size and return the effective one.
    ///
    /// An axis that is zero, negative or not finite keeps its previous value.
    pub fn observe(&mut self, width: f32, height: f32) -> Vec2 {
        if usable(width) {
            self.size.x = width;
        }
        if usable(height) {
            self.size.y = height;
        }
        self.size
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }
}

fn usable(extent: f32) -> bool {
    extent.is_finite() && extent > 0.0
}
