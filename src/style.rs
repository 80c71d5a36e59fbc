//! Visual styling for the particle network.
//!
//! Colours are straight (non-premultiplied) RGBA in `0.0..=1.0`, stored as
//! [`Vec4`]. Styling is kept apart from [`FieldConfig`](crate::FieldConfig),
//! which controls how particles move.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Build a colour from 8-bit channels and a 0..1 alpha, CSS `rgba()` style.
pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Vec4 {
    Vec4::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a.clamp(0.0, 1.0),
    )
}

/// The signature cyan.
pub const CYAN: Vec3 = Vec3::new(0.0, 243.0 / 255.0, 1.0);

/// How particles and connector lines are painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkStyle {
    /// Fill for every particle, alpha included.
    pub particle_color: Vec4,
    /// RGB of connector lines; alpha comes from proximity.
    pub line_color: Vec3,
    /// Connector stroke width in pixels.
    pub line_width: f32,
    /// Colour the surface is cleared to.
    pub background: Vec4,
}

impl Default for NetworkStyle {
    fn default() -> Self {
        Self {
            particle_color: CYAN.extend(0.5),
            line_color: CYAN,
            line_width: 0.5,
            background: Vec4::ZERO,
        }
    }
}

impl NetworkStyle {
    /// Line colour for a connector with the given opacity.
    #[inline]
    pub fn line(&self, opacity: f32) -> Vec4 {
        self.line_color.extend(opacity.clamp(0.0, 1.0))
    }
}
