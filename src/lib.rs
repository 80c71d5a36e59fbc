//! # driftnet
//!
//! Animated particle-network backdrops.
//!
//! A handful of slow-drifting dots fill a drawing surface, bounce off its
//! edges, and are joined by faint lines whenever two of them come close. The
//! whole effect is a pure simulation plus a small [`Surface`] drawing trait,
//! so the same code paints into a browser canvas shim, a wgpu window, or an
//! in-memory image.
//!
//! ## Quick Start
//!
//! ```ignore
//! use driftnet::prelude::*;
//!
//! let mut field = ParticleField::with_seed(7, 1920.0, 1080.0);
//! let mut surface = PixelSurface::new(1920, 1080);
//!
//! for _ in 0..60 {
//!     field.step();
//!     field.render(&mut surface)?;
//! }
//! surface.save_png("backdrop.png")?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Configuration
//!
//! [`configure`] picks a [`FieldConfig`] from the viewport width: viewports
//! up to 768 pixels wide get 40 particles linked within 120 pixels, wider
//! ones get 60 particles linked within 150 pixels.
//! [`FieldProfile`] makes the breakpoint and both presets adjustable, and
//! [`Settings`] loads them from JSON.
//!
//! ### Simulation
//!
//! - [`seed`] scatters particles uniformly over the surface
//! - [`step`] moves every particle by its velocity and reflects it off the
//!   edges it has crossed
//! - [`connections`] yields every pair closer than the connection distance
//! - [`render`] clears the surface, draws the dots, then the connecting lines
//!
//! [`ParticleField`] bundles those with a viewport and a random source and
//! decides when a resize needs a reseed.
//!
//! ### Scheduling
//!
//! Hosts drive a backdrop through a [`FrameLoop`]. Frames are skipped until
//! the host reports its surface ready, while the surface is hidden, or when
//! there is nothing to draw into. A frame that fails to draw, or panics, is
//! dropped and reported to a [`DiagnosticSink`]; the animation keeps going.
//!
//! ### Hosts
//!
//! - [`run_window`] opens a desktop window rendered with wgpu
//! - [`snapshot`] renders offscreen into a [`PixelSurface`]
//! - [`RecordingSurface`] captures draw calls for tests
//!
//! ## Effects
//!
//! Besides the network, [`Cascade`] is a field of small shapes falling from
//! the top edge that drift away from the pointer. Both implement
//! [`Backdrop`].

pub mod animator;
pub mod cascade;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod gpu;
pub mod headless;
pub mod particle;
pub mod raster;
pub mod style;
pub mod surface;
pub mod time;
pub mod viewport;
pub mod window;

pub use glam::{Vec2, Vec3, Vec4};

pub use animator::{Backdrop, FrameLoop, FrameOutcome, FrameStats};
pub use cascade::{Cascade, CascadeConfig, Flake, Shape};
pub use config::{configure, DeviceClass, DiagnosticsConfig, FieldConfig, FieldProfile, Settings};
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use error::{ConfigError, DrawError, FrameError, GpuError, RunError, SnapshotError};
pub use field::{connections, render, Connection, ParticleField};
pub use headless::{render_offscreen, snapshot};
pub use particle::{seed, step, Particle};
pub use raster::PixelSurface;
pub use style::NetworkStyle;
pub use surface::{DrawCommand, RecordingSurface, Surface};
pub use time::FrameClock;
pub use viewport::Viewport;
pub use window::run_window;

/// Convenient imports for building and hosting backdrops.
///
/// ```ignore
/// use driftnet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animator::{Backdrop, FrameLoop, FrameOutcome};
    pub use crate::cascade::Cascade;
    pub use crate::config::{configure, FieldConfig, Settings};
    pub use crate::field::ParticleField;
    pub use crate::raster::PixelSurface;
    pub use crate::surface::{RecordingSurface, Surface};
    pub use glam::{Vec2, Vec4};
}
