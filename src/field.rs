//! The particle-network backdrop.
//!
//! A [`ParticleField`] owns a set of drifting [`Particle`]s sized to a
//! drawing surface. Every frame the particles move, bounce off the edges,
//! and every pair closer than the connection distance is joined by a line
//! whose opacity fades linearly with distance.
//!
//! # Example
//!
//! ```ignore
//! use driftnet::prelude::*;
//!
//! let mut field = ParticleField::new(1920.0, 1080.0);
//! let mut surface = RecordingSurface::new();
//!
//! field.step();
//! field.render(&mut surface)?;
//! ```
//!
//! # Resizing
//!
//! [`ParticleField::resize`] updates the dimensions and only reseeds when the
//! device class flips. Otherwise existing particles keep their coordinates,
//! even if they now sit outside the surface; they come back through the
//! reflect rule.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::{FieldConfig, FieldProfile, Settings};
use crate::error::DrawError;
use crate::particle::{self, Particle};
use crate::style::NetworkStyle;
use crate::surface::Surface;
use crate::viewport::Viewport;

/// A pair of particles close enough to be joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Index of the first particle (always less than `b`).
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    /// `1 - distance / connection_distance`, in `(0, 1]`.
    pub opacity: f32,
}

/// Iterator over every qualifying unordered pair, each visited once.
///
/// Created by [`connections`].
#[derive(Debug, Clone)]
pub struct Connections<'a> {
    particles: &'a [Particle],
    max_distance: f32,
    max_distance_sq: f32,
    i: usize,
    j: usize,
}

impl Iterator for Connections<'_> {
    type Item = Connection;

    fn next(&mut self) -> Option<Connection> {
        let n = self.particles.len();
        while self.i < n {
            while self.j < n {
                let (i, j) = (self.i, self.j);
                self.j += 1;

                let delta = self.particles[i].position - self.particles[j].position;
                let distance_sq = delta.length_squared();
                if distance_sq < self.max_distance_sq {
                    let distance = distance_sq.sqrt();
                    return Some(Connection {
                        a: i,
                        b: j,
                        distance,
                        opacity: 1.0 - distance / self.max_distance,
                    });
                }
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }
}

/// Pairs `i < j` whose distance is strictly below `connection_distance`.
pub fn connections(particles: &[Particle], connection_distance: f32) -> Connections<'_> {
    let max_distance = connection_distance.max(0.0);
    Connections {
        particles,
        max_distance,
        max_distance_sq: max_distance * max_distance,
        i: 0,
        j: 1,
    }
}

/// Draw one frame: clear, particles, then connector lines.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    particles: &[Particle],
    connection_distance: f32,
    style: &NetworkStyle,
) -> Result<(), DrawError> {
    surface.clear()?;

    for p in particles {
        surface.fill_circle(p.position, p.size, style.particle_color)?;
    }

    for link in connections(particles, connection_distance) {
        surface.stroke_line(
            particles[link.a].position,
            particles[link.b].position,
            style.line_width,
            style.line(link.opacity),
        )?;
    }

    Ok(())
}

/// Owned particle set plus the surface size and configuration it was seeded for.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    viewport: Viewport,
    profile: FieldProfile,
    config: FieldConfig,
    style: NetworkStyle,
    rng: SmallRng,
}

impl ParticleField {
    /// Default profile and style, seeded from entropy.
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(
            FieldProfile::default(),
            NetworkStyle::default(),
            width,
            height,
            SmallRng::from_entropy(),
        )
    }

    /// Default profile and style with a reproducible RNG.
    pub fn with_seed(seed: u64, width: f32, height: f32) -> Self {
        Self::with_rng(
            FieldProfile::default(),
            NetworkStyle::default(),
            width,
            height,
            SmallRng::seed_from_u64(seed),
        )
    }

    /// Profile and style from loaded settings.
    pub fn from_settings(settings: &Settings, width: f32, height: f32, rng: SmallRng) -> Self {
        Self::with_rng(settings.profile, settings.network, width, height, rng)
    }

    pub fn with_rng(
        profile: FieldProfile,
        style: NetworkStyle,
        width: f32,
        height: f32,
        rng: SmallRng,
    ) -> Self {
        let viewport = Viewport::with_size(width, height);
        let config = profile.configure(viewport.width());
        let mut field = Self {
            particles: Vec::new(),
            viewport,
            profile,
            config,
            style,
            rng,
        };
        field.reseed();
        field
    }

    /// Replace every particle with a fresh set for the current size and config.
    pub fn reseed(&mut self) {
        self.particles = particle::seed(
            &self.config,
            self.viewport.width(),
            self.viewport.height(),
            &mut self.rng,
        );
    }

    /// Reconfigure for `width × height` and reseed unconditionally.
    pub fn reset(&mut self, width: f32, height: f32) {
        let size = self.viewport.observe(width, height);
        self.config = self.profile.configure(size.x);
        self.reseed();
        debug!(
            width = size.x,
            height = size.y,
            count = self.particles.len(),
            "particle field reset"
        );
    }

    /// Track a new surface size.
    ///
    /// Zero extents keep the previous value. Returns `true` when the device
    /// class changed and the particles were reseeded.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let size = self.viewport.observe(width, height);
        let class = self.profile.classify(size.x);
        if class == self.config.class {
            return false;
        }

        self.config = self.profile.configure(size.x);
        self.reseed();
        debug!(
            ?class,
            width = size.x,
            height = size.y,
            count = self.particles.len(),
            "device class changed, particles reseeded"
        );
        true
    }

    /// Advance all particles by one frame.
    pub fn step(&mut self) {
        particle::step(&mut self.particles, self.viewport.width(), self.viewport.height());
    }

    /// Draw the current state.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), DrawError> {
        render(
            surface,
            &self.particles,
            self.config.connection_distance,
            &self.style,
        )
    }

    /// Connector lines for the current state.
    pub fn connections(&self) -> Connections<'_> {
        connections(&self.particles, self.config.connection_distance)
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Direct access for hosts that place particles themselves.
    #[inline]
    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    #[inline]
    pub fn profile(&self) -> &FieldProfile {
        &self.profile
    }

    #[inline]
    pub fn style(&self) -> &NetworkStyle {
        &self.style
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.viewport.size()
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.viewport.width()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.viewport.height()
    }
}
