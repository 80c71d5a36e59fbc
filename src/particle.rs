//! Particles and the per-frame motion rule.

use glam::Vec2;
use rand::Rng;

use crate::config::FieldConfig;

/// A single drifting point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in surface pixels.
    pub position: Vec2,
    /// Velocity in pixels per frame.
    pub velocity: Vec2,
    /// Circle radius in pixels.
    pub size: f32,
}

impl Particle {
    /// Move by one frame of velocity, then reflect off the `[0, width] × [0, height]` box.
    ///
    /// A component is negated only while the particle is outside on that
    /// axis *and* still heading away, so each excursion reflects exactly
    /// once. Positions are never clamped: a particle may sit slightly
    /// outside for the frame it bounces, and particles stranded outside
    /// after a shrink drift back in on their own.
    #[inline]
    pub fn advance(&mut self, width: f32, height: f32) {
        self.position += self.velocity;

        if (self.position.x < 0.0 && self.velocity.x < 0.0)
            || (self.position.x > width && self.velocity.x > 0.0)
        {
            self.velocity.x = -self.velocity.x;
        }
        if (self.position.y < 0.0 && self.velocity.y < 0.0)
            || (self.position.y > height && self.velocity.y > 0.0)
        {
            self.velocity.y = -self.velocity.y;
        }
    }
}

/// Produce `config.count` fresh particles scattered over a `width × height` surface.
///
/// Positions are uniform in `[0, width) × [0, height)`, velocity components
/// uniform in `[-speed/2, speed/2]`, sizes uniform in `[min_size, max_size]`.
pub fn seed<R: Rng + ?Sized>(
    config: &FieldConfig,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<Particle> {
    let half_speed = finite_or_zero(config.speed.abs() * 0.5);
    let (min_size, max_size) = match (config.min_size.is_finite(), config.max_size.is_finite()) {
        (true, true) if config.min_size <= config.max_size => (config.min_size, config.max_size),
        (true, true) => (config.max_size, config.min_size),
        (true, false) => (config.min_size, config.min_size),
        (false, true) => (config.max_size, config.max_size),
        (false, false) => (0.0, 0.0),
    };

    (0..config.count)
        .map(|_| Particle {
            position: Vec2::new(coordinate(rng, width), coordinate(rng, height)),
            velocity: Vec2::new(
                rng.gen_range(-half_speed..=half_speed),
                rng.gen_range(-half_speed..=half_speed),
            ),
            size: rng.gen_range(min_size..=max_size),
        })
        .collect()
}

/// Advance every particle by one frame.
pub fn step(particles: &mut [Particle], width: f32, height: f32) {
    for particle in particles.iter_mut() {
        particle.advance(width, height);
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn coordinate<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> f32 {
    if extent.is_finite() && extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}
