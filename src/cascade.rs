//! Falling-shapes backdrop.
//!
//! A companion to the particle network: small circles, squares, triangles
//! and crosses drop from the top of the surface, sway and spin as they fall,
//! fade in near the top and out near the bottom, and are nudged away from
//! the pointer. New drops keep spawning at the top up to a burst ceiling.

use glam::{Vec2, Vec4};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::config::{check_non_negative, Settings};
use crate::error::{ConfigError, DrawError};
use crate::surface::Surface;
use crate::viewport::Viewport;

/// Fraction of the height over which drops fade in (top) and out (bottom).
const FADE_BAND: f32 = 0.2;
/// Peak opacity reached by the fade ramps.
const FADE_PEAK: f32 = 0.8;
const SWAY_AMPLITUDE: f32 = 0.3;
const SWAY_RATE: f32 = 0.02;
/// Pixels of displacement per unit of pointer force.
const POINTER_PUSH: f32 = 10.0;

/// Tunables for [`Cascade`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Drops created up front; spawning stops at `particle_count * burst_ceiling`.
    pub particle_count: usize,
    pub min_size: f32,
    pub max_size: f32,
    /// Fall speed range in pixels per frame.
    pub min_speed: f32,
    pub max_speed: f32,
    /// Spin speeds lie in `[-rotation_speed/2, rotation_speed/2]` radians per frame.
    pub rotation_speed: f32,
    /// Chance per frame of spawning a new drop at the top.
    pub spawn_rate: f32,
    pub burst_ceiling: f32,
    pub pointer_influence: f32,
    pub pointer_radius: f32,
    /// Fraction of the remaining distance the pointer eases each frame.
    pub pointer_easing: f32,
    /// Colours picked uniformly per drop.
    pub palette: Vec<Vec4>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            particle_count: 150,
            min_size: 3.0,
            max_size: 12.0,
            min_speed: 0.5,
            max_speed: 2.5,
            rotation_speed: 0.02,
            spawn_rate: 0.3,
            burst_ceiling: 1.5,
            pointer_influence: 0.15,
            pointer_radius: 150.0,
            pointer_easing: 0.1,
            palette: vec![
                Vec4::new(1.0, 1.0, 1.0, 0.8),
                Vec4::new(1.0, 1.0, 1.0, 0.6),
                Vec4::new(1.0, 1.0, 1.0, 0.4),
            ],
        }
    }
}

impl CascadeConfig {
    /// Largest initial population accepted from settings.
    pub const MAX_PARTICLES: usize = 2000;

    /// Check that the values can spawn and animate drops.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count > Self::MAX_PARTICLES {
            return Err(ConfigError::Invalid(format!(
                "cascade.particle_count {} exceeds {}",
                self.particle_count,
                Self::MAX_PARTICLES
            )));
        }
        for (name, value) in [
            ("cascade.min_size", self.min_size),
            ("cascade.max_size", self.max_size),
            ("cascade.min_speed", self.min_speed),
            ("cascade.max_speed", self.max_speed),
            ("cascade.rotation_speed", self.rotation_speed),
            ("cascade.spawn_rate", self.spawn_rate),
            ("cascade.pointer_influence", self.pointer_influence),
            ("cascade.pointer_radius", self.pointer_radius),
            ("cascade.pointer_easing", self.pointer_easing),
        ] {
            check_non_negative(name, value)?;
        }
        if !(1.0..=4.0).contains(&self.burst_ceiling) {
            return Err(ConfigError::Invalid(format!(
                "cascade.burst_ceiling must lie in 1..=4, got {}",
                self.burst_ceiling
            )));
        }
        Ok(())
    }

    /// Upper bound on live drops.
    pub fn capacity(&self) -> usize {
        (self.particle_count as f32 * self.burst_ceiling.max(1.0)) as usize
    }
}

/// Outline of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Cross,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Square, Shape::Triangle, Shape::Cross];
}

/// One falling shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flake {
    pub position: Vec2,
    pub size: f32,
    pub speed: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub shape: Shape,
    pub color: Vec4,
    pub opacity: f32,
    /// Sway phase in radians.
    pub phase: f32,
}

impl Flake {
    fn spawn(rng: &mut SmallRng, config: &CascadeConfig, size: Vec2, at_top: bool) -> Self {
        let drop_size = uniform(rng, config.min_size, config.max_size);
        let y = if at_top {
            -drop_size
        } else {
            uniform(rng, 0.0, size.y)
        };
        let color = if config.palette.is_empty() {
            Vec4::new(1.0, 1.0, 1.0, FADE_PEAK)
        } else {
            config.palette[rng.gen_range(0..config.palette.len())]
        };
        let half_spin = config.rotation_speed.abs() * 0.5;

        Flake {
            position: Vec2::new(uniform(rng, 0.0, size.x), y),
            size: drop_size,
            speed: uniform(rng, config.min_speed, config.max_speed),
            rotation: rng.gen_range(0.0..TAU),
            rotation_speed: uniform(rng, -half_spin, half_spin),
            shape: Shape::ALL[rng.gen_range(0..Shape::ALL.len())],
            color,
            opacity: rng.gen_range(0.3..0.8),
            phase: rng.gen_range(0.0..TAU),
        }
    }

    /// Fill colour with the drop's opacity applied.
    pub fn fill(&self) -> Vec4 {
        let alpha = self.color.w * self.opacity.clamp(0.0, 1.0);
        self.color.truncate().extend(alpha)
    }

    fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), DrawError> {
        let color = self.fill();
        let half = self.size * 0.5;
        match self.shape {
            Shape::Circle => surface.fill_circle(self.position, half, color),
            Shape::Square => {
                let corners = self.place(&rect(half, half));
                surface.fill_polygon(&corners, color)
            }
            Shape::Triangle => {
                let points = self.place(&[
                    Vec2::new(0.0, -half),
                    Vec2::new(-half, half),
                    Vec2::new(half, half),
                ]);
                surface.fill_polygon(&points, color)
            }
            Shape::Cross => {
                let bar = self.size / 6.0;
                surface.fill_polygon(&self.place(&rect(bar, half)), color)?;
                surface.fill_polygon(&self.place(&rect(half, bar)), color)
            }
        }
    }

    /// Rotate local points by the drop's rotation and move them to its position.
    fn place<const N: usize>(&self, local: &[Vec2; N]) -> [Vec2; N] {
        let rotation = Vec2::from_angle(self.rotation);
        local.map(|p| self.position + rotation.rotate(p))
    }
}

fn rect(half_width: f32, half_height: f32) -> [Vec2; 4] {
    [
        Vec2::new(-half_width, -half_height),
        Vec2::new(half_width, -half_height),
        Vec2::new(half_width, half_height),
        Vec2::new(-half_width, half_height),
    ]
}

/// Uniform in `[a, b)` in either order. Non-finite bounds never reach `rand`;
/// the finite one (or zero) is returned instead.
fn uniform(rng: &mut SmallRng, a: f32, b: f32) -> f32 {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => {}
        (true, false) => return a,
        (false, true) => return b,
        (false, false) => return 0.0,
    }
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo < hi && (hi - lo).is_finite() {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Owned set of falling drops.
#[derive(Debug, Clone)]
pub struct Cascade {
    drops: Vec<Flake>,
    config: CascadeConfig,
    viewport: Viewport,
    pointer: Vec2,
    pointer_target: Vec2,
    rng: SmallRng,
}

impl Cascade {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(CascadeConfig::default(), width, height, SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64, width: f32, height: f32) -> Self {
        Self::with_rng(
            CascadeConfig::default(),
            width,
            height,
            SmallRng::seed_from_u64(seed),
        )
    }

    pub fn from_settings(settings: &Settings, width: f32, height: f32, rng: SmallRng) -> Self {
        Self::with_rng(settings.cascade.clone(), width, height, rng)
    }

    pub fn with_rng(config: CascadeConfig, width: f32, height: f32, rng: SmallRng) -> Self {
        let viewport = Viewport::with_size(width, height);
        let center = viewport.size() * 0.5;
        let mut cascade = Self {
            drops: Vec::new(),
            config,
            viewport,
            pointer: center,
            pointer_target: center,
            rng,
        };
        cascade.populate();
        cascade
    }

    /// Replace all drops with `particle_count` drops scattered over the surface.
    pub fn populate(&mut self) {
        let size = self.viewport.size();
        self.drops = (0..self.config.particle_count)
            .map(|_| Flake::spawn(&mut self.rng, &self.config, size, false))
            .collect();
    }

    /// Resize, re-centre the pointer and repopulate.
    pub fn reset(&mut self, width: f32, height: f32) {
        let center = self.viewport.observe(width, height) * 0.5;
        self.pointer = center;
        self.pointer_target = center;
        self.populate();
    }

    /// Track a new surface size; drops keep their positions.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.observe(width, height);
    }

    /// Set where the pointer is heading; the effective pointer eases toward it.
    pub fn set_pointer(&mut self, target: Vec2) {
        self.pointer_target = target;
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        let config = &self.config;
        let size = self.viewport.size();

        self.pointer += (self.pointer_target - self.pointer) * config.pointer_easing;

        if self.rng.gen::<f32>() < config.spawn_rate && self.drops.len() < config.capacity() {
            let drop = Flake::spawn(&mut self.rng, config, size, true);
            self.drops.push(drop);
        }

        let pointer = self.pointer;
        let band = size.y * FADE_BAND;
        self.drops.retain_mut(|drop| {
            let away = drop.position - pointer;
            let distance = away.length();
            if distance < config.pointer_radius {
                let force = (1.0 - distance / config.pointer_radius) * config.pointer_influence;
                let angle = away.y.atan2(away.x);
                drop.position += Vec2::from_angle(angle) * force * POINTER_PUSH;
            }

            drop.position.y += drop.speed;
            drop.position.x += drop.phase.sin() * SWAY_AMPLITUDE;
            drop.phase += SWAY_RATE;
            drop.rotation += drop.rotation_speed;

            if drop.position.y < band {
                drop.opacity = (drop.position.y / band * FADE_PEAK).min(1.0);
            }
            if drop.position.y > size.y - band {
                drop.opacity = ((1.0 - (drop.position.y - (size.y - band)) / band) * FADE_PEAK).max(0.0);
            }

            drop.position.y <= size.y + drop.size
        });
    }

    /// Draw the current state.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), DrawError> {
        surface.clear()?;
        for drop in &self.drops {
            drop.draw(surface)?;
        }
        Ok(())
    }

    #[inline]
    pub fn drops(&self) -> &[Flake] {
        &self.drops
    }

    #[inline]
    pub fn drops_mut(&mut self) -> &mut Vec<Flake> {
        &mut self.drops
    }

    #[inline]
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.viewport.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn still_config() -> CascadeConfig {
        CascadeConfig {
            spawn_rate: 0.0,
            pointer_influence: 0.0,
            ..CascadeConfig::default()
        }
    }

    fn drop_at(x: f32, y: f32, shape: Shape) -> Flake {
        Flake {
            position: Vec2::new(x, y),
            size: 6.0,
            speed: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            shape,
            color: Vec4::new(1.0, 1.0, 1.0, 0.5),
            opacity: 0.5,
            phase: 0.0,
        }
    }

    #[test]
    fn test_initial_population() {
        let cascade = Cascade::with_seed(1, 800.0, 600.0);
        assert_eq!(cascade.drops().len(), 150);
        assert_eq!(cascade.pointer(), Vec2::new(400.0, 300.0));
        for d in cascade.drops() {
            assert!((0.0..800.0).contains(&d.position.x));
            assert!((0.0..600.0).contains(&d.position.y));
            assert!((3.0..=12.0).contains(&d.size));
            assert!((0.5..=2.5).contains(&d.speed));
        }
    }

    #[test]
    fn test_spawning_respects_ceiling() {
        let config = CascadeConfig {
            particle_count: 4,
            spawn_rate: 1.0,
            min_speed: 0.0,
            max_speed: 0.0,
            ..CascadeConfig::default()
        };
        let mut cascade = Cascade::with_rng(config, 800.0, 600.0, SmallRng::seed_from_u64(2));
        for _ in 0..20 {
            cascade.step();
        }
        assert_eq!(cascade.drops().len(), 6);
    }

    #[test]
    fn test_spawned_drop_starts_above_surface() {
        let config = CascadeConfig {
            particle_count: 1,
            spawn_rate: 1.0,
            ..CascadeConfig::default()
        };
        let mut cascade = Cascade::with_rng(config, 800.0, 600.0, SmallRng::seed_from_u64(4));
        cascade.drops_mut().clear();
        cascade.step();
        let d = cascade.drops()[0];
        // Spawned at -size, then fell once by its speed.
        assert!((d.position.y - (d.speed - d.size)).abs() < 1e-4);
    }

    #[test]
    fn test_drops_fall_and_leave() {
        let mut cascade = Cascade::with_rng(still_config(), 800.0, 600.0, SmallRng::seed_from_u64(3));
        cascade.drops_mut().clear();
        cascade.drops_mut().push(drop_at(100.0, 590.0, Shape::Circle));
        cascade.step();
        assert_eq!(cascade.drops()[0].position.y, 591.0);

        for _ in 0..20 {
            cascade.step();
        }
        assert!(cascade.drops().is_empty());
    }

    #[test]
    fn test_fade_bands() {
        let mut cascade = Cascade::with_rng(still_config(), 800.0, 1000.0, SmallRng::seed_from_u64(5));
        cascade.drops_mut().clear();
        cascade.drops_mut().push(drop_at(100.0, 99.0, Shape::Square));
        cascade.drops_mut().push(drop_at(100.0, 499.0, Shape::Square));
        cascade.drops_mut().push(drop_at(100.0, 899.0, Shape::Square));
        cascade.step();

        let d = cascade.drops();
        // y = 100 in a 200px band: half way up the ramp.
        assert!((d[0].opacity - 0.4).abs() < 1e-5);
        assert_eq!(d[1].opacity, 0.5);
        // y = 900: half way down the exit ramp.
        assert!((d[2].opacity - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_pointer_pushes_away() {
        let config = CascadeConfig {
            spawn_rate: 0.0,
            pointer_easing: 1.0,
            ..CascadeConfig::default()
        };
        let mut cascade = Cascade::with_rng(config, 800.0, 600.0, SmallRng::seed_from_u64(6));
        cascade.drops_mut().clear();
        let mut d = drop_at(450.0, 300.0, Shape::Circle);
        d.speed = 0.0;
        d.phase = 0.0;
        cascade.drops_mut().push(d);
        cascade.set_pointer(Vec2::new(400.0, 300.0));
        cascade.step();

        // force = (1 - 50/150) * 0.15 = 0.1, pushed 1px along +x.
        let moved = cascade.drops()[0].position;
        assert!((moved.x - 451.0).abs() < 1e-4);
        assert!((moved.y - 300.0).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_eases() {
        let mut cascade = Cascade::with_rng(still_config(), 800.0, 600.0, SmallRng::seed_from_u64(7));
        cascade.set_pointer(Vec2::new(500.0, 300.0));
        cascade.step();
        assert!((cascade.pointer().x - 410.0).abs() < 1e-4);
    }

    #[test]
    fn test_shapes_draw_expected_commands() {
        let mut cascade = Cascade::with_rng(still_config(), 800.0, 600.0, SmallRng::seed_from_u64(8));
        cascade.drops_mut().clear();
        for shape in Shape::ALL {
            cascade.drops_mut().push(drop_at(50.0, 50.0, shape));
        }
        let mut surface = RecordingSurface::new();
        cascade.render(&mut surface).unwrap();

        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        assert_eq!(surface.circles().count(), 1);
        let polygons: Vec<_> = surface.polygons().map(|(p, _)| p.len()).collect();
        assert_eq!(polygons, vec![4, 3, 4, 4]);

        let (center, radius, color) = surface.circles().next().unwrap();
        assert_eq!(center, Vec2::new(50.0, 50.0));
        assert_eq!(radius, 3.0);
        assert!((color.w - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_square_is_rotated() {
        let mut d = drop_at(0.0, 0.0, Shape::Square);
        d.rotation = std::f32::consts::FRAC_PI_4;
        let mut surface = RecordingSurface::new();
        d.draw(&mut surface).unwrap();
        let (points, _) = surface.polygons().next().unwrap();
        // A 6px square turned 45 degrees reaches 3 * sqrt(2) on each axis.
        let reach = points.iter().map(|p| p.x.abs()).fold(0.0, f32::max);
        assert!((reach - 3.0 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CascadeConfig = serde_json::from_str(r#"{ "particle_count": 10 }"#).unwrap();
        assert_eq!(config.particle_count, 10);
        assert_eq!(config.capacity(), 15);
        assert_eq!(config.palette.len(), 3);
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        assert!(CascadeConfig::default().validate().is_ok());

        let infinite = CascadeConfig {
            max_speed: f32::INFINITY,
            ..CascadeConfig::default()
        };
        assert!(matches!(infinite.validate(), Err(ConfigError::Invalid(_))));

        let crowded = CascadeConfig {
            particle_count: CascadeConfig::MAX_PARTICLES + 1,
            ..CascadeConfig::default()
        };
        assert!(crowded.validate().is_err());

        let shrinking = CascadeConfig {
            burst_ceiling: 0.5,
            ..CascadeConfig::default()
        };
        assert!(shrinking.validate().is_err());
    }

    #[test]
    fn test_uniform_tolerates_non_finite_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 2.0, f32::INFINITY), 2.0);
        assert_eq!(uniform(&mut rng, f32::NAN, 3.0), 3.0);
        assert_eq!(uniform(&mut rng, f32::NAN, f32::NEG_INFINITY), 0.0);
        assert_eq!(uniform(&mut rng, -3e38, 3e38), -3e38);

        let unchecked = CascadeConfig {
            min_speed: f32::NAN,
            max_size: f32::INFINITY,
            ..CascadeConfig::default()
        };
        let cascade = Cascade::with_rng(unchecked, 800.0, 600.0, SmallRng::seed_from_u64(2));
        assert_eq!(cascade.drops().len(), 150);
    }
}
