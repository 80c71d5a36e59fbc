//! End-to-end behaviour of the particle network through the public API.

use driftnet::prelude::*;
use driftnet::{
    connections, render, seed, step, ConfigError, DeviceClass, DrawCommand, FieldProfile,
    MemorySink, NetworkStyle, Particle,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn at(x: f32, y: f32) -> Particle {
    Particle {
        position: Vec2::new(x, y),
        velocity: Vec2::ZERO,
        size: 1.0,
    }
}

#[test]
fn desktop_viewport_gets_full_field() {
    let field = ParticleField::with_seed(1, 1920.0, 1080.0);
    assert_eq!(field.particles().len(), 60);
    assert_eq!(field.config().connection_distance, 150.0);
    assert_eq!(field.config().class, DeviceClass::Full);

    for p in field.particles() {
        assert!((0.0..1920.0).contains(&p.position.x));
        assert!((0.0..1080.0).contains(&p.position.y));
        assert!(p.velocity.x.abs() <= 0.25 && p.velocity.y.abs() <= 0.25);
        assert!((1.0..=3.0).contains(&p.size));
    }
}

#[test]
fn phone_viewport_gets_compact_field() {
    let config = configure(400.0, 800.0);
    assert_eq!(config.count, 40);
    assert_eq!(config.connection_distance, 120.0);

    let field = ParticleField::with_seed(1, 400.0, 800.0);
    assert_eq!(field.particles().len(), 40);
    assert!(field.particles().iter().all(|p| p.size <= 2.0));
}

#[test]
fn pair_at_exact_distance_is_not_joined() {
    let style = NetworkStyle::default();
    let mut surface = RecordingSurface::new();

    render(&mut surface, &[at(100.0, 100.0), at(250.0, 100.0)], 150.0, &style).unwrap();
    assert_eq!(surface.lines().count(), 0);
    assert_eq!(surface.circles().count(), 2);

    surface.reset();
    render(&mut surface, &[at(100.0, 100.0), at(249.0, 100.0)], 150.0, &style).unwrap();
    let lines: Vec<_> = surface.lines().collect();
    assert_eq!(lines.len(), 1);
    let (_, _, width, color) = lines[0];
    assert_eq!(width, 0.5);
    assert!((color.w - 1.0 / 150.0).abs() < 1e-4);
}

#[test]
fn frame_draws_clear_then_dots_then_lines() {
    let field = ParticleField::with_seed(5, 1024.0, 768.0);
    let mut surface = RecordingSurface::new();
    field.render(&mut surface).unwrap();

    let commands = surface.commands();
    assert_eq!(commands[0], DrawCommand::Clear);
    let n = field.particles().len();
    assert!(commands[1..=n]
        .iter()
        .all(|c| matches!(c, DrawCommand::Circle { .. })));
    assert!(commands[n + 1..]
        .iter()
        .all(|c| matches!(c, DrawCommand::Line { .. })));
    assert_eq!(commands.len() - n - 1, field.connections().count());
}

#[test]
fn shrinking_across_breakpoint_reseeds() {
    let mut field = ParticleField::with_seed(9, 1920.0, 1080.0);
    assert!(field.resize(375.0, 667.0));
    assert_eq!(field.particles().len(), 40);
    assert_eq!(field.config().connection_distance, 120.0);
    assert!(field
        .particles()
        .iter()
        .all(|p| p.position.x < 375.0 && p.position.y < 667.0));

    let before = field.particles().to_vec();
    assert!(!field.resize(400.0, 700.0));
    assert_eq!(field.particles(), before.as_slice());
}

#[test]
fn zero_size_resize_keeps_last_good_size() {
    let mut field = ParticleField::with_seed(2, 800.0, 600.0);
    field.resize(0.0, 0.0);
    assert_eq!(field.size(), Vec2::new(800.0, 600.0));
    field.step();
    assert_eq!(field.particles().len(), 60);
}

#[test]
fn seeds_are_reproducible_and_independent() {
    let a = ParticleField::with_seed(42, 1920.0, 1080.0);
    let b = ParticleField::with_seed(42, 1920.0, 1080.0);
    let c = ParticleField::with_seed(43, 1920.0, 1080.0);
    assert_eq!(a.particles(), b.particles());
    assert_ne!(a.particles(), c.particles());
}

#[test]
fn particles_stay_near_the_box() {
    let config = configure(1280.0, 720.0);
    let mut rng = SmallRng::seed_from_u64(77);
    let mut particles = seed(&config, 1280.0, 720.0, &mut rng);

    for _ in 0..20_000 {
        step(&mut particles, 1280.0, 720.0);
        for p in &particles {
            assert!(p.position.x >= -0.5 && p.position.x <= 1280.5);
            assert!(p.position.y >= -0.5 && p.position.y <= 720.5);
        }
    }
}

#[test]
fn opacity_falls_with_distance() {
    let particles: Vec<_> = (0..6).map(|i| at(i as f32 * 25.0, 0.0)).collect();
    let mut links: Vec<_> = connections(&particles, 150.0).collect();
    links.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    assert_eq!(links.len(), 15);
    for pair in links.windows(2) {
        assert!(pair[0].opacity >= pair[1].opacity);
    }
    assert!(links.iter().all(|l| l.a < l.b && l.opacity > 0.0 && l.opacity <= 1.0));
}

#[test]
fn pixel_snapshot_shows_cyan_dots() {
    let mut field = ParticleField::with_seed(123, 640.0, 480.0);
    let mut surface = PixelSurface::new(640, 480);
    field.step();
    field.render(&mut surface).unwrap();

    for p in field.particles() {
        let x = p.position.x.clamp(0.0, 639.0) as u32;
        let y = p.position.y.clamp(0.0, 479.0) as u32;
        let pixel = surface.pixel(x, y).unwrap();
        assert!(pixel.w > 0.0);
        assert_eq!(pixel.x, 0.0);
        assert_eq!(pixel.z, 1.0);
    }
}

#[test]
fn frame_loop_survives_failing_surface() {
    let field = ParticleField::with_seed(8, 1920.0, 1080.0);
    let mut frames = FrameLoop::with_sink(field, MemorySink::new());
    frames.notify_ready(1920.0, 1080.0);

    let mut broken = RecordingSurface::failing_after(3);
    assert_eq!(frames.frame(Some(&mut broken)), FrameOutcome::Dropped);

    let mut healthy = RecordingSurface::new();
    assert_eq!(frames.frame(Some(&mut healthy)), FrameOutcome::Rendered);
    assert_eq!(frames.sink().failures().len(), 1);
    assert_eq!(frames.stats().rendered, 1);
}

#[test]
fn settings_file_drives_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "profile": { "breakpoint": 1024.0 } }"#).unwrap();

    let settings = Settings::load(&path).unwrap();
    let field = ParticleField::from_settings(&settings, 900.0, 700.0, SmallRng::seed_from_u64(1));
    assert_eq!(field.particles().len(), 40);

    settings.save(&path).unwrap();
    assert_eq!(Settings::load(&path).unwrap(), settings);
}

#[test]
fn cascade_runs_through_the_frame_loop() {
    let cascade = Cascade::with_seed(4, 800.0, 600.0);
    let mut frames = FrameLoop::with_sink(cascade, MemorySink::new());
    frames.notify_ready(800.0, 600.0);

    let mut surface = RecordingSurface::new();
    for _ in 0..30 {
        surface.reset();
        assert_eq!(frames.frame(Some(&mut surface)), FrameOutcome::Rendered);
    }
    assert!(frames.backdrop().drops().len() <= frames.backdrop().config().capacity());
    assert!(frames.sink().is_empty());
}

#[test]
fn out_of_range_speed_in_settings_is_rejected() {
    let json = r#"{
        "profile": {
            "full": {
                "class": "full",
                "count": 60,
                "connection_distance": 150.0,
                "speed": 1e39,
                "min_size": 1.0,
                "max_size": 3.0
            }
        }
    }"#;
    assert!(matches!(Settings::from_json(json), Err(ConfigError::Invalid(_))));

    // Settings built in code skip validation; seeding and resizing still hold up.
    let mut settings = Settings::default();
    settings.profile = FieldProfile {
        full: FieldConfig {
            speed: f32::INFINITY,
            ..FieldConfig::FULL
        },
        ..FieldProfile::default()
    };
    let mut field =
        ParticleField::from_settings(&settings, 375.0, 667.0, SmallRng::seed_from_u64(3));
    assert!(field.resize(1920.0, 1080.0));
    assert_eq!(field.particles().len(), 60);
    field.step();
}
