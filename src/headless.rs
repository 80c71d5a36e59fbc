//! Offscreen host: drives a [`FrameLoop`] into a [`PixelSurface`].

use tracing::debug;

use crate::animator::{Backdrop, FrameLoop, FrameStats};
use crate::config::Settings;
use crate::diagnostics::DiagnosticSink;
use crate::raster::PixelSurface;
use crate::surface::Surface;

/// Run `count` frame callbacks against `surface`.
///
/// The loop is made ready at the surface's size first if it is not already.
pub fn render_offscreen<B, D>(
    frames: &mut FrameLoop<B, D>,
    surface: &mut PixelSurface,
    count: u32,
) -> FrameStats
where
    B: Backdrop,
    D: DiagnosticSink,
{
    frames.notify_ready(surface.width() as f32, surface.height() as f32);
    for _ in 0..count {
        frames.frame(Some(&mut *surface as &mut dyn Surface));
    }
    let stats = frames.stats();
    debug!(
        rendered = stats.rendered,
        dropped = stats.dropped,
        "offscreen run finished"
    );
    stats
}

/// Animate `backdrop` for `count` frames on a fresh `width × height` surface
/// and return the last frame.
pub fn snapshot<B: Backdrop>(
    backdrop: B,
    settings: &Settings,
    width: u32,
    height: u32,
    count: u32,
) -> (PixelSurface, FrameStats) {
    let mut frames = FrameLoop::new(backdrop).with_diagnostics(settings.diagnostics);
    let mut surface = PixelSurface::with_background(width, height, settings.network.background);
    let stats = render_offscreen(&mut frames, &mut surface, count);
    (surface, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::field::ParticleField;

    #[test]
    fn test_offscreen_renders_every_frame() {
        let field = ParticleField::with_seed(3, 200.0, 100.0);
        let mut frames = FrameLoop::with_sink(field, MemorySink::new());
        let mut surface = PixelSurface::new(200, 100);

        let stats = render_offscreen(&mut frames, &mut surface, 5);
        assert_eq!(stats.rendered, 5);
        assert_eq!(stats.dropped, 0);
        assert!(frames.sink().is_empty());
        assert_eq!(frames.size().x, 200.0);
    }

    #[test]
    fn test_snapshot_draws_particles() {
        let field = ParticleField::with_seed(11, 320.0, 240.0);
        let (surface, stats) = snapshot(field, &Settings::default(), 320, 240, 3);
        assert_eq!(stats.rendered, 3);
        let lit = surface.image().pixels().filter(|p| p[3] > 0).count();
        assert!(lit > 0);
    }
}
