//! CPU rasterizer.
//!
//! [`PixelSurface`] draws into an [`RgbaImage`] with one pixel of analytic
//! anti-aliasing and straight-alpha source-over blending, close enough to a
//! browser 2D canvas for snapshots and golden tests. It is not fast; the
//! backdrops draw at most a few hundred shapes per frame.

use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};
use std::path::Path;

use crate::error::{DrawError, SnapshotError};
use crate::surface::Surface;

/// Software surface backed by an RGBA8 image.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    image: RgbaImage,
    background: Vec4,
}

impl PixelSurface {
    /// A transparent `width × height` surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, Vec4::ZERO)
    }

    pub fn with_background(width: u32, height: u32, background: Vec4) -> Self {
        let mut surface = Self {
            image: RgbaImage::new(width, height),
            background,
        };
        surface.fill_background();
        surface
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel at `(x, y)` as straight RGBA in 0..1.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        self.image.get_pixel_checked(x, y).map(|p| to_vec4(*p))
    }

    /// Write the surface as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.image
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn fill_background(&mut self) {
        let bg = to_rgba8(self.background);
        for pixel in self.image.pixels_mut() {
            *pixel = bg;
        }
    }

    /// Visit every pixel centre in the clipped bounding box `[min, max]`.
    fn cover<F>(&mut self, min: Vec2, max: Vec2, color: Vec4, mut coverage: F)
    where
        F: FnMut(Vec2) -> f32,
    {
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(w);
        let y1 = max.y.ceil().min(h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for y in y0 as u32..y1 as u32 {
            for x in x0 as u32..x1 as u32 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let amount = coverage(center).clamp(0.0, 1.0);
                if amount > 0.0 {
                    let dst = self.image.get_pixel_mut(x, y);
                    *dst = blend(*dst, color, amount);
                }
            }
        }
    }
}

impl Surface for PixelSurface {
    fn clear(&mut self) -> Result<(), DrawError> {
        self.fill_background();
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) -> Result<(), DrawError> {
        if !center.is_finite() || !radius.is_finite() {
            return Err(DrawError::NonFinite);
        }
        if radius <= 0.0 {
            return Ok(());
        }
        let reach = Vec2::splat(radius + 1.0);
        self.cover(center - reach, center + reach, color, |p| {
            radius + 0.5 - p.distance(center)
        });
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) -> Result<(), DrawError> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(DrawError::NonFinite);
        }
        if points.len() < 3 {
            return Ok(());
        }
        let min = points.iter().fold(Vec2::splat(f32::MAX), |a, p| a.min(*p));
        let max = points.iter().fold(Vec2::splat(f32::MIN), |a, p| a.max(*p));
        self.cover(min, max, color, |p| {
            if contains(points, p) {
                1.0
            } else {
                0.0
            }
        });
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Vec4,
    ) -> Result<(), DrawError> {
        if !from.is_finite() || !to.is_finite() || !width.is_finite() {
            return Err(DrawError::NonFinite);
        }
        if width <= 0.0 {
            return Ok(());
        }
        let half = width * 0.5;
        let reach = Vec2::splat(half + 1.0);
        let min = from.min(to) - reach;
        let max = from.max(to) + reach;
        // Sub-pixel lines spread their coverage over one pixel, like a canvas.
        let (core, scale) = if width < 1.0 { (0.5, width) } else { (half, 1.0) };
        self.cover(min, max, color, |p| {
            (core + 0.5 - segment_distance(p, from, to)) * scale
        });
        Ok(())
    }
}

/// Even-odd point-in-polygon test.
fn contains(points: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Straight-alpha source-over.
fn blend(dst: Rgba<u8>, color: Vec4, coverage: f32) -> Rgba<u8> {
    let src_a = color.w.clamp(0.0, 1.0) * coverage;
    if src_a <= 0.0 {
        return dst;
    }
    let d = to_vec4(dst);
    let out_a = src_a + d.w * (1.0 - src_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let rgb = (color.truncate() * src_a + d.truncate() * d.w * (1.0 - src_a)) / out_a;
    to_rgba8(rgb.extend(out_a))
}

fn to_vec4(p: Rgba<u8>) -> Vec4 {
    Vec4::new(p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32) / 255.0
}

fn to_rgba8(c: Vec4) -> Rgba<u8> {
    let c = (c.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    Rgba([c.x as u8, c.y as u8, c.z as u8, c.w as u8])
}
