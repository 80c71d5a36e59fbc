//! CPU-side batching of one frame's draw calls.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use crate::error::DrawError;
use crate::surface::Surface;

/// One instanced disc.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub _padding: f32,
    pub color: [f32; 4],
}

/// One vertex of the triangle list used for lines and polygons.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl CircleInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl MeshVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A [`Surface`] that records geometry for [`GpuState::render`](super::GpuState::render).
///
/// Discs are drawn first, then the mesh (lines and polygons) on top.
#[derive(Debug, Default, Clone)]
pub struct GpuFrame {
    circles: Vec<CircleInstance>,
    vertices: Vec<MeshVertex>,
    cleared: bool,
}

impl GpuFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circles(&self) -> &[CircleInstance] {
        &self.circles
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Whether `clear` was called this frame.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty() && self.vertices.is_empty()
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Vec4) {
        let color = color.to_array();
        for p in [a, b, c] {
            self.vertices.push(MeshVertex {
                position: p.to_array(),
                color,
            });
        }
    }
}

impl Surface for GpuFrame {
    fn clear(&mut self) -> Result<(), DrawError> {
        self.circles.clear();
        self.vertices.clear();
        self.cleared = true;
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) -> Result<(), DrawError> {
        if !center.is_finite() || !radius.is_finite() {
            return Err(DrawError::NonFinite);
        }
        if radius > 0.0 {
            self.circles.push(CircleInstance {
                center: center.to_array(),
                radius,
                _padding: 0.0,
                color: color.to_array(),
            });
        }
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) -> Result<(), DrawError> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(DrawError::NonFinite);
        }
        // Fan triangulation, so outlines must be convex.
        for pair in points.windows(2).skip(1) {
            self.triangle(points[0], pair[0], pair[1], color);
        }
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
        let dir = (to - from).normalize_or_zero();
        if dir == Vec2::ZERO || width <= 0.0 {
            return Ok(());
        }
        // Hairlines become one pixel wide with proportionally less alpha.
        let (width, color) = if width < 1.0 {
            (1.0, color * Vec4::new(1.0, 1.0, 1.0, width))
        } else {
            (width, color)
        };
        let offset = dir.perp() * (width * 0.5);
        let (a, b, c, d) = (from + offset, from - offset, to + offset, to - offset);
        self.triangle(a, b, c, color);
        self.triangle(c, b, d, color);
        Ok(())
    }
}
