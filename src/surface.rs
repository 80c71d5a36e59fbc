//! Abstract 2D drawing surface.
//!
//! Backdrops draw through [`Surface`] so the same frame can land in a GPU
//! window ([`GpuFrame`](crate::gpu::GpuFrame)), a CPU image
//! ([`PixelSurface`](crate::raster::PixelSurface)) or a command log
//! ([`RecordingSurface`]).
//!
//! Coordinates are in surface pixels with the origin at the top-left corner
//! and y pointing down.

use glam::{Vec2, Vec4};

use crate::error::DrawError;

/// Immediate-mode drawing target for one frame.
pub trait Surface {
    /// Reset every pixel to the surface's background.
    fn clear(&mut self) -> Result<(), DrawError>;

    /// Fill a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) -> Result<(), DrawError>;

    /// Fill a convex polygon given in either winding order.
    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) -> Result<(), DrawError>;

    /// Stroke a straight segment of the given width.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec4)
        -> Result<(), DrawError>;
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        center: Vec2,
        radius: f32,
        color: Vec4,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Vec4,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Vec4,
    },
}

/// Surface that records commands instead of drawing them.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    fail_after: Option<usize>,
    accepted: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that accepts `n` commands and then fails every later one
    /// with [`DrawError::Backend`].
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded commands, keeping the failure budget.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Vec4)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => Some((*center, *radius, *color)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2, f32, Vec4)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => Some((*from, *to, *width, *color)),
            _ => None,
        })
    }

    pub fn polygons(&self) -> impl Iterator<Item = (&[Vec2], Vec4)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polygon { points, color } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }

    fn record(&mut self, command: DrawCommand) -> Result<(), DrawError> {
        if let Some(limit) = self.fail_after {
            if self.accepted >= limit {
                return Err(DrawError::Backend(format!(
                    "recording surface refused command after {} accepted",
                    limit
                )));
            }
        }
        self.accepted += 1;
        self.commands.push(command);
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) -> Result<(), DrawError> {
        self.record(DrawCommand::Clear)
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) -> Result<(), DrawError> {
        self.record(DrawCommand::Circle {
            center,
            radius,
            color,
        })
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) -> Result<(), DrawError> {
        self.record(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        })
    }

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Vec4,
    ) -> Result<(), DrawError> {
        self.record(DrawCommand::Line {
            from,
            to,
            width,
            color,
        })
    }
}
