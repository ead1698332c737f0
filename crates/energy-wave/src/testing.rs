//! Test double for [`Surface`] that records every call.

use energy_wave_core::{BlendMode, Dimensions, GradientStop, Rgba, Surface};
use glam::DVec2;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize {
        dimensions: Dimensions,
        device_pixel_ratio: f64,
    },
    Clear,
    Blend(BlendMode),
    Polyline {
        points: Vec<DVec2>,
        color: Rgba,
        width: f64,
    },
    Circle {
        center: DVec2,
        radius: f64,
        color: Rgba,
    },
    Glow {
        center: DVec2,
        radius: f64,
        stops: Vec<GradientStop>,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn last_resize(&self) -> Option<(Dimensions, f64)> {
        self.ops.iter().rev().find_map(|op| match op {
            DrawOp::Resize {
                dimensions,
                device_pixel_ratio,
            } => Some((*dimensions, *device_pixel_ratio)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, dimensions: Dimensions, device_pixel_ratio: f64) {
        self.ops.push(DrawOp::Resize {
            dimensions,
            device_pixel_ratio,
        });
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.ops.push(DrawOp::Blend(mode));
    }

    fn stroke_polyline(&mut self, points: &[DVec2], color: Rgba, width: f64) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn radial_glow(&mut self, center: DVec2, radius: f64, stops: &[GradientStop]) {
        self.ops.push(DrawOp::Glow {
            center,
            radius,
            stops: stops.to_vec(),
        });
    }
}
