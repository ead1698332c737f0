//! Field-Line Renderer: streamlines traced from seeds spaced around the
//! surface border.
//!
//! Lines are retraced from scratch every frame and stroked faintly behind the
//! particles. Nothing is kept between frames.

use energy_wave_core::{Dimensions, FieldSource, Surface};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::palette;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLineParams {
    pub count: usize,
    pub max_steps: usize,
    /// Each step moves `field * step_scale` pixels.
    pub step_scale: f64,
    /// A trace stops once it leaves the surface by more than this.
    pub margin: f64,
    /// A trace stops where the field is weaker than this.
    pub min_strength: f64,
    pub alpha: f64,
    pub width: f64,
}

impl Default for FieldLineParams {
    fn default() -> Self {
        Self {
            count: 32,
            max_steps: 300,
            step_scale: 2.0,
            margin: 20.0,
            min_strength: 1e-3,
            alpha: 0.06,
            width: 0.8,
        }
    }
}

/// `count` seed points spread evenly along the border, clockwise from the
/// top-left corner.
pub fn seeds(dimensions: Dimensions, count: usize) -> Vec<DVec2> {
    let Dimensions { width, height } = dimensions;
    (0..count)
        .map(|k| {
            let s = (k as f64 + 0.5) / count as f64 * 4.0;
            let edge = s.floor();
            let u = s - edge;
            match edge as u8 {
                0 => DVec2::new(u * width, 0.0),
                1 => DVec2::new(width, u * height),
                2 => DVec2::new((1.0 - u) * width, height),
                _ => DVec2::new(0.0, (1.0 - u) * height),
            }
        })
        .collect()
}

/// Follows the field from `start`, returning the visited points (including
/// `start`). Stops at `max_steps`, where the field stalls, or before the
/// first point outside the margin.
pub fn trace<F: FieldSource + ?Sized>(
    field: &F,
    start: DVec2,
    time: f64,
    dimensions: Dimensions,
    params: &FieldLineParams,
) -> Vec<DVec2> {
    let mut points = Vec::with_capacity(params.max_steps + 1);
    points.push(start);
    let mut at = start;
    for _ in 0..params.max_steps {
        let force = field.sample(at, time);
        if force.length() < params.min_strength {
            break;
        }
        let next = at + force * params.step_scale;
        if !dimensions.contains_with_margin(next, params.margin) {
            break;
        }
        points.push(next);
        at = next;
    }
    points
}

/// Traces and strokes every field line for this frame.
pub fn draw<F: FieldSource + ?Sized>(
    field: &F,
    time: f64,
    dimensions: Dimensions,
    params: &FieldLineParams,
    surface: &mut dyn Surface,
) {
    let color = palette::FIELD_LINE.with_alpha(params.alpha);
    for seed in seeds(dimensions, params.count) {
        let line = trace(field, seed, time, dimensions, params);
        if line.len() >= 2 {
            surface.stroke_polyline(&line, color, params.width);
        }
    }
}
