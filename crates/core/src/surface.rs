//! The drawing contract shared by the browser canvas and the CPU raster.
//!
//! Every coordinate passed to a [`Surface`] is in CSS pixels. Implementations
//! own the mapping to backing pixels (`css * device_pixel_ratio`), so engine
//! state never depends on the backing resolution.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::EngineError;

/// Logical surface size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Validated constructor: both sides must be finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self, EngineError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(Self { width, height })
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Maps a fractional position (0..1 on each axis) to CSS pixels.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> DVec2 {
        DVec2::new(fx * self.width, fy * self.height)
    }

    /// True when `p` lies within `[-margin, side + margin]` on both axes.
    pub fn contains_with_margin(&self, p: DVec2, margin: f64) -> bool {
        p.x >= -margin
            && p.x <= self.width + margin
            && p.y >= -margin
            && p.y <= self.height + margin
    }

    /// Backing-store size in device pixels, rounded, never below 1.
    pub fn backing_size(&self, device_pixel_ratio: f64) -> (u32, u32) {
        let scale = |v: f64| ((v * device_pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// How a draw call combines with what is already on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// Channel-wise addition (canvas `lighter`).
    Additive,
}

impl BlendMode {
    /// The `globalCompositeOperation` value for a 2D canvas context.
    pub fn composite_operation(self) -> &'static str {
        match self {
            BlendMode::Normal => "source-over",
            BlendMode::Additive => "lighter",
        }
    }
}

/// A color stop on a radial gradient; `offset` runs 0 (center) to 1 (rim).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

/// Samples a stop list at `t`, interpolating between neighbours.
///
/// Stops must be sorted by offset. Outside the covered range the nearest
/// end stop is returned; an empty list yields transparent.
pub fn sample_gradient(stops: &[GradientStop], t: f64) -> Rgba {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    stops
        .windows(2)
        .find(|pair| t <= pair[1].offset)
        .map(|pair| {
            let span = pair[1].offset - pair[0].offset;
            if span <= f64::EPSILON {
                pair[1].color
            } else {
                pair[0].color.lerp(pair[1].color, (t - pair[0].offset) / span)
            }
        })
        .unwrap_or(last.color)
}

/// A 2D drawing target.
///
/// This trait is object-safe so engines can render through `&mut dyn Surface`.
pub trait Surface {
    /// Sets the logical size and backing resolution. Clears the contents.
    fn resize(&mut self, dimensions: Dimensions, device_pixel_ratio: f64);

    /// Erases everything to transparent.
    fn clear(&mut self);

    /// Blend mode for subsequent draw calls.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Strokes an open polyline. Fewer than two points draws nothing.
    fn stroke_polyline(&mut self, points: &[DVec2], color: Rgba, width: f64);

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);

    /// Fills a disc of `radius` with a radial gradient centred on `center`.
    fn radial_glow(&mut self, center: DVec2, radius: f64, stops: &[GradientStop]);
}
