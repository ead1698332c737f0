//! CPU implementation of [`Surface`].
//!
//! Pixels are premultiplied RGBA `f32` at backing resolution
//! (`css * device_pixel_ratio`). Coverage is binary: a backing pixel is
//! painted when its center falls inside the shape. Strokes and discs are
//! never thinner than one backing pixel.

use std::ops::Range;

use energy_wave_core::surface::sample_gradient;
use energy_wave_core::{BlendMode, Dimensions, GradientStop, Rgba, Srgb, Surface};
use glam::DVec2;

/// Half of the thinnest stroke or disc, in backing pixels.
const MIN_HALF_EXTENT: f64 = 0.5;

/// Premultiplied RGBA pixel.
pub type Pixel = [f32; 4];

#[derive(Debug, Clone)]
pub struct Raster {
    dimensions: Dimensions,
    ratio: f64,
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
    blend: BlendMode,
    /// Per-pixel draw-call stamps, so a polyline paints each pixel once.
    stamps: Vec<u32>,
    generation: u32,
}

impl Raster {
    pub fn new(dimensions: Dimensions, device_pixel_ratio: f64) -> Self {
        let (w, h) = dimensions.backing_size(device_pixel_ratio);
        let (width, height) = (w as usize, h as usize);
        Self {
            dimensions,
            ratio: device_pixel_ratio,
            width,
            height,
            pixels: vec![[0.0; 4]; width * height],
            blend: BlendMode::Normal,
            stamps: vec![0; width * height],
            generation: 0,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.ratio
    }

    pub fn backing_width(&self) -> usize {
        self.width
    }

    pub fn backing_height(&self) -> usize {
        self.height
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Backing pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Backing pixel under a CSS-pixel position.
    pub fn pixel_at(&self, css: DVec2) -> Option<Pixel> {
        let p = css * self.ratio;
        if !(p.x >= 0.0 && p.y >= 0.0) {
            return None;
        }
        self.pixel(p.x as usize, p.y as usize)
    }

    /// Number of pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p[3] > 0.0).count()
    }

    /// Straight-alpha RGBA8, row major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&[r, g, b, a]| {
                if a <= 0.0 {
                    [0, 0, 0, 0]
                } else {
                    [quantize(r / a), quantize(g / a), quantize(b / a), quantize(a)]
                }
            })
            .collect()
    }

    /// Opaque RGBA8 with the contents composited over `background`.
    pub fn composite_over(&self, background: Srgb) -> Vec<u8> {
        let bg = [background.r as f32, background.g as f32, background.b as f32];
        self.pixels
            .iter()
            .flat_map(|&[r, g, b, a]| {
                let under = 1.0 - a;
                [
                    quantize(r + bg[0] * under),
                    quantize(g + bg[1] * under),
                    quantize(b + bg[2] * under),
                    255,
                ]
            })
            .collect()
    }

    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
        self.generation
    }

    fn blend_pixel(&mut self, idx: usize, color: Rgba) {
        let a = color.alpha.clamp(0.0, 1.0) as f32;
        if a <= 0.0 {
            return;
        }
        let channel = |c: f64| c.clamp(0.0, 1.0) as f32 * a;
        let src = [
            channel(color.color.r),
            channel(color.color.g),
            channel(color.color.b),
            a,
        ];
        let dst = &mut self.pixels[idx];
        match self.blend {
            BlendMode::Normal => {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d = s + *d * (1.0 - a);
                }
            }
            BlendMode::Additive => {
                for (d, s) in dst.iter_mut().zip(src) {
                    *d = (*d + s).min(1.0);
                }
            }
        }
    }

    /// Visits every backing pixel whose center lies in the box `[lo, hi]`.
    fn for_each_in_box(
        &mut self,
        lo: DVec2,
        hi: DVec2,
        mut visit: impl FnMut(&mut Self, usize, DVec2),
    ) {
        let xs = span(lo.x, hi.x, self.width);
        for y in span(lo.y, hi.y, self.height) {
            for x in xs.clone() {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                visit(self, y * self.width + x, center);
            }
        }
    }
}

/// Indices `i < len` with `lo <= i + 0.5 <= hi`. Empty for NaN bounds.
fn span(lo: f64, hi: f64, len: usize) -> Range<usize> {
    let start = (lo - 0.5).ceil().max(0.0);
    let end = ((hi - 0.5).floor() + 1.0).min(len as f64);
    if start < end {
        start as usize..end as usize
    } else {
        0..0
    }
}

fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Surface for Raster {
    fn resize(&mut self, dimensions: Dimensions, device_pixel_ratio: f64) {
        *self = Raster::new(dimensions, device_pixel_ratio);
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn stroke_polyline(&mut self, points: &[DVec2], color: Rgba, width: f64) {
        if points.len() < 2 || color.alpha <= 0.0 {
            return;
        }
        let half = (width * self.ratio * 0.5).max(MIN_HALF_EXTENT);
        let stamp = self.next_generation();
        let ratio = self.ratio;
        for pair in points.windows(2) {
            let (a, b) = (pair[0] * ratio, pair[1] * ratio);
            self.for_each_in_box(a.min(b) - half, a.max(b) + half, |raster, idx, center| {
                if raster.stamps[idx] != stamp && segment_distance(center, a, b) <= half {
                    raster.stamps[idx] = stamp;
                    raster.blend_pixel(idx, color);
                }
            });
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if color.alpha <= 0.0 || !(radius > 0.0 && radius.is_finite()) {
            return;
        }
        let c = center * self.ratio;
        let r = (radius * self.ratio).max(MIN_HALF_EXTENT);
        self.for_each_in_box(c - r, c + r, |raster, idx, p| {
            if p.distance_squared(c) <= r * r {
                raster.blend_pixel(idx, color);
            }
        });
    }

    fn radial_glow(&mut self, center: DVec2, radius: f64, stops: &[GradientStop]) {
        if stops.is_empty() || !(radius > 0.0 && radius.is_finite()) {
            return;
        }
        let c = center * self.ratio;
        let r = radius * self.ratio;
        self.for_each_in_box(c - r, c + r, |raster, idx, p| {
            let t = p.distance(c) / r;
            if t <= 1.0 {
                raster.blend_pixel(idx, sample_gradient(stops, t));
            }
        });
    }
}
