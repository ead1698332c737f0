//! [`Surface`] over a `CanvasRenderingContext2d`.
//!
//! The context transform is set to the device pixel ratio on every resize,
//! so all draw calls take CSS pixels.

use std::f64::consts::TAU;

use energy_wave_core::{BlendMode, Dimensions, EngineError, GradientStop, Rgba, Surface};
use glam::DVec2;
use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    dimensions: Option<Dimensions>,
}

impl Canvas2dSurface {
    /// Fails when the browser has no 2D context for this canvas.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, EngineError> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| EngineError::SurfaceUnavailable(format!("{e:?}")))?
            .ok_or_else(|| EngineError::SurfaceUnavailable("no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EngineError::SurfaceUnavailable("not a 2d context".into()))?;
        Ok(Self {
            canvas,
            context,
            dimensions: None,
        })
    }
}

fn log_js_error(what: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        warn!("canvas {what} failed: {e:?}");
    }
}

impl Surface for Canvas2dSurface {
    fn resize(&mut self, dimensions: Dimensions, device_pixel_ratio: f64) {
        let (width, height) = dimensions.backing_size(device_pixel_ratio);
        // Assigning the backing size also resets the context state.
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        log_js_error(
            "set_transform",
            self.context.set_transform(
                device_pixel_ratio,
                0.0,
                0.0,
                device_pixel_ratio,
                0.0,
                0.0,
            ),
        );
        self.context.set_line_cap("round");
        self.context.set_line_join("round");
        self.dimensions = Some(dimensions);
    }

    fn clear(&mut self) {
        if let Some(d) = self.dimensions {
            self.context.clear_rect(0.0, 0.0, d.width, d.height);
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        log_js_error(
            "composite operation",
            self.context
                .set_global_composite_operation(mode.composite_operation()),
        );
    }

    fn stroke_polyline(&mut self, points: &[DVec2], color: Rgba, width: f64) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let ctx = &self.context;
        ctx.begin_path();
        ctx.move_to(first.x, first.y);
        for p in rest {
            ctx.line_to(p.x, p.y);
        }
        ctx.set_stroke_style_str(&color.to_css());
        ctx.set_line_width(width);
        ctx.stroke();
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if !(radius > 0.0) {
            return;
        }
        let ctx = &self.context;
        ctx.begin_path();
        log_js_error("arc", ctx.arc(center.x, center.y, radius, 0.0, TAU));
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill();
    }

    fn radial_glow(&mut self, center: DVec2, radius: f64, stops: &[GradientStop]) {
        if !(radius > 0.0 && radius.is_finite()) {
            return;
        }
        let gradient = match self
            .context
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
        {
            Ok(g) => g,
            Err(e) => {
                warn!("canvas radial gradient failed: {e:?}");
                return;
            }
        };
        for stop in stops {
            log_js_error(
                "color stop",
                gradient.add_color_stop(stop.offset as f32, &stop.color.to_css()),
            );
        }
        self.context.set_fill_style_canvas_gradient(&gradient);
        self.context.fill_rect(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        );
    }
}
