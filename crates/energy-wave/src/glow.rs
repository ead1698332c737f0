//! Additive glow overlays: one breathing halo per source, plus one around the
//! pointer while it is over the container.

use energy_wave_core::field_source::Polarity;
use energy_wave_core::{BlendMode, Dimensions, GradientStop, Srgb, Surface};

use crate::field::{PointerState, SourceLayout, SOURCES};
use crate::palette;

/// Source halo radius as a fraction of the shorter surface side.
pub const SOURCE_GLOW_FRACTION: f64 = 0.18;
/// Relative radius swing of the breathing pulse.
pub const PULSE_DEPTH: f64 = 0.2;
pub const POINTER_GLOW_RADIUS: f64 = 180.0;

/// Halo radius for `source` at simulation time `time`.
pub fn source_glow_radius(source: &SourceLayout, dimensions: Dimensions, time: f64) -> f64 {
    let pulse = (time * source.pulse_rate + source.pulse_phase).sin();
    dimensions.min_side() * SOURCE_GLOW_FRACTION * (1.0 + PULSE_DEPTH * pulse)
}

fn halo(color: Srgb, peak: f64) -> [GradientStop; 3] {
    [
        GradientStop {
            offset: 0.0,
            color: color.with_alpha(peak),
        },
        GradientStop {
            offset: 0.4,
            color: color.with_alpha(peak * 0.35),
        },
        GradientStop {
            offset: 1.0,
            color: color.with_alpha(0.0),
        },
    ]
}

/// Composites every halo additively, then restores normal blending.
pub fn draw(dimensions: Dimensions, pointer: PointerState, time: f64, surface: &mut dyn Surface) {
    surface.set_blend_mode(BlendMode::Additive);
    for source in &SOURCES {
        let tint = match source.polarity {
            Polarity::Positive => palette::POSITIVE,
            Polarity::Negative => palette::NEGATIVE,
        };
        surface.radial_glow(
            source.position(dimensions),
            source_glow_radius(source, dimensions, time),
            &halo(tint, 0.3),
        );
    }
    if pointer.active {
        surface.radial_glow(
            pointer.position,
            POINTER_GLOW_RADIUS,
            &halo(palette::POINTER, 0.22),
        );
    }
    surface.set_blend_mode(BlendMode::Normal);
}
