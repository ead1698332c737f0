//! Field Synthesizer: the force field that drives particles and field lines.
//!
//! The field at a point is the sum of five fixed dipole sources, two
//! travelling radial waves around the surface center, an ambient drift, and
//! (while the pointer is over the container) a local swirl-and-push term. The
//! total is clamped to [`FIELD_CEILING`].
//!
//! Source positions are fractions of the surface size, so the layout follows
//! resizes. [`EnergyField`] is a cheap per-frame value; sampling it is pure.

use energy_wave_core::field_source::{
    clamp_magnitude, AmbientDrift, Dipole, FieldSource, PointerRepulsion, Polarity, RadialWave,
    WaveProjection,
};
use energy_wave_core::Dimensions;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Upper bound on the field magnitude.
pub const FIELD_CEILING: f64 = 3.0;
/// Dipole moment per unit of source strength.
pub const MOMENT_PER_STRENGTH: f64 = 60_000.0;
/// Pointer influence radius in CSS pixels.
pub const POINTER_RADIUS: f64 = 350.0;
const POINTER_STRENGTH: f64 = 2.4;
const POINTER_SWIRL: f64 = 0.6;
const POINTER_PUSH: f64 = 0.8;

const DRIFT: AmbientDrift = AmbientDrift {
    spatial_frequency: 0.004,
    temporal_frequency_x: 0.6,
    temporal_frequency_y: 0.45,
    amplitude: 0.12,
};

/// One named dipole source, positioned relative to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceLayout {
    pub name: &'static str,
    /// Horizontal position as a fraction of surface width.
    pub x: f64,
    /// Vertical position as a fraction of surface height.
    pub y: f64,
    pub strength: f64,
    pub polarity: Polarity,
    /// Glow breathing rate in radians per simulated second.
    pub pulse_rate: f64,
    pub pulse_phase: f64,
}

/// The fixed source layout.
pub const SOURCES: [SourceLayout; 5] = [
    SourceLayout {
        name: "solar",
        x: 0.18,
        y: 0.28,
        strength: 1.2,
        polarity: Polarity::Positive,
        pulse_rate: 0.9,
        pulse_phase: 0.0,
    },
    SourceLayout {
        name: "storage",
        x: 0.82,
        y: 0.32,
        strength: 1.0,
        polarity: Polarity::Negative,
        pulse_rate: 0.7,
        pulse_phase: 1.3,
    },
    SourceLayout {
        name: "grid",
        x: 0.5,
        y: 0.55,
        strength: 0.8,
        polarity: Polarity::Positive,
        pulse_rate: 1.1,
        pulse_phase: 2.1,
    },
    SourceLayout {
        name: "heat-pump",
        x: 0.25,
        y: 0.78,
        strength: 0.9,
        polarity: Polarity::Negative,
        pulse_rate: 0.6,
        pulse_phase: 3.4,
    },
    SourceLayout {
        name: "charger",
        x: 0.76,
        y: 0.8,
        strength: 1.1,
        polarity: Polarity::Positive,
        pulse_rate: 0.8,
        pulse_phase: 4.6,
    },
];

impl SourceLayout {
    pub fn position(&self, dimensions: Dimensions) -> DVec2 {
        dimensions.at_fraction(self.x, self.y)
    }

    pub fn dipole(&self, dimensions: Dimensions) -> Dipole {
        Dipole {
            position: self.position(dimensions),
            moment: self.strength * MOMENT_PER_STRENGTH,
            polarity: self.polarity,
        }
    }
}

/// Pointer position in surface-local CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub position: DVec2,
    pub active: bool,
}

impl PointerState {
    pub fn move_to(&mut self, position: DVec2) {
        self.position = position;
        self.active = true;
    }

    /// Marks the pointer as gone; the last position is kept.
    pub fn leave(&mut self) {
        self.active = false;
    }
}

/// The composite field for one frame.
#[derive(Debug, Clone, Copy)]
pub struct EnergyField<'a> {
    dimensions: Dimensions,
    pointer: PointerState,
    sources: &'a [SourceLayout],
}

impl EnergyField<'static> {
    /// Field over the fixed [`SOURCES`] layout.
    pub fn new(dimensions: Dimensions, pointer: PointerState) -> Self {
        Self::with_sources(dimensions, pointer, &SOURCES)
    }
}

impl<'a> EnergyField<'a> {
    pub fn with_sources(
        dimensions: Dimensions,
        pointer: PointerState,
        sources: &'a [SourceLayout],
    ) -> Self {
        Self {
            dimensions,
            pointer,
            sources,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// Sum of the dipole terms alone, unclamped.
    pub fn dipole_sum(&self, point: DVec2) -> DVec2 {
        self.sources
            .iter()
            .map(|s| s.dipole(self.dimensions).sample(point, 0.0))
            .sum()
    }

    /// The two ripples around the surface center.
    pub fn waves(&self) -> [RadialWave; 2] {
        let center = self.dimensions.center();
        [
            RadialWave {
                center,
                wavenumber: 0.012,
                angular_velocity: 1.8,
                amplitude: 0.35,
                phase: 0.0,
                projection: WaveProjection::Tangential,
            },
            RadialWave {
                center,
                wavenumber: 0.025,
                angular_velocity: 1.1,
                amplitude: 0.2,
                phase: 1.2,
                projection: WaveProjection::Radial,
            },
        ]
    }

    /// The pointer term, present only while the pointer is active.
    pub fn pointer_term(&self) -> Option<PointerRepulsion> {
        self.pointer.active.then_some(PointerRepulsion {
            position: self.pointer.position,
            radius: POINTER_RADIUS,
            strength: POINTER_STRENGTH,
            swirl: POINTER_SWIRL,
            push: POINTER_PUSH,
        })
    }
}

impl FieldSource for EnergyField<'_> {
    fn sample(&self, point: DVec2, time: f64) -> DVec2 {
        let mut force = self.dipole_sum(point);
        for wave in self.waves() {
            force += wave.sample(point, time);
        }
        force += DRIFT.sample(point, time);
        if let Some(pointer) = self.pointer_term().filter(|p| p.reaches(point)) {
            force += pointer.sample(point, time);
        }
        clamp_magnitude(force, FIELD_CEILING)
    }
}
