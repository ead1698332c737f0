//! Field sources: the 2D vector terms an energy field is summed from.
//!
//! A [`FieldSource`] returns a force vector at any point and time. The terms
//! here are positioned in absolute CSS pixels; callers that scale with the
//! surface rebuild them from fractional coordinates.
//!
//! All implementations are pure: same inputs produce the same output.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A source of 2D force vectors.
pub trait FieldSource: Send + Sync {
    /// Force at `point` at simulation time `time` (seconds).
    fn sample(&self, point: DVec2, time: f64) -> DVec2;
}

impl<F: Fn(DVec2, f64) -> DVec2 + Send + Sync> FieldSource for F {
    fn sample(&self, point: DVec2, time: f64) -> DVec2 {
        self(point, time)
    }
}

/// Added to every dipole distance so the field stays finite at the source.
pub const DIPOLE_SOFTENING: f64 = 40.0;

/// Sign applied to a dipole's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

/// Magnetic-dipole-style source with inverse-cube falloff.
///
/// The dipole axis is the +x direction. At angle θ from the axis the field
/// has a radial part `2m·cosθ/r³` and a tangential part `m·sinθ/r³`, with
/// `r` softened by [`DIPOLE_SOFTENING`]. Not physically exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dipole {
    pub position: DVec2,
    pub moment: f64,
    pub polarity: Polarity,
}

/// Which way a radial wave pushes relative to its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveProjection {
    /// Along the line from the center.
    Radial,
    /// Perpendicular to it (counter-clockwise).
    Tangential,
}

/// Sinusoidal ripple travelling outward from `center`.
///
/// Amplitude at distance `d` is `amplitude * sin(d * wavenumber - t * angular_velocity + phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialWave {
    pub center: DVec2,
    pub wavenumber: f64,
    pub angular_velocity: f64,
    pub amplitude: f64,
    pub phase: f64,
    pub projection: WaveProjection,
}

/// Low-amplitude background drift so the field never goes flat.
///
/// `fx` varies with x and time, `fy` with y and time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientDrift {
    pub spatial_frequency: f64,
    pub temporal_frequency_x: f64,
    pub temporal_frequency_y: f64,
    pub amplitude: f64,
}

/// Swirl-and-push term around a pointer, zero beyond `radius`.
///
/// Magnitude is `strength * (1 - d/radius)²`, split between a tangential
/// swirl and an outward push.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRepulsion {
    pub position: DVec2,
    pub radius: f64,
    pub strength: f64,
    pub swirl: f64,
    pub push: f64,
}

impl PointerRepulsion {
    /// Whether `point` is strictly inside the influence radius.
    pub fn reaches(&self, point: DVec2) -> bool {
        point.distance_squared(self.position) < self.radius * self.radius
    }
}

/// Scales `v` down so its length does not exceed `ceiling`.
pub fn clamp_magnitude(v: DVec2, ceiling: f64) -> DVec2 {
    v.clamp_length_max(ceiling)
}

/// Unit vector at `angle` radians.
fn direction(angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(cos, sin)
}

impl FieldSource for Dipole {
    fn sample(&self, point: DVec2, _time: f64) -> DVec2 {
        let d = point - self.position;
        let r = d.length() + DIPOLE_SOFTENING;
        let angle = d.y.atan2(d.x);
        let (sin, cos) = angle.sin_cos();
        let r3 = r * r * r;
        let radial = 2.0 * self.moment * cos / r3;
        let tangential = self.moment * sin / r3;
        DVec2::new(
            radial * cos - tangential * sin,
            radial * sin + tangential * cos,
        ) * self.polarity.sign()
    }
}

impl FieldSource for RadialWave {
    fn sample(&self, point: DVec2, time: f64) -> DVec2 {
        let d = point - self.center;
        let dist = d.length();
        let value = (dist * self.wavenumber - time * self.angular_velocity + self.phase).sin()
            * self.amplitude;
        let outward = direction(d.y.atan2(d.x));
        match self.projection {
            WaveProjection::Radial => outward * value,
            WaveProjection::Tangential => outward.perp() * value,
        }
    }
}

impl FieldSource for AmbientDrift {
    fn sample(&self, point: DVec2, time: f64) -> DVec2 {
        DVec2::new(
            (point.x * self.spatial_frequency + time * self.temporal_frequency_x).sin(),
            (point.y * self.spatial_frequency + time * self.temporal_frequency_y).cos(),
        ) * self.amplitude
    }
}

impl FieldSource for PointerRepulsion {
    fn sample(&self, point: DVec2, _time: f64) -> DVec2 {
        if !self.reaches(point) {
            return DVec2::ZERO;
        }
        let d = point - self.position;
        let dist = d.length();
        let falloff = 1.0 - dist / self.radius;
        let force = falloff * falloff * self.strength;
        // +1 keeps the direction finite when the pointer sits on the point.
        let away = d / (dist + 1.0);
        away.perp() * force * self.swirl + away * force * self.push
    }
}
