#![deny(unsafe_code)]
//! Energy-wave engine.
//!
//! A decorative vector-field animation: five fixed dipole sources, travelling
//! ripples and ambient drift form a force field that advects a fixed pool of
//! particles. Each frame also traces streamlines from the surface edges and
//! composites breathing glows over the sources and the pointer.
//!
//! [`EnergyWave`] is the platform-free simulation. [`driver::FrameDriver`]
//! binds it to a [`driver::Host`] that supplies the drawing surface, events
//! and frame scheduling.

pub mod driver;
pub mod field;
pub mod field_lines;
pub mod glow;
pub mod palette;
pub mod particles;

#[cfg(test)]
pub(crate) mod testing;

use energy_wave_core::error::EngineError;
use energy_wave_core::{Dimensions, Engine, Surface};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::field::{EnergyField, PointerState, FIELD_CEILING, POINTER_RADIUS, SOURCES};
use crate::field_lines::FieldLineParams;
use crate::particles::{ParticleParams, ParticleSystem};

/// Simulated seconds per frame. Not wall-clock.
pub const DEFAULT_TIME_STEP: f64 = 0.016;

/// Every internal constant of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub time_step: f64,
    pub particles: ParticleParams,
    pub field_lines: FieldLineParams,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            particles: ParticleParams::default(),
            field_lines: FieldLineParams::default(),
        }
    }
}

/// The energy-wave simulation.
///
/// All positions are CSS pixels relative to the surface's top-left corner,
/// so backing resolution changes never touch simulation state.
#[derive(Debug, Clone)]
pub struct EnergyWave {
    dimensions: Dimensions,
    params: WaveParams,
    time: f64,
    frame: u64,
    pointer: PointerState,
    particles: ParticleSystem,
}

impl EnergyWave {
    pub fn new(dimensions: Dimensions, seed: u64) -> Self {
        Self::with_params(dimensions, seed, WaveParams::default())
    }

    pub fn with_params(dimensions: Dimensions, seed: u64, params: WaveParams) -> Self {
        Self {
            dimensions,
            params,
            time: 0.0,
            frame: 0,
            pointer: PointerState::default(),
            particles: ParticleSystem::new(dimensions, params.particles, seed),
        }
    }

    /// Simulated seconds since construction.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn wave_params(&self) -> &WaveParams {
        &self.params
    }

    /// The field as it stands this frame.
    pub fn field(&self) -> EnergyField<'static> {
        EnergyField::new(self.dimensions, self.pointer)
    }
}

impl Engine for EnergyWave {
    fn step(&mut self) -> Result<(), EngineError> {
        self.time += self.params.time_step;
        self.frame += 1;
        let field = self.field();
        self.particles.update(&field, self.dimensions, self.time);
        Ok(())
    }

    fn render(&self, surface: &mut dyn Surface) {
        let field = self.field();
        field_lines::draw(
            &field,
            self.time,
            self.dimensions,
            &self.params.field_lines,
            surface,
        );
        self.particles.draw(surface);
        glow::draw(self.dimensions, self.pointer, self.time, surface);
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn resize(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
    }

    fn params(&self) -> Value {
        json!({
            "time_step": self.params.time_step,
            "particles": self.params.particles,
            "field_lines": self.params.field_lines,
            "field_ceiling": FIELD_CEILING,
            "pointer_radius": POINTER_RADIUS,
            "sources": SOURCES,
        })
    }
}
