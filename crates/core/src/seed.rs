//! Reproducible record of a headless render.
//!
//! A [`Seed`] captures everything the CLI needs to recreate a frame: engine
//! name, CSS size, device pixel ratio, PRNG seed, frame count, and the fixed
//! pointer position if one was simulated.

use crate::error::EngineError;
use crate::surface::Dimensions;
use serde::{Deserialize, Serialize};

/// Reproducible specification for one headless render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub engine: String,
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
    pub seed: u64,
    pub frames: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<[f64; 2]>,
}

impl Seed {
    /// DPR 1, zero frames, no pointer.
    pub fn new(engine: &str, width: f64, height: f64, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            width,
            height,
            device_pixel_ratio: 1.0,
            seed,
            frames: 0,
            pointer: None,
        }
    }

    /// Validated logical dimensions. DPR must also be positive and finite.
    pub fn dimensions(&self) -> Result<Dimensions, EngineError> {
        if !(self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0) {
            return Err(EngineError::InvalidDimensions);
        }
        Dimensions::new(self.width, self.height)
    }
}
