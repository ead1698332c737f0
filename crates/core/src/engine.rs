//! The `Engine` trait every animated visual in this workspace implements.
//!
//! The trait is object-safe so hosts can hold engines as `Box<dyn Engine>`.

use crate::error::EngineError;
use crate::surface::{Dimensions, Surface};
use serde_json::Value;

/// A fixed-step simulation that can paint itself onto a [`Surface`].
pub trait Engine {
    /// Advance the simulation by one frame.
    fn step(&mut self) -> Result<(), EngineError>;

    /// Paint the current state. Does not clear the surface first.
    fn render(&self, surface: &mut dyn Surface);

    /// Logical size the simulation is laid out against, in CSS pixels.
    fn dimensions(&self) -> Dimensions;

    /// Update the logical size without resetting simulation state.
    fn resize(&mut self, dimensions: Dimensions);

    /// Active parameter values as a JSON object (read-only report).
    fn params(&self) -> Value;
}
