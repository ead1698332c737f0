#![deny(unsafe_code)]
//! Core types and traits for the energy-wave engine.
//!
//! Provides the `Engine` trait, the `Surface` drawing contract, reusable
//! `FieldSource` terms (dipole, radial wave, ambient drift, pointer
//! repulsion), color types, the `Xorshift64` PRNG, and the `Seed` replay record.

pub mod color;
pub mod engine;
pub mod error;
pub mod field_source;
pub mod prng;
pub mod seed;
pub mod surface;

pub use color::{Rgba, Srgb};
pub use engine::Engine;
pub use error::EngineError;
pub use field_source::FieldSource;
pub use prng::Xorshift64;
pub use seed::Seed;
pub use surface::{BlendMode, Dimensions, GradientStop, Surface};
