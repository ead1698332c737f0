#![deny(unsafe_code)]
//! Headless rendering for the energy-wave engine.
//!
//! [`Raster`] is a CPU [`Surface`](energy_wave_core::Surface), [`HeadlessHost`]
//! drives a [`FrameDriver`](energy_wave::driver::FrameDriver) without a
//! display, and [`snapshot::write_png`] saves the result.

pub mod headless;
pub mod raster;
#[cfg(feature = "png")]
pub mod snapshot;

pub use headless::{pump, HeadlessHost};
pub use raster::Raster;
