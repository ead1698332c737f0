//! PNG output of a [`Raster`].
//!
//! Feature-gated behind `png` (default on) so the raster surface can be used
//! without pulling in the `image` crate.

use std::path::Path;

use energy_wave_core::error::EngineError;
use energy_wave_core::Srgb;

use crate::raster::Raster;

/// Writes the raster at backing resolution.
///
/// With a `background` the image is opaque; without one it keeps the
/// raster's alpha. Returns `EngineError::InvalidDimensions` if the backing
/// size overflows `u32`, or `EngineError::Io` on write failure.
pub fn write_png(raster: &Raster, background: Option<Srgb>, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(raster.backing_width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(raster.backing_height()).map_err(|_| EngineError::InvalidDimensions)?;
    let rgba = match background {
        Some(bg) => raster.composite_over(bg),
        None => raster.to_rgba8(),
    };
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_wave_core::{Dimensions, Surface};
    use glam::DVec2;

    #[test]
    fn write_png_at_backing_resolution() {
        let mut raster = Raster::new(Dimensions::new(16.0, 8.0).unwrap(), 2.0);
        raster.fill_circle(DVec2::new(8.0, 4.0), 3.0, Srgb::WHITE.with_alpha(1.0));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&raster, Some(Srgb::BLACK), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (32, 16));
        assert_eq!(img.get_pixel(16, 8).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn transparent_background_keeps_alpha() {
        let raster = Raster::new(Dimensions::new(4.0, 4.0).unwrap(), 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");

        write_png(&raster, None, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let raster = Raster::new(Dimensions::new(4.0, 4.0).unwrap(), 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        assert!(matches!(write_png(&raster, None, &path), Err(EngineError::Io(_))));
    }
}
