//! Raster-to-RGBA rendering and PNG encoding.

use crate::scheme::{evaluate, ColorScheme, Rgb};
use fieldscan_core::Raster;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

/// Errors raised while writing a rendered image.
#[derive(Error, Debug)]
pub enum ColormapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Raster too large to encode: {rows}x{cols}")]
    TooLarge { rows: usize, cols: usize },
}

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    pub scheme: ColorScheme,
    /// Values below this are clamped.
    pub min: f64,
    /// Values above this are clamped.
    pub max: f64,
    /// Color for missing pixels (RGBA). Default: fully transparent.
    pub missing_color: [u8; 4],
}

impl ColormapParams {
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            missing_color: [0, 0, 0, 0],
        }
    }
}

impl Default for ColormapParams {
    /// RdYlGn over the normalized-difference range -1..1.
    fn default() -> Self {
        Self::with_range(ColorScheme::RdYlGn, -1.0, 1.0)
    }
}

/// Fit the color range to the valid cells of `raster`.
///
/// All-missing rasters get 0..1, constant rasters get `v..v+1`.
pub fn auto_params(raster: &Raster, scheme: ColorScheme) -> ColormapParams {
    let stats = raster.statistics();
    let (min, max) = if stats.valid_count == 0 {
        (0.0, 1.0)
    } else if (stats.max - stats.min).abs() < f64::EPSILON {
        (stats.min, stats.min + 1.0)
    } else {
        (stats.min, stats.max)
    };
    ColormapParams::with_range(scheme, min, max)
}

/// Convert a raster to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order.
/// Missing pixels are rendered with `params.missing_color`.
pub fn raster_to_rgba(raster: &Raster, params: &ColormapParams) -> Vec<u8> {
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON {
        1.0 / range
    } else {
        1.0
    };

    let mut rgba = Vec::with_capacity(raster.len() * 4);
    for &v in raster.data().iter() {
        if v.is_finite() {
            let Rgb { r, g, b } = evaluate(params.scheme, (v - params.min) * inv_range);
            rgba.extend_from_slice(&[r, g, b, 255]);
        } else {
            rgba.extend_from_slice(&params.missing_color);
        }
    }
    rgba
}

/// Encode a raster as an in-memory PNG.
pub fn encode_png(raster: &Raster, params: &ColormapParams) -> Result<Vec<u8>, ColormapError> {
    let mut buf = Vec::new();
    write_png_to(raster, params, &mut buf)?;
    Ok(buf)
}

/// Render a raster and write it as a PNG file.
pub fn write_png<P: AsRef<Path>>(
    raster: &Raster,
    params: &ColormapParams,
    path: P,
) -> Result<(), ColormapError> {
    let file = File::create(path)?;
    write_png_to(raster, params, BufWriter::new(file))
}

fn write_png_to<W: std::io::Write>(
    raster: &Raster,
    params: &ColormapParams,
    writer: W,
) -> Result<(), ColormapError> {
    let (rows, cols) = raster.shape();
    let too_large = || ColormapError::TooLarge { rows, cols };
    let width = u32::try_from(cols).map_err(|_| too_large())?;
    let height = u32::try_from(rows).map_err(|_| too_large())?;

    let rgba = raster_to_rgba(raster, params);
    PngEncoder::new(writer).write_image(&rgba, width, height, ColorType::Rgba8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldscan_core::MISSING;

    #[test]
    fn raster_to_rgba_basic() {
        let r = Raster::from_vec(vec![0.0, 0.5, 1.0, MISSING], 2, 2).unwrap();

        let params = ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 1.0);
        let rgba = raster_to_rgba(&r, &params);

        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[128, 128, 128, 255]);
        assert_eq!(&rgba[8..12], &[255, 255, 255, 255]);
        // missing -> transparent
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn default_params_center_on_zero() {
        let r = Raster::from_vec(vec![-1.0, 0.0, 1.0], 1, 3).unwrap();
        let rgba = raster_to_rgba(&r, &ColormapParams::default());
        assert_eq!(&rgba[0..4], &[165, 0, 38, 255]);
        assert_eq!(&rgba[4..8], &[255, 255, 191, 255]);
        assert_eq!(&rgba[8..12], &[0, 104, 55, 255]);
    }

    #[test]
    fn auto_params_range() {
        let r = Raster::from_vec(vec![10.0, 50.0, 100.0], 1, 3).unwrap();
        let params = auto_params(&r, ColorScheme::Water);
        assert!((params.min - 10.0).abs() < f64::EPSILON);
        assert!((params.max - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn auto_params_all_missing() {
        let r = Raster::missing(1, 2);
        let params = auto_params(&r, ColorScheme::RdYlGn);
        assert_eq!((params.min, params.max), (0.0, 1.0));
    }

    #[test]
    fn auto_params_constant_raster() {
        let r = Raster::filled(2, 2, 42.0);
        let params = auto_params(&r, ColorScheme::RdYlGn);
        assert_eq!((params.min, params.max), (42.0, 43.0));
    }

    #[test]
    fn png_signature_and_file() {
        let r = Raster::from_vec(vec![-0.5, 0.2, MISSING, 0.9, 0.0, 0.4], 2, 3).unwrap();
        let bytes = encode_png(&r, &ColormapParams::default()).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ndvi.png");
        write_png(&r, &ColormapParams::default(), &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }
}
