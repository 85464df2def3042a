//! Native single-band GeoTIFF reading/writing
//!
//! Uses the `tiff` crate. Only pixel values are read; georeferencing tags
//! are ignored because every band of a stack is assumed co-registered.

use crate::error::{Error, Result};
use crate::raster::Raster;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// TIFF tag written by GDAL to carry the nodata value as ASCII text.
const GDAL_NODATA_TAG: u16 = 42113;

/// Read the first band of a (Geo)TIFF file.
///
/// Pixels equal to the file's `GDAL_NODATA` value, if the tag is present,
/// are returned as missing. Non-finite values are returned as stored.
pub fn read_band<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let file = File::open(path.as_ref())?;
    decode_band(BufReader::new(file))
}

/// Same as [`read_band`] but decodes from an in-memory buffer.
pub fn read_band_from_buffer(data: &[u8]) -> Result<Raster> {
    decode_band(Cursor::new(data))
}

macro_rules! to_f64_vec {
    ($buf:expr) => {
        $buf.into_iter().map(|v| v as f64).collect::<Vec<f64>>()
    };
}

fn decode_band<R: Read + Seek>(reader: R) -> Result<Raster> {
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let nodata = read_nodata(&mut decoder);

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    #[allow(unreachable_patterns)]
    let samples: Vec<f64> = match result {
        DecodingResult::U8(buf) => to_f64_vec!(buf),
        DecodingResult::U16(buf) => to_f64_vec!(buf),
        DecodingResult::U32(buf) => to_f64_vec!(buf),
        DecodingResult::U64(buf) => to_f64_vec!(buf),
        DecodingResult::I8(buf) => to_f64_vec!(buf),
        DecodingResult::I16(buf) => to_f64_vec!(buf),
        DecodingResult::I32(buf) => to_f64_vec!(buf),
        DecodingResult::I64(buf) => to_f64_vec!(buf),
        DecodingResult::F32(buf) => to_f64_vec!(buf),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    // Interleaved multi-sample images keep only the first sample.
    let pixels = rows * cols;
    if samples.len() < pixels || samples.len() % pixels != 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }
    let stride = samples.len() / pixels;
    let data = if stride == 1 {
        samples
    } else {
        samples.into_iter().step_by(stride).collect()
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(nd) = nodata {
        raster.mask_value(nd);
    }
    Ok(raster)
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder
        .get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA_TAG))
        .ok()?;
    text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse::<f64>()
        .ok()
}

/// Write a raster as a single-band 32-bit float TIFF.
pub fn write_band<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_band(raster, file)
}

/// Write a raster to an in-memory single-band 32-bit float TIFF.
pub fn write_band_to_buffer(raster: &Raster) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_band(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_band<W: Write + Seek>(raster: &Raster, writer: W) -> Result<()> {
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster.data().iter().map(|&v| v as f32).collect();

    encoder
        .write_image::<Gray32Float>(cols as u32, rows as u32, &data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::MISSING;

    #[test]
    fn test_buffer_roundtrip() {
        let mut band = Raster::filled(4, 3, 0.25);
        band.set(1, 2, 0.75).unwrap();
        band.set(3, 0, MISSING).unwrap();

        let bytes = write_band_to_buffer(&band).unwrap();
        let back = read_band_from_buffer(&bytes).unwrap();

        assert_eq!(back.shape(), (4, 3));
        assert_eq!(back.get(0, 0).unwrap(), 0.25);
        assert_eq!(back.get(1, 2).unwrap(), 0.75);
        assert!(back.is_missing_at(3, 0).unwrap());
    }

    #[test]
    fn test_file_roundtrip_keeps_infinity() {
        let mut band = Raster::filled(2, 2, 1.5);
        band.set(0, 1, f64::INFINITY).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("B01.tiff");
        write_band(&band, &path).unwrap();

        let back = read_band(&path).unwrap();
        assert_eq!(back.get(0, 0).unwrap(), 1.5);
        assert!(back.get(0, 1).unwrap().is_infinite());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(read_band_from_buffer(b"definitely not a tiff").is_err());
    }
}
