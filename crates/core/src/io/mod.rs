//! Reading and writing single-band GeoTIFF files

mod native;

pub use native::{read_band, read_band_from_buffer, write_band, write_band_to_buffer};
