//! # fieldscan core
//!
//! Core types and I/O for fieldscan.
//!
//! This crate provides:
//! - `Raster`: single-band grid with NaN as the missing-value marker
//! - `BandStack`: shape-checked, ordered set of co-registered bands
//! - The band loader that turns a directory of band files into a stack
//! - Native GeoTIFF band I/O

pub mod error;
pub mod io;
pub mod raster;
pub mod stack;

pub use error::{Error, Result};
pub use raster::{is_missing, Raster, RasterStatistics, MISSING};
pub use stack::{load_band_stack, load_band_stack_with, Band, BandStack, LoaderOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{is_missing, Raster, RasterStatistics, MISSING};
    pub use crate::stack::{BandStack, LoaderOptions};
}
