//! Raster data structures and operations

mod grid;

pub use grid::{is_missing, Raster, RasterStatistics, MISSING};
