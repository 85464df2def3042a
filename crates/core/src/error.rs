//! Error types for fieldscan

use thiserror::Error;

/// Main error type for fieldscan operations.
///
/// Only structural failures are errors. Numeric anomalies inside a band
/// (division by zero, invalid operands) become missing pixels instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No band files found: {0}")]
    EmptyInput(String),

    #[error("Insufficient bands: {required} required, {available} available")]
    InsufficientBands { required: usize, available: usize },

    #[error("Missing required index: {0}")]
    MissingIndex(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for fieldscan operations
pub type Result<T> = std::result::Result<T, Error>;
