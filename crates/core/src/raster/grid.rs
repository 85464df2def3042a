//! Single-band raster grid

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use serde::Serialize;

/// Marker stored in a cell whose value is unknown.
///
/// NaN propagates through every arithmetic operation, so a missing input
/// pixel yields a missing output pixel without any special casing.
pub const MISSING: f64 = f64::NAN;

/// Whether a cell value is the missing-value marker.
#[inline]
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}

/// A 2D grid of `f64` cell values stored in row-major order.
///
/// Georeferencing is deliberately absent: bands in a stack are assumed to
/// be co-registered and only pixel values take part in the analysis.
///
/// # Example
///
/// ```ignore
/// use fieldscan_core::Raster;
///
/// let mut band = Raster::filled(100, 100, 0.25);
/// band.set(10, 20, 0.8)?;
/// let stats = band.statistics();
/// ```
#[derive(Debug, Clone)]
pub struct Raster {
    data: Array2<f64>,
}

impl Raster {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Create a raster where every cell is missing
    pub fn missing(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, MISSING)
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self { data: array })
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> f64 {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// Whether the cell at (row, col) holds the missing marker
    pub fn is_missing_at(&self, row: usize, col: usize) -> Result<bool> {
        Ok(is_missing(self.get(row, col)?))
    }

    /// Replace every non-finite value (±inf, NaN) with [`MISSING`].
    ///
    /// Returns the number of cells that were not finite.
    pub fn replace_non_finite(&mut self) -> usize {
        let mut replaced = 0;
        for v in self.data.iter_mut() {
            if !v.is_finite() {
                *v = MISSING;
                replaced += 1;
            }
        }
        replaced
    }

    /// Replace cells equal to `nodata` with [`MISSING`], returning the count.
    pub fn mask_value(&mut self, nodata: f64) -> usize {
        let mut masked = 0;
        for v in self.data.iter_mut() {
            if *v == nodata {
                *v = MISSING;
                masked += 1;
            }
        }
        masked
    }

    /// Bit-exact equality, treating two missing cells at the same position as equal.
    pub fn bitwise_eq(&self, other: &Raster) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Min, max and mean over the non-missing cells.
    pub fn statistics(&self) -> RasterStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if is_missing(value) {
                continue;
            }
            min = min.min(value);
            max = max.max(value);
            sum += value;
            count += 1;
        }

        if count == 0 {
            return RasterStatistics {
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                valid_count: 0,
                missing_count: self.len(),
            };
        }

        RasterStatistics {
            min,
            max,
            mean: sum / count as f64,
            valid_count: count,
            missing_count: self.len() - count,
        }
    }
}

/// Statistics over the non-missing cells of a raster.
///
/// When no cell is valid, `min`, `max` and `mean` are NaN so that callers
/// report "undefined" instead of a fabricated number.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RasterStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid_count: usize,
    pub missing_count: usize,
}

impl RasterStatistics {
    /// Percentage (0-100) of cells that hold a valid value.
    pub fn valid_percentage(&self) -> f64 {
        let total = self.valid_count + self.missing_count;
        if total == 0 {
            return 0.0;
        }
        self.valid_count as f64 * 100.0 / total as f64
    }
}
