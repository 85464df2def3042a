//! Band stacks and the band loader
//!
//! A [`BandStack`] is an ordered set of co-registered single-band rasters.
//! Slot `i` is the `i`-th band file in lexicographic file-name order, which
//! for the usual `..._B01.tiff`, `..._B02.tiff` naming matches the spectral
//! order the index catalog expects.

use crate::error::{Error, Result};
use crate::io::read_band;
use crate::raster::{is_missing, Raster};
use ndarray::{Array3, ArrayView2, Axis};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which files in a directory count as band files.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Accepted file extensions, compared case-insensitively (without the dot).
    pub extensions: Vec<String>,
    /// Character that introduces the band number in the file stem, e.g. `B` in `T31_B04`.
    pub band_token: char,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["tiff".to_string(), "tif".to_string()],
            band_token: 'B',
        }
    }
}

impl LoaderOptions {
    /// Whether `file_name` looks like a band file.
    ///
    /// The extension must be one of [`LoaderOptions::extensions`] and the stem
    /// must contain the band token immediately followed by an ASCII digit.
    pub fn matches(&self, file_name: &str) -> bool {
        let Some((stem, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        if !self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            return false;
        }
        let mut chars = stem.chars().peekable();
        while let Some(c) = chars.next() {
            if c == self.band_token && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
                return true;
            }
        }
        false
    }

    fn describe(&self) -> String {
        format!("*{}<digit>*.{{{}}}", self.band_token, self.extensions.join(","))
    }
}

/// One band of a stack together with where it came from.
#[derive(Debug, Clone)]
pub struct Band {
    pub name: String,
    pub raster: Raster,
}

/// Ordered, shape-consistent collection of bands.
///
/// Immutable after construction: stages derive new values from it instead
/// of editing it in place.
#[derive(Debug, Clone)]
pub struct BandStack {
    bands: Vec<Band>,
}

impl BandStack {
    /// Build a stack, checking that every band has the shape of the first.
    pub fn new(bands: Vec<Band>) -> Result<Self> {
        let Some(first) = bands.first() else {
            return Err(Error::EmptyInput("no bands supplied".to_string()));
        };
        let (er, ec) = first.raster.shape();
        for band in &bands[1..] {
            let (ar, ac) = band.raster.shape();
            if (ar, ac) != (er, ec) {
                return Err(Error::SizeMismatch { er, ec, ar, ac });
            }
        }
        Ok(Self { bands })
    }

    /// Build a stack from unnamed rasters; bands are named `band_<slot>`.
    pub fn from_rasters(rasters: Vec<Raster>) -> Result<Self> {
        let bands = rasters
            .into_iter()
            .enumerate()
            .map(|(slot, raster)| Band {
                name: format!("band_{}", slot),
                raster,
            })
            .collect();
        Self::new(bands)
    }

    /// Number of bands (slots)
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Shared (rows, cols) of every band
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].raster.shape()
    }

    /// Raster at `slot`, if the stack has that many bands
    pub fn band(&self, slot: usize) -> Option<&Raster> {
        self.bands.get(slot).map(|b| &b.raster)
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }

    /// Fail with [`Error::InsufficientBands`] unless at least `required` slots exist.
    pub fn require(&self, required: usize) -> Result<()> {
        if self.len() < required {
            return Err(Error::InsufficientBands {
                required,
                available: self.len(),
            });
        }
        Ok(())
    }

    /// Derive a new stack by transforming each band, keeping names.
    pub fn map_bands<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&Raster) -> Raster,
    {
        let bands = self
            .bands
            .iter()
            .map(|b| Band {
                name: b.name.clone(),
                raster: f(&b.raster),
            })
            .collect();
        Self::new(bands)
    }

    /// Percentage (0-100) of pixel positions where no band is missing.
    pub fn valid_pixel_percentage(&self) -> f64 {
        let (rows, cols) = self.shape();
        let total = rows * cols;
        if total == 0 {
            return 0.0;
        }
        let mut valid = 0usize;
        for row in 0..rows {
            for col in 0..cols {
                if self
                    .bands
                    .iter()
                    .all(|b| !is_missing(b.raster.data()[(row, col)]))
                {
                    valid += 1;
                }
            }
        }
        valid as f64 * 100.0 / total as f64
    }

    /// Stack all bands into one `band × row × column` array.
    pub fn to_array3(&self) -> Result<Array3<f64>> {
        let views: Vec<ArrayView2<'_, f64>> = self.bands.iter().map(|b| b.raster.view()).collect();
        ndarray::stack(Axis(0), &views).map_err(|e| Error::Other(e.to_string()))
    }
}

/// List band files in `dir` in slot order.
///
/// Returns [`Error::EmptyInput`] when nothing matches. Subdirectories are
/// not searched.
pub fn discover_band_files(dir: &Path, options: &LoaderOptions) -> Result<Vec<PathBuf>> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if options.matches(&name) {
            files.push((name, entry.path()));
        } else {
            debug!("Skipping non-band file {}", name);
        }
    }

    if files.is_empty() {
        return Err(Error::EmptyInput(format!(
            "{} (expected files matching {})",
            dir.display(),
            options.describe()
        )));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Load every band file in `dir` with default [`LoaderOptions`].
pub fn load_band_stack(dir: &Path) -> Result<BandStack> {
    load_band_stack_with(dir, &LoaderOptions::default())
}

/// Load every band file in `dir` into a [`BandStack`].
///
/// Non-finite pixels are replaced by the missing marker before stacking.
/// Source files are only read.
pub fn load_band_stack_with(dir: &Path, options: &LoaderOptions) -> Result<BandStack> {
    let files = discover_band_files(dir, options)?;

    let mut bands = Vec::with_capacity(files.len());
    for (slot, path) in files.iter().enumerate() {
        let mut raster = read_band(path)?;
        let replaced = raster.replace_non_finite();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if replaced > 0 {
            warn!("{}: {} non-finite pixels marked missing", name, replaced);
        }
        debug!(
            "slot {} <- {} ({} x {})",
            slot,
            name,
            raster.cols(),
            raster.rows()
        );
        bands.push(Band { name, raster });
    }

    let stack = BandStack::new(bands)?;
    let (rows, cols) = stack.shape();
    info!("Loaded {} bands ({} x {})", stack.len(), cols, rows);
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::write_band;

    fn write(dir: &Path, name: &str, raster: &Raster) {
        write_band(raster, dir.join(name)).unwrap();
    }

    #[test]
    fn test_matches_band_names() {
        let opts = LoaderOptions::default();
        assert!(opts.matches("T31UFQ_20240601_B04.tiff"));
        assert!(opts.matches("B8A.tif"));
        assert!(opts.matches("scene_B12.TIFF"));
        assert!(!opts.matches("T31UFQ_TCI.tiff"));
        assert!(!opts.matches("B04.jp2"));
        assert!(!opts.matches("BAND.tiff"));
        assert!(!opts.matches("README"));
    }

    #[test]
    fn test_empty_directory_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let err = load_band_stack(dir.path()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)), "got {:?}", err);
    }

    #[test]
    fn test_bands_sorted_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x_B03.tiff", &Raster::filled(2, 2, 3.0));
        write(dir.path(), "x_B01.tiff", &Raster::filled(2, 2, 1.0));
        write(dir.path(), "x_B02.tiff", &Raster::filled(2, 2, 2.0));

        let stack = load_band_stack(dir.path()).unwrap();
        let names: Vec<&str> = stack.names().collect();
        assert_eq!(names, vec!["x_B01.tiff", "x_B02.tiff", "x_B03.tiff"]);
        assert_eq!(stack.band(0).unwrap().get(0, 0).unwrap(), 1.0);
        assert_eq!(stack.band(2).unwrap().get(1, 1).unwrap(), 3.0);
    }

    #[test]
    fn test_infinity_becomes_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut band = Raster::filled(2, 2, 0.4);
        band.set(0, 0, f64::INFINITY).unwrap();
        band.set(1, 1, f64::NEG_INFINITY).unwrap();
        write(dir.path(), "B01.tiff", &band);

        let stack = load_band_stack(dir.path()).unwrap();
        let loaded = stack.band(0).unwrap();
        assert!(loaded.is_missing_at(0, 0).unwrap());
        assert!(loaded.is_missing_at(1, 1).unwrap());
        assert!((loaded.get(0, 1).unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "B01.tiff", &Raster::filled(2, 2, 1.0));
        write(dir.path(), "B02.tiff", &Raster::filled(3, 2, 1.0));

        let err = load_band_stack(dir.path()).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }), "got {:?}", err);
    }

    #[test]
    fn test_require() {
        let stack = BandStack::from_rasters(vec![Raster::filled(2, 2, 1.0); 7]).unwrap();
        match stack.require(8) {
            Err(Error::InsufficientBands {
                required,
                available,
            }) => {
                assert_eq!(required, 8);
                assert_eq!(available, 7);
            }
            other => panic!("expected InsufficientBands, got {:?}", other),
        }
        assert!(stack.require(7).is_ok());
    }

    #[test]
    fn test_empty_stack_rejected() {
        assert!(matches!(
            BandStack::new(Vec::new()),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn test_valid_pixel_percentage() {
        let mut a = Raster::filled(2, 2, 1.0);
        a.set(0, 0, f64::NAN).unwrap();
        let mut b = Raster::filled(2, 2, 1.0);
        b.set(0, 0, f64::NAN).unwrap();
        b.set(1, 1, f64::NAN).unwrap();

        let stack = BandStack::from_rasters(vec![a, b]).unwrap();
        assert!((stack.valid_pixel_percentage() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_to_array3() {
        let stack = BandStack::from_rasters(vec![
            Raster::filled(2, 3, 1.0),
            Raster::filled(2, 3, 2.0),
        ])
        .unwrap();
        let cube = stack.to_array3().unwrap();
        assert_eq!(cube.dim(), (2, 2, 3));
        assert_eq!(cube[[1, 1, 2]], 2.0);
    }
}
