//! Spectral index catalog and formulas
//!
//! Thirteen closed-form indices used for field assessment. Each formula
//! works on whole rasters, pixel by pixel. A pixel whose inputs include a
//! missing value, whose denominator is zero, or whose result is not finite
//! becomes missing in the output; data content never produces an error.

use crate::maybe_rayon::*;
use fieldscan_core::raster::{is_missing, Raster, MISSING};
use fieldscan_core::{Error, Result};
use ndarray::Array2;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The closed catalog of indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SpectralIndex {
    /// Normalized Difference Vegetation Index
    NDVI,
    /// Soil Adjusted Vegetation Index
    SAVI,
    /// Visible Atmospherically Resistant Index
    VARI,
    /// Modified Normalized Difference Water Index
    MNDWI,
    /// Normalized Difference Moisture Index
    NDMI,
    /// Chlorophyll/Moisture Ratio
    CMR,
    /// Floating Mat Recognition
    FMR,
    /// Enhanced Vegetation Index
    EVI,
    /// Normalized Burn Ratio
    NBR,
    /// Green Chlorophyll Index
    GCI,
    /// Transformed Chlorophyll Absorption in Reflectance Index
    TCARI,
    /// Burn Area Index
    BAI,
    /// Optimized Soil-Adjusted Vegetation Index
    OSAVI,
}

impl SpectralIndex {
    /// Every index, in catalog order.
    pub const ALL: [SpectralIndex; 13] = [
        Self::NDVI,
        Self::SAVI,
        Self::VARI,
        Self::MNDWI,
        Self::NDMI,
        Self::CMR,
        Self::FMR,
        Self::EVI,
        Self::NBR,
        Self::GCI,
        Self::TCARI,
        Self::BAI,
        Self::OSAVI,
    ];

    /// Stable short identifier, e.g. `NDVI`.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::NDVI => "NDVI",
            Self::SAVI => "SAVI",
            Self::VARI => "VARI",
            Self::MNDWI => "MNDWI",
            Self::NDMI => "NDMI",
            Self::CMR => "CMR",
            Self::FMR => "FMR",
            Self::EVI => "EVI",
            Self::NBR => "NBR",
            Self::GCI => "GCI",
            Self::TCARI => "TCARI",
            Self::BAI => "BAI",
            Self::OSAVI => "OSAVI",
        }
    }

    /// Display name with the expanded acronym.
    pub fn full_name(&self) -> &'static str {
        match self {
            Self::NDVI => "NDVI (Normalized Difference Vegetation Index)",
            Self::SAVI => "SAVI (Soil Adjusted Vegetation Index)",
            Self::VARI => "VARI (Visible Atmospherically Resistant Index)",
            Self::MNDWI => "MNDWI (Modified Normalized Difference Water Index)",
            Self::NDMI => "NDMI (Normalized Difference Moisture Index)",
            Self::CMR => "CMR (Chlorophyll/Moisture Ratio)",
            Self::FMR => "FMR (Floating Mat Recognition)",
            Self::EVI => "EVI (Enhanced Vegetation Index)",
            Self::NBR => "NBR (Normalized Burn Ratio)",
            Self::GCI => "GCI (Green Chlorophyll Index)",
            Self::TCARI => "TCARI (Transformed Chlorophyll Absorption in Reflectance Index)",
            Self::BAI => "BAI (Burn Area Index)",
            Self::OSAVI => "OSAVI (Optimized Soil-Adjusted Vegetation Index)",
        }
    }

    /// Stack slots the formula reads, in argument order.
    pub fn slots(&self) -> &'static [usize] {
        match self {
            Self::NDVI | Self::NDMI | Self::SAVI | Self::OSAVI => &[7, 3],
            Self::VARI => &[2, 3, 1],
            Self::MNDWI => &[1, 3],
            Self::CMR | Self::FMR => &[7, 5],
            Self::EVI => &[7, 3, 1],
            Self::NBR => &[7, 6],
            Self::GCI => &[7, 1],
            Self::TCARI => &[3, 1, 2],
            Self::BAI => &[2, 3],
        }
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for SpectralIndex {
    type Err = Error;

    /// Accepts the short name (any case) or the exact full name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|idx| idx.short_name().eq_ignore_ascii_case(s) || idx.full_name() == s)
            .ok_or_else(|| Error::InvalidParameter {
                name: "index",
                value: s.to_string(),
                reason: "unknown spectral index".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameters for SAVI
#[derive(Debug, Clone, Serialize)]
pub struct SaviParams {
    /// Soil brightness correction factor. Default: 0.5
    pub l_factor: f64,
}

impl Default for SaviParams {
    fn default() -> Self {
        Self { l_factor: 0.5 }
    }
}

/// Parameters for OSAVI
#[derive(Debug, Clone, Serialize)]
pub struct OsaviParams {
    /// Soil adjustment added to the denominator. Default: 0.16
    pub y_factor: f64,
}

impl Default for OsaviParams {
    fn default() -> Self {
        Self { y_factor: 0.16 }
    }
}

/// Parameters for EVI
#[derive(Debug, Clone, Serialize)]
pub struct EviParams {
    /// Gain factor (default: 2.5)
    pub g: f64,
    /// Aerosol coefficient for red band (default: 6.0)
    pub c1: f64,
    /// Aerosol coefficient for blue band (default: 7.5)
    pub c2: f64,
    /// Canopy background adjustment (default: 1.0)
    pub l: f64,
}

impl Default for EviParams {
    fn default() -> Self {
        Self {
            g: 2.5,
            c1: 6.0,
            c2: 7.5,
            l: 1.0,
        }
    }
}

/// Parameters for TCARI
#[derive(Debug, Clone, Serialize)]
pub struct TcariParams {
    /// Weight of the green-referenced ratio term. Default: 0.2
    pub weight: f64,
}

impl Default for TcariParams {
    fn default() -> Self {
        Self { weight: 0.2 }
    }
}

/// Parameters for BAI
#[derive(Debug, Clone, Serialize)]
pub struct BaiParams {
    /// Red reflectance of the charcoal reference point. Default: 0.1
    pub red_ref: f64,
    /// NIR reflectance of the charcoal reference point. Default: 0.06
    pub nir_ref: f64,
}

impl Default for BaiParams {
    fn default() -> Self {
        Self {
            red_ref: 0.1,
            nir_ref: 0.06,
        }
    }
}

/// All formula constants of the catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexParams {
    pub savi: SaviParams,
    pub osavi: OsaviParams,
    pub evi: EviParams,
    pub tcari: TcariParams,
    pub bai: BaiParams,
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Normalized difference `(a - b) / (a + b)`.
///
/// Result is in [-1, 1] for non-negative inputs. Pixels where `a + b` is
/// zero or either input is missing are set to missing.
pub fn normalized_difference(band_a: &Raster, band_b: &Raster) -> Result<Raster> {
    pixelwise([band_a, band_b], |[a, b]| ratio(a - b, a + b))
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Water/clouds: below 0
pub fn ndvi(nir: &Raster, red: &Raster) -> Result<Raster> {
    normalized_difference(nir, red)
}

/// Normalized Difference Moisture Index, `(NIR - SWIR) / (NIR + SWIR)`.
pub fn ndmi(nir: &Raster, swir: &Raster) -> Result<Raster> {
    normalized_difference(nir, swir)
}

/// Modified Normalized Difference Water Index, `(Green - SWIR) / (Green + SWIR)`.
pub fn mndwi(green: &Raster, swir: &Raster) -> Result<Raster> {
    normalized_difference(green, swir)
}

/// Normalized Burn Ratio, `(NIR - SWIR) / (NIR + SWIR)`. Low values indicate burned areas.
pub fn nbr(nir: &Raster, swir: &Raster) -> Result<Raster> {
    normalized_difference(nir, swir)
}

/// Soil Adjusted Vegetation Index (Huete, 1988)
///
/// `SAVI = ((NIR - Red) / (NIR + Red + L)) * (1 + L)`
pub fn savi(nir: &Raster, red: &Raster, params: &SaviParams) -> Result<Raster> {
    let l = params.l_factor;
    pixelwise([nir, red], |[n, r]| ratio(n - r, n + r + l) * (1.0 + l))
}

/// Optimized Soil-Adjusted Vegetation Index
///
/// `OSAVI = (NIR - Red) / (NIR + Red + Y)`
pub fn osavi(nir: &Raster, red: &Raster, params: &OsaviParams) -> Result<Raster> {
    let y = params.y_factor;
    pixelwise([nir, red], |[n, r]| ratio(n - r, n + r + y))
}

/// Visible Atmospherically Resistant Index
///
/// `VARI = (Green - Red) / (Green + Red - Blue)`
pub fn vari(green: &Raster, red: &Raster, blue: &Raster) -> Result<Raster> {
    pixelwise([green, red, blue], |[g, r, b]| ratio(g - r, g + r - b))
}

/// Enhanced Vegetation Index (Huete et al., 2002)
///
/// `EVI = G * (NIR - Red) / (NIR + C1 * Red - C2 * Blue + L)`
pub fn evi(nir: &Raster, red: &Raster, blue: &Raster, params: &EviParams) -> Result<Raster> {
    pixelwise([nir, red, blue], |[n, r, b]| {
        params.g * ratio(n - r, n + params.c1 * r - params.c2 * b + params.l)
    })
}

/// Plain band ratio `a / b`.
pub fn simple_ratio(numerator: &Raster, denominator: &Raster) -> Result<Raster> {
    pixelwise([numerator, denominator], |[a, b]| ratio(a, b))
}

/// Green Chlorophyll Index, `(NIR / Green) - 1`. Not bounded to [-1, 1].
pub fn gci(nir: &Raster, green: &Raster) -> Result<Raster> {
    pixelwise([nir, green], |[n, g]| ratio(n, g) - 1.0)
}

/// Transformed Chlorophyll Absorption in Reflectance Index
///
/// `TCARI = 3 * ((RE - Red) - w * (RE - Green) * (RE / Red))`
pub fn tcari(
    red_edge: &Raster,
    red: &Raster,
    green: &Raster,
    params: &TcariParams,
) -> Result<Raster> {
    pixelwise([red_edge, red, green], |[re, r, g]| {
        3.0 * ((re - r) - params.weight * (re - g) * ratio(re, r))
    })
}

/// Burn Area Index
///
/// `BAI = 1 / ((red_ref - Red)^2 + (nir_ref - NIR)^2)`
pub fn bai(red: &Raster, nir: &Raster, params: &BaiParams) -> Result<Raster> {
    pixelwise([red, nir], |[r, n]| {
        ratio(1.0, (params.red_ref - r).powi(2) + (params.nir_ref - n).powi(2))
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `num / den`, or missing when the denominator is exactly zero.
#[inline]
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        MISSING
    } else {
        num / den
    }
}

/// Evaluate `f` at every pixel of `N` same-shaped rasters, row-parallel.
///
/// Missing inputs and non-finite results leave the output pixel missing.
fn pixelwise<const N: usize, F>(bands: [&Raster; N], f: F) -> Result<Raster>
where
    F: Fn([f64; N]) -> f64 + Sync + Send,
{
    let first = bands[0];
    for band in &bands[1..] {
        check_dimensions(first, band)?;
    }

    let (rows, cols) = first.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![MISSING; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let mut values = [0.0; N];
                for (v, band) in values.iter_mut().zip(bands.iter()) {
                    *v = unsafe { band.get_unchecked(row, col) };
                }
                if values.iter().any(|&v| is_missing(v)) {
                    continue;
                }
                let value = f(values);
                if value.is_finite() {
                    *out = value;
                }
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(Raster::from_array(array))
}

fn check_dimensions(a: &Raster, b: &Raster) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
