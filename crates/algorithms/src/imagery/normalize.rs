//! Per-band min/max rescaling to [0, 1]

use crate::maybe_rayon::*;
use fieldscan_core::raster::{Raster, MISSING};
use fieldscan_core::stack::{Band, BandStack};
use fieldscan_core::Result;

/// Rescale a band to [0, 1] using its own finite min and max.
///
/// `(v - min) / (max - min)`. Non-finite cells do not count toward the range
/// and come out missing. A band with no dynamic range (`max == min`, or no
/// finite cell at all) is returned unchanged.
pub fn normalize_band(band: &Raster) -> Raster {
    let Some((min, max)) = finite_range(band) else {
        return band.clone();
    };
    if max <= min {
        return band.clone();
    }

    let range = max - min;
    let mut out = band.clone();
    out.data_mut().mapv_inplace(|v| {
        if v.is_finite() {
            (v - min) / range
        } else {
            MISSING
        }
    });
    out
}

fn finite_range(band: &Raster) -> Option<(f64, f64)> {
    band.data()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Normalize every band of a stack independently, in parallel across bands.
pub fn normalize_stack(stack: &BandStack) -> Result<BandStack> {
    let bands: Vec<Band> = stack
        .bands()
        .to_vec()
        .into_par_iter()
        .map(|band| Band {
            raster: normalize_band(&band.raster),
            name: band.name,
        })
        .collect();
    BandStack::new(bands)
}
