//! # fieldscan colormap
//!
//! Color scales for index rasters and PNG output.
//!
//! [`raster_to_rgba`] turns a `Raster` into an RGBA buffer; [`write_png`]
//! and [`encode_png`] wrap that in a PNG. Missing pixels come out transparent.
//!
//! ## Usage
//!
//! ```ignore
//! use fieldscan_colormap::{write_png, ColormapParams};
//!
//! write_png(&ndvi, &ColormapParams::default(), "ndvi.png")?;
//! ```

mod render;
mod scheme;

pub use render::{
    auto_params, encode_png, raster_to_rgba, write_png, ColormapError, ColormapParams,
};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
