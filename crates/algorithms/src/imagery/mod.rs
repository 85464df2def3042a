//! Imagery analysis algorithms
//!
//! The field-assessment pipeline over a band stack:
//! - Normalize: per-band [0, 1] rescaling
//! - Indices: the 13-entry spectral index catalog and its formulas
//! - Engine: batch evaluation with per-index degradation
//! - Summary: index means, threshold classification and the text report
//! - Interpretation: reading guides for each index

mod engine;
mod indices;
mod interpretation;
mod normalize;
mod summary;

pub use engine::{
    compute_all, compute_index, compute_indices, EngineOptions, IndexOutcome, IndexSet,
    REQUIRED_BANDS,
};
pub use indices::{
    bai, evi, gci, mndwi, nbr, ndmi, ndvi, normalized_difference, osavi, savi, simple_ratio,
    tcari, vari, BaiParams, EviParams, IndexParams, OsaviParams, SaviParams, SpectralIndex,
    TcariParams,
};
pub use interpretation::{interpretation, interpretation_for_name, INTERPRETATION_UNAVAILABLE};
pub use normalize::{normalize_band, normalize_stack};
pub use summary::{
    summarize, summarize_with, AnalysisSummary, Assessment, ClassificationThresholds,
    SessionMetadata, SummaryEntry, SUMMARY_INDICES,
};
