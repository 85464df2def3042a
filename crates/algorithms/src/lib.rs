//! # fieldscan algorithms
//!
//! Spectral analysis of a co-registered band stack for field assessment.
//!
//! ## Modules
//!
//! - **imagery**: band normalization, the spectral index catalog, the index
//!   engine, summary statistics and interpretation guides
//! - **session**: `AnalysisSession`, one load → compute → summarize run
//! - **insight**: best-effort hand-off of the summary to a text-generation service

mod maybe_rayon;

pub mod imagery;
pub mod insight;
pub mod session;

pub use session::AnalysisSession;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        compute_all, compute_indices, interpretation, normalize_band, normalize_stack,
        summarize, AnalysisSummary, Assessment, EngineOptions, IndexOutcome, IndexSet,
        SessionMetadata, SpectralIndex,
    };
    pub use crate::insight::{request_insights, Insight, InsightProvider};
    pub use crate::session::AnalysisSession;
    pub use fieldscan_core::prelude::*;
}
