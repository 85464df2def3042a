//! One analysis run, from band files to summary
//!
//! [`AnalysisSession`] owns everything a run produces. Nothing is cached
//! between sessions; dropping a session releases its arrays.

use crate::imagery::{
    compute_all, summarize_with, AnalysisSummary, ClassificationThresholds, EngineOptions,
    IndexSet, SessionMetadata,
};
use fieldscan_core::stack::{load_band_stack_with, BandStack, LoaderOptions};
use fieldscan_core::Result;
use std::path::Path;

#[derive(Debug)]
pub struct AnalysisSession {
    stack: BandStack,
    options: EngineOptions,
    thresholds: ClassificationThresholds,
    indices: Option<IndexSet>,
    summary: Option<AnalysisSummary>,
}

impl AnalysisSession {
    /// Start a session over an already-loaded stack.
    pub fn new(stack: BandStack, options: EngineOptions) -> Self {
        Self {
            stack,
            options,
            thresholds: ClassificationThresholds::default(),
            indices: None,
            summary: None,
        }
    }

    /// Load the band files in `dir` and start a session over them.
    pub fn open(dir: &Path, loader: &LoaderOptions, options: EngineOptions) -> Result<Self> {
        let stack = load_band_stack_with(dir, loader)?;
        Ok(Self::new(stack, options))
    }

    pub fn with_thresholds(mut self, thresholds: ClassificationThresholds) -> Self {
        self.thresholds = thresholds;
        self.summary = None;
        self
    }

    pub fn stack(&self) -> &BandStack {
        &self.stack
    }

    /// Indices, if [`AnalysisSession::compute_indices`] has run.
    pub fn indices(&self) -> Option<&IndexSet> {
        self.indices.as_ref()
    }

    pub fn summary(&self) -> Option<&AnalysisSummary> {
        self.summary.as_ref()
    }

    /// Compute the full catalog once; later calls return the same set.
    pub fn compute_indices(&mut self) -> Result<&IndexSet> {
        let indices = self.take_or_compute()?;
        Ok(&*self.indices.insert(indices))
    }

    /// Build the summary, computing indices first if needed.
    ///
    /// A summary failure leaves the computed indices in place.
    pub fn summarize(&mut self, metadata: SessionMetadata) -> Result<&AnalysisSummary> {
        let indices = self.take_or_compute()?;
        let result = summarize_with(&indices, metadata, &self.thresholds);
        self.indices = Some(indices);
        Ok(&*self.summary.insert(result?))
    }

    fn take_or_compute(&mut self) -> Result<IndexSet> {
        match self.indices.take() {
            Some(indices) => Ok(indices),
            None => compute_all(&self.stack, &self.options),
        }
    }

    /// Give back the stack and whatever was computed.
    pub fn into_parts(self) -> (BandStack, Option<IndexSet>, Option<AnalysisSummary>) {
        (self.stack, self.indices, self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::{Assessment, SpectralIndex};
    use fieldscan_core::{Error, Raster};

    fn stack(values: [f64; 8]) -> BandStack {
        BandStack::from_rasters(values.iter().map(|&v| Raster::filled(4, 4, v)).collect())
            .unwrap()
    }

    #[test]
    fn test_session_flow() {
        let mut v = [0.3; 8];
        v[7] = 0.8;
        v[3] = 0.2;
        let mut session = AnalysisSession::new(stack(v), EngineOptions::default());
        assert!(session.indices().is_none());

        let summary = session.summarize(SessionMetadata::default()).unwrap();
        let ndvi = summary.mean(SpectralIndex::NDVI).unwrap();
        assert!((ndvi - 0.6).abs() < 1e-10);
        assert_eq!(summary.assessment(SpectralIndex::NDVI), Some(Assessment::Good));

        assert_eq!(session.indices().unwrap().len(), 13);
        assert!(session.summary().is_some());
    }

    #[test]
    fn test_insufficient_bands_keeps_stack() {
        let seven = BandStack::from_rasters(vec![Raster::filled(2, 2, 0.1); 7]).unwrap();
        let mut session = AnalysisSession::new(seven, EngineOptions::default());

        assert!(matches!(
            session.compute_indices(),
            Err(Error::InsufficientBands { .. })
        ));
        assert_eq!(session.stack().len(), 7);
        assert!(session.indices().is_none());
    }

    #[test]
    fn test_custom_thresholds() {
        let mut session = AnalysisSession::new(stack([0.5; 8]), EngineOptions::default())
            .with_thresholds(ClassificationThresholds {
                ndvi_good: -0.5,
                ..Default::default()
            });
        let summary = session.summarize(SessionMetadata::default()).unwrap();
        assert_eq!(summary.assessment(SpectralIndex::NDVI), Some(Assessment::Good));
    }
}
