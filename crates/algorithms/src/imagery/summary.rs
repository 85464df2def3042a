//! Field summary: index means, qualitative assessments and the text report

use super::engine::IndexSet;
use super::indices::SpectralIndex;
use fieldscan_core::Result;
use serde::Serialize;
use std::fmt;

/// Indices that feed the summary, in report order.
///
/// NDMI, CMR and FMR are for visualization only.
pub const SUMMARY_INDICES: [SpectralIndex; 10] = [
    SpectralIndex::NDVI,
    SpectralIndex::SAVI,
    SpectralIndex::VARI,
    SpectralIndex::MNDWI,
    SpectralIndex::EVI,
    SpectralIndex::NBR,
    SpectralIndex::GCI,
    SpectralIndex::TCARI,
    SpectralIndex::BAI,
    SpectralIndex::OSAVI,
];

/// Qualitative label attached to an index mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Good,
    Poor,
    High,
    Low,
    Healthy,
    Stressed,
}

impl Assessment {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Poor => "poor",
            Self::High => "high",
            Self::Low => "low",
            Self::Healthy => "healthy",
            Self::Stressed => "stressed",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Threshold table used to classify index means.
///
/// All comparisons are strict, so a mean sitting exactly on a threshold
/// takes the second label. An undefined (NaN) mean also takes the second label.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationThresholds {
    /// NDVI above this is "good" vegetation
    pub ndvi_good: f64,
    /// VARI below this is "high" stress
    pub vari_stress: f64,
    /// MNDWI above this is "high" water presence
    pub mndwi_water: f64,
    /// NBR below this is "high" burn severity
    pub nbr_burn: f64,
    /// GCI above this is "high" chlorophyll
    pub gci_chlorophyll: f64,
    /// BAI above this is "high" burn-area risk
    pub bai_risk: f64,
    /// OSAVI above this is "healthy"
    pub osavi_healthy: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            ndvi_good: 0.3,
            vari_stress: 0.0,
            mndwi_water: 0.0,
            nbr_burn: -0.1,
            gci_chlorophyll: 0.0,
            bai_risk: 0.1,
            osavi_healthy: 0.16,
        }
    }
}

impl ClassificationThresholds {
    /// Classify `mean` for `index`, or `None` for indices without a rule.
    pub fn classify(&self, index: SpectralIndex, mean: f64) -> Option<Assessment> {
        use Assessment::*;
        let pick = |hit: bool, yes: Assessment, no: Assessment| if hit { yes } else { no };
        Some(match index {
            SpectralIndex::NDVI => pick(mean > self.ndvi_good, Good, Poor),
            SpectralIndex::VARI => pick(mean < self.vari_stress, High, Low),
            SpectralIndex::MNDWI => pick(mean > self.mndwi_water, High, Low),
            SpectralIndex::NBR => pick(mean < self.nbr_burn, High, Low),
            SpectralIndex::GCI => pick(mean > self.gci_chlorophyll, High, Low),
            SpectralIndex::BAI => pick(mean > self.bai_risk, High, Low),
            SpectralIndex::OSAVI => pick(mean > self.osavi_healthy, Healthy, Stressed),
            _ => return None,
        })
    }
}

/// Session-level fields supplied by the caller, not derived from the bands.
#[derive(Debug, Clone, Serialize)]
pub struct SessionMetadata {
    /// Free-form moisture descriptor
    pub moisture: String,
    /// Percentage of valid measurements
    pub valid_pixels: f64,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            moisture: "high".to_string(),
            valid_pixels: 48.0,
        }
    }
}

/// Mean of one index and its assessment.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryEntry {
    pub index: SpectralIndex,
    /// NaN when the index has no valid pixel
    pub mean: f64,
    pub assessment: Option<Assessment>,
}

/// Result of one aggregation run. Read-only once built.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    entries: Vec<SummaryEntry>,
    metadata: SessionMetadata,
}

/// Summarize with the default thresholds.
pub fn summarize(indices: &IndexSet, metadata: SessionMetadata) -> Result<AnalysisSummary> {
    summarize_with(indices, metadata, &ClassificationThresholds::default())
}

/// Reduce each summary index to its mean and classify it.
///
/// Fails with `MissingIndex` if any of [`SUMMARY_INDICES`] is absent. A
/// degraded (all-missing) index is present; its mean is NaN.
pub fn summarize_with(
    indices: &IndexSet,
    metadata: SessionMetadata,
    thresholds: &ClassificationThresholds,
) -> Result<AnalysisSummary> {
    let mut entries = Vec::with_capacity(SUMMARY_INDICES.len());
    for index in SUMMARY_INDICES {
        let mean = indices.require(index)?.statistics().mean;
        entries.push(SummaryEntry {
            index,
            mean,
            assessment: thresholds.classify(index, mean),
        });
    }
    Ok(AnalysisSummary { entries, metadata })
}

impl AnalysisSummary {
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub fn entry(&self, index: SpectralIndex) -> Option<&SummaryEntry> {
        self.entries.iter().find(|e| e.index == index)
    }

    pub fn mean(&self, index: SpectralIndex) -> Option<f64> {
        self.entry(index).map(|e| e.mean)
    }

    pub fn assessment(&self, index: SpectralIndex) -> Option<Assessment> {
        self.entry(index).and_then(|e| e.assessment)
    }

    /// The multi-line text report.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

fn report_line(entry: &SummaryEntry) -> String {
    let m = entry.mean;
    let a = entry.assessment.map(|a| a.label()).unwrap_or_default();
    match entry.index {
        SpectralIndex::NDVI => {
            format!("Vegetation Health (NDVI): {m:.3} - {a} vegetation density")
        }
        SpectralIndex::SAVI => {
            format!("Soil Impact (SAVI): {m:.3} - Significant soil influence detected")
        }
        SpectralIndex::VARI => format!("Plant Stress (VARI): {m:.3} - {a} vegetation stress"),
        SpectralIndex::MNDWI => {
            format!("Water Presence (MNDWI): {m:.3} - {a} water content in soil")
        }
        SpectralIndex::EVI => {
            format!("Enhanced Vegetation Index (EVI): {m:.3} - Vegetation enhancement index")
        }
        SpectralIndex::NBR => format!("Burn Severity (NBR): {m:.3} - {a} burn severity risk"),
        SpectralIndex::GCI => format!(
            "Green Chlorophyll Index (GCI): {m:.3} - {a} chlorophyll content in plants"
        ),
        SpectralIndex::TCARI => {
            format!("Chlorophyll Absorption (TCARI): {m:.3} - Chlorophyll absorption rate")
        }
        SpectralIndex::BAI => format!("Burn Area Index (BAI): {m:.3} - {a} burn area risk"),
        SpectralIndex::OSAVI => {
            format!("Soil-Adjusted Vegetation (OSAVI): {m:.3} - {a} vegetation")
        }
        other => format!("{}: {m:.3}", other.full_name()),
    }
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SATELLITE ANALYSIS SUMMARY:")?;
        let mut n = 0;
        for entry in &self.entries {
            n += 1;
            writeln!(f, "{}. {}", n, report_line(entry))?;
        }
        writeln!(f, "{}. Moisture Content: {}", n + 1, self.metadata.moisture)?;
        // Shortest round-trip form: 48.0, 87.5, 33.3333
        writeln!(
            f,
            "{}. Data Quality: {:?}% valid measurements",
            n + 2,
            self.metadata.valid_pixels
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::engine::{compute_all, EngineOptions, IndexOutcome};
    use fieldscan_core::raster::Raster;
    use fieldscan_core::stack::BandStack;

    fn set_with_means(value: f64) -> IndexSet {
        let mut set = IndexSet::new();
        for index in SpectralIndex::ALL {
            set.insert(index, IndexOutcome::Computed(Raster::filled(2, 2, value)));
        }
        set
    }

    #[test]
    fn test_ndvi_boundary_is_strict() {
        let t = ClassificationThresholds::default();
        assert_eq!(t.classify(SpectralIndex::NDVI, 0.3), Some(Assessment::Poor));
        assert_eq!(t.classify(SpectralIndex::NDVI, 0.300001), Some(Assessment::Good));
    }

    #[test]
    fn test_threshold_table() {
        let t = ClassificationThresholds::default();
        assert_eq!(t.classify(SpectralIndex::VARI, -0.01), Some(Assessment::High));
        assert_eq!(t.classify(SpectralIndex::VARI, 0.0), Some(Assessment::Low));
        assert_eq!(t.classify(SpectralIndex::MNDWI, 0.0), Some(Assessment::Low));
        assert_eq!(t.classify(SpectralIndex::MNDWI, 0.01), Some(Assessment::High));
        assert_eq!(t.classify(SpectralIndex::NBR, -0.1), Some(Assessment::Low));
        assert_eq!(t.classify(SpectralIndex::NBR, -0.11), Some(Assessment::High));
        assert_eq!(t.classify(SpectralIndex::GCI, 0.5), Some(Assessment::High));
        assert_eq!(t.classify(SpectralIndex::BAI, 0.1), Some(Assessment::Low));
        assert_eq!(t.classify(SpectralIndex::BAI, 12.0), Some(Assessment::High));
        assert_eq!(t.classify(SpectralIndex::OSAVI, 0.16), Some(Assessment::Stressed));
        assert_eq!(t.classify(SpectralIndex::OSAVI, 0.2), Some(Assessment::Healthy));
        assert_eq!(t.classify(SpectralIndex::SAVI, 0.9), None);
        assert_eq!(t.classify(SpectralIndex::NDMI, 0.9), None);
    }

    #[test]
    fn test_missing_index_is_an_error() {
        let mut set = set_with_means(0.4);
        let mut partial = IndexSet::new();
        for (index, outcome) in set.iter() {
            if index != SpectralIndex::GCI {
                partial.insert(index, outcome.clone());
            }
        }
        let err = summarize(&partial, SessionMetadata::default()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required index: GCI");

        // NDMI, CMR and FMR are not needed.
        set = {
            let mut s = IndexSet::new();
            for index in SUMMARY_INDICES {
                s.insert(index, IndexOutcome::Computed(Raster::filled(1, 1, 0.4)));
            }
            s
        };
        assert!(summarize(&set, SessionMetadata::default()).is_ok());
    }

    #[test]
    fn test_degraded_index_reports_nan() {
        let mut set = set_with_means(0.4);
        set.insert(
            SpectralIndex::EVI,
            IndexOutcome::from_result(Err(fieldscan_core::Error::Other("x".into())), (2, 2)),
        );

        let summary = summarize(&set, SessionMetadata::default()).unwrap();
        assert!(summary.mean(SpectralIndex::EVI).unwrap().is_nan());
        assert!(summary
            .report()
            .contains("Enhanced Vegetation Index (EVI): NaN - Vegetation enhancement index"));
    }

    #[test]
    fn test_mean_ignores_missing() {
        let mut set = set_with_means(0.4);
        let mut ndvi = Raster::filled(2, 2, 0.5);
        ndvi.set(0, 0, f64::NAN).unwrap();
        ndvi.set(0, 1, 0.2).unwrap();
        set.insert(SpectralIndex::NDVI, IndexOutcome::Computed(ndvi));

        let summary = summarize(&set, SessionMetadata::default()).unwrap();
        assert!((summary.mean(SpectralIndex::NDVI).unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(summary.assessment(SpectralIndex::NDVI), Some(Assessment::Good));
    }

    #[test]
    fn test_constant_stack_scenario() {
        let stack = BandStack::from_rasters(vec![Raster::filled(3, 3, 0.5); 8]).unwrap();
        let set = compute_all(&stack, &EngineOptions::default()).unwrap();
        let summary = summarize(&set, SessionMetadata::default()).unwrap();

        for index in [
            SpectralIndex::NDVI,
            SpectralIndex::SAVI,
            SpectralIndex::OSAVI,
            SpectralIndex::MNDWI,
            SpectralIndex::NBR,
        ] {
            assert_eq!(summary.mean(index), Some(0.0), "{}", index);
        }
        assert_eq!(summary.assessment(SpectralIndex::NDVI), Some(Assessment::Poor));
        assert_eq!(summary.assessment(SpectralIndex::MNDWI), Some(Assessment::Low));
        assert_eq!(summary.assessment(SpectralIndex::NBR), Some(Assessment::Low));
        assert_eq!(summary.assessment(SpectralIndex::OSAVI), Some(Assessment::Stressed));
        // VARI = 0 / 0.5 = 0 -> low stress; GCI = 1 - 1 = 0 -> low chlorophyll
        assert_eq!(summary.assessment(SpectralIndex::VARI), Some(Assessment::Low));
        assert_eq!(summary.assessment(SpectralIndex::GCI), Some(Assessment::Low));
    }

    #[test]
    fn test_report_layout() {
        let summary = summarize(
            &set_with_means(0.5),
            SessionMetadata {
                moisture: "moderate".to_string(),
                valid_pixels: 87.5,
            },
        )
        .unwrap();

        let report = summary.report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "SATELLITE ANALYSIS SUMMARY:");
        assert_eq!(
            lines[1],
            "1. Vegetation Health (NDVI): 0.500 - good vegetation density"
        );
        assert_eq!(lines[10], "10. Soil-Adjusted Vegetation (OSAVI): 0.500 - healthy vegetation");
        assert_eq!(lines[11], "11. Moisture Content: moderate");
        assert_eq!(lines[12], "12. Data Quality: 87.5% valid measurements");

        // Deterministic
        assert_eq!(report, summary.report());
    }

    #[test]
    fn test_valid_pixels_printed_unrounded() {
        let summary = summarize(
            &set_with_means(0.5),
            SessionMetadata {
                moisture: "low".to_string(),
                valid_pixels: 33.3333,
            },
        )
        .unwrap();
        assert!(summary
            .report()
            .ends_with("12. Data Quality: 33.3333% valid measurements\n"));

        let summary = summarize(&set_with_means(0.5), SessionMetadata::default()).unwrap();
        assert!(summary
            .report()
            .ends_with("12. Data Quality: 48.0% valid measurements\n"));
    }

    #[test]
    fn test_summary_serializes() {
        let summary = summarize(&set_with_means(0.5), SessionMetadata::default()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["entries"][0]["index"], "NDVI");
        assert_eq!(json["entries"][0]["assessment"], "good");
        assert_eq!(json["metadata"]["moisture"], "high");
    }
}
