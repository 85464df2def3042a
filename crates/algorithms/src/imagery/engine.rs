//! Index engine: evaluates the catalog over a band stack
//!
//! Every formula runs independently. A formula that fails structurally is
//! recorded as [`IndexOutcome::Degraded`] with an all-missing raster and
//! the batch carries on.

use super::indices::{self, IndexParams, SpectralIndex};
use super::normalize::normalize_stack;
use crate::maybe_rayon::*;
use fieldscan_core::raster::{Raster, RasterStatistics};
use fieldscan_core::stack::BandStack;
use fieldscan_core::{Error, Result};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Number of stack slots the catalog reads from (slots 0..=7).
pub const REQUIRED_BANDS: usize = 8;

/// Options for an engine run.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub params: IndexParams,
    /// Rescale every band to [0, 1] before evaluating the formulas.
    pub normalize_inputs: bool,
}

/// Result of evaluating one index.
#[derive(Debug, Clone)]
pub enum IndexOutcome {
    Computed(Raster),
    /// The formula could not be evaluated; `raster` is all missing.
    Degraded { raster: Raster, reason: String },
}

impl IndexOutcome {
    /// Wrap a formula result, degrading errors to an all-missing raster of `shape`.
    pub fn from_result(result: Result<Raster>, shape: (usize, usize)) -> Self {
        match result {
            Ok(raster) => Self::Computed(raster),
            Err(e) => Self::Degraded {
                raster: Raster::missing(shape.0, shape.1),
                reason: e.to_string(),
            },
        }
    }

    pub fn raster(&self) -> &Raster {
        match self {
            Self::Computed(raster) | Self::Degraded { raster, .. } => raster,
        }
    }

    pub fn into_raster(self) -> Raster {
        match self {
            Self::Computed(raster) | Self::Degraded { raster, .. } => raster,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn degradation_reason(&self) -> Option<&str> {
        match self {
            Self::Computed(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn statistics(&self) -> RasterStatistics {
        self.raster().statistics()
    }
}

/// Computed indices keyed by catalog entry.
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    entries: BTreeMap<SpectralIndex, IndexOutcome>,
}

impl IndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: SpectralIndex, outcome: IndexOutcome) {
        self.entries.insert(index, outcome);
    }

    pub fn get(&self, index: SpectralIndex) -> Option<&IndexOutcome> {
        self.entries.get(&index)
    }

    pub fn raster(&self, index: SpectralIndex) -> Option<&Raster> {
        self.get(index).map(IndexOutcome::raster)
    }

    /// Raster of `index`, or [`Error::MissingIndex`] if it was never computed.
    pub fn require(&self, index: SpectralIndex) -> Result<&Raster> {
        self.raster(index)
            .ok_or_else(|| Error::MissingIndex(index.short_name().to_string()))
    }

    pub fn contains(&self, index: SpectralIndex) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (SpectralIndex, &IndexOutcome)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Indices that degraded to all-missing.
    pub fn degraded(&self) -> impl Iterator<Item = SpectralIndex> + '_ {
        self.iter().filter(|(_, o)| o.is_degraded()).map(|(k, _)| k)
    }
}

/// Evaluate one formula against a stack that has already passed the slot check.
fn evaluate(stack: &BandStack, index: SpectralIndex, params: &IndexParams) -> Result<Raster> {
    let slot = |i: usize| slot_band(stack, i);

    match index {
        SpectralIndex::NDVI => indices::ndvi(slot(7)?, slot(3)?),
        SpectralIndex::SAVI => indices::savi(slot(7)?, slot(3)?, &params.savi),
        SpectralIndex::VARI => indices::vari(slot(2)?, slot(3)?, slot(1)?),
        SpectralIndex::MNDWI => indices::mndwi(slot(1)?, slot(3)?),
        SpectralIndex::NDMI => indices::ndmi(slot(7)?, slot(3)?),
        // CMR and FMR evaluate the same ratio.
        SpectralIndex::CMR | SpectralIndex::FMR => indices::simple_ratio(slot(7)?, slot(5)?),
        SpectralIndex::EVI => indices::evi(slot(7)?, slot(3)?, slot(1)?, &params.evi),
        SpectralIndex::NBR => indices::nbr(slot(7)?, slot(6)?),
        SpectralIndex::GCI => indices::gci(slot(7)?, slot(1)?),
        SpectralIndex::TCARI => indices::tcari(slot(3)?, slot(1)?, slot(2)?, &params.tcari),
        SpectralIndex::BAI => indices::bai(slot(2)?, slot(3)?, &params.bai),
        SpectralIndex::OSAVI => indices::osavi(slot(7)?, slot(3)?, &params.osavi),
    }
}

fn slot_band(stack: &BandStack, slot: usize) -> Result<&Raster> {
    stack.band(slot).ok_or(Error::InsufficientBands {
        required: slot + 1,
        available: stack.len(),
    })
}

/// Compute a single index.
///
/// Fails only when the stack has fewer than [`REQUIRED_BANDS`] slots.
pub fn compute_index(
    stack: &BandStack,
    index: SpectralIndex,
    params: &IndexParams,
) -> Result<IndexOutcome> {
    stack.require(REQUIRED_BANDS)?;
    Ok(IndexOutcome::from_result(
        evaluate(stack, index, params),
        stack.shape(),
    ))
}

/// Compute a selection of indices, in parallel across formulas.
///
/// Fails with [`Error::InsufficientBands`] before any work when the stack
/// has fewer than [`REQUIRED_BANDS`] slots. Per-formula failures do not
/// fail the call.
pub fn compute_indices(
    stack: &BandStack,
    selection: &[SpectralIndex],
    options: &EngineOptions,
) -> Result<IndexSet> {
    stack.require(REQUIRED_BANDS)?;

    let normalized;
    let input = if options.normalize_inputs {
        normalized = normalize_stack(stack)?;
        &normalized
    } else {
        stack
    };

    let start = Instant::now();
    let shape = input.shape();
    let outcomes: Vec<(SpectralIndex, IndexOutcome)> = selection
        .to_vec()
        .into_par_iter()
        .map(|index| {
            let t = Instant::now();
            let outcome =
                IndexOutcome::from_result(evaluate(input, index, &options.params), shape);
            debug!("{} computed in {:.2?}", index, t.elapsed());
            (index, outcome)
        })
        .collect();

    let mut set = IndexSet::new();
    for (index, outcome) in outcomes {
        if let Some(reason) = outcome.degradation_reason() {
            warn!("{} degraded to all-missing: {}", index, reason);
        }
        set.insert(index, outcome);
    }

    info!(
        "Computed {} indices ({} degraded) in {:.2?}",
        set.len(),
        set.degraded().count(),
        start.elapsed()
    );
    Ok(set)
}

/// Compute the full catalog.
pub fn compute_all(stack: &BandStack, options: &EngineOptions) -> Result<IndexSet> {
    compute_indices(stack, &SpectralIndex::ALL, options)
}
