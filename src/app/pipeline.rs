//! Shared reconciliation pipeline used by both `build` and `check`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source ingest -> patch load -> per-country convert/patch -> synchronize
//!
//! The commands then only differ in what they do with the result.

use tracing::{error, info};

use crate::domain::{Dataset, ReconcileConfig};
use crate::error::AppError;
use crate::io::{PatchSourceReport, RawDataset, SourceReport, load_patches, load_sources};
use crate::reconcile::{Patch, Reconciled, reconcile_all};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sources: Vec<SourceReport>,
    pub patch_sources: Vec<PatchSourceReport>,
    pub reconciled: Reconciled,
}

impl RunOutput {
    pub fn dataset(&self) -> Dataset {
        self.reconciled.sync.dataset()
    }
}

/// Execute the full pipeline: load inputs from disk, then reconcile.
pub fn run_reconcile(config: &ReconcileConfig) -> Result<RunOutput, AppError> {
    let raw = load_sources(config);
    if !raw.has_core_input() {
        error!("no core metric source could be loaded");
        return Err(AppError::new(
            3,
            format!(
                "No usable core metric source found in '{}' (house prices, income/CPI, or mortgage rates).",
                config.data_dir.display()
            ),
        ));
    }

    let (patches, patch_sources) = load_patches(config);
    run_reconcile_with(config, raw, &patches, patch_sources)
}

/// Reconcile pre-loaded inputs.
///
/// Fails only when no country survives synchronization.
pub fn run_reconcile_with(
    config: &ReconcileConfig,
    raw: RawDataset,
    patches: &[Patch],
    patch_sources: Vec<PatchSourceReport>,
) -> Result<RunOutput, AppError> {
    info!(countries = raw.countries.len(), base_year = config.base_year, "reconciling");
    let reconciled = reconcile_all(&raw.countries, patches, config.base_year);

    if reconciled.sync.accepted.is_empty() {
        error!(rejected = reconciled.sync.rejected.len(), "no country survived synchronization");
        return Err(AppError::new(3, "No valid data could be processed: every country was rejected."));
    }
    info!(
        accepted = reconciled.sync.accepted.len(),
        rejected = reconciled.sync.rejected.len(),
        "synchronization complete"
    );

    Ok(RunOutput {
        sources: raw.sources,
        patch_sources,
        reconciled,
    })
}
