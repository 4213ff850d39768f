//! Run summary formatting.

use std::collections::BTreeSet;
use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::domain::ReconcileConfig;
use crate::io::SourceStatus;

/// Format the full run summary (sources, patches, per-country outcomes).
pub fn format_run_summary(run: &RunOutput, config: &ReconcileConfig) -> String {
    let mut out = String::new();

    out.push_str("=== recon - Housing Affordability Reconciliation ===\n");
    out.push_str(&format!("Data dir: {}\n", config.data_dir.display()));
    out.push_str(&format!("Base year: {}\n", config.base_year));

    out.push_str("\nSources:\n");
    for s in &run.sources {
        out.push_str(&format!(
            "  {:<20} {:<16} {}",
            s.metric.name(),
            file_name(&s.file),
            s.status
        ));
        if s.status == SourceStatus::Loaded {
            out.push_str(&format!(
                " (rows={} matched={} dropped={})",
                s.rows_read, s.rows_matched, s.rows_dropped
            ));
        }
        out.push('\n');
    }

    if !run.patch_sources.is_empty() {
        out.push_str("\nPatches:\n");
        for p in &run.patch_sources {
            let applied = run
                .reconciled
                .patches
                .iter()
                .find(|r| r.country == p.country && r.metric == p.metric);
            let detail = match (&p.status, applied) {
                (SourceStatus::Loaded, Some(r)) => format!("{} +{} points", r.kind, r.points_applied),
                (SourceStatus::Loaded, None) => "not applied (no base series)".to_string(),
                (status, _) => status.to_string(),
            };
            out.push_str(&format!(
                "  [{}] {:<20} {:<24} {detail}\n",
                p.country,
                p.metric.field_name(),
                file_name(&p.file)
            ));
        }
    }

    if !run.reconciled.conversion_errors.is_empty() {
        out.push_str("\nIncome conversion failures:\n");
        for (code, e) in &run.reconciled.conversion_errors {
            out.push_str(&format!("  [{code}] {e}\n"));
        }
    }

    out.push_str("\nCountries:\n");
    let sync = &run.reconciled.sync;
    let codes: BTreeSet<&String> = sync.accepted.keys().chain(sync.rejected.keys()).collect();
    for code in codes {
        if let Some(s) = sync.accepted.get(code) {
            out.push_str(&format!(
                "  [{code}] SUCCESS  {} ({} yrs)\n",
                s.window,
                s.window.year_count()
            ));
        } else if let Some(reason) = sync.rejected.get(code) {
            out.push_str(&format!("  [{code}] SKIPPED  {reason}\n"));
        }
    }

    let included: Vec<&str> = sync.accepted.keys().map(String::as_str).collect();
    out.push_str(&format!(
        "\nIncluded countries ({}): {}\n",
        included.len(),
        included.join(", ")
    ));

    out
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use crate::domain::{CountryRecord, Metric, SourceMetric, YearWindow};
    use crate::error::{ConversionError, RejectReason};
    use crate::io::{PatchSourceReport, SourceReport};
    use crate::reconcile::{PatchReport, Reconciled, SyncReport, Synchronized};

    fn sample_run() -> RunOutput {
        let mut sync = SyncReport::default();
        sync.record(
            "AUS".to_string(),
            Ok(Synchronized {
                record: CountryRecord::new(),
                window: YearWindow { start: 1990, end: 2023 },
            }),
        );
        sync.record(
            "CHL".to_string(),
            Err(RejectReason::MissingCoreMetric {
                missing: vec![Metric::RealIncome],
            }),
        );

        RunOutput {
            sources: vec![
                SourceReport {
                    metric: SourceMetric::MortgageRate,
                    file: PathBuf::from("_artifacts/IRLT.csv"),
                    status: SourceStatus::Loaded,
                    rows_read: 10,
                    rows_matched: 8,
                    rows_dropped: 1,
                },
                SourceReport {
                    metric: SourceMetric::Cpi,
                    file: PathBuf::from("_artifacts/CPI_HSH.csv"),
                    status: SourceStatus::Missing,
                    rows_read: 0,
                    rows_matched: 0,
                    rows_dropped: 0,
                },
            ],
            patch_sources: vec![PatchSourceReport {
                country: "MEX".to_string(),
                metric: Metric::MortgageRate,
                file: PathBuf::from("_artifacts/MEX-banxico.csv"),
                status: SourceStatus::Loaded,
            }],
            reconciled: Reconciled {
                sync,
                patches: vec![PatchReport {
                    country: "MEX".to_string(),
                    metric: Metric::MortgageRate,
                    kind: "overwrite",
                    points_applied: 12,
                }],
                conversion_errors: BTreeMap::from([("CHL".to_string(), ConversionError::NoOverlap)]),
            },
        }
    }

    #[test]
    fn summary_lists_sources_patches_and_outcomes() {
        let config = ReconcileConfig::with_defaults("_artifacts");
        let text = format_run_summary(&sample_run(), &config);

        assert!(text.contains("Base year: 2015"));
        assert!(text.contains("IRLT.csv"));
        assert!(text.contains("(rows=10 matched=8 dropped=1)"));
        assert!(text.contains("cpi"));
        assert!(text.contains("missing"));
        assert!(text.contains("overwrite +12 points"));
        assert!(text.contains("[CHL] no overlapping years between nominal income and CPI"));
        assert!(text.contains("[AUS] SUCCESS  1990-2023 (34 yrs)"));
        assert!(text.contains("[CHL] SKIPPED  missing core metrics: realIncome"));
        assert!(text.contains("Included countries (1): AUS"));
    }
}
