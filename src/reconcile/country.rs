//! Per-country assembly: raw source series → `CountryRecord` ready for
//! synchronization (income deflated, patches applied).

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::domain::{CountryCode, CountryRecord, Metric, RawCountry, SourceMetric, TimeSeriesPoint};
use crate::error::ConversionError;
use crate::series::{cpi_base, merge_growth_extend, merge_overwrite, to_real};

/// Payload of a loaded patch source.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchData {
    /// Annual values written over the base series.
    Overwrite(Vec<TimeSeriesPoint>),
    /// Year → percent growth used to extend the base series.
    GrowthRates(BTreeMap<i32, f64>),
}

/// A patch source loaded into memory, bound to one country and metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub country: CountryCode,
    pub metric: Metric,
    pub data: PatchData,
}

impl PatchData {
    pub fn label(&self) -> &'static str {
        match self {
            PatchData::Overwrite(_) => "overwrite",
            PatchData::GrowthRates(_) => "growth-extend",
        }
    }
}

/// What a patch actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub country: CountryCode,
    pub metric: Metric,
    pub kind: &'static str,
    /// Points overwritten/inserted, or years appended.
    pub points_applied: usize,
}

/// A country's record before synchronization, plus what happened building it.
#[derive(Debug, Clone, Default)]
pub struct AssembledCountry {
    pub record: CountryRecord,
    pub conversion_error: Option<ConversionError>,
    pub patches: Vec<PatchReport>,
}

/// Deflate nominal income by CPI.
///
/// Returns `None` when either input is absent for the country (nothing to
/// convert); an error when both are present but cannot be combined.
pub fn convert_income(raw: &RawCountry, base_year: i32) -> Option<Result<Vec<TimeSeriesPoint>, ConversionError>> {
    let nominal = raw.get(SourceMetric::NominalIncome)?;
    let cpi = raw.get(SourceMetric::Cpi)?;

    if cpi_base(cpi, base_year) == 0.0 {
        return Some(Err(ConversionError::ZeroBase { base_year }));
    }
    let real = to_real(nominal, cpi, base_year);
    if real.is_empty() {
        return Some(Err(ConversionError::NoOverlap));
    }
    Some(Ok(real))
}

/// Build the pre-synchronization record for one country.
pub fn assemble_country(code: &str, raw: &RawCountry, patches: &[Patch], base_year: i32) -> AssembledCountry {
    let mut out = AssembledCountry::default();

    for (metric, series) in &raw.series {
        if let Some(target) = metric.passthrough() {
            out.record.insert(target, series.clone());
        }
    }

    match convert_income(raw, base_year) {
        Some(Ok(real)) => {
            debug!(country = code, points = real.len(), base_year, "converted nominal income to real");
            out.record.insert(Metric::RealIncome, real);
        }
        Some(Err(e)) => {
            warn!(country = code, "could not convert income: {e}");
            out.conversion_error = Some(e);
        }
        None => {}
    }

    for patch in patches.iter().filter(|p| p.country == code) {
        if let Some(report) = apply_patch(&mut out.record, patch) {
            out.patches.push(report);
        }
    }

    out
}

fn apply_patch(record: &mut CountryRecord, patch: &Patch) -> Option<PatchReport> {
    let base = record.get(patch.metric).unwrap_or_default();

    let (merged, applied) = match &patch.data {
        PatchData::Overwrite(points) => (merge_overwrite(base, points), points.len()),
        PatchData::GrowthRates(rates) => {
            if base.is_empty() {
                warn!(
                    country = %patch.country,
                    metric = %patch.metric,
                    "no base series to extend; skipping growth patch"
                );
                return None;
            }
            let extended = merge_growth_extend(base, rates);
            let added = extended.len() - base.len();
            (extended, added)
        }
    };

    if applied == 0 {
        info!(
            country = %patch.country,
            metric = %patch.metric,
            kind = patch.data.label(),
            "patch added no points"
        );
    } else {
        info!(
            country = %patch.country,
            metric = %patch.metric,
            kind = patch.data.label(),
            points = applied,
            total = merged.len(),
            "patched"
        );
    }
    record.insert(patch.metric, merged);

    Some(PatchReport {
        country: patch.country.clone(),
        metric: patch.metric,
        kind: patch.data.label(),
        points_applied: applied,
    })
}
