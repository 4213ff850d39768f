//! Loading country-specific patch sources.
//!
//! Two file shapes are supported:
//! - sub-annual observations (`date,value` columns) averaged into annual values
//! - a `year,growth_pct` table used to extend a series forward

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::domain::{CountryCode, Metric, PatchKind, PatchSpec, ReconcileConfig, TimeSeriesPoint};
use crate::error::SourceError;
use crate::io::ingest::{build_header_map, get_optional, open_csv, parse_opt_f64, require_column, SourceStatus};
use crate::reconcile::{Patch, PatchData};
use crate::series::round_value;

/// How loading a patch file went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSourceReport {
    pub country: CountryCode,
    pub metric: Metric,
    pub file: PathBuf,
    pub status: SourceStatus,
}

/// Load every configured patch; missing or broken files are skipped.
pub fn load_patches(config: &ReconcileConfig) -> (Vec<Patch>, Vec<PatchSourceReport>) {
    let mut patches = Vec::with_capacity(config.patches.len());
    let mut reports = Vec::with_capacity(config.patches.len());

    for spec in &config.patches {
        let path = config.resolve(&spec.file);
        debug!(country = %spec.country, metric = %spec.metric, file = %path.display(), "processing patch");

        let status = match load_patch(spec, &path) {
            Ok(patch) => {
                info!(country = %spec.country, metric = %spec.metric, kind = patch.data.label(), "loaded patch");
                patches.push(patch);
                SourceStatus::Loaded
            }
            Err(e) => {
                if e.is_missing() {
                    warn!("{e}; skipping {} patch", spec.country);
                } else {
                    error!("{e}; skipping {} patch", spec.country);
                }
                SourceStatus::from(&e)
            }
        };

        reports.push(PatchSourceReport {
            country: spec.country.clone(),
            metric: spec.metric,
            file: path,
            status,
        });
    }

    (patches, reports)
}

/// Load a single patch file according to its kind.
pub fn load_patch(spec: &PatchSpec, path: &Path) -> Result<Patch, SourceError> {
    let data = match &spec.kind {
        PatchKind::Overwrite {
            date_column,
            value_column,
            missing_marker,
        } => PatchData::Overwrite(read_annual_means(path, date_column, value_column, missing_marker)?),
        PatchKind::GrowthExtend { year_column, rate_column } => {
            PatchData::GrowthRates(read_growth_rates(path, year_column, rate_column)?)
        }
    };

    Ok(Patch {
        country: spec.country.clone(),
        metric: spec.metric,
        data,
    })
}

/// Read dated observations and average them per calendar year (rounded).
pub fn read_annual_means(
    path: &Path,
    date_column: &str,
    value_column: &str,
    missing_marker: &str,
) -> Result<Vec<TimeSeriesPoint>, SourceError> {
    let mut reader = open_csv(path)?;
    let headers = reader
        .headers()
        .map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let header_map = build_header_map(&headers);
    require_column(&header_map, date_column, path)?;
    require_column(&header_map, value_column, path)?;

    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    let mut not_published = 0usize;
    let mut dropped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                dropped += 1;
                debug!(file = %path.display(), line, "CSV parse error: {e}");
                continue;
            }
        };

        let raw_value = get_optional(&record, &header_map, value_column);
        if raw_value == Some(missing_marker) {
            not_published += 1;
            continue;
        }
        let date = get_optional(&record, &header_map, date_column).and_then(parse_date);
        let (Some(date), Some(value)) = (date, parse_opt_f64(raw_value)) else {
            dropped += 1;
            debug!(file = %path.display(), line, "dropped row with invalid date or value");
            continue;
        };

        let entry = sums.entry(date.year()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    if dropped > 0 {
        warn!(file = %path.display(), dropped, "dropped malformed patch rows");
    }
    debug!(file = %path.display(), not_published, "skipped unpublished observations");

    Ok(sums
        .into_iter()
        .map(|(year, (sum, n))| TimeSeriesPoint {
            year,
            value: round_value(sum / n as f64),
        })
        .collect())
}

/// Read a year → percent growth table. Later rows win on duplicate years.
pub fn read_growth_rates(path: &Path, year_column: &str, rate_column: &str) -> Result<BTreeMap<i32, f64>, SourceError> {
    let mut reader = open_csv(path)?;
    let headers = reader
        .headers()
        .map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let header_map = build_header_map(&headers);
    require_column(&header_map, year_column, path)?;
    require_column(&header_map, rate_column, path)?;

    let mut rates = BTreeMap::new();
    let mut dropped = 0usize;
    for result in reader.records() {
        let Ok(record) = result else {
            dropped += 1;
            continue;
        };
        let year = get_optional(&record, &header_map, year_column).and_then(parse_year);
        let rate = parse_opt_f64(get_optional(&record, &header_map, rate_column));
        match (year, rate) {
            (Some(year), Some(rate)) => {
                rates.insert(year, rate);
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(file = %path.display(), dropped, "dropped malformed growth rows");
    }
    Ok(rates)
}

const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

fn parse_year(s: &str) -> Option<i32> {
    let year = match s.parse::<i32>() {
        Ok(y) => y,
        Err(_) => {
            // Spreadsheet round-trips turn `2021` into `2021.0`.
            let f = s.parse::<f64>().ok()?;
            if f.fract() != 0.0 || f.abs() > 1.0e5 {
                return None;
            }
            f as i32
        }
    };
    YEAR_RANGE.contains(&year).then_some(year)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Central-bank exports use `DD/MM/YYYY`; ISO dates are accepted as well.
    const FMTS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];
    FMTS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_day_first_and_iso() {
        assert_eq!(parse_date("31/12/2020"), NaiveDate::from_ymd_opt(2020, 12, 31));
        assert_eq!(parse_date("2020-12-31"), NaiveDate::from_ymd_opt(2020, 12, 31));
        assert_eq!(parse_date("12/31/2020"), None);
    }

    #[test]
    fn years_tolerate_float_formatting() {
        assert_eq!(parse_year("2021"), Some(2021));
        assert_eq!(parse_year("2021.0"), Some(2021));
        assert_eq!(parse_year("2021.5"), None);
        assert_eq!(parse_year("abc"), None);
    }

    #[test]
    fn years_outside_four_digits_are_rejected() {
        assert_eq!(parse_year("2000000000"), None);
        assert_eq!(parse_year("2000000000.0"), None);
        assert_eq!(parse_year("-2021"), None);
        assert_eq!(parse_year("999"), None);
        assert_eq!(parse_year("9999"), Some(9999));
    }
}
