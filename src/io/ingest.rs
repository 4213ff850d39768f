//! CSV ingest of raw statistical-agency exports.
//!
//! This module turns SDMX-style CSV files (`REF_AREA`, `MEASURE`, `TIME_PERIOD`,
//! `OBS_VALUE`, ...) into per-country raw series.
//!
//! Design goals:
//! - **Strict schema** for required columns (the source is skipped, not the run)
//! - **Row-level validation** (drop bad rows, but count what happened)
//! - **Deterministic behavior**: rows keep file order, so keep-first
//!   deduplication downstream is well defined
//! - **Separation of concerns**: no reconciliation logic here

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, error, info, warn};

use crate::domain::{CountryCode, RawCountry, RawRecord, ReconcileConfig, SourceMetric, SourceSpec, TimeSeriesPoint};
use crate::error::SourceError;

const COL_REF_AREA: &str = "ref_area";
const COL_MEASURE: &str = "measure";
const COL_TIME_PERIOD: &str = "time_period";
const COL_OBS_VALUE: &str = "obs_value";
const COL_STATISTICAL_OPERATION: &str = "statistical_operation";

/// How loading a source went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Loaded,
    Missing,
    Failed(String),
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceStatus::Loaded => f.write_str("loaded"),
            SourceStatus::Missing => f.write_str("missing"),
            SourceStatus::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

impl From<&SourceError> for SourceStatus {
    fn from(e: &SourceError) -> Self {
        if e.is_missing() {
            SourceStatus::Missing
        } else {
            SourceStatus::Failed(e.to_string())
        }
    }
}

/// Per-source ingest counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub metric: SourceMetric,
    pub file: PathBuf,
    pub status: SourceStatus,
    /// Data rows in the file (shared files count every row).
    pub rows_read: usize,
    /// Rows matching this source's measure, filters and country allowlist.
    pub rows_matched: usize,
    /// Matched rows dropped for an unparsable period or value.
    pub rows_dropped: usize,
}

/// Ingest output: raw series per allowlisted country + per-source reports.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub countries: BTreeMap<CountryCode, RawCountry>,
    pub sources: Vec<SourceReport>,
}

impl RawDataset {
    /// Whether at least one source feeding a core metric loaded.
    pub fn has_core_input(&self) -> bool {
        self.sources
            .iter()
            .any(|s| s.status == SourceStatus::Loaded && s.metric.feeds_core())
    }
}

/// One parsed row of an SDMX-style export; values are still unvalidated text.
#[derive(Debug, Clone)]
struct SdmxRow {
    ref_area: String,
    measure: String,
    time_period: String,
    obs_value: Option<String>,
    statistical_operation: Option<String>,
}

#[derive(Debug, Clone)]
struct SdmxTable {
    rows: Vec<SdmxRow>,
    rows_read: usize,
    has_statistical_operation: bool,
}

/// Load every configured source, reading each file at most once.
///
/// Missing or unreadable files skip the affected metrics; this never fails.
pub fn load_sources(config: &ReconcileConfig) -> RawDataset {
    let mut dataset = RawDataset {
        countries: config
            .countries
            .iter()
            .map(|c| (c.clone(), RawCountry::default()))
            .collect(),
        sources: Vec::with_capacity(config.sources.len()),
    };
    let mut tables: HashMap<PathBuf, Result<SdmxTable, SourceStatus>> = HashMap::new();

    for spec in &config.sources {
        let path = config.resolve(&spec.file);
        info!(metric = %spec.metric, measure = %spec.measure, file = %path.display(), "processing source");

        let table = tables.entry(path.clone()).or_insert_with(|| {
            read_sdmx_table(&path).map_err(|e| {
                if e.is_missing() {
                    warn!("{e}; skipping");
                } else {
                    error!("{e}; skipping");
                }
                SourceStatus::from(&e)
            })
        });

        let report = match table {
            Ok(table) => match extract_source(table, spec, config, &path) {
                Ok((records, report)) => {
                    for r in records {
                        if let Some(country) = dataset.countries.get_mut(&r.country) {
                            country.push(spec.metric, TimeSeriesPoint::new(r.year, r.value));
                        }
                    }
                    report
                }
                Err(e) => {
                    error!("{e}; skipping {}", spec.metric);
                    failed_report(spec, &path, SourceStatus::from(&e))
                }
            },
            Err(status) => failed_report(spec, &path, status.clone()),
        };
        dataset.sources.push(report);
    }

    dataset
}

fn failed_report(spec: &SourceSpec, path: &Path, status: SourceStatus) -> SourceReport {
    SourceReport {
        metric: spec.metric,
        file: path.to_path_buf(),
        status,
        rows_read: 0,
        rows_matched: 0,
        rows_dropped: 0,
    }
}

/// Select and validate the rows belonging to one source.
fn extract_source(
    table: &SdmxTable,
    spec: &SourceSpec,
    config: &ReconcileConfig,
    path: &Path,
) -> Result<(Vec<RawRecord>, SourceReport), SourceError> {
    if spec.statistical_operation.is_some() && !table.has_statistical_operation {
        return Err(SourceError::MissingColumn {
            column: COL_STATISTICAL_OPERATION.to_ascii_uppercase(),
            path: path.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    let mut rows_matched = 0usize;
    let mut rows_dropped = 0usize;

    for row in &table.rows {
        if row.measure != spec.measure || !config.is_allowed(&row.ref_area) {
            continue;
        }
        if let Some(op) = &spec.statistical_operation {
            if row.statistical_operation.as_deref() != Some(op.as_str()) {
                continue;
            }
        }
        rows_matched += 1;

        match validate_row(row) {
            Ok(record) => records.push(record),
            Err(reason) => {
                rows_dropped += 1;
                debug!(metric = %spec.metric, country = %row.ref_area, period = %row.time_period, "dropped row: {reason}");
            }
        }
    }

    info!(metric = %spec.metric, rows = rows_matched, "found relevant rows");
    if rows_dropped > 0 {
        warn!(metric = %spec.metric, dropped = rows_dropped, "dropped rows with unparsable period or value");
    }

    let report = SourceReport {
        metric: spec.metric,
        file: path.to_path_buf(),
        status: SourceStatus::Loaded,
        rows_read: table.rows_read,
        rows_matched,
        rows_dropped,
    };
    Ok((records, report))
}

fn validate_row(row: &SdmxRow) -> Result<RawRecord, String> {
    let year = parse_period_year(&row.time_period)
        .ok_or_else(|| format!("invalid period label '{}'", row.time_period))?;
    let value = parse_opt_f64(row.obs_value.as_deref()).ok_or_else(|| "missing/invalid OBS_VALUE".to_string())?;
    Ok(RawRecord {
        country: row.ref_area.clone(),
        year,
        value,
    })
}

/// Year from the first four characters of a period label (`2015`, `2015-Q2`, `2015-03`).
pub fn parse_period_year(label: &str) -> Option<i32> {
    let prefix: String = label.chars().take(4).collect();
    prefix.parse::<i32>().ok()
}

fn read_sdmx_table(path: &Path) -> Result<SdmxTable, SourceError> {
    let mut reader = open_csv(path)?;

    let headers = reader
        .headers()
        .map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let header_map = build_header_map(&headers);

    for column in [COL_REF_AREA, COL_MEASURE, COL_TIME_PERIOD, COL_OBS_VALUE] {
        require_column(&header_map, column, path)?;
    }

    let mut rows = Vec::new();
    let mut rows_read = 0usize;
    let mut unreadable = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                unreadable += 1;
                debug!(file = %path.display(), line, "CSV parse error: {e}");
                continue;
            }
        };

        let (Some(ref_area), Some(measure)) = (
            get_optional(&record, &header_map, COL_REF_AREA),
            get_optional(&record, &header_map, COL_MEASURE),
        ) else {
            unreadable += 1;
            continue;
        };

        rows.push(SdmxRow {
            ref_area: ref_area.to_string(),
            measure: measure.to_string(),
            time_period: get_optional(&record, &header_map, COL_TIME_PERIOD)
                .unwrap_or_default()
                .to_string(),
            obs_value: get_optional(&record, &header_map, COL_OBS_VALUE).map(str::to_string),
            statistical_operation: get_optional(&record, &header_map, COL_STATISTICAL_OPERATION).map(str::to_string),
        });
    }

    if unreadable > 0 {
        warn!(file = %path.display(), rows = unreadable, "skipped unreadable rows");
    }

    Ok(SdmxTable {
        rows,
        rows_read,
        has_statistical_operation: header_map.contains_key(COL_STATISTICAL_OPERATION),
    })
}

pub(crate) fn open_csv(path: &Path) -> Result<csv::Reader<File>, SourceError> {
    if !path.exists() {
        return Err(SourceError::Missing {
            path: path.to_path_buf(),
        });
    }
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

pub(crate) fn require_column(header_map: &HashMap<String, usize>, column: &str, path: &Path) -> Result<(), SourceError> {
    if header_map.contains_key(&normalize_header_name(column)) {
        Ok(())
    } else {
        Err(SourceError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
    }
}

pub(crate) fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_year_uses_first_four_characters() {
        assert_eq!(parse_period_year("2015"), Some(2015));
        assert_eq!(parse_period_year("2015-Q2"), Some(2015));
        assert_eq!(parse_period_year("1999-12"), Some(1999));
        assert_eq!(parse_period_year("Q2-2015"), None);
        assert_eq!(parse_period_year(""), None);
    }

    #[test]
    fn header_names_are_case_and_bom_insensitive() {
        assert_eq!(normalize_header_name("\u{feff}REF_AREA"), "ref_area");
        assert_eq!(normalize_header_name("  OBS_VALUE "), "obs_value");
    }

    #[test]
    fn values_must_be_finite_numbers() {
        assert_eq!(parse_opt_f64(Some("1.5")), Some(1.5));
        assert_eq!(parse_opt_f64(Some("NaN")), None);
        assert_eq!(parse_opt_f64(Some("n/a")), None);
        assert_eq!(parse_opt_f64(None), None);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let row = SdmxRow {
            ref_area: "AUS".to_string(),
            measure: "RHP".to_string(),
            time_period: "2015-Q1".to_string(),
            obs_value: Some("101.5".to_string()),
            statistical_operation: None,
        };
        assert_eq!(
            validate_row(&row),
            Ok(RawRecord {
                country: "AUS".to_string(),
                year: 2015,
                value: 101.5
            })
        );

        let bad_period = SdmxRow {
            time_period: "n.a.".to_string(),
            ..row.clone()
        };
        assert!(validate_row(&bad_period).is_err());

        let no_value = SdmxRow { obs_value: None, ..row };
        assert!(validate_row(&no_value).is_err());
    }
}
