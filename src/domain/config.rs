//! Run configuration.
//!
//! Everything the pipeline needs to know about *where* data comes from and
//! *which* countries to keep lives in [`ReconcileConfig`]. It is built once
//! (from CLI flags plus defaults) and passed by reference through every stage.

use std::path::{Path, PathBuf};

use crate::domain::{CountryCode, Metric, SourceMetric};

/// OECD members covered by the affordability dataset.
pub const DEFAULT_COUNTRIES: [&str; 37] = [
    "AUS", "AUT", "BEL", "CAN", "CHL", "CRI", "CZE", "DNK", "EST", "FIN", "FRA", "DEU", "GRC", "HUN", "ISL", "IRL",
    "ISR", "ITA", "JPN", "KOR", "LVA", "LTU", "LUX", "MEX", "NLD", "NZL", "NOR", "POL", "PRT", "SVK", "SVN", "ESP",
    "SWE", "CHE", "TUR", "GBR", "USA",
];

/// Reference year at which real income is expressed in CPI terms.
pub const DEFAULT_BASE_YEAR: i32 = 2015;

/// One raw metric extracted from an SDMX-style CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub metric: SourceMetric,
    /// File name, resolved against `ReconcileConfig::data_dir`.
    pub file: PathBuf,
    /// Required `MEASURE` column value.
    pub measure: String,
    /// Optional required `STATISTICAL_OPERATION` column value.
    pub statistical_operation: Option<String>,
}

impl SourceSpec {
    pub fn new(metric: SourceMetric, file: &str, measure: &str) -> Self {
        Self {
            metric,
            file: PathBuf::from(file),
            measure: measure.to_string(),
            statistical_operation: None,
        }
    }

    pub fn with_statistical_operation(mut self, op: &str) -> Self {
        self.statistical_operation = Some(op.to_string());
        self
    }
}

/// How a patch source is applied to a country's series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchKind {
    /// Sub-annual observations averaged per year, then written over the base
    /// series (patch wins on overlapping years).
    Overwrite {
        date_column: String,
        value_column: String,
        /// Placeholder the publisher uses for "no observation".
        missing_marker: String,
    },
    /// Year → percent growth table used to extend the base series forward.
    GrowthExtend { year_column: String, rate_column: String },
}

/// A country-specific correction from an alternate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSpec {
    pub country: CountryCode,
    pub metric: Metric,
    pub file: PathBuf,
    pub kind: PatchKind,
}

/// Full run configuration as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub data_dir: PathBuf,
    /// Country allowlist; rows for any other `REF_AREA` are ignored.
    pub countries: Vec<CountryCode>,
    pub base_year: i32,
    pub sources: Vec<SourceSpec>,
    /// Applied per country, in order.
    pub patches: Vec<PatchSpec>,
    /// Where the dataset is written (`None` for a dry run).
    pub output: Option<PathBuf>,
}

impl ReconcileConfig {
    /// Standard sources and patches rooted at `data_dir`.
    pub fn with_defaults(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            base_year: DEFAULT_BASE_YEAR,
            sources: default_sources(),
            patches: default_patches(),
            output: None,
        }
    }

    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn is_allowed(&self, country: &str) -> bool {
        self.countries.iter().any(|c| c == country)
    }
}

pub fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new(SourceMetric::RealHousePriceIndex, "RHP_RPI_HPI.csv", "RHP"),
        SourceSpec::new(SourceMetric::RentPriceIndex, "RHP_RPI_HPI.csv", "RPI"),
        SourceSpec::new(SourceMetric::NominalIncome, "INC_DISP.csv", "INC_DISP").with_statistical_operation("MEDIAN"),
        SourceSpec::new(SourceMetric::Cpi, "CPI_HSH.csv", "CPI"),
        SourceSpec::new(SourceMetric::NumberOfHouseholds, "CPI_HSH.csv", "HSH"),
        SourceSpec::new(SourceMetric::MortgageRate, "IRLT.csv", "IRLT"),
    ]
}

pub fn default_patches() -> Vec<PatchSpec> {
    vec![
        // Banxico fixed-rate peso mortgage series replaces the long-term bond proxy.
        PatchSpec {
            country: "MEX".to_string(),
            metric: Metric::MortgageRate,
            file: PathBuf::from("MEX-banxico.csv"),
            kind: PatchKind::Overwrite {
                date_column: "Fecha".to_string(),
                value_column: "SF43426".to_string(),
                missing_marker: "N/E".to_string(),
            },
        },
        PatchSpec {
            country: "AUS".to_string(),
            metric: Metric::RealIncome,
            file: PathBuf::from("AUS_income_growth.csv"),
            kind: PatchKind::GrowthExtend {
                year_column: "year".to_string(),
                rate_column: "growth_pct".to_string(),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_raw_metric() {
        let config = ReconcileConfig::with_defaults("_artifacts");
        for metric in [
            SourceMetric::RealHousePriceIndex,
            SourceMetric::RentPriceIndex,
            SourceMetric::NominalIncome,
            SourceMetric::Cpi,
            SourceMetric::NumberOfHouseholds,
            SourceMetric::MortgageRate,
        ] {
            assert!(config.sources.iter().any(|s| s.metric == metric), "missing {metric}");
        }
        assert_eq!(config.countries.len(), 37);
        assert!(config.is_allowed("MEX"));
        assert!(!config.is_allowed("OECD"));
    }

    #[test]
    fn resolve_joins_data_dir() {
        let config = ReconcileConfig::with_defaults("/data");
        assert_eq!(config.resolve(Path::new("IRLT.csv")), PathBuf::from("/data/IRLT.csv"));
    }
}
