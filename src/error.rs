//! Error types.
//!
//! `AppError` is the only error that reaches `main`; it carries the process exit
//! code. The remaining enums describe local failures that are logged and
//! reported but never abort the run on their own.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Metric;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure to load a raw or patch source file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {path}")]
    Missing { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },
}

impl SourceError {
    /// Missing files are expected for optional inputs and only warrant a warning.
    pub fn is_missing(&self) -> bool {
        matches!(self, SourceError::Missing { .. })
    }
}

/// Failure to derive real income from nominal income and CPI.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("no overlapping years between nominal income and CPI")]
    NoOverlap,

    #[error("CPI is zero in base year {base_year}")]
    ZeroBase { base_year: i32 },
}

/// Why the range synchronizer dropped a country.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("missing core metrics: {}", join_metrics(.missing))]
    MissingCoreMetric { missing: Vec<Metric> },

    /// `latest_start` begins after `earliest_end` finishes.
    #[error("no overlapping years ({latest_start} starts after {earliest_end} ends)")]
    EmptyIntersection { latest_start: Metric, earliest_end: Metric },

    #[error("{metric} is empty after filtering to the common window")]
    PostFilterEmpty { metric: Metric },
}

impl RejectReason {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MissingCoreMetric { .. } => "MissingCoreMetric",
            RejectReason::EmptyIntersection { .. } => "EmptyIntersection",
            RejectReason::PostFilterEmpty { .. } => "PostFilterEmpty",
        }
    }
}

fn join_metrics(metrics: &[Metric]) -> String {
    metrics.iter().map(|m| m.field_name()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reason_messages_name_metrics() {
        let reason = RejectReason::MissingCoreMetric {
            missing: vec![Metric::RealIncome, Metric::MortgageRate],
        };
        assert_eq!(reason.to_string(), "missing core metrics: realIncome, mortgageRate");
        assert_eq!(reason.code(), "MissingCoreMetric");

        let reason = RejectReason::EmptyIntersection {
            latest_start: Metric::RealIncome,
            earliest_end: Metric::MortgageRate,
        };
        assert!(reason.to_string().contains("realIncome starts after mortgageRate ends"));
    }

    #[test]
    fn only_missing_sources_are_soft() {
        let missing = SourceError::Missing {
            path: PathBuf::from("IRLT.csv"),
        };
        assert!(missing.is_missing());
        let column = SourceError::MissingColumn {
            column: "obs_value".to_string(),
            path: PathBuf::from("IRLT.csv"),
        };
        assert!(!column.is_missing());
    }
}
