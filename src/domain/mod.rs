//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - metric identifiers (`Metric`, `SourceMetric`)
//! - annual observation points and per-country containers (`TimeSeriesPoint`, `CountryRecord`)
//! - run configuration (`ReconcileConfig`, `SourceSpec`, `PatchSpec`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
