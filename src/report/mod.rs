//! Reporting utilities: formatted terminal output for a run.
//!
//! Formatting lives in one place so the pipeline code stays free of printing
//! and output changes are localized.

pub mod format;

pub use format::*;
