//! `housing-recon` library crate.
//!
//! The binary (`recon`) is a thin wrapper around this library so that:
//!
//! - the reconciliation logic is testable without spawning processes
//! - the series operations are reusable on in-memory data
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod series;
