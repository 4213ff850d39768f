//! Input/output helpers.
//!
//! - raw source CSV ingest + validation (`ingest`)
//! - patch source files (`patches`)
//! - dataset JSON export (`export`)

pub mod export;
pub mod ingest;
pub mod patches;

pub use export::*;
pub use ingest::*;
pub use patches::*;
