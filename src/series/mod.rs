//! Pure operations on annual series.
//!
//! - gap filling + rounding (`normalize`)
//! - nominal → real deflation (`convert`)
//! - overwrite / growth-extension patch merges (`patch`)

pub mod convert;
pub mod normalize;
pub mod patch;

pub use convert::*;
pub use normalize::*;
pub use patch::*;
