//! Country reconciliation.
//!
//! Responsibilities:
//!
//! - assemble each country's record from raw sources (income deflation, patches)
//! - synchronize all countries to their core-metric window (parallel)

pub mod country;
pub mod synchronize;

pub use country::*;
pub use synchronize::*;

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::info_span;

use crate::domain::{CountryCode, CountryRecord, RawCountry};
use crate::error::ConversionError;

/// Everything produced by reconciling a raw dataset.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub sync: SyncReport,
    pub patches: Vec<PatchReport>,
    pub conversion_errors: BTreeMap<CountryCode, ConversionError>,
}

/// Assemble and synchronize every country.
///
/// Countries are independent, so assembly runs in parallel; results are keyed
/// by country code and do not depend on completion order.
pub fn reconcile_all(raw: &BTreeMap<CountryCode, RawCountry>, patches: &[Patch], base_year: i32) -> Reconciled {
    let assembled: Vec<(CountryCode, AssembledCountry)> = raw
        .par_iter()
        .map(|(code, country)| {
            let _span = info_span!("country", code = %code).entered();
            (code.clone(), assemble_country(code, country, patches, base_year))
        })
        .collect();

    let mut out = Reconciled::default();
    let mut records: BTreeMap<CountryCode, CountryRecord> = BTreeMap::new();
    for (code, country) in assembled {
        out.patches.extend(country.patches);
        if let Some(e) = country.conversion_error {
            out.conversion_errors.insert(code.clone(), e);
        }
        records.insert(code, country.record);
    }

    out.sync = synchronize(&records);
    out
}
