//! Range synchronization: clip every series of a country to the window shared
//! by all core metrics, or reject the country outright.
//!
//! A country is either emitted whole or not at all. The steps per country:
//! 1. every core metric must be present and non-empty
//! 2. each metric is normalized on its own (gap-free, rounded)
//! 3. the window is the intersection of the core metrics' covered years
//! 4. all metrics (core or not) are clipped to that window

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{CountryCode, CountryRecord, Dataset, Metric, TimeSeriesPoint, YearWindow};
use crate::error::RejectReason;
use crate::series::normalize;

/// An accepted country together with its window.
#[derive(Debug, Clone, PartialEq)]
pub struct Synchronized {
    pub record: CountryRecord,
    pub window: YearWindow,
}

/// Per-country synchronizer outcomes.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub accepted: BTreeMap<CountryCode, Synchronized>,
    pub rejected: BTreeMap<CountryCode, RejectReason>,
}

impl SyncReport {
    pub fn record(&mut self, code: CountryCode, outcome: Result<Synchronized, RejectReason>) {
        match outcome {
            Ok(sync) => {
                self.accepted.insert(code, sync);
            }
            Err(reason) => {
                self.rejected.insert(code, reason);
            }
        }
    }

    /// The consolidated dataset (accepted countries only).
    pub fn dataset(&self) -> Dataset {
        self.accepted
            .iter()
            .map(|(code, sync)| (code.clone(), sync.record.clone()))
            .collect()
    }
}

/// Synchronize every country independently.
pub fn synchronize(countries: &BTreeMap<CountryCode, CountryRecord>) -> SyncReport {
    let outcomes: Vec<(CountryCode, Result<Synchronized, RejectReason>)> = countries
        .par_iter()
        .map(|(code, record)| (code.clone(), synchronize_country(code, record)))
        .collect();

    let mut report = SyncReport::default();
    for (code, outcome) in outcomes {
        report.record(code, outcome);
    }
    report
}

/// Synchronize one country's series to the window shared by its core metrics.
pub fn synchronize_country(code: &str, record: &CountryRecord) -> Result<Synchronized, RejectReason> {
    let missing: Vec<Metric> = Metric::CORE.into_iter().filter(|m| !record.has(*m)).collect();
    if !missing.is_empty() {
        let reason = RejectReason::MissingCoreMetric { missing };
        info!(country = code, reason = reason.code(), "skipped: {reason}");
        return Err(reason);
    }

    let normalized: BTreeMap<Metric, Vec<TimeSeriesPoint>> = Metric::ALL
        .into_iter()
        .map(|m| (m, record.get(m).map(normalize).unwrap_or_default()))
        .collect();

    let common = core_year_intersection(&normalized);
    let (Some(&start), Some(&end)) = (common.first(), common.last()) else {
        let reason = empty_intersection_reason(&normalized);
        info!(country = code, reason = reason.code(), "skipped: {reason}");
        return Err(reason);
    };
    let window = YearWindow { start, end };

    let mut clipped = CountryRecord::new();
    for (metric, series) in normalized {
        let mut filtered: Vec<TimeSeriesPoint> = series.into_iter().filter(|p| window.contains(p.year)).collect();
        if metric.is_core() && filtered.is_empty() {
            let reason = RejectReason::PostFilterEmpty { metric };
            info!(country = code, reason = reason.code(), "skipped: {reason}");
            return Err(reason);
        }
        filtered.sort_by_key(|p| p.year);
        clipped.insert(metric, filtered);
    }

    info!(country = code, %window, years = common.len(), "synchronized");
    Ok(Synchronized {
        record: clipped,
        window,
    })
}

fn core_year_intersection(series: &BTreeMap<Metric, Vec<TimeSeriesPoint>>) -> BTreeSet<i32> {
    let mut common: Option<BTreeSet<i32>> = None;
    for metric in Metric::CORE {
        let years: BTreeSet<i32> = series
            .get(&metric)
            .map(|s| s.iter().map(|p| p.year).collect())
            .unwrap_or_default();
        common = Some(match common {
            None => years,
            Some(mut set) => {
                set.retain(|y| years.contains(y));
                set
            }
        });
    }
    common.unwrap_or_default()
}

/// Name the core metric that starts latest and the one that ends earliest.
fn empty_intersection_reason(series: &BTreeMap<Metric, Vec<TimeSeriesPoint>>) -> RejectReason {
    let bounds: Vec<(Metric, i32, i32)> = Metric::CORE
        .into_iter()
        .filter_map(|m| {
            let s = series.get(&m)?;
            Some((m, s.first()?.year, s.last()?.year))
        })
        .collect();
    debug!(?bounds, "core metric ranges do not overlap");

    let latest_start = bounds.iter().max_by_key(|(_, start, _)| *start).map(|(m, _, _)| *m);
    let earliest_end = bounds.iter().min_by_key(|(_, _, end)| *end).map(|(m, _, _)| *m);
    RejectReason::EmptyIntersection {
        latest_start: latest_start.unwrap_or(Metric::CORE[0]),
        earliest_end: earliest_end.unwrap_or(Metric::CORE[0]),
    }
}
