//! Series normalization: deduplicate, gap-fill by linear interpolation, round.
//!
//! The output of [`normalize`] is the canonical shape every later stage relies on:
//! one point per integer year between the first and last observed year, strictly
//! increasing, values rounded to [`VALUE_DECIMALS`] decimal places.

use std::collections::BTreeMap;

use crate::domain::TimeSeriesPoint;

/// Decimal places kept on every published value.
pub const VALUE_DECIMALS: i32 = 4;

/// Round to [`VALUE_DECIMALS`] decimal places.
pub fn round_value(v: f64) -> f64 {
    let scale = 10f64.powi(VALUE_DECIMALS);
    (v * scale).round() / scale
}

/// Collapse duplicate years, keeping the first occurrence in input order.
///
/// The result is sorted ascending by year.
pub fn dedup_first(points: &[TimeSeriesPoint]) -> BTreeMap<i32, f64> {
    let mut by_year = BTreeMap::new();
    for p in points {
        by_year.entry(p.year).or_insert(p.value);
    }
    by_year
}

/// Produce a gap-free annual series from irregular observations.
///
/// - duplicates: first occurrence wins
/// - missing years: linear interpolation between the nearest known neighbours
/// - empty input yields an empty series; a single observation is returned as is
pub fn normalize(points: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let known = dedup_first(points);

    if known.len() <= 1 {
        return known.into_iter().map(|(year, value)| TimeSeriesPoint { year, value }).collect();
    }

    let known: Vec<(i32, f64)> = known.into_iter().collect();
    let (first_year, _) = known[0];
    let (last_year, _) = known[known.len() - 1];

    let mut out = Vec::with_capacity((last_year - first_year + 1) as usize);
    for pair in known.windows(2) {
        let (y0, v0) = pair[0];
        let (y1, v1) = pair[1];
        let span = f64::from(y1 - y0);
        for year in y0..y1 {
            let value = if year == y0 {
                v0
            } else {
                v0 + (v1 - v0) * f64::from(year - y0) / span
            };
            out.push(TimeSeriesPoint {
                year,
                value: round_value(value),
            });
        }
    }
    let (_, last_value) = known[known.len() - 1];
    out.push(TimeSeriesPoint {
        year: last_year,
        value: round_value(last_value),
    });

    out
}

/// Whether `points` has strictly increasing, consecutive years.
pub fn is_gap_free(points: &[TimeSeriesPoint]) -> bool {
    points.windows(2).all(|w| w[1].year == w[0].year + 1)
}
