//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed between pipeline stages as plain values
//! - exported to JSON for downstream consumers
//! - constructed directly in tests without any I/O

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// ISO-3 country code (e.g. `"AUS"`).
pub type CountryCode = String;

/// A single annual observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub year: i32,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Output metrics carried by every reconciled country.
///
/// The serialized names are fixed: downstream consumers key on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    RealHousePriceIndex,
    RentPriceIndex,
    RealIncome,
    MortgageRate,
    NumberOfHouseholds,
}

impl Metric {
    /// Metrics whose presence and overlapping range gate inclusion of a country.
    pub const CORE: [Metric; 3] = [Metric::RealHousePriceIndex, Metric::RealIncome, Metric::MortgageRate];

    /// Every output metric: the core set plus the non-gating extras.
    pub const ALL: [Metric; 5] = [
        Metric::RealHousePriceIndex,
        Metric::RealIncome,
        Metric::MortgageRate,
        Metric::RentPriceIndex,
        Metric::NumberOfHouseholds,
    ];

    pub fn is_core(self) -> bool {
        Self::CORE.contains(&self)
    }

    /// Field name used in the exported dataset.
    pub fn field_name(self) -> &'static str {
        match self {
            Metric::RealHousePriceIndex => "realHousePriceIndex",
            Metric::RentPriceIndex => "rentPriceIndex",
            Metric::RealIncome => "realIncome",
            Metric::MortgageRate => "mortgageRate",
            Metric::NumberOfHouseholds => "numberOfHouseholds",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Metrics as published by the statistical agency, before unit conversion.
///
/// `NominalIncome` and `Cpi` never reach the output; they are combined into
/// [`Metric::RealIncome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceMetric {
    RealHousePriceIndex,
    RentPriceIndex,
    NominalIncome,
    Cpi,
    NumberOfHouseholds,
    MortgageRate,
}

impl SourceMetric {
    /// The output metric this raw series is copied into unchanged, if any.
    pub fn passthrough(self) -> Option<Metric> {
        match self {
            SourceMetric::RealHousePriceIndex => Some(Metric::RealHousePriceIndex),
            SourceMetric::RentPriceIndex => Some(Metric::RentPriceIndex),
            SourceMetric::NumberOfHouseholds => Some(Metric::NumberOfHouseholds),
            SourceMetric::MortgageRate => Some(Metric::MortgageRate),
            SourceMetric::NominalIncome | SourceMetric::Cpi => None,
        }
    }

    /// Whether losing this source can leave every country without a core metric.
    pub fn feeds_core(self) -> bool {
        match self {
            SourceMetric::NominalIncome | SourceMetric::Cpi => true,
            other => other.passthrough().is_some_and(Metric::is_core),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceMetric::RealHousePriceIndex => "realHousePriceIndex",
            SourceMetric::RentPriceIndex => "rentPriceIndex",
            SourceMetric::NominalIncome => "nominalIncome",
            SourceMetric::Cpi => "cpi",
            SourceMetric::NumberOfHouseholds => "numberOfHouseholds",
            SourceMetric::MortgageRate => "mortgageRate",
        }
    }
}

impl fmt::Display for SourceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated row from a raw source file.
///
/// Rows that cannot be represented here never make it past ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub country: CountryCode,
    pub year: i32,
    pub value: f64,
}

/// Raw, unreconciled series for one country, in source file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCountry {
    pub series: BTreeMap<SourceMetric, Vec<TimeSeriesPoint>>,
}

impl RawCountry {
    pub fn get(&self, metric: SourceMetric) -> Option<&[TimeSeriesPoint]> {
        self.series.get(&metric).map(Vec::as_slice)
    }

    pub fn push(&mut self, metric: SourceMetric, point: TimeSeriesPoint) {
        self.series.entry(metric).or_default().push(point);
    }
}

/// All series for one country, keyed by output metric.
///
/// Serializes as a JSON object with the fixed metric field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryRecord {
    series: BTreeMap<Metric, Vec<TimeSeriesPoint>>,
}

impl CountryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: Metric) -> Option<&[TimeSeriesPoint]> {
        self.series.get(&metric).map(Vec::as_slice)
    }

    pub fn insert(&mut self, metric: Metric, points: Vec<TimeSeriesPoint>) {
        self.series.insert(metric, points);
    }

    /// Whether `metric` is present with at least one point.
    pub fn has(&self, metric: Metric) -> bool {
        self.get(metric).is_some_and(|s| !s.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &[TimeSeriesPoint])> {
        self.series.iter().map(|(m, s)| (*m, s.as_slice()))
    }
}

impl FromIterator<(Metric, Vec<TimeSeriesPoint>)> for CountryRecord {
    fn from_iter<I: IntoIterator<Item = (Metric, Vec<TimeSeriesPoint>)>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

/// Inclusive year range shared by all core metrics of an accepted country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Number of years in the window.
    pub fn year_count(&self) -> usize {
        (self.end - self.start + 1).max(0) as usize
    }
}

impl fmt::Display for YearWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The consolidated output: country code → reconciled record.
pub type Dataset = BTreeMap<CountryCode, CountryRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_serializes_with_fixed_field_names() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.field_name()));
        }
    }

    #[test]
    fn core_metrics_are_a_subset_of_all() {
        for metric in Metric::CORE {
            assert!(Metric::ALL.contains(&metric));
            assert!(metric.is_core());
        }
        assert!(!Metric::RentPriceIndex.is_core());
        assert!(!Metric::NumberOfHouseholds.is_core());
    }

    #[test]
    fn income_inputs_feed_core_but_rent_does_not() {
        assert!(SourceMetric::NominalIncome.feeds_core());
        assert!(SourceMetric::Cpi.feeds_core());
        assert!(SourceMetric::MortgageRate.feeds_core());
        assert!(!SourceMetric::RentPriceIndex.feeds_core());
        assert_eq!(SourceMetric::Cpi.passthrough(), None);
    }

    #[test]
    fn window_length_is_inclusive() {
        let w = YearWindow { start: 2000, end: 2015 };
        assert_eq!(w.year_count(), 16);
        assert!(w.contains(2000) && w.contains(2015));
        assert!(!w.contains(2016));
        assert_eq!(w.to_string(), "2000-2015");
    }
}
