//! Applying patch sources on top of a base series.
//!
//! Both merges are pure: they take the base by reference and return a new series.

use std::collections::BTreeMap;

use crate::domain::TimeSeriesPoint;
use crate::series::normalize::{dedup_first, round_value};

/// Write `patch` over `base`, year by year.
///
/// Patch values win on overlap and patch-only years are inserted. Points are
/// inserted in order, base first, so a duplicated year in either input
/// resolves to its last occurrence. The result is sorted ascending by year.
pub fn merge_overwrite(base: &[TimeSeriesPoint], patch: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let mut merged = BTreeMap::new();
    for p in base.iter().chain(patch) {
        merged.insert(p.year, p.value);
    }
    merged.into_iter().map(|(year, value)| TimeSeriesPoint { year, value }).collect()
}

/// Extend `base` past its latest year by compounding percent growth rates.
///
/// Starting from the latest point of `base`, each year in `growth_rates` after
/// it (ascending) appends `previous * (1 + rate / 100)`. The chain carries the
/// unrounded value forward; only the appended points are rounded. An empty
/// `base` is returned unchanged since there is nothing to anchor on.
pub fn merge_growth_extend(base: &[TimeSeriesPoint], growth_rates: &BTreeMap<i32, f64>) -> Vec<TimeSeriesPoint> {
    let mut out = base.to_vec();
    let Some((&last_year, &last_value)) = dedup_first(base).last_key_value() else {
        return out;
    };

    let mut previous = last_value;
    for (&year, &rate) in growth_rates.range(last_year + 1..) {
        previous *= 1.0 + rate / 100.0;
        out.push(TimeSeriesPoint {
            year,
            value: round_value(previous),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, f64)]) -> Vec<TimeSeriesPoint> {
        raw.iter().map(|&(y, v)| TimeSeriesPoint::new(y, v)).collect()
    }

    #[test]
    fn overwrite_prefers_patch_values() {
        let merged = merge_overwrite(&pts(&[(2010, 5.0), (2011, 5.2)]), &pts(&[(2011, 6.0), (2012, 6.1)]));
        assert_eq!(merged, pts(&[(2010, 5.0), (2011, 6.0), (2012, 6.1)]));
    }

    #[test]
    fn overwrite_keeps_last_duplicate_base_year() {
        let merged = merge_overwrite(&pts(&[(2010, 5.0), (2011, 5.5), (2010, 7.0)]), &pts(&[(2011, 6.0)]));
        assert_eq!(merged, pts(&[(2010, 7.0), (2011, 6.0)]));
    }

    #[test]
    fn overwrite_onto_empty_base_is_the_patch() {
        let merged = merge_overwrite(&[], &pts(&[(2012, 6.1), (2011, 6.0)]));
        assert_eq!(merged, pts(&[(2011, 6.0), (2012, 6.1)]));
    }

    #[test]
    fn growth_extension_compounds_sequentially() {
        let rates = BTreeMap::from([(2021, 10.0), (2022, -5.0)]);
        let out = merge_growth_extend(&pts(&[(2019, 90.0), (2020, 100.0)]), &rates);
        assert_eq!(out, pts(&[(2019, 90.0), (2020, 100.0), (2021, 110.0), (2022, 104.5)]));
    }

    #[test]
    fn growth_extension_ignores_years_at_or_before_base_end() {
        let rates = BTreeMap::from([(2019, 50.0), (2020, 50.0), (2021, 0.0)]);
        let out = merge_growth_extend(&pts(&[(2020, 100.0)]), &rates);
        assert_eq!(out, pts(&[(2020, 100.0), (2021, 100.0)]));
    }

    #[test]
    fn growth_extension_uses_latest_year_even_when_unsorted() {
        let rates = BTreeMap::from([(2021, 10.0)]);
        let out = merge_growth_extend(&pts(&[(2020, 200.0), (2018, 1.0)]), &rates);
        assert_eq!(out.last().copied(), Some(TimeSeriesPoint::new(2021, 220.0)));
    }

    #[test]
    fn growth_extension_carries_unrounded_value() {
        // Compounding from the rounded 1.0001 would give 1.0002 for 2022.
        let rates = BTreeMap::from([(2021, 0.006), (2022, 0.006)]);
        let out = merge_growth_extend(&pts(&[(2020, 1.0)]), &rates);
        assert_eq!(out[1].value, 1.0001);
        assert_eq!(out[2].value, 1.0001);
    }

    #[test]
    fn growth_extension_on_empty_base_is_noop() {
        let rates = BTreeMap::from([(2021, 10.0)]);
        assert!(merge_growth_extend(&[], &rates).is_empty());
    }
}
