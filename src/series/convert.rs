//! Nominal → real conversion using a CPI series.

use crate::domain::TimeSeriesPoint;
use crate::series::normalize::dedup_first;

/// CPI level assumed when the base year is not in the CPI series.
pub const DEFAULT_CPI_BASE: f64 = 100.0;

/// CPI level at `base_year`, falling back to [`DEFAULT_CPI_BASE`].
///
/// Duplicate CPI years resolve to their first occurrence.
pub fn cpi_base(cpi: &[TimeSeriesPoint], base_year: i32) -> f64 {
    dedup_first(cpi).get(&base_year).copied().unwrap_or(DEFAULT_CPI_BASE)
}

/// Deflate `nominal` by `cpi`, expressing values in `base_year` prices.
///
/// Only years present in both inputs are kept (inner join), so the result can
/// have gaps; it is re-normalized downstream. Values are not rounded here.
/// Either input being empty gives an empty result.
pub fn to_real(nominal: &[TimeSeriesPoint], cpi: &[TimeSeriesPoint], base_year: i32) -> Vec<TimeSeriesPoint> {
    if nominal.is_empty() || cpi.is_empty() {
        return Vec::new();
    }

    let base = cpi_base(cpi, base_year);
    let cpi = dedup_first(cpi);

    dedup_first(nominal)
        .into_iter()
        .filter_map(|(year, value)| {
            let index = cpi.get(&year)? / base;
            let real = value / index;
            real.is_finite().then_some(TimeSeriesPoint { year, value: real })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, f64)]) -> Vec<TimeSeriesPoint> {
        raw.iter().map(|&(y, v)| TimeSeriesPoint::new(y, v)).collect()
    }

    #[test]
    fn rebases_to_cpi_at_base_year() {
        let nominal = pts(&[(2014, 1000.0), (2015, 1100.0), (2016, 1210.0)]);
        let cpi = pts(&[(2014, 90.0), (2015, 110.0), (2016, 121.0)]);
        let real = to_real(&nominal, &cpi, 2015);
        assert_eq!(real.len(), 3);
        assert!((real[0].value - 1000.0 / (90.0 / 110.0)).abs() < 1e-9);
        assert!((real[1].value - 1100.0).abs() < 1e-9);
        assert!((real[2].value - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_base_year_defaults_to_one_hundred() {
        let nominal = pts(&[(2000, 500.0), (2001, 600.0)]);
        let cpi = pts(&[(2000, 50.0), (2001, 200.0)]);
        assert_eq!(cpi_base(&cpi, 2015), DEFAULT_CPI_BASE);
        let real = to_real(&nominal, &cpi, 2015);
        assert_eq!(real, pts(&[(2000, 1000.0), (2001, 300.0)]));
    }

    #[test]
    fn keeps_only_years_in_both_series() {
        let nominal = pts(&[(1999, 1.0), (2000, 2.0), (2002, 3.0)]);
        let cpi = pts(&[(2000, 100.0), (2001, 100.0), (2002, 100.0), (2003, 100.0)]);
        let years: Vec<i32> = to_real(&nominal, &cpi, 2015).iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2000, 2002]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let cpi = pts(&[(2000, 100.0)]);
        assert!(to_real(&[], &cpi, 2015).is_empty());
        assert!(to_real(&cpi, &[], 2015).is_empty());
    }

    #[test]
    fn zero_cpi_years_are_dropped() {
        let nominal = pts(&[(2000, 10.0), (2001, 10.0)]);
        let cpi = pts(&[(2000, 0.0), (2001, 100.0)]);
        let real = to_real(&nominal, &cpi, 2015);
        assert_eq!(real, pts(&[(2001, 10.0)]));
    }
}
