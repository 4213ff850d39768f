use proptest::prelude::*;

use housing_recon::domain::TimeSeriesPoint;
use housing_recon::series::{is_gap_free, normalize};

fn raw_points() -> impl Strategy<Value = Vec<TimeSeriesPoint>> {
    prop::collection::vec((1950i32..2030, -1.0e6f64..1.0e6), 0..40)
        .prop_map(|raw| raw.into_iter().map(|(y, v)| TimeSeriesPoint::new(y, v)).collect())
}

proptest! {
    #[test]
    fn output_is_gap_free_and_spans_input_range(points in raw_points()) {
        let out = normalize(&points);
        prop_assert!(is_gap_free(&out));
        if let (Some(min), Some(max)) = (points.iter().map(|p| p.year).min(), points.iter().map(|p| p.year).max()) {
            prop_assert_eq!(out.first().map(|p| p.year), Some(min));
            prop_assert_eq!(out.last().map(|p| p.year), Some(max));
            prop_assert_eq!(out.len(), (max - min + 1) as usize);
        } else {
            prop_assert!(out.is_empty());
        }
    }

    #[test]
    fn normalizing_is_idempotent(points in raw_points()) {
        let once = normalize(&points);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn observed_years_keep_their_first_value(points in raw_points()) {
        let out = normalize(&points);
        if out.len() > 1 {
            for p in &out {
                if let Some(first) = points.iter().find(|q| q.year == p.year) {
                    prop_assert!((p.value - first.value).abs() <= 5.1e-5);
                }
            }
        }
    }
}
