//! Export the reconciled dataset to JSON.
//!
//! Shape: `{ "<ISO3>": { "realHousePriceIndex": [{"year": 2000, "value": 1.0}, ...], ... } }`.
//! Every country carries all five metric fields; a metric with no data is `[]`.

use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::path::Path;

use serde::Serialize;

use crate::domain::{CountryRecord, Dataset, Metric, TimeSeriesPoint};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountryData<'a> {
    real_house_price_index: &'a [TimeSeriesPoint],
    rent_price_index: &'a [TimeSeriesPoint],
    real_income: &'a [TimeSeriesPoint],
    mortgage_rate: &'a [TimeSeriesPoint],
    number_of_households: &'a [TimeSeriesPoint],
}

impl<'a> From<&'a CountryRecord> for CountryData<'a> {
    fn from(record: &'a CountryRecord) -> Self {
        let get = move |m: Metric| record.get(m).unwrap_or_default();
        Self {
            real_house_price_index: get(Metric::RealHousePriceIndex),
            rent_price_index: get(Metric::RentPriceIndex),
            real_income: get(Metric::RealIncome),
            mortgage_rate: get(Metric::MortgageRate),
            number_of_households: get(Metric::NumberOfHouseholds),
        }
    }
}

fn country_view(dataset: &Dataset) -> BTreeMap<&str, CountryData<'_>> {
    dataset
        .iter()
        .map(|(code, record)| (code.as_str(), CountryData::from(record)))
        .collect()
}

/// Write the dataset JSON file, creating parent directories as needed.
pub fn write_dataset_json(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", parent.display())))?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create output JSON '{}': {e}", path.display())))?;

    let view = country_view(dataset);
    serde_json::to_writer_pretty(file, &view)
        .map_err(|e| AppError::new(2, format!("Failed to write output JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_country_carries_all_metric_fields() {
        let record: CountryRecord = [(Metric::RealIncome, vec![TimeSeriesPoint::new(2000, 1.5)])]
            .into_iter()
            .collect();
        let dataset = Dataset::from([("AUS".to_string(), record)]);

        let value = serde_json::to_value(country_view(&dataset)).unwrap();
        let aus = &value["AUS"];
        for metric in Metric::ALL {
            assert!(aus[metric.field_name()].is_array(), "missing {metric}");
        }
        assert_eq!(aus["realIncome"][0]["year"], 2000);
        assert_eq!(aus["realIncome"][0]["value"], 1.5);
        assert_eq!(aus["mortgageRate"].as_array().unwrap().len(), 0);
    }
}
