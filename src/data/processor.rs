//! Data Processor Module
//! Row filtering and group/aggregate operations over the exports table.

use super::dataset::{
    f64_values, i32_values, str_values, Dataset, EXPORTS, MONTH, PRODUCT, PRODUCTION, YEAR,
};
use super::record::{Month, UnknownMonth};
use polars::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    UnknownMonth(#[from] UnknownMonth),
}

/// Product and year multi-select state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub products: BTreeSet<String>,
    pub years: BTreeSet<i32>,
}

impl FilterSelection {
    pub fn new<P, Y>(products: P, years: Y) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Y: IntoIterator<Item = i32>,
    {
        Self {
            products: products.into_iter().map(Into::into).collect(),
            years: years.into_iter().collect(),
        }
    }

    /// Every product and every year present in `dataset`.
    pub fn all(dataset: &Dataset) -> PolarsResult<Self> {
        Ok(Self::new(dataset.products()?, dataset.years()?))
    }

    pub fn matches(&self, product: &str, year: i32) -> bool {
        self.products.contains(product) && self.years.contains(&year)
    }
}

/// Summed figures for one (Year, Product) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualTotal {
    pub year: i32,
    pub product: String,
    pub production: f64,
    pub exports: f64,
}

/// Mean figures for one month across all matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAverage {
    pub month: Month,
    pub production: f64,
    pub exports: f64,
}

/// Summed figures for one (Month, Product) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyProductTotal {
    pub month: Month,
    pub product: String,
    pub production: f64,
    pub exports: f64,
}

/// Summed figures for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotal {
    pub product: String,
    pub production: f64,
    pub exports: f64,
}

/// Filtering and aggregation operations.
///
/// Group keys without matching rows never appear in the output.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep rows whose product and year are both selected.
    pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> Result<Dataset, ProcessorError> {
        let df = dataset.frame();
        let products = str_values(df, PRODUCT)?;
        let years = i32_values(df, YEAR)?;

        let mask: BooleanChunked = products
            .iter()
            .zip(&years)
            .map(|(product, &year)| selection.matches(product, year))
            .collect();

        let filtered = df.filter(&mask)?;
        debug!(
            before = df.height(),
            after = filtered.height(),
            "applied product/year filter"
        );
        Ok(Dataset::derived(filtered))
    }

    /// Sum production and exports by (Year, Product), ordered by year then product.
    pub fn annual_totals(dataset: &Dataset) -> Result<Vec<AnnualTotal>, ProcessorError> {
        let out = dataset
            .frame()
            .clone()
            .lazy()
            .group_by_stable([col(YEAR), col(PRODUCT)])
            .agg([col(PRODUCTION).sum(), col(EXPORTS).sum()])
            .collect()?;

        let mut rows: Vec<AnnualTotal> = i32_values(&out, YEAR)?
            .into_iter()
            .zip(str_values(&out, PRODUCT)?)
            .zip(f64_values(&out, PRODUCTION)?)
            .zip(f64_values(&out, EXPORTS)?)
            .map(|(((year, product), production), exports)| AnnualTotal {
                year,
                product,
                production,
                exports,
            })
            .collect();

        rows.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.product.cmp(&b.product)));
        Ok(rows)
    }

    /// Mean production and exports by month, in calendar order.
    pub fn monthly_averages(dataset: &Dataset) -> Result<Vec<MonthlyAverage>, ProcessorError> {
        let out = dataset
            .frame()
            .clone()
            .lazy()
            .group_by_stable([col(MONTH)])
            .agg([col(PRODUCTION).mean(), col(EXPORTS).mean()])
            .collect()?;

        let months = parse_months(&out)?;
        let mut rows: Vec<MonthlyAverage> = months
            .into_iter()
            .zip(f64_values(&out, PRODUCTION)?)
            .zip(f64_values(&out, EXPORTS)?)
            .map(|((month, production), exports)| MonthlyAverage {
                month,
                production,
                exports,
            })
            .collect();

        rows.sort_by_key(|row| row.month);
        Ok(rows)
    }

    /// Sum production and exports by (Month, Product), calendar order then product.
    pub fn monthly_product_totals(
        dataset: &Dataset,
    ) -> Result<Vec<MonthlyProductTotal>, ProcessorError> {
        let out = dataset
            .frame()
            .clone()
            .lazy()
            .group_by_stable([col(MONTH), col(PRODUCT)])
            .agg([col(PRODUCTION).sum(), col(EXPORTS).sum()])
            .collect()?;

        let months = parse_months(&out)?;
        let mut rows: Vec<MonthlyProductTotal> = months
            .into_iter()
            .zip(str_values(&out, PRODUCT)?)
            .zip(f64_values(&out, PRODUCTION)?)
            .zip(f64_values(&out, EXPORTS)?)
            .map(|(((month, product), production), exports)| MonthlyProductTotal {
                month,
                product,
                production,
                exports,
            })
            .collect();

        rows.sort_by(|a, b| a.month.cmp(&b.month).then_with(|| a.product.cmp(&b.product)));
        Ok(rows)
    }

    /// Sum production and exports by product, in order of first appearance.
    pub fn product_totals(dataset: &Dataset) -> Result<Vec<ProductTotal>, ProcessorError> {
        let out = dataset
            .frame()
            .clone()
            .lazy()
            .group_by_stable([col(PRODUCT)])
            .agg([col(PRODUCTION).sum(), col(EXPORTS).sum()])
            .collect()?;

        Ok(str_values(&out, PRODUCT)?
            .into_iter()
            .zip(f64_values(&out, PRODUCTION)?)
            .zip(f64_values(&out, EXPORTS)?)
            .map(|((product, production), exports)| ProductTotal {
                product,
                production,
                exports,
            })
            .collect())
    }
}

fn parse_months(df: &DataFrame) -> Result<Vec<Month>, ProcessorError> {
    Ok(str_values(df, MONTH)?
        .iter()
        .map(|m| m.parse::<Month>())
        .collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::fixtures::sample;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn filter_keeps_only_selected_pairs() {
        let ds = sample();
        let sel = FilterSelection::new(["Tea"], [2022]);
        let filtered = DataProcessor::filter(&ds, &sel).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.exports().unwrap(), vec![120.0, 98.0]);
        // source untouched
        assert_eq!(ds.len(), 8);
    }

    #[test]
    fn filter_with_empty_selection_yields_no_rows() {
        let filtered = DataProcessor::filter(&sample(), &FilterSelection::default()).unwrap();
        assert!(filtered.is_empty());
        assert!(DataProcessor::annual_totals(&filtered).unwrap().is_empty());
        assert!(DataProcessor::monthly_averages(&filtered).unwrap().is_empty());
    }

    #[test]
    fn annual_totals_are_ordered_by_year_then_product() {
        let rows = DataProcessor::annual_totals(&sample()).unwrap();
        let keys: Vec<(i32, &str)> = rows.iter().map(|r| (r.year, r.product.as_str())).collect();
        assert_eq!(
            keys,
            vec![
                (2021, "Coconut"),
                (2021, "Rubber"),
                (2021, "Tea"),
                (2022, "Coconut"),
                (2022, "Rubber"),
                (2022, "Tea"),
            ]
        );
        let tea_2021 = &rows[2];
        assert!(close(tea_2021.production, 42.0));
        assert!(close(tea_2021.exports, 215.0));
    }

    #[test]
    fn monthly_averages_follow_calendar_order() {
        let rows = DataProcessor::monthly_averages(&sample()).unwrap();
        let months: Vec<Month> = rows.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![Month::January, Month::March, Month::December]);

        // January: Coconut 250/60, Tea 22/105, Rubber 7/68
        assert!(close(rows[0].production, (250.0 + 22.0 + 7.0) / 3.0));
        assert!(close(rows[0].exports, (60.0 + 105.0 + 68.0) / 3.0));
    }

    #[test]
    fn monthly_product_totals_have_no_zero_fill() {
        let rows = DataProcessor::monthly_product_totals(&sample()).unwrap();
        assert!(rows
            .iter()
            .all(|r| !(r.month == Month::December && r.product == "Coconut")));
        assert_eq!(rows.first().map(|r| r.month), Some(Month::January));
        assert_eq!(rows.last().map(|r| r.month), Some(Month::December));
        let total: f64 = rows.iter().map(|r| r.exports).sum();
        let expected: f64 = sample().exports().unwrap().iter().sum();
        assert!(close(total, expected));
    }

    #[test]
    fn product_totals_keep_first_appearance_order() {
        let rows = DataProcessor::product_totals(&sample()).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(names, vec!["Tea", "Coconut", "Rubber"]);
        assert!(close(rows[0].exports, 110.0 + 105.0 + 120.0 + 98.0));
    }

    #[test]
    fn full_selection_reproduces_unfiltered_totals() {
        let ds = sample();
        let all = FilterSelection::all(&ds).unwrap();
        let filtered = DataProcessor::filter(&ds, &all).unwrap();
        assert_eq!(
            DataProcessor::annual_totals(&filtered).unwrap(),
            DataProcessor::annual_totals(&ds).unwrap()
        );
    }
}
