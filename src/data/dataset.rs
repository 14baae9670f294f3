//! Dataset Module
//! Immutable in-memory table of export records backed by a Polars DataFrame.

use super::record::{Month, Record};
use super::LoaderError;
use polars::prelude::*;

pub const PRODUCT: &str = "Product";
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const PRODUCTION: &str = "Production (Mn.Kg/Nuts)";
pub const EXPORTS: &str = "Exports (US Mn)";

/// Columns every exports CSV must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = [PRODUCT, YEAR, MONTH, PRODUCTION, EXPORTS];

/// Validated exports table.
///
/// Columns are always the five `REQUIRED_COLUMNS` with types
/// String / Int32 / String (canonical month name) / Float64 / Float64.
/// Filtering produces a new `Dataset`; the source is never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    /// Build a dataset from typed records.
    pub fn from_records(records: &[Record]) -> PolarsResult<Self> {
        let df = DataFrame::new(vec![
            Column::new(
                PRODUCT.into(),
                records.iter().map(|r| r.product.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                YEAR.into(),
                records.iter().map(|r| r.year).collect::<Vec<i32>>(),
            ),
            Column::new(
                MONTH.into(),
                records
                    .iter()
                    .map(|r| r.month.name().to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                PRODUCTION.into(),
                records.iter().map(|r| r.production).collect::<Vec<f64>>(),
            ),
            Column::new(
                EXPORTS.into(),
                records.iter().map(|r| r.exports).collect::<Vec<f64>>(),
            ),
        ])?;
        Ok(Self { df })
    }

    /// Validate a frame already cast to String / Float64 / String / Float64 / Float64.
    ///
    /// Null cells (missing or non-numeric input), non-finite figures,
    /// fractional years and unknown month names are rejected. Month
    /// spellings are normalised to full names.
    pub fn from_frame(df: &DataFrame) -> Result<Self, LoaderError> {
        for name in REQUIRED_COLUMNS {
            let nulls = df.column(name)?.as_materialized_series().null_count();
            if nulls > 0 {
                return Err(LoaderError::InvalidValues {
                    column: name.to_string(),
                    count: nulls,
                });
            }
        }

        for name in [PRODUCTION, EXPORTS] {
            let bad = f64_values(df, name)?
                .iter()
                .filter(|v| !v.is_finite())
                .count();
            if bad > 0 {
                return Err(LoaderError::InvalidValues {
                    column: name.to_string(),
                    count: bad,
                });
            }
        }

        let raw_years: Vec<f64> = df
            .column(YEAR)?
            .cast(&DataType::Float64)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let year_range = f64::from(i32::MIN)..=f64::from(i32::MAX);
        let integral = |y: &f64| y.fract() == 0.0 && year_range.contains(y);
        let bad = raw_years.iter().filter(|y| !integral(y)).count();
        if bad > 0 {
            return Err(LoaderError::InvalidValues {
                column: YEAR.to_string(),
                count: bad,
            });
        }
        let years = raw_years.into_iter().map(|y| y as i32).collect();

        let mut records = rows(df, years)?;
        for record in &mut records {
            record.product = record.product.trim().to_string();
        }
        Ok(Self::from_records(&records)?)
    }

    /// Wrap a frame derived from an existing dataset (same schema).
    pub(crate) fn derived(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Distinct products in order of first appearance.
    pub fn products(&self) -> PolarsResult<Vec<String>> {
        let mut seen: Vec<String> = Vec::new();
        for product in str_values(&self.df, PRODUCT)? {
            if !seen.contains(&product) {
                seen.push(product);
            }
        }
        Ok(seen)
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> PolarsResult<Vec<i32>> {
        let mut years = i32_values(&self.df, YEAR)?;
        years.sort_unstable();
        years.dedup();
        Ok(years)
    }

    pub fn production(&self) -> PolarsResult<Vec<f64>> {
        f64_values(&self.df, PRODUCTION)
    }

    pub fn exports(&self) -> PolarsResult<Vec<f64>> {
        f64_values(&self.df, EXPORTS)
    }

    pub fn year_values(&self) -> PolarsResult<Vec<f64>> {
        Ok(i32_values(&self.df, YEAR)?
            .into_iter()
            .map(f64::from)
            .collect())
    }

    /// All rows as typed records, in file order.
    pub fn records(&self) -> Result<Vec<Record>, LoaderError> {
        rows(&self.df, i32_values(&self.df, YEAR)?)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Result<Vec<Record>, LoaderError> {
        Dataset::derived(self.df.head(Some(n))).records()
    }
}

/// Zip the frame's columns into records, taking years from `years`.
fn rows(df: &DataFrame, years: Vec<i32>) -> Result<Vec<Record>, LoaderError> {
    let months = str_values(df, MONTH)?
        .iter()
        .map(|m| m.parse::<Month>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(str_values(df, PRODUCT)?
        .into_iter()
        .zip(years)
        .zip(months)
        .zip(f64_values(df, PRODUCTION)?)
        .zip(f64_values(df, EXPORTS)?)
        .map(|((((product, year), month), production), exports)| Record {
            product,
            year,
            month,
            production,
            exports,
        })
        .collect())
}

pub(crate) fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let series = df.column(name)?.as_materialized_series();
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

pub(crate) fn i32_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<i32>> {
    let series = df.column(name)?.as_materialized_series();
    Ok(series.i32()?.into_iter().map(|v| v.unwrap_or_default()).collect())
}

pub(crate) fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let series = df.column(name)?.as_materialized_series();
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}


#[cfg(test)]
mod tests {
    use super::fixtures::{record, sample};
    use super::*;

    #[test]
    fn products_keep_first_appearance_order() {
        assert_eq!(sample().products().unwrap(), vec!["Tea", "Coconut", "Rubber"]);
    }

    #[test]
    fn years_are_sorted_and_unique() {
        assert_eq!(sample().years().unwrap(), vec![2021, 2022]);
    }

    #[test]
    fn records_round_trip_in_file_order() {
        let rows = sample().records().unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[1], record("Coconut", 2021, Month::January, 250.0, 60.0));
        assert_eq!(sample().head(3).unwrap().len(), 3);
    }

    #[test]
    fn from_frame_normalises_month_spelling() {
        let df = DataFrame::new(vec![
            Column::new(PRODUCT.into(), vec![" Tea "]),
            Column::new(YEAR.into(), vec![2020i32]),
            Column::new(MONTH.into(), vec!["feb"]),
            Column::new(PRODUCTION.into(), vec![1.5f64]),
            Column::new(EXPORTS.into(), vec![2.5f64]),
        ])
        .unwrap();
        let ds = Dataset::from_frame(&df).unwrap();
        assert_eq!(
            ds.records().unwrap(),
            vec![record("Tea", 2020, Month::February, 1.5, 2.5)]
        );
    }

    #[test]
    fn from_frame_rejects_unknown_month() {
        let df = DataFrame::new(vec![
            Column::new(PRODUCT.into(), vec!["Tea"]),
            Column::new(YEAR.into(), vec![2020i32]),
            Column::new(MONTH.into(), vec!["Thermidor"]),
            Column::new(PRODUCTION.into(), vec![1.0f64]),
            Column::new(EXPORTS.into(), vec![1.0f64]),
        ])
        .unwrap();
        assert!(matches!(
            Dataset::from_frame(&df),
            Err(LoaderError::UnknownMonth(_))
        ));
    }

    #[test]
    fn from_frame_rejects_nulls() {
        let df = DataFrame::new(vec![
            Column::new(PRODUCT.into(), vec!["Tea", "Rubber"]),
            Column::new(YEAR.into(), vec![2020i32, 2020]),
            Column::new(MONTH.into(), vec!["May", "June"]),
            Column::new(PRODUCTION.into(), vec![Some(1.0f64), None]),
            Column::new(EXPORTS.into(), vec![1.0f64, 2.0]),
        ])
        .unwrap();
        match Dataset::from_frame(&df) {
            Err(LoaderError::InvalidValues { column, count }) => {
                assert_eq!(column, PRODUCTION);
                assert_eq!(count, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn from_frame_rejects_non_finite_figures() {
        let df = DataFrame::new(vec![
            Column::new(PRODUCT.into(), vec!["Tea", "Coconut"]),
            Column::new(YEAR.into(), vec![2020i32, 2021]),
            Column::new(MONTH.into(), vec!["March", "January"]),
            Column::new(PRODUCTION.into(), vec![20.0f64, 250.0]),
            Column::new(EXPORTS.into(), vec![f64::INFINITY, f64::NAN]),
        ])
        .unwrap();
        match Dataset::from_frame(&df) {
            Err(LoaderError::InvalidValues { column, count }) => {
                assert_eq!(column, EXPORTS);
                assert_eq!(count, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn from_frame_rejects_fractional_year() {
        let df = DataFrame::new(vec![
            Column::new(PRODUCT.into(), vec!["Tea", "Tea"]),
            Column::new(YEAR.into(), vec![2020.0f64, 2020.7]),
            Column::new(MONTH.into(), vec!["March", "April"]),
            Column::new(PRODUCTION.into(), vec![20.0f64, 21.0]),
            Column::new(EXPORTS.into(), vec![110.0f64, 111.0]),
        ])
        .unwrap();
        match Dataset::from_frame(&df) {
            Err(LoaderError::InvalidValues { column, count }) => {
                assert_eq!(column, YEAR);
                assert_eq!(count, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn from_frame_accepts_whole_float_years() {
        let df = DataFrame::new(vec![
            Column::new(PRODUCT.into(), vec!["Tea"]),
            Column::new(YEAR.into(), vec![2021.0f64]),
            Column::new(MONTH.into(), vec!["May"]),
            Column::new(PRODUCTION.into(), vec![1.0f64]),
            Column::new(EXPORTS.into(), vec![2.0f64]),
        ])
        .unwrap();
        assert_eq!(Dataset::from_frame(&df).unwrap().years().unwrap(), vec![2021]);
    }
}
