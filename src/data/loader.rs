//! CSV Data Loader Module
//! Handles CSV file loading and column validation using Polars.

use super::dataset::{Dataset, EXPORTS, MONTH, PRODUCT, PRODUCTION, REQUIRED_COLUMNS, YEAR};
use super::record::UnknownMonth;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Column {column:?} has {count} missing or non-numeric value(s)")]
    InvalidValues { column: String, count: usize },
    #[error(transparent)]
    UnknownMonth(#[from] UnknownMonth),
}

/// Loads the exports CSV with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load and validate an exports CSV file.
    ///
    /// Extra columns are ignored. Any missing column, null cell,
    /// non-numeric or non-finite figure, fractional year or unknown month
    /// name fails the whole load.
    pub fn load_csv(path: &Path) -> Result<Dataset, LoaderError> {
        info!(path = %path.display(), "loading exports CSV");

        let mut lazy = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?;

        let schema = lazy.collect_schema()?;
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| schema.get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns(missing));
        }

        let df = lazy
            .select([
                col(PRODUCT).cast(DataType::String),
                col(YEAR).cast(DataType::Float64),
                col(MONTH).cast(DataType::String),
                col(PRODUCTION).cast(DataType::Float64),
                col(EXPORTS).cast(DataType::Float64),
            ])
            .collect()?;
        debug!(rows = df.height(), "CSV parsed");

        let dataset = Dataset::from_frame(&df)?;
        info!(rows = dataset.len(), "exports dataset ready");
        Ok(dataset)
    }
}
