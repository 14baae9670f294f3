//! Data module - CSV loading, caching and aggregation

pub mod cache;
mod dataset;
mod loader;
mod processor;
mod record;

pub use cache::load_cached;
pub use dataset::{Dataset, EXPORTS, MONTH, PRODUCT, PRODUCTION, REQUIRED_COLUMNS, YEAR};
pub use loader::{DataLoader, LoaderError};
pub use processor::{
    AnnualTotal, DataProcessor, FilterSelection, MonthlyAverage, MonthlyProductTotal,
    ProcessorError, ProductTotal,
};
pub use record::{Month, Record, UnknownMonth};

#[cfg(test)]
pub(crate) use dataset::fixtures;
