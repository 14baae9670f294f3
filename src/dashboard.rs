//! Dashboard Module
//! Page-level computations over the cached dataset.
//!
//! Every call recomputes from the immutable source dataset; nothing here
//! holds state between interactions.

use crate::charts::{ChartData, ChartRenderer, PieChart, RenderError, TrendCharts};
use crate::data::{
    DataProcessor, Dataset, FilterSelection, LoaderError, ProcessorError, Record, EXPORTS,
    PRODUCTION, YEAR,
};
use crate::stats::{ColumnSummary, PerformanceMetrics, StatsCalculator};
use polars::prelude::PolarsError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Shown instead of charts when a filter selection matches no rows.
pub const NO_DATA_NOTICE: &str =
    "No data available for the selected filters. Please adjust your selection.";

pub const DEFAULT_PREVIEW_ROWS: usize = 20;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Overview page content.
#[derive(Debug, Clone)]
pub struct Overview {
    pub row_count: usize,
    pub preview: Vec<Record>,
    pub summaries: Vec<ColumnSummary>,
    pub export_share: PieChart,
}

/// Options offered by the filter form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub years: Vec<i32>,
}

/// Result of applying a filter selection.
#[derive(Debug, Clone)]
pub enum TrendsOutcome {
    /// The selection matched nothing; show `NO_DATA_NOTICE` and no charts.
    NoData,
    Charts {
        rows: usize,
        charts: Box<TrendCharts>,
    },
}

impl TrendsOutcome {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            TrendsOutcome::NoData => Some(NO_DATA_NOTICE),
            TrendsOutcome::Charts { .. } => None,
        }
    }

    pub fn charts(&self) -> Option<&TrendCharts> {
        match self {
            TrendsOutcome::NoData => None,
            TrendsOutcome::Charts { charts, .. } => Some(&**charts),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    preview_rows: usize,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn overview(&self) -> Result<Overview, DashboardError> {
        let ds = &self.dataset;
        let summaries = vec![
            StatsCalculator::describe(YEAR, &ds.year_values()?),
            StatsCalculator::describe(PRODUCTION, &ds.production()?),
            StatsCalculator::describe(EXPORTS, &ds.exports()?),
        ];
        let totals = DataProcessor::product_totals(ds)?;

        Ok(Overview {
            row_count: ds.len(),
            preview: ds.head(self.preview_rows)?,
            summaries,
            export_share: PieChart::export_share(&totals),
        })
    }

    /// Headline figures over the unfiltered dataset.
    pub fn metrics(&self) -> Result<PerformanceMetrics, DashboardError> {
        let totals = DataProcessor::product_totals(&self.dataset)?;
        Ok(StatsCalculator::performance_metrics(&self.dataset, &totals)?)
    }

    pub fn filter_options(&self) -> Result<FilterOptions, DashboardError> {
        Ok(FilterOptions {
            products: self.dataset.products()?,
            years: self.dataset.years()?,
        })
    }

    /// Every product and every year selected.
    pub fn default_selection(&self) -> Result<FilterSelection, DashboardError> {
        Ok(FilterSelection::all(&self.dataset)?)
    }

    /// Filter, aggregate and build every Trends chart.
    pub fn trends(&self, selection: &FilterSelection) -> Result<TrendsOutcome, DashboardError> {
        let filtered = DataProcessor::filter(&self.dataset, selection)?;
        if filtered.is_empty() {
            warn!(
                products = selection.products.len(),
                years = selection.years.len(),
                "filter selection matched no rows"
            );
            return Ok(TrendsOutcome::NoData);
        }

        let charts = TrendCharts::build(
            &DataProcessor::annual_totals(&filtered)?,
            &DataProcessor::monthly_averages(&filtered)?,
            &DataProcessor::monthly_product_totals(&filtered)?,
            &filtered.records()?,
        );
        info!(rows = filtered.len(), "trend charts rebuilt");

        Ok(TrendsOutcome::Charts {
            rows: filtered.len(),
            charts: Box::new(charts),
        })
    }

    /// Write the export-share pie and, when `selection` matches rows, every
    /// Trends chart into `dir` as PNG files.
    pub fn export_pngs(
        &self,
        selection: &FilterSelection,
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<(TrendsOutcome, Vec<PathBuf>), DashboardError> {
        let totals = DataProcessor::product_totals(&self.dataset)?;
        let mut charts = vec![ChartData::Pie(PieChart::export_share(&totals))];

        let outcome = self.trends(selection)?;
        if let Some(trends) = outcome.charts() {
            charts.extend(trends.all());
        }

        let paths = ChartRenderer::export_all(&charts, dir, width, height)?;
        Ok((outcome, paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Month;

    fn dashboard() -> Dashboard {
        let rows = [
            ("Tea", 2020, Month::February, 20.0, 100.0),
            ("Coconut", 2020, Month::January, 250.0, 150.0),
            ("Rubber", 2021, Month::January, 7.0, 50.0),
        ];
        let records: Vec<Record> = rows
            .iter()
            .map(|&(product, year, month, production, exports)| Record {
                product: product.to_string(),
                year,
                month,
                production,
                exports,
            })
            .collect();
        Dashboard::new(Arc::new(Dataset::from_records(&records).unwrap()))
    }

    #[test]
    fn metrics_report_coconut_as_top_export() {
        let m = dashboard().metrics().unwrap();
        assert_eq!(m.total_production, 277.0);
        assert_eq!(m.total_exports, 300.0);
        let top = m.top_product.unwrap();
        assert_eq!(top.product, "Coconut");
        assert_eq!(top.exports, 150.0);
    }

    #[test]
    fn empty_selection_yields_notice_and_no_charts() {
        let d = dashboard();
        let outcome = d
            .trends(&FilterSelection::new(["Tea"], [1999]))
            .unwrap();
        assert_eq!(outcome.notice(), Some(NO_DATA_NOTICE));
        assert!(outcome.charts().is_none());
    }

    #[test]
    fn overview_describes_three_numeric_columns() {
        let o = dashboard().with_preview_rows(2).overview().unwrap();
        assert_eq!(o.row_count, 3);
        assert_eq!(o.preview.len(), 2);
        let columns: Vec<&str> = o.summaries.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(columns, vec![YEAR, PRODUCTION, EXPORTS]);
        assert_eq!(o.export_share.total(), 300.0);
    }

    #[test]
    fn filter_options_are_products_then_sorted_years() {
        let opts = dashboard().filter_options().unwrap();
        assert_eq!(opts.products, vec!["Tea", "Coconut", "Rubber"]);
        assert_eq!(opts.years, vec![2020, 2021]);
    }
}
