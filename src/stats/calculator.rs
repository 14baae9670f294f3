//! Statistics Calculator Module
//! Headline metrics, top performer and descriptive statistics.

use crate::data::{Dataset, ProductTotal};
use polars::prelude::PolarsResult;
use statrs::statistics::Statistics;

/// Product with the largest summed exports.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPerformer {
    pub product: String,
    pub exports: f64,
}

/// Headline figures over the whole dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub total_production: f64,
    pub total_exports: f64,
    pub top_product: Option<TopPerformer>,
}

impl PerformanceMetrics {
    pub fn production_label(&self) -> String {
        format!("{} Mn.Kg/Nuts", group_thousands(self.total_production))
    }

    pub fn exports_label(&self) -> String {
        format!("${}M", group_thousands(self.total_exports))
    }

    pub fn top_product_label(&self) -> String {
        match &self.top_product {
            Some(top) => format!("{} (${}M)", top.product, group_thousands(top.exports)),
            None => "-".to_string(),
        }
    }
}

/// describe()-style summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            column: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// argmax of summed exports; equal totals resolve to the alphabetically first product.
    pub fn top_performer(totals: &[ProductTotal]) -> Option<TopPerformer> {
        totals
            .iter()
            .filter(|t| !t.exports.is_nan())
            .max_by(|a, b| {
                a.exports
                    .total_cmp(&b.exports)
                    .then_with(|| b.product.cmp(&a.product))
            })
            .map(|t| TopPerformer {
                product: t.product.clone(),
                exports: t.exports,
            })
    }

    pub fn performance_metrics(
        dataset: &Dataset,
        totals: &[ProductTotal],
    ) -> PolarsResult<PerformanceMetrics> {
        Ok(PerformanceMetrics {
            total_production: dataset.production()?.iter().sum(),
            total_exports: dataset.exports()?.iter().sum(),
            top_product: Self::top_performer(totals),
        })
    }

    /// Compute describe()-style statistics for an array of values.
    pub fn describe(column: &str, values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary {
                column: column.to_string(),
                ..Default::default()
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let std = if n > 1 { values.iter().std_dev() } else { f64::NAN };

        ColumnSummary {
            column: column.to_string(),
            count: n,
            mean: values.iter().mean(),
            std,
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}

/// Truncate to an integer and insert thousands separators: 12345.9 -> "12,345".
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let truncated = value.trunc() as i64;
    let digits = truncated.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if truncated < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(product: &str, exports: f64) -> ProductTotal {
        ProductTotal {
            product: product.to_string(),
            production: 0.0,
            exports,
        }
    }

    #[test]
    fn top_performer_picks_largest_exports() {
        let totals = [total("Tea", 100.0), total("Coconut", 150.0), total("Rubber", 50.0)];
        assert_eq!(
            StatsCalculator::top_performer(&totals),
            Some(TopPerformer {
                product: "Coconut".to_string(),
                exports: 150.0
            })
        );
    }

    #[test]
    fn top_performer_ties_break_alphabetically() {
        let totals = [total("Tea", 150.0), total("Rubber", 150.0), total("Coconut", 20.0)];
        assert_eq!(
            StatsCalculator::top_performer(&totals).map(|t| t.product),
            Some("Rubber".to_string())
        );
    }

    #[test]
    fn top_performer_of_nothing_is_none() {
        assert_eq!(StatsCalculator::top_performer(&[]), None);
    }

    #[test]
    fn describe_matches_numpy_linear_percentiles() {
        let s = StatsCalculator::describe("x", &[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert!((s.p25 - 1.75).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.p75 - 3.25).abs() < 1e-12);
        // sample std of 1..4
        assert!((s.std - 1.290_994_448_735_805_6).abs() < 1e-9);
    }

    #[test]
    fn describe_empty_and_single() {
        let empty = StatsCalculator::describe("x", &[]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_nan());

        let one = StatsCalculator::describe("x", &[7.0]);
        assert_eq!(one.median, 7.0);
        assert!(one.std.is_nan());
    }

    #[test]
    fn thousands_grouping_truncates() {
        assert_eq!(group_thousands(0.4), "0");
        assert_eq!(group_thousands(999.9), "999");
        assert_eq!(group_thousands(1234.5), "1,234");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
        assert_eq!(group_thousands(-4321.0), "-4,321");
    }

    #[test]
    fn metric_labels() {
        let m = PerformanceMetrics {
            total_production: 12345.6,
            total_exports: 6789.0,
            top_product: Some(TopPerformer {
                product: "Coconut".into(),
                exports: 1500.0,
            }),
        };
        assert_eq!(m.production_label(), "12,345 Mn.Kg/Nuts");
        assert_eq!(m.exports_label(), "$6,789M");
        assert_eq!(m.top_product_label(), "Coconut ($1,500M)");
    }
}
