//! Chart Models
//! Backend-independent data for the five dashboard chart types.
//!
//! Both the interactive plotter and the static renderer draw from these
//! structs, so every figure shown on screen is the figure written to PNG.

use crate::data::{
    AnnualTotal, Month, MonthlyAverage, MonthlyProductTotal, ProductTotal, Record, EXPORTS,
    PRODUCTION,
};
use std::f64::consts::TAU;

/// Largest bubble diameter in pixels.
pub const BUBBLE_SIZE_MAX: f64 = 60.0;

/// Numeric column a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Production,
    Exports,
}

impl Measure {
    pub fn column(self) -> &'static str {
        match self {
            Measure::Production => PRODUCTION,
            Measure::Exports => EXPORTS,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Measure::Production => "Production",
            Measure::Exports => "Exports",
        }
    }
}

/// Named sequence of (x, y) points.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    /// Share of summed exports per product.
    pub fn export_share(totals: &[ProductTotal]) -> Self {
        Self {
            title: "Export Distribution by Product".to_string(),
            slices: totals
                .iter()
                .map(|t| PieSlice {
                    label: t.product.clone(),
                    value: t.exports,
                })
                .collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }

    /// Fraction of the whole for slice `i` (0 when the pie is empty).
    pub fn share(&self, i: usize) -> f64 {
        let total = self.total();
        match self.slices.get(i) {
            Some(slice) if total > 0.0 => slice.value / total,
            _ => 0.0,
        }
    }

    /// (start, end) angle of every slice in radians, clockwise from 12 o'clock.
    pub fn wedges(&self) -> Vec<(f64, f64)> {
        let mut start = 0.0;
        (0..self.slices.len())
            .map(|i| {
                let end = start + self.share(i) * TAU;
                let wedge = (start, end);
                start = end;
                wedge
            })
            .collect()
    }
}

/// One line per product with years on the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl LineChart {
    pub fn annual(rows: &[AnnualTotal], measure: Measure) -> Self {
        let mut series: Vec<Series> = Vec::new();
        for row in rows {
            let value = match measure {
                Measure::Production => row.production,
                Measure::Exports => row.exports,
            };
            let point = [f64::from(row.year), value];
            match series.iter_mut().find(|s| s.name == row.product) {
                Some(s) => s.points.push(point),
                None => series.push(Series {
                    name: row.product.clone(),
                    points: vec![point],
                }),
            }
        }
        series.sort_by(|a, b| a.name.cmp(&b.name));
        for s in &mut series {
            s.points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        }

        Self {
            title: format!("Yearly Trends of {} by Product", measure.noun()),
            y_label: measure.column().to_string(),
            series,
        }
    }

    pub fn total(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p[1])
            .sum()
    }

    /// Inclusive (min, max) of the x values, if any.
    pub fn year_range(&self) -> Option<(f64, f64)> {
        bounds(self.series.iter().flat_map(|s| s.points.iter()).map(|p| p[0]))
    }

    pub fn value_max(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p[1])
            .fold(0.0, f64::max)
    }
}

/// One bar per month, calendar ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<(Month, f64)>,
}

impl BarChart {
    pub fn monthly_average(rows: &[MonthlyAverage], measure: Measure) -> Self {
        let mut bars: Vec<(Month, f64)> = rows
            .iter()
            .map(|row| {
                let value = match measure {
                    Measure::Production => row.production,
                    Measure::Exports => row.exports,
                };
                (row.month, value)
            })
            .collect();
        bars.sort_by_key(|(month, _)| *month);

        Self {
            title: format!("Average Monthly {}", measure.noun()),
            y_label: format!("Average {}", measure.column()),
            bars,
        }
    }

    pub fn total(&self) -> f64 {
        self.bars.iter().map(|(_, v)| v).sum()
    }

    pub fn value_max(&self) -> f64 {
        self.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub product: String,
    pub year: i32,
    pub production: f64,
    pub exports: f64,
}

/// Production vs exports, one bubble per row, sized by year.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleChart {
    pub title: String,
    pub products: Vec<String>,
    pub bubbles: Vec<Bubble>,
    /// Largest year among `bubbles`, 0 when empty.
    pub max_year: i32,
}

impl BubbleChart {
    pub fn from_records(records: &[Record]) -> Self {
        let mut products: Vec<String> = Vec::new();
        for r in records {
            if !products.contains(&r.product) {
                products.push(r.product.clone());
            }
        }
        products.sort();

        Self {
            title: "Production vs Exports".to_string(),
            products,
            max_year: records.iter().map(|r| r.year).max().unwrap_or(0),
            bubbles: records
                .iter()
                .map(|r| Bubble {
                    product: r.product.clone(),
                    year: r.year,
                    production: r.production,
                    exports: r.exports,
                })
                .collect(),
        }
    }

    /// Diameter for a bubble so that area scales with year, largest = `size_max`.
    pub fn diameter(&self, bubble: &Bubble, size_max: f64) -> f64 {
        if self.max_year <= 0 || bubble.year <= 0 {
            return 0.0;
        }
        size_max * (f64::from(bubble.year) / f64::from(self.max_year)).sqrt()
    }

    pub fn production_total(&self) -> f64 {
        self.bubbles.iter().map(|b| b.production).sum()
    }

    pub fn exports_total(&self) -> f64 {
        self.bubbles.iter().map(|b| b.exports).sum()
    }

    pub fn production_range(&self) -> Option<(f64, f64)> {
        bounds(self.bubbles.iter().map(|b| b.production))
    }

    pub fn exports_range(&self) -> Option<(f64, f64)> {
        bounds(self.bubbles.iter().map(|b| b.exports))
    }

    pub fn product_index(&self, product: &str) -> usize {
        self.products
            .iter()
            .position(|p| p == product)
            .unwrap_or_default()
    }
}

/// One stacked band of the area chart, x = calendar month index.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedLayer {
    pub name: String,
    pub lower: Vec<[f64; 2]>,
    pub upper: Vec<[f64; 2]>,
}

/// Summed monthly exports per product, stacked.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaChart {
    pub title: String,
    pub y_label: String,
    pub months: Vec<Month>,
    pub series: Vec<(String, Vec<(Month, f64)>)>,
}

impl AreaChart {
    pub fn cumulative_exports(rows: &[MonthlyProductTotal]) -> Self {
        let mut months: Vec<Month> = rows.iter().map(|r| r.month).collect();
        months.sort();
        months.dedup();

        let mut series: Vec<(String, Vec<(Month, f64)>)> = Vec::new();
        for row in rows {
            match series.iter_mut().find(|(name, _)| *name == row.product) {
                Some((_, values)) => values.push((row.month, row.exports)),
                None => series.push((row.product.clone(), vec![(row.month, row.exports)])),
            }
        }
        series.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, values) in &mut series {
            values.sort_by_key(|(month, _)| *month);
        }

        Self {
            title: "Cumulative Monthly Exports by Product".to_string(),
            y_label: "Cumulative Exports (US Mn)".to_string(),
            months,
            series,
        }
    }

    pub fn total(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|(_, values)| values.iter())
            .map(|(_, v)| v)
            .sum()
    }

    /// Bands in series order, each resting on the previous one.
    /// A month missing from a series adds nothing to the stack.
    pub fn stacked(&self) -> Vec<StackedLayer> {
        let mut base = vec![0.0; self.months.len()];
        self.series
            .iter()
            .map(|(name, values)| {
                let mut lower = Vec::with_capacity(self.months.len());
                let mut upper = Vec::with_capacity(self.months.len());
                for (i, month) in self.months.iter().enumerate() {
                    let x = month.index() as f64;
                    let v = values
                        .iter()
                        .find(|(m, _)| m == month)
                        .map(|(_, v)| *v)
                        .unwrap_or(0.0);
                    lower.push([x, base[i]]);
                    base[i] += v;
                    upper.push([x, base[i]]);
                }
                StackedLayer {
                    name: name.clone(),
                    lower,
                    upper,
                }
            })
            .collect()
    }

    pub fn stack_max(&self) -> f64 {
        self.stacked()
            .last()
            .map(|layer| layer.upper.iter().map(|p| p[1]).fold(0.0, f64::max))
            .unwrap_or(0.0)
    }
}

/// Any chart the dashboard draws.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Pie(PieChart),
    Line(LineChart),
    Bar(BarChart),
    Bubble(BubbleChart),
    Area(AreaChart),
}

impl ChartData {
    pub fn title(&self) -> &str {
        match self {
            ChartData::Pie(c) => &c.title,
            ChartData::Line(c) => &c.title,
            ChartData::Bar(c) => &c.title,
            ChartData::Bubble(c) => &c.title,
            ChartData::Area(c) => &c.title,
        }
    }

    /// File-name friendly title: "Average Monthly Exports" -> "average_monthly_exports".
    pub fn file_stem(&self) -> String {
        let mut stem = String::new();
        for ch in self.title().chars() {
            if ch.is_ascii_alphanumeric() {
                stem.push(ch.to_ascii_lowercase());
            } else if !stem.ends_with('_') {
                stem.push('_');
            }
        }
        stem.trim_matches('_').to_string()
    }
}

/// Charts of the Trends page for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendCharts {
    pub annual_production: LineChart,
    pub annual_exports: LineChart,
    pub monthly_production: BarChart,
    pub monthly_exports: BarChart,
    pub production_vs_exports: BubbleChart,
    pub cumulative_exports: AreaChart,
}

impl TrendCharts {
    pub fn build(
        annual: &[AnnualTotal],
        monthly: &[MonthlyAverage],
        monthly_by_product: &[MonthlyProductTotal],
        records: &[Record],
    ) -> Self {
        Self {
            annual_production: LineChart::annual(annual, Measure::Production),
            annual_exports: LineChart::annual(annual, Measure::Exports),
            monthly_production: BarChart::monthly_average(monthly, Measure::Production),
            monthly_exports: BarChart::monthly_average(monthly, Measure::Exports),
            production_vs_exports: BubbleChart::from_records(records),
            cumulative_exports: AreaChart::cumulative_exports(monthly_by_product),
        }
    }

    /// Every chart, in tab order.
    pub fn all(&self) -> Vec<ChartData> {
        vec![
            ChartData::Line(self.annual_production.clone()),
            ChartData::Line(self.annual_exports.clone()),
            ChartData::Bar(self.monthly_production.clone()),
            ChartData::Bar(self.monthly_exports.clone()),
            ChartData::Bubble(self.production_vs_exports.clone()),
            ChartData::Area(self.cumulative_exports.clone()),
        ]
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
