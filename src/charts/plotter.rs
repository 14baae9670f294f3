//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use super::model::{AreaChart, BarChart, BubbleChart, ChartData, LineChart, PieChart, BUBBLE_SIZE_MAX};
use crate::data::{Month, Record};
use crate::stats::ColumnSummary;
use egui::{Align2, Color32, FontId, RichText, Shape, Stroke};
use egui_plot::{Bar, BarChart as PlotBarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};
use std::f64::consts::TAU;

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(102, 194, 165), // Teal
    Color32::from_rgb(252, 141, 98),  // Orange
    Color32::from_rgb(141, 160, 203), // Lavender
    Color32::from_rgb(231, 138, 195), // Pink
    Color32::from_rgb(166, 216, 84),  // Lime
    Color32::from_rgb(255, 217, 47),  // Yellow
    Color32::from_rgb(229, 196, 148), // Sand
    Color32::from_rgb(179, 179, 179), // Grey
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Single colour for the monthly bar charts.
pub const BAR_COLOR: Color32 = Color32::from_rgb(59, 68, 75);

const CHART_HEIGHT: f32 = 380.0;

/// Draws dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for the `index`-th series.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Colour for `name` given every name in the chart; stable across charts
    /// because products are ranked alphabetically.
    pub fn product_color(names: &[String], name: &str) -> Color32 {
        let mut sorted: Vec<&String> = names.iter().collect();
        sorted.sort();
        let index = sorted.iter().position(|n| *n == name).unwrap_or_default();
        Self::series_color(index)
    }

    pub fn draw(ui: &mut egui::Ui, chart: &ChartData) {
        match chart {
            ChartData::Pie(c) => Self::draw_pie_chart(ui, c),
            ChartData::Line(c) => Self::draw_line_chart(ui, c),
            ChartData::Bar(c) => Self::draw_bar_chart(ui, c),
            ChartData::Bubble(c) => Self::draw_bubble_chart(ui, c),
            ChartData::Area(c) => Self::draw_area_chart(ui, c),
        }
    }

    /// Yearly line per product with point markers.
    pub fn draw_line_chart(ui: &mut egui::Ui, chart: &LineChart) {
        let names: Vec<String> = chart.series.iter().map(|s| s.name.clone()).collect();

        Plot::new(format!("line_{}", chart.title))
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label(chart.y_label.clone())
            .x_axis_formatter(|mark, _range| {
                if mark.value.fract().abs() < 1e-9 {
                    format!("{:.0}", mark.value)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for series in &chart.series {
                    let color = Self::product_color(&names, &series.name);
                    plot_ui.line(
                        Line::new(PlotPoints::from(series.points.clone()))
                            .color(color)
                            .width(2.0)
                            .name(&series.name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from(series.points.clone()))
                            .radius(4.0)
                            .color(color)
                            .name(&series.name),
                    );
                }
            });
    }

    /// Calendar-ordered bars, x = month index.
    pub fn draw_bar_chart(ui: &mut egui::Ui, chart: &BarChart) {
        let bars: Vec<Bar> = chart
            .bars
            .iter()
            .map(|(month, value)| {
                Bar::new(month.index() as f64, *value)
                    .width(0.7)
                    .name(month.name())
            })
            .collect();

        Plot::new(format!("bar_{}", chart.title))
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Month")
            .y_axis_label(chart.y_label.clone())
            .x_axis_formatter(Self::month_tick)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    PlotBarChart::new(bars)
                        .color(BAR_COLOR)
                        .name(&chart.y_label),
                );
            });
    }

    /// One bubble per row, coloured by product, area proportional to year.
    pub fn draw_bubble_chart(ui: &mut egui::Ui, chart: &BubbleChart) {
        Plot::new(format!("bubble_{}", chart.title))
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label(crate::data::PRODUCTION)
            .y_axis_label(crate::data::EXPORTS)
            .show(ui, |plot_ui| {
                for bubble in &chart.bubbles {
                    let color = Self::series_color(chart.product_index(&bubble.product));
                    let radius = (chart.diameter(bubble, BUBBLE_SIZE_MAX) / 2.0) as f32;
                    plot_ui.points(
                        Points::new(vec![[bubble.production, bubble.exports]])
                            .radius(radius.max(1.0))
                            .color(color.gamma_multiply(0.6))
                            .name(&bubble.product),
                    );
                }
            });
    }

    /// Stacked bands drawn as one convex quad per month interval.
    pub fn draw_area_chart(ui: &mut egui::Ui, chart: &AreaChart) {
        let layers = chart.stacked();
        let names: Vec<String> = layers.iter().map(|l| l.name.clone()).collect();

        Plot::new(format!("area_{}", chart.title))
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Month")
            .y_axis_label(chart.y_label.clone())
            .x_axis_formatter(Self::month_tick)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                for layer in &layers {
                    let color = Self::product_color(&names, &layer.name);
                    for i in 0..layer.upper.len().saturating_sub(1) {
                        let quad = vec![
                            layer.lower[i],
                            layer.upper[i],
                            layer.upper[i + 1],
                            layer.lower[i + 1],
                        ];
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(quad))
                                .fill_color(color.gamma_multiply(0.6))
                                .stroke(Stroke::NONE)
                                .name(&layer.name),
                        );
                    }
                    plot_ui.line(
                        Line::new(PlotPoints::from(layer.upper.clone()))
                            .color(color)
                            .width(1.5)
                            .name(&layer.name),
                    );
                }
            });
    }

    /// Pie drawn directly with the painter; egui_plot has no pie item.
    pub fn draw_pie_chart(ui: &mut egui::Ui, chart: &PieChart) {
        let labels: Vec<String> = chart.slices.iter().map(|s| s.label.clone()).collect();
        let size = ui.available_width().min(CHART_HEIGHT);

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
            let painter = ui.painter_at(rect);
            let center = rect.center();
            let radius = size * 0.45;
            let at = |angle: f64, r: f32| {
                center + egui::vec2(angle.sin() as f32 * r, -(angle.cos() as f32) * r)
            };

            for (i, (start, end)) in chart.wedges().into_iter().enumerate() {
                let color = Self::product_color(&labels, &chart.slices[i].label);
                let steps = (((end - start) / TAU) * 128.0).ceil().max(1.0) as usize;
                for s in 0..steps {
                    let a0 = start + (end - start) * s as f64 / steps as f64;
                    let a1 = start + (end - start) * (s + 1) as f64 / steps as f64;
                    painter.add(Shape::convex_polygon(
                        vec![center, at(a0, radius), at(a1, radius)],
                        color,
                        Stroke::NONE,
                    ));
                }
                painter.line_segment([center, at(start, radius)], Stroke::new(1.0, Color32::BLACK));

                let share = chart.share(i);
                if share > 0.0 {
                    painter.text(
                        at((start + end) / 2.0, radius * 0.65),
                        Align2::CENTER_CENTER,
                        format!("{}\n{:.1}%", chart.slices[i].label, share * 100.0),
                        FontId::proportional(14.0),
                        Color32::BLACK,
                    );
                }
            }

            ui.vertical(|ui| {
                for slice in &chart.slices {
                    ui.horizontal(|ui| {
                        let color = Self::product_color(&labels, &slice.label);
                        let (swatch, _) =
                            ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::hover());
                        ui.painter().rect_filled(swatch, 3.0, color);
                        ui.label(RichText::new(&slice.label).size(13.0));
                    });
                }
            });
        });
    }

    /// Draw the describe() table.
    pub fn draw_summary_table(ui: &mut egui::Ui, summaries: &[ColumnSummary]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("summary_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("").strong());
                        for s in summaries {
                            ui.label(RichText::new(&s.column).strong().size(11.0));
                        }
                        ui.end_row();

                        let rows: [(&str, fn(&ColumnSummary) -> f64); 7] = [
                            ("mean", |s| s.mean),
                            ("std", |s| s.std),
                            ("min", |s| s.min),
                            ("25%", |s| s.p25),
                            ("50%", |s| s.median),
                            ("75%", |s| s.p75),
                            ("max", |s| s.max),
                        ];

                        ui.label(RichText::new("count").strong().size(11.0));
                        for s in summaries {
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                        }
                        ui.end_row();

                        for (name, value) in rows {
                            ui.label(RichText::new(name).strong().size(11.0));
                            for s in summaries {
                                ui.label(RichText::new(format!("{:.3}", value(s))).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Draw the dataset snippet.
    pub fn draw_records_table(ui: &mut egui::Ui, records: &[Record]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("records_table")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for header in crate::data::REQUIRED_COLUMNS {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for r in records {
                            ui.label(RichText::new(&r.product).size(11.0));
                            ui.label(RichText::new(r.year.to_string()).size(11.0));
                            ui.label(RichText::new(r.month.name()).size(11.0));
                            ui.label(RichText::new(format!("{:.2}", r.production)).size(11.0));
                            ui.label(RichText::new(format!("{:.2}", r.exports)).size(11.0));
                            ui.end_row();
                        }
                    });
            });
    }

    fn month_tick(mark: egui_plot::GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-9 || rounded < 0.0 {
            return String::new();
        }
        Month::from_index(rounded as usize)
            .map(|m| m.short_name().to_string())
            .unwrap_or_default()
    }
}
