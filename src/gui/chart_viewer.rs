//! Chart Viewer Widget
//! Tabbed display of the Trends charts using egui_plot.

use crate::charts::{ChartData, ChartPlotter};
use crate::dashboard::TrendsOutcome;
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;

/// Trends page tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendTab {
    #[default]
    Annual,
    Monthly,
    ProductionVsExports,
    Cumulative,
}

impl TrendTab {
    pub const ALL: [TrendTab; 4] = [
        TrendTab::Annual,
        TrendTab::Monthly,
        TrendTab::ProductionVsExports,
        TrendTab::Cumulative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TrendTab::Annual => "Annual Production and Exports",
            TrendTab::Monthly => "Average Monthly Production",
            TrendTab::ProductionVsExports => "Production Vs Exports",
            TrendTab::Cumulative => "Cumulative exports",
        }
    }
}

/// Holds the last applied filter outcome and the selected tab.
#[derive(Default)]
pub struct ChartViewer {
    outcome: Option<TrendsOutcome>,
    pub tab: TrendTab,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_outcome(&mut self, outcome: TrendsOutcome) {
        self.outcome = Some(outcome);
    }

    pub fn outcome(&self) -> Option<&TrendsOutcome> {
        self.outcome.as_ref()
    }

    /// Charts of the current outcome, empty until filters are applied.
    pub fn charts(&self) -> Vec<ChartData> {
        self.outcome
            .as_ref()
            .and_then(TrendsOutcome::charts)
            .map(|c| c.all())
            .unwrap_or_default()
    }

    /// Charts belonging to the selected tab.
    fn tab_charts(&self) -> Vec<ChartData> {
        let Some(charts) = self.outcome.as_ref().and_then(TrendsOutcome::charts) else {
            return Vec::new();
        };
        match self.tab {
            TrendTab::Annual => vec![
                ChartData::Line(charts.annual_production.clone()),
                ChartData::Line(charts.annual_exports.clone()),
            ],
            TrendTab::Monthly => vec![
                ChartData::Bar(charts.monthly_production.clone()),
                ChartData::Bar(charts.monthly_exports.clone()),
            ],
            TrendTab::ProductionVsExports => {
                vec![ChartData::Bubble(charts.production_vs_exports.clone())]
            }
            TrendTab::Cumulative => vec![ChartData::Area(charts.cumulative_exports.clone())],
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        match &self.outcome {
            None => {
                ui.label(
                    RichText::new("Choose products and years, then press Apply Filters.")
                        .color(Color32::GRAY),
                );
                return action;
            }
            Some(outcome) => {
                if let Some(notice) = outcome.notice() {
                    egui::Frame::none()
                        .rounding(6.0)
                        .stroke(egui::Stroke::new(1.5, Color32::from_rgb(255, 193, 7)))
                        .inner_margin(10.0)
                        .show(ui, |ui| {
                            ui.label(
                                RichText::new(format!("⚠ {notice}"))
                                    .size(14.0)
                                    .color(Color32::from_rgb(255, 193, 7)),
                            );
                        });
                    return action;
                }
            }
        }

        ui.horizontal(|ui| {
            for tab in TrendTab::ALL {
                ui.selectable_value(&mut self.tab, tab, RichText::new(tab.label()).size(14.0));
            }
        });
        ui.separator();

        let charts = self.tab_charts();
        ScrollArea::vertical()
            .id_salt("trend_charts")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for chart in &charts {
                    if Self::draw_chart_card(ui, chart) {
                        action = ChartViewerAction::SavePng(chart.clone());
                    }
                    ui.add_space(CHART_SPACING);
                }
            });

        action
    }

    /// Draw one chart card; returns true when its save button was clicked.
    pub fn draw_chart_card(ui: &mut egui::Ui, chart: &ChartData) -> bool {
        let mut save = false;
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(chart.title()).size(18.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("💾 Save PNG").clicked() {
                            save = true;
                        }
                    });
                });
                ui.add_space(8.0);
                ChartPlotter::draw(ui, chart);
            });
        save
    }
}

/// Actions triggered by the chart viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    SavePng(ChartData),
}
