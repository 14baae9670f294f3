//! Dashboard Main Application
//! Main window with navigation panel, Overview page and Trends page.

use crate::charts::{ChartData, ChartPlotter, ChartRenderer};
use crate::config::AppConfig;
use crate::dashboard::{Dashboard, Overview};
use crate::gui::{
    ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction, FilterForm,
    FilterFormAction, Page,
};
use crate::stats::PerformanceMetrics;
use egui::{Color32, RichText, ScrollArea, SidePanel};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info};

/// Batch export result from background thread
enum ExportResult {
    Complete { dir: PathBuf, count: usize },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    dashboard: Dashboard,
    config: AppConfig,
    control_panel: ControlPanel,
    filter_form: FilterForm,
    chart_viewer: ChartViewer,

    overview: Option<Overview>,
    metrics: Option<PerformanceMetrics>,

    export_rx: Option<Receiver<ExportResult>>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dashboard: Dashboard, config: AppConfig) -> Self {
        let mut control_panel =
            ControlPanel::new(config.data_path.clone(), dashboard.dataset().len());

        let overview = dashboard
            .overview()
            .map_err(|e| control_panel.set_status(format!("Error: {e}")))
            .ok();
        let metrics = dashboard
            .metrics()
            .map_err(|e| control_panel.set_status(format!("Error: {e}")))
            .ok();
        let options = dashboard.filter_options().unwrap_or_else(|e| {
            control_panel.set_status(format!("Error: {e}"));
            crate::dashboard::FilterOptions {
                products: Vec::new(),
                years: Vec::new(),
            }
        });

        Self {
            filter_form: FilterForm::new(&options),
            dashboard,
            config,
            control_panel,
            chart_viewer: ChartViewer::new(),
            overview,
            metrics,
            export_rx: None,
        }
    }

    /// Recompute the Trends charts for the submitted selection.
    fn handle_apply(&mut self) {
        let selection = self.filter_form.selection();
        match self.dashboard.trends(&selection) {
            Ok(outcome) => {
                let status = match outcome.charts() {
                    Some(_) => format!(
                        "Showing {} product(s) over {} year(s)",
                        selection.products.len(),
                        selection.years.len()
                    ),
                    None => "No matching rows".to_string(),
                };
                self.chart_viewer.set_outcome(outcome);
                self.control_panel.set_status(status);
            }
            Err(e) => {
                error!(error = %e, "failed to build trend charts");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Save a single chart through a file dialog.
    fn handle_save_png(&mut self, chart: &ChartData) {
        let path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(format!("{}.png", chart.file_stem()))
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        let export = &self.config.export;
        match ChartRenderer::save_png(chart, &path, export.width, export.height) {
            Ok(()) => self
                .control_panel
                .set_status(format!("Saved {}", path.display())),
            Err(e) => {
                error!(error = %e, "failed to save chart");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Render every visible chart into a folder on a background thread.
    fn handle_export_all(&mut self) {
        if self.export_rx.is_some() {
            return; // Already exporting
        }

        let mut charts: Vec<ChartData> = self
            .overview
            .iter()
            .map(|o| ChartData::Pie(o.export_share.clone()))
            .collect();
        charts.extend(self.chart_viewer.charts());

        let dir = match rfd::FileDialog::new().pick_folder() {
            Some(dir) => dir,
            None => return,
        };

        self.control_panel
            .set_status(format!("Rendering {} charts...", charts.len()));
        let (width, height) = (self.config.export.width, self.config.export.height);
        let (tx, rx) = channel();
        self.export_rx = Some(rx);

        thread::spawn(move || {
            let result = match ChartRenderer::export_all(&charts, &dir, width, height) {
                Ok(paths) => ExportResult::Complete {
                    dir,
                    count: paths.len(),
                },
                Err(e) => ExportResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for batch export results
    fn check_export_results(&mut self) {
        let Some(rx) = self.export_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(ExportResult::Complete { dir, count }) => {
                info!(count, dir = %dir.display(), "export finished");
                self.control_panel
                    .set_status(format!("Exported {count} charts to {}", dir.display()));
                if let Err(e) = open::that(&dir) {
                    error!(error = %e, "failed to open export folder");
                }
            }
            Ok(ExportResult::Error(e)) => {
                self.control_panel.set_status(format!("Error: {e}"));
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => self.export_rx = Some(rx),
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel
                    .set_status("Error: export thread stopped unexpectedly");
            }
        }
    }

    fn show_overview(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Overview").size(24.0).strong());
        ui.add_space(10.0);

        let Some(overview) = &self.overview else {
            ui.label(RichText::new("Overview unavailable").color(Color32::GRAY));
            return;
        };

        ui.label(RichText::new("Data Snippet").size(18.0).strong());
        ui.label(
            RichText::new(format!(
                "First {} of {} rows",
                overview.preview.len(),
                overview.row_count
            ))
            .color(Color32::GRAY),
        );
        ui.add_space(5.0);
        ChartPlotter::draw_records_table(ui, &overview.preview);

        ui.add_space(15.0);
        ui.label(RichText::new("Summary Statistics").size(18.0).strong());
        ui.add_space(5.0);
        ChartPlotter::draw_summary_table(ui, &overview.summaries);

        ui.add_space(15.0);
        let pie = ChartData::Pie(overview.export_share.clone());
        if ChartViewer::draw_chart_card(ui, &pie) {
            self.handle_save_png(&pie);
        }
    }

    fn show_trends(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Trends").size(24.0).strong());
        ui.add_space(10.0);

        ui.label(RichText::new("Key Performance Indicators").size(18.0).strong());
        ui.add_space(5.0);
        match &self.metrics {
            Some(metrics) => {
                let cards = [
                    ("Total Production", metrics.production_label()),
                    ("Total Exports", metrics.exports_label()),
                    ("Top Export Product", metrics.top_product_label()),
                ];
                ui.columns(cards.len(), |columns| {
                    for (col, (label, value)) in columns.iter_mut().zip(cards) {
                        Self::metric_card(col, label, &value);
                    }
                });
            }
            None => {
                ui.label(RichText::new("Metrics unavailable").color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.label(RichText::new("Filter Data").size(18.0).strong());
        ui.add_space(5.0);
        if self.filter_form.show(ui) == FilterFormAction::Apply {
            self.handle_apply();
        }

        ui.add_space(15.0);
        if let ChartViewerAction::SavePng(chart) = self.chart_viewer.show(ui) {
            self.handle_save_png(&chart);
        }
    }

    fn metric_card(ui: &mut egui::Ui, label: &str, value: &str) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
                ui.label(
                    RichText::new(value)
                        .size(24.0)
                        .strong()
                        .color(Color32::from_rgb(102, 194, 165)),
                );
            });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_export_results();
        if self.export_rx.is_some() {
            ctx.request_repaint();
        }
        self.control_panel.export_enabled = self.export_rx.is_none();

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| match self.control_panel.show(ui) {
                    ControlPanelAction::ExportAll => self.handle_export_all(),
                    ControlPanelAction::PageChanged | ControlPanelAction::None => {}
                });
            });

        // Central panel - current page
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .id_salt("page")
                .auto_shrink([false, false])
                .show(ui, |ui| match self.control_panel.page {
                    Page::Overview => self.show_overview(ui),
                    Page::Trends => self.show_trends(ui),
                });
        });
    }
}
