//! Control Panel Widget
//! Left side panel with page navigation, data source info and status.

use egui::{Color32, RichText};
use std::path::PathBuf;

/// Dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Trends,
}

/// Left side control panel.
pub struct ControlPanel {
    pub page: Page,
    pub source: PathBuf,
    pub row_count: usize,
    pub status: String,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(source: PathBuf, row_count: usize) -> Self {
        Self {
            page: Page::default(),
            source,
            row_count,
            status: "Ready".to_string(),
            export_enabled: true,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌾 Agri Exports")
                    .size(22.0)
                    .color(Color32::from_rgb(102, 194, 165)),
            );
            ui.label(
                RichText::new("Production & Export Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Navigation =====
        ui.label(RichText::new("🧭 Navigate").size(14.0).strong());
        ui.add_space(5.0);
        let before = self.page;
        ui.radio_value(&mut self.page, Page::Overview, "Overview");
        ui.radio_value(&mut self.page, Page::Trends, "Trends");
        if self.page != before {
            action = ControlPanelAction::PageChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let name = self
                    .source
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| self.source.display().to_string());
                ui.label(RichText::new(name).size(12.0));
                ui.label(
                    RichText::new(format!("{} rows", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportAll;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Saved") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    PageChanged,
    ExportAll,
}
