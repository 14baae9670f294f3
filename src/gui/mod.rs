//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod filter_form;

pub use app::DashboardApp;
pub use chart_viewer::{ChartViewer, ChartViewerAction, TrendTab};
pub use control_panel::{ControlPanel, ControlPanelAction, Page};
pub use filter_form::{FilterForm, FilterFormAction};
