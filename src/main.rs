//! Agri Exports - Production & Export Dashboard
//!
//! Desktop dashboard over a monthly per-product exports CSV, with a
//! headless `--export` mode that writes every chart as PNG.

use agri_exports::config::{AppConfig, Cli};
use agri_exports::dashboard::{Dashboard, NO_DATA_NOTICE};
use agri_exports::data::{self, FilterSelection};
use agri_exports::gui::DashboardApp;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli).context("loading configuration")?;

    let dataset = data::load_cached(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    info!(rows = dataset.len(), path = %config.data_path.display(), "dataset ready");

    let dashboard = Dashboard::new(dataset).with_preview_rows(config.preview_rows);

    if let Some(dir) = &cli.export {
        return export(&dashboard, &cli, &config, dir);
    }

    let window = &config.window;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width, window.height])
            .with_min_inner_size([window.min_width, window.min_height])
            .with_title("Agri Exports Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Agri Exports Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, dashboard, config)))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}

/// Headless mode: render charts for the selection given on the command line.
fn export(dashboard: &Dashboard, cli: &Cli, config: &AppConfig, dir: &Path) -> Result<()> {
    let defaults = dashboard.default_selection()?;
    let selection = FilterSelection {
        products: if cli.products.is_empty() {
            defaults.products
        } else {
            cli.products.iter().cloned().collect()
        },
        years: if cli.years.is_empty() {
            defaults.years
        } else {
            cli.years.iter().copied().collect()
        },
    };

    let (outcome, paths) = dashboard
        .export_pngs(&selection, dir, config.export.width, config.export.height)
        .with_context(|| format!("exporting charts to {}", dir.display()))?;

    if let Some(notice) = outcome.notice() {
        warn!("{notice}");
        eprintln!("{NO_DATA_NOTICE}");
    }
    for path in &paths {
        println!("{}", path.display());
    }
    Ok(())
}
