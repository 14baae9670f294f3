//! Configuration
//! Command-line arguments and the optional JSON settings file.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DATA_PATH: &str = "./cleaned_exports.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Agricultural production & export dashboard.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "agri-exports", version, about)]
pub struct Cli {
    /// Exports CSV to load (overrides `data_path` from the config file)
    #[arg(value_name = "CSV", env = "AGRI_EXPORTS_CSV")]
    pub csv: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render every chart as PNG into DIR and exit without opening a window
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Product to include in a headless export (repeatable; default: all)
    #[arg(long = "product", value_name = "NAME", requires = "export")]
    pub products: Vec<String>,

    /// Year to include in a headless export (repeatable; default: all)
    #[arg(long = "year", value_name = "YEAR", requires = "export")]
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 860.0,
            min_width: 1000.0,
            min_height: 640.0,
        }
    }
}

/// Pixel size of saved chart images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub preview_rows: usize,
    pub window: WindowConfig,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            preview_rows: crate::dashboard::DEFAULT_PREVIEW_ROWS,
            window: WindowConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the config file, then CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(csv) = &cli.csv {
            config.data_path = csv.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "preview_rows": 5, "export": {{ "width": 640 }} }}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.export.width, 640);
        assert_eq!(config.export.height, 800);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn cli_csv_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_path": "from_file.csv" }}"#).unwrap();

        let cli = Cli::parse_from([
            "agri-exports",
            "from_cli.csv",
            "--config",
            file.path().to_str().unwrap(),
        ]);
        let config = AppConfig::resolve(&cli).unwrap();
        assert_eq!(config.data_path, PathBuf::from("from_cli.csv"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn headless_filters_parse_repeated_flags() {
        let cli = Cli::parse_from([
            "agri-exports",
            "--export",
            "out",
            "--product",
            "Tea",
            "--product",
            "Rubber",
            "--year",
            "2021",
        ]);
        assert_eq!(cli.export, Some(PathBuf::from("out")));
        assert_eq!(cli.products, vec!["Tea", "Rubber"]);
        assert_eq!(cli.years, vec![2021]);
    }
}
