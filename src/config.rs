// src/config.rs
//
// loading config.toml

use crate::draw::DrawOptions;
use crate::error::GridError;
use crate::grid::MultiGridOptions;
use crate::units::Units;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Pixels per millimeter must be positive and finite, got {0}")]
    InvalidPixelsPerMillimeter(f64),

    #[error("Invalid [grid] options: {0}")]
    Grid(#[from] GridError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: MultiGridOptions,
    pub style: DrawOptions,
    pub units: Units,
    pub viewer: ViewerConfig,
    pub export: ExportConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Braille dots per millimetre at scale 1
    pub dots_per_millimeter: f64,
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dots_per_millimeter: 4.0,
            zoom_step: 1.5,
            min_scale: 0.01,
            max_scale: 10_000.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub path: PathBuf,
    pub pattern_id: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("grid.svg"),
            pattern_id: "grid-pattern-".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; logging is off when unset
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }
}

impl Config {
    /// Load from the executable's directory, then the working directory,
    /// falling back to defaults when neither has a config file
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(exe_config) = Self::exe_dir_path().filter(|p| p.exists()) {
            return Self::load_from(&exe_config);
        }

        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::load_from(local);
        }

        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make grid geometry non-finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ppm = self.units.pixels_per_millimeter;
        if !ppm.is_finite() || ppm <= 0.0 {
            return Err(ConfigError::InvalidPixelsPerMillimeter(ppm));
        }
        self.grid.validate()?;
        Ok(())
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn exe_dir_path() -> Option<PathBuf> {
        let exe_path = std::env::current_exe().ok()?;
        Some(exe_path.parent()?.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.grid, MultiGridOptions::default());
        assert_eq!(config.style, DrawOptions::default());
        assert_eq!(config.export.pattern_id, "grid-pattern-");
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_options_default_independently() {
        let config = Config::parse(
            r#"
            [grid]
            num_grids = 3

            [style]
            stroke_style = "cyan"
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.num_grids, 3);
        assert_eq!(config.grid.grid_size, 10.0);
        assert_eq!(config.grid.min_spacing, 0.5);
        assert_eq!(config.style.stroke_style, "cyan");
        assert_eq!(config.style.opacity, 0.1);
    }

    #[test]
    fn test_units_and_log_level() {
        let config = Config::parse(
            r#"
            [units]
            pixels_per_millimeter = 2.0

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.units, Units::new(2.0));
        assert_eq!(config.log.level_filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_non_positive_pixels_per_millimeter_rejected() {
        for ppm in ["0.0", "-3.5"] {
            let config = Config::parse(&format!("[units]\npixels_per_millimeter = {}", ppm)).unwrap();
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidPixelsPerMillimeter(_))
            ));
        }
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_validates() {
        let path = std::env::temp_dir().join(format!("tui-multigrid-config-{}.toml", std::process::id()));
        fs::write(&path, "[units]\npixels_per_millimeter = 0.0\n").unwrap();
        let result = Config::load_from(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidPixelsPerMillimeter(v)) if v == 0.0));
    }

    #[test]
    fn test_bad_grid_options_rejected() {
        let config = Config::parse("[grid]\nnum_grids = 0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Grid(GridError::InvalidNumGrids(0)))
        ));
    }

    #[test]
    fn test_bad_type_rejected() {
        assert!(Config::parse("[grid]\nnum_grids = \"two\"").is_err());
    }
}
