//! Configuration module for the fixture generator.
//!
//! Settings come from environment variables, with defaults that reproduce the
//! standard fixture tree under `./data`.

use std::env;
use std::path::PathBuf;

use crate::layout::{PanelLayout, DEFAULT_LINE_COUNT};

/// Default data directory, relative to the working directory
const DEFAULT_DATA_DIR: &str = "data";

/// Maximum numbered-lines count
const MAX_LINE_COUNT: u64 = 1_000_000;

const DATA_DIR_VAR: &str = "ALSCAN_FIXTURES_DATA_DIR";
const LAYOUTS_VAR: &str = "ALSCAN_FIXTURES_LAYOUTS";
const LINES_VAR: &str = "ALSCAN_FIXTURES_LINES";
const REPORT_VAR: &str = "ALSCAN_FIXTURES_REPORT";

/// Configuration for a fixture generation run.
///
/// All settings can be configured via environment variables:
/// - `ALSCAN_FIXTURES_DATA_DIR`: data directory (default: data)
/// - `ALSCAN_FIXTURES_LAYOUTS`: comma-separated panel layouts (default: cpanel,plesk)
/// - `ALSCAN_FIXTURES_LINES`: lines in the numbered-lines fixtures (default: 10000)
/// - `ALSCAN_FIXTURES_REPORT`: where to write a JSON run report (default: none)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of the fixture tree; sample logs are read from `<data_dir>/logs`
    pub data_dir: PathBuf,

    /// Panel layouts to provision, in order
    pub layouts: Vec<PanelLayout>,

    /// Number of lines in the numbered-lines fixtures
    pub line_count: u64,

    /// Optional path for the JSON run report
    pub report_path: Option<PathBuf>,
}

/// Error type for configuration loading failures
#[derive(Debug, thiserror::Error)]
#[error("Configuration error for {env_var}: {message}")]
pub struct ConfigError {
    pub message: String,
    pub env_var: String,
}

impl ConfigError {
    fn new(env_var: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            env_var: env_var.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `ALSCAN_FIXTURES_LAYOUTS` names an unknown layout or none at all
    /// - `ALSCAN_FIXTURES_LINES` is not a number or is outside 1..=1000000
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let layouts = match lookup(LAYOUTS_VAR) {
            Some(value) => Self::parse_layouts(&value)?,
            None => PanelLayout::all().to_vec(),
        };

        let line_count = match lookup(LINES_VAR) {
            Some(value) => Self::parse_line_count(&value)?,
            None => DEFAULT_LINE_COUNT,
        };

        let report_path = lookup(REPORT_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            data_dir,
            layouts,
            line_count,
            report_path,
        })
    }

    /// Parse a comma-separated layout list, dropping duplicates.
    fn parse_layouts(value: &str) -> Result<Vec<PanelLayout>, ConfigError> {
        let mut layouts = Vec::new();
        for name in value.split(',').filter(|n| !n.trim().is_empty()) {
            let layout = PanelLayout::from_name(name)
                .ok_or_else(|| ConfigError::new(LAYOUTS_VAR, format!("unknown layout '{}'", name.trim())))?;
            if !layouts.contains(&layout) {
                layouts.push(layout);
            }
        }

        if layouts.is_empty() {
            return Err(ConfigError::new(LAYOUTS_VAR, "at least one layout is required"));
        }
        Ok(layouts)
    }

    /// Parse the numbered-lines count with validation.
    fn parse_line_count(value: &str) -> Result<u64, ConfigError> {
        let count: u64 = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::new(LINES_VAR, format!("'{}' is not a valid number", value)))?;

        if count == 0 {
            return Err(ConfigError::new(LINES_VAR, "line count must be greater than 0"));
        }

        if count > MAX_LINE_COUNT {
            return Err(ConfigError::new(
                LINES_VAR,
                format!("line count {} exceeds maximum allowed ({})", count, MAX_LINE_COUNT),
            ));
        }

        Ok(count)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            layouts: PanelLayout::all().to_vec(),
            line_count: DEFAULT_LINE_COUNT,
            report_path: None,
        }
    }
}
