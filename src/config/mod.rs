//! TOML-based configuration.
//!
//! Supports a config file (gridline.toml) with environment variable
//! expansion.
//!
//! Example configuration:
//! ```toml
//! [limits]
//! ai_rows = 100
//! live_rows = 1000000
//!
//! [export]
//! sheet_name = "Report"
//! output_dir = "${HOME}/exports"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Row budgets for resolution.
    pub limits: Limits,

    /// Spreadsheet export configuration.
    pub export: ExportSettings,
}

/// Row budgets applied when fetching report data.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    /// Cap on AI-generated rows per report view.
    pub ai_rows: usize,

    /// Cap on live-query rows per report view.
    pub live_rows: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            ai_rows: 100,
            live_rows: 1_000_000,
        }
    }
}

/// Spreadsheet export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Worksheet name in exported workbooks.
    pub sheet_name: String,

    /// Directory exported files are written to.
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sheet_name: "Report".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, expanding `${ENV_VAR}` references.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let expanded = expand_env_vars(&raw)?;
        Ok(toml::from_str(&expanded)?)
    }

    /// Load settings from a file if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env pattern is valid"));

/// Expand `${ENV_VAR}` references in a string. Errors on the first variable
/// that is not set.
pub fn expand_env_vars(input: &str) -> Result<String, SettingsError> {
    let mut output = String::with_capacity(input.len());
    let mut last = 0;
    for captures in ENV_VAR.captures_iter(input) {
        let whole = captures.get(0).expect("capture 0 always present");
        let name = &captures[1];
        let value =
            env::var(name).map_err(|_| SettingsError::MissingEnvVar(name.to_string()))?;
        output.push_str(&input[last..whole.start()]);
        output.push_str(&value);
        last = whole.end();
    }
    output.push_str(&input[last..]);
    Ok(output)
}
