//! Configuration settings for the menucal pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::ics::CalendarMeta;
use crate::merge::DateWindow;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub window: DateWindow,
    pub input: InputConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("menucal.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("menucal/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".menucal/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.calendar.name.is_empty() {
            return Err(ConfigError::MissingField("calendar.name".to_string()).into());
        }
        if self.calendar.product_id.is_empty() {
            return Err(ConfigError::MissingField("calendar.product_id".to_string()).into());
        }
        if self.calendar.default_title.is_empty() {
            return Err(ConfigError::MissingField("calendar.default_title".to_string()).into());
        }
        if let (Some(start), Some(end)) = (self.window.start, self.window.end) {
            if end < start {
                return Err(ConfigError::Invalid(format!(
                    "window.end {} is before window.start {}",
                    end, start
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Expand the input directory path.
    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.input.dir).as_ref())
    }

    /// Expand the output calendar path.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output.path).as_ref())
    }

    /// Document metadata for emission.
    pub fn calendar_meta(&self) -> CalendarMeta {
        CalendarMeta {
            name: self.calendar.name.clone(),
            description: self.calendar.description.clone(),
            product_id: self.calendar.product_id.clone(),
            timezone: self.calendar.timezone.clone(),
        }
    }
}

/// Calendar document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Display name (X-WR-CALNAME).
    pub name: String,
    /// Calendar description (X-WR-CALDESC).
    pub description: String,
    /// Product identifier (PRODID).
    pub product_id: String,
    /// Event title used when no entrée is found.
    pub default_title: String,
    /// Timezone hint (X-WR-TIMEZONE), optional.
    pub timezone: Option<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            name: "School Lunch Menu".to_string(),
            description: "School lunch menu, regenerated from vendor data".to_string(),
            product_id: "-//menucal//School Lunch Menu//EN".to_string(),
            default_title: crate::event::DEFAULT_TITLE.to_string(),
            timezone: None,
        }
    }
}

/// Input directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory containing payload files (.json, .txt).
    pub dir: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: "./menus".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the emitted .ics file.
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./school-lunch.ics".to_string(),
        }
    }
}
