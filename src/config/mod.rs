//! Configuration management for coursegate

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::draft::DraftModel;
use crate::theme::Theme;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the course backend
    pub api_base_url: String,

    /// Student identity used to look up enrollments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,

    /// Per-request timeout for backend calls
    pub request_timeout_secs: u64,

    /// Selected theme name
    pub theme: String,

    /// Custom theme overrides (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// Model used by `coursegate draft`
    pub draft_model: DraftModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            student_email: None,
            request_timeout_secs: 30,
            theme: "Tokyo Night".to_string(),
            custom_theme: None,
            draft_model: DraftModel::default(),
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Load from an explicit path, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {:?}", config_path))
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!(path = ?config_path, "created default config");
            Ok(config)
        }
    }

    /// Save to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "coursegate").context("Failed to determine project directories")
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Log file used while the terminal viewer is running
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("coursegate.log"))
    }

    /// Get the active theme
    pub fn active_theme(&self) -> Theme {
        self.custom_theme
            .clone()
            .or_else(|| Theme::named(&self.theme))
            .unwrap_or_else(Theme::tokyo_night)
    }
}
