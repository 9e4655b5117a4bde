pub mod types;

pub use types::*;

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download settings
    pub download: DownloadConfig,
    /// Self-update settings
    pub update: UpdateConfig,
    /// Rating prompt settings
    pub rating: RatingConfig,
}

impl AppConfig {
    /// Load configuration from TOML file, or create default if not found.
    ///
    /// `path` overrides the default location.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);

        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config: {}. Using defaults.", e);
                    return Self::default();
                }
            }
        }

        let config = Self::default();
        // Save default config for future editing
        if let Err(e) = config.save_to(&config_path) {
            warn!("Failed to save default config: {}", e);
        }
        config
    }

    /// Save configuration to a specific TOML file
    pub fn save_to(&self, config_path: &Path) -> Result<(), AppError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(config_path, toml_string)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Load and validate configuration from a specific file
    fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("any-video-downloader")
            .join("config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.download.output_template.trim().is_empty() {
            return Err(AppError::Config(
                "Output template must not be empty".to_string(),
            ));
        }
        if self.download.remux_container.trim().is_empty() {
            return Err(AppError::Config(
                "Remux container must not be empty".to_string(),
            ));
        }
        if self.update.enabled && self.update.artifact_name.trim().is_empty() {
            return Err(AppError::Config(
                "Update artifact name must not be empty".to_string(),
            ));
        }
        if !self.rating.table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AppError::Config(format!(
                "Invalid rating table name: {}",
                self.rating.table
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.download.remux_container, "mp4");
        assert_eq!(config.download.output_template, "%(title).100s.%(ext)s");
        assert_eq!(config.rating.delay_secs, 10);
        assert!(!config.update.is_active());
        assert!(!config.rating.is_active());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [rating]
            store_url = "https://example.supabase.co/rest/v1"
            "#,
        )
        .unwrap();

        assert!(config.rating.is_active());
        assert_eq!(config.rating.table, "ratings");
        assert!(config.update.enabled);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.download.min_free_space_mb = 42;
        config.update.api_url = "https://example.com/version".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load(Some(&path));
        assert_eq!(loaded.download.min_free_space_mb, 42);
        assert!(loaded.update.is_active());
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load(Some(&path));
        assert!(path.exists());
        assert_eq!(config.rating.table, "ratings");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = AppConfig::default();
        config.rating.table = "ratings; drop".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.download.remux_container = " ".to_string();
        assert!(config.validate().is_err());
    }
}
