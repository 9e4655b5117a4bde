use crate::formats::selector::DEFAULT_REMUX_TARGET;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the release artifact fetched by the updater
#[cfg(windows)]
pub const DEFAULT_ARTIFACT_NAME: &str = "Any Video Url Downloader.exe";
#[cfg(not(windows))]
pub const DEFAULT_ARTIFACT_NAME: &str = "Any Video Url Downloader";

/// Download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Folder preselected on start; empty means the user must pick one
    pub output_dir: Option<PathBuf>,
    /// yt-dlp output template
    pub output_template: String,
    /// Container used when video and audio are merged
    pub remux_container: String,
    /// Explicit yt-dlp executable, otherwise it is searched for
    pub ytdlp_path: Option<PathBuf>,
    /// Warn when the output folder has less free space than this
    pub min_free_space_mb: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs::download_dir(),
            output_template: "%(title).100s.%(ext)s".to_string(),
            remux_container: DEFAULT_REMUX_TARGET.to_string(),
            ytdlp_path: None,
            min_free_space_mb: 500,
        }
    }
}

/// Self-update settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub enabled: bool,
    /// Endpoint returning `{"version": ..., "download_url": ...}`
    pub api_url: String,
    pub artifact_name: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: String::new(),
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
        }
    }
}

impl UpdateConfig {
    /// Checking needs both the switch and an endpoint
    pub fn is_active(&self) -> bool {
        self.enabled && !self.api_url.trim().is_empty()
    }
}

/// Rating prompt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub enabled: bool,
    /// Base URL of the REST store, e.g. `https://xyz.supabase.co/rest/v1`
    pub store_url: String,
    pub api_key: String,
    pub table: String,
    /// Seconds after start before the prompt may appear
    pub delay_secs: u64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_url: String::new(),
            api_key: String::new(),
            table: "ratings".to_string(),
            delay_secs: 10,
        }
    }
}

impl RatingConfig {
    pub fn is_active(&self) -> bool {
        self.enabled && !self.store_url.trim().is_empty()
    }
}
