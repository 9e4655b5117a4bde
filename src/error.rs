use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure reported by yt-dlp, ANSI escapes already stripped
    #[error("{0}")]
    Provider(String),

    #[error("The video is private or not available for download.")]
    VideoUnavailable,

    #[error("Row {index} is out of range ({len} formats)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Update failed: {0}")]
    Update(String),

    #[error("Rating failed: {0}")]
    Rating(String),
}
