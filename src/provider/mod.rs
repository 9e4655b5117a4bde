//! Provider Module
//!
//! Everything that talks to yt-dlp: format extraction, downloads and the
//! translation of its output into application types.

pub mod progress;
pub mod ytdlp;

pub use progress::{ProgressEvent, ProgressUpdate};
pub use ytdlp::{DownloadJob, YtDlp};

use crate::error::AppError;
use crate::formats::RawFormat;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ANSI regex"));

/// Subset of `yt-dlp -J` output the application consumes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// Keep the first occurrence of every `format_id`; rows without an id are
/// never treated as duplicates
pub fn dedupe_formats(formats: Vec<RawFormat>) -> Vec<RawFormat> {
    let mut seen = HashSet::new();
    formats
        .into_iter()
        .filter(|format| {
            format
                .format_id
                .as_ref()
                .is_none_or(|id| seen.insert(id.clone()))
        })
        .collect()
}

/// Remove terminal color sequences from provider output
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").to_string()
}

/// Turn yt-dlp's stderr into an error the user can read
pub fn classify_error(stderr: &str) -> AppError {
    let clean = strip_ansi(stderr);

    let error_lines: Vec<&str> = clean
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR"))
        .collect();

    let message = if error_lines.is_empty() {
        let last_lines: Vec<&str> = clean
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .rev()
            .take(5)
            .collect();
        last_lines.into_iter().rev().collect::<Vec<_>>().join("\n")
    } else {
        error_lines.join("\n")
    };

    let lower = message.to_lowercase();
    if lower.contains("private video") || lower.contains("not available") {
        return AppError::VideoUnavailable;
    }

    if message.is_empty() {
        AppError::Provider("yt-dlp exited without an error message".to_string())
    } else {
        AppError::Provider(message)
    }
}

/// Make a video title safe to show and use as a file name
pub fn sanitize_filename(title: &str) -> String {
    const MAX_LENGTH: usize = 100;

    let cleaned: String = title
        .chars()
        .filter(|c| c.is_ascii() && !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .take(MAX_LENGTH)
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let formats: Vec<RawFormat> = serde_json::from_value(json!([
            {"format_id": "18", "ext": "mp4"},
            {"format_id": "22", "ext": "mp4"},
            {"format_id": "18", "ext": "webm"}
        ]))
        .unwrap();

        let unique = dedupe_formats(formats);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].ext.as_deref(), Some("mp4"));
    }

    #[test]
    fn test_dedupe_keeps_rows_without_id() {
        let formats: Vec<RawFormat> = serde_json::from_value(json!([
            {"vcodec": "avc1", "ext": "mp4"},
            {"vcodec": "vp9", "ext": "webm"},
            {"format_id": "18", "vcodec": "avc1", "acodec": "mp4a"}
        ]))
        .unwrap();

        let unique = dedupe_formats(formats);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[1].vcodec.as_deref(), Some("vp9"));
    }

    #[test]
    fn test_video_info_tolerates_missing_formats() {
        let info: VideoInfo = serde_json::from_value(json!({"title": "Clip", "id": "abc"})).unwrap();
        assert_eq!(info.title.as_deref(), Some("Clip"));
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_private_video_is_friendly() {
        let err = classify_error("\x1b[0;31mERROR:\x1b[0m [youtube] abc: Private video. Sign in");
        assert!(matches!(err, AppError::VideoUnavailable));

        let err = classify_error("ERROR: [youtube] abc: Video not available");
        assert!(matches!(err, AppError::VideoUnavailable));
    }

    #[test]
    fn test_other_errors_pass_through_without_colors() {
        let stderr = "WARNING: something\n\x1b[0;31mERROR:\x1b[0m Unsupported URL: https://x.y";
        match classify_error(stderr) {
            AppError::Provider(message) => {
                assert_eq!(message, "ERROR: Unsupported URL: https://x.y")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a<b>c:d\"e/f\\g|h?i*j"), "abcdefghij");
        assert_eq!(sanitize_filename("Caf\u{e9} ... "), "Caf");
        assert_eq!(sanitize_filename("...  "), "video");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
    }
}
