use super::strip_ansi;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Prefix put in front of every JSON progress line via `--progress-template`
pub const PROGRESS_MARKER: &str = "[progress] ";

/// Value passed to `--progress-template`
pub fn progress_template() -> String {
    format!("download:{}%(progress)j", PROGRESS_MARKER)
}

static PLAIN_PROGRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*\S+\s+at\s+(\S+)(?:\s+ETA\s+(\S+))?")
        .expect("valid progress regex")
});

static MERGING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Merger?\]\s+Merging").expect("valid merger regex"));

/// Progress dictionary as reported by yt-dlp's progress hooks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressHook {
    pub status: String,
    #[serde(default)]
    pub downloaded_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes_estimate: Option<f64>,
    #[serde(default, rename = "_speed_str")]
    pub speed_str: Option<String>,
    #[serde(default, rename = "_eta_str")]
    pub eta_str: Option<String>,
}

/// Display-ready snapshot of a running download
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub percent: f32,
    pub speed: String,
    pub eta: String,
}

impl ProgressUpdate {
    pub fn from_hook(hook: &ProgressHook) -> Self {
        let downloaded = hook.downloaded_bytes.unwrap_or(0.0);
        let total = hook
            .total_bytes
            .filter(|t| *t > 0.0)
            .or(hook.total_bytes_estimate)
            .unwrap_or(0.0);

        let percent = if total > 0.0 {
            (downloaded / total * 100.0).min(100.0) as f32
        } else {
            0.0
        };

        Self {
            percent,
            speed: display_text(hook.speed_str.as_deref()),
            eta: display_text(hook.eta_str.as_deref()),
        }
    }

    pub fn status_text(&self) -> String {
        format!(
            "Downloading: {:.1}% | Speed: {} | ETA: {}",
            self.percent, self.speed, self.eta
        )
    }
}

fn display_text(value: Option<&str>) -> String {
    let text = strip_ansi(value.unwrap_or("N/A"));
    let text = text.trim();
    if text.is_empty() {
        "N/A".to_string()
    } else {
        text.to_string()
    }
}

/// Something worth reporting from one line of yt-dlp output
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading(ProgressUpdate),
    /// One stream finished downloading
    FileFinished,
    /// Separate video and audio streams are being merged
    Merging,
}

/// Parse a line of yt-dlp stdout
pub fn parse_line(line: &str) -> Option<ProgressEvent> {
    if let Some(json) = line.trim_start().strip_prefix(PROGRESS_MARKER) {
        let hook: ProgressHook = serde_json::from_str(json).ok()?;
        return match hook.status.as_str() {
            "downloading" => Some(ProgressEvent::Downloading(ProgressUpdate::from_hook(&hook))),
            "finished" => Some(ProgressEvent::FileFinished),
            _ => None,
        };
    }

    if let Some(caps) = PLAIN_PROGRESS.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        return Some(ProgressEvent::Downloading(ProgressUpdate {
            percent: percent.min(100.0),
            speed: display_text(caps.get(2).map(|m| m.as_str())),
            eta: display_text(caps.get(3).map(|m| m.as_str())),
        }));
    }

    if MERGING.is_match(line) {
        return Some(ProgressEvent::Merging);
    }

    None
}
