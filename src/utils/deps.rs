use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Availability of the external tools the downloader drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyStatus {
    /// Required for everything
    pub ytdlp: bool,
    /// Needed to merge separate streams and remux
    pub ffmpeg: bool,
}

impl DependencyStatus {
    /// Check all dependencies
    pub fn check(ytdlp: &Path) -> Self {
        let status = Self {
            ytdlp: check_command(ytdlp, &["--version"]),
            ffmpeg: check_command("ffmpeg", &["-version"]),
        };

        if status.ytdlp {
            info!("Found yt-dlp at {}", ytdlp.display());
        } else {
            warn!("yt-dlp not runnable at {}", ytdlp.display());
        }
        if !status.ffmpeg {
            warn!("ffmpeg not found, merging and remuxing will fail");
        }
        status
    }

    /// Message to surface at start, if anything is missing
    pub fn problem(&self) -> Option<String> {
        match (self.ytdlp, self.ffmpeg) {
            (false, _) => Some(
                "yt-dlp was not found. Install it or set download.ytdlp_path in the config."
                    .to_string(),
            ),
            (true, false) => Some(
                "ffmpeg was not found. Formats that need audio merging will fail to download."
                    .to_string(),
            ),
            (true, true) => None,
        }
    }
}

/// Check if a command is available
fn check_command(cmd: impl AsRef<OsStr>, args: &[&str]) -> bool {
    Command::new(cmd)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_reported() {
        let status = DependencyStatus::check(Path::new("/nonexistent/yt-dlp"));
        assert!(!status.ytdlp);
        assert!(status.problem().unwrap().contains("yt-dlp"));
    }

    #[test]
    fn test_all_present_has_no_problem() {
        let status = DependencyStatus {
            ytdlp: true,
            ffmpeg: true,
        };
        assert_eq!(status.problem(), None);

        let status = DependencyStatus {
            ytdlp: true,
            ffmpeg: false,
        };
        assert!(status.problem().unwrap().contains("ffmpeg"));
    }
}
