use super::progress::{self, ProgressEvent};
use super::{VideoInfo, classify_error, dedupe_formats};
use crate::error::AppError;
use crate::formats::DownloadRequest;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

/// Install locations checked before falling back to `PATH`
const COMMON_PATHS: [&str; 3] = [
    "/opt/homebrew/bin/yt-dlp",
    "/usr/local/bin/yt-dlp",
    "/usr/bin/yt-dlp",
];

/// One download handed to the engine
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    pub output_dir: PathBuf,
    /// yt-dlp output template, relative to `output_dir`
    pub output_template: String,
    pub request: DownloadRequest,
}

/// Handle on a yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Find yt-dlp, preferring an explicit path from the config
    pub fn locate(override_path: Option<&Path>) -> Self {
        if let Some(path) = override_path {
            return Self::new(path);
        }

        for candidate in COMMON_PATHS {
            if Path::new(candidate).is_file() {
                debug!("Using yt-dlp at {}", candidate);
                return Self::new(candidate);
            }
        }

        Self::new("yt-dlp")
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Extract the format list for `url` without downloading anything
    pub fn fetch_formats(&self, url: &str) -> Result<VideoInfo, AppError> {
        info!("Fetching formats for {}", url);

        let output = Command::new(&self.binary)
            .args(["-J", "--no-playlist", "--no-warnings", url])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| AppError::Provider(format!("Failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            return Err(classify_error(&String::from_utf8_lossy(&output.stderr)));
        }

        let mut info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        let reported = info.formats.len();
        info.formats = dedupe_formats(info.formats);
        debug!(
            "yt-dlp reported {} formats, {} unique",
            reported,
            info.formats.len()
        );

        Ok(info)
    }

    /// Full argument list for a download
    pub fn download_args(job: &DownloadJob) -> Vec<String> {
        let mut args = job.request.to_args();
        args.extend([
            "-o".to_string(),
            job.output_dir
                .join(&job.output_template)
                .to_string_lossy()
                .to_string(),
            "--newline".to_string(),
            "--no-playlist".to_string(),
            "--no-colors".to_string(),
            "--progress-template".to_string(),
            progress::progress_template(),
            job.url.clone(),
        ]);
        args
    }

    /// Run a download to completion, reporting progress through `on_event`
    pub fn download<F>(&self, job: &DownloadJob, mut on_event: F) -> Result<(), AppError>
    where
        F: FnMut(ProgressEvent),
    {
        let args = Self::download_args(job);
        info!(
            "Downloading {} with format {} into {}",
            job.url,
            job.request.format,
            job.output_dir.display()
        );

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::Provider(format!("Failed to start yt-dlp: {}", e)))?;

        // stderr must be drained while stdout is read
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if let Some(event) = progress::parse_line(&line) {
                    on_event(event);
                }
            }
        }

        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            info!("Download finished: {}", job.url);
            Ok(())
        } else {
            warn!("yt-dlp exited with {}", status);
            Err(classify_error(&stderr))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::selector::PostProcessor;

    fn job(request: DownloadRequest) -> DownloadJob {
        DownloadJob {
            url: "https://example.com/watch?v=abc".to_string(),
            output_dir: PathBuf::from("/tmp/videos"),
            output_template: "%(title).100s.%(ext)s".to_string(),
            request,
        }
    }

    #[test]
    fn test_download_args_single_stream() {
        let args = YtDlp::download_args(&job(DownloadRequest {
            format: "18".to_string(),
            post_processor: None,
        }));

        assert_eq!(&args[..2], ["-f", "18"]);
        assert!(!args.contains(&"--remux-video".to_string()));
        let out = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[out + 1], "/tmp/videos/%(title).100s.%(ext)s");
        assert_eq!(args.last().unwrap(), "https://example.com/watch?v=abc");
    }

    #[test]
    fn test_download_args_with_merge() {
        let args = YtDlp::download_args(&job(DownloadRequest {
            format: "137+140".to_string(),
            post_processor: Some(PostProcessor::RemuxVideo {
                target: "mp4".to_string(),
            }),
        }));

        assert_eq!(&args[..4], ["-f", "137+140", "--remux-video", "mp4"]);
        let template = args.iter().position(|a| a == "--progress-template").unwrap();
        assert_eq!(args[template + 1], "download:[progress] %(progress)j");
    }

    #[test]
    fn test_locate_prefers_override() {
        let ytdlp = YtDlp::locate(Some(Path::new("/custom/yt-dlp")));
        assert_eq!(ytdlp.binary(), Path::new("/custom/yt-dlp"));
    }

    #[test]
    fn test_missing_binary_is_a_provider_error() {
        let ytdlp = YtDlp::new("/nonexistent/yt-dlp-binary");
        let err = ytdlp.fetch_formats("https://example.com").unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }
}
