//! Background work units.
//!
//! Every long-running operation runs on its own thread and reports back
//! through a channel that only the UI loop reads.

use crate::config::{RatingConfig, UpdateConfig};
use crate::error::AppError;
use crate::provider::{DownloadJob, ProgressEvent, ProgressUpdate, VideoInfo, YtDlp};
use crate::rating::{RatingRecord, RatingStore, SystemInfo};
use crate::update::{UpdateInfo, VersionChecker, download_update};
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Messages sent from a worker thread to the main thread
#[derive(Debug)]
pub enum WorkerMessage<T> {
    /// Progress of a running download
    Progress(ProgressUpdate),
    /// Free-form status line
    Status(String),
    /// Work completed with a result
    Finished(T),
    /// Work failed with a message fit for the user
    Failed(String),
}

fn spawn_worker<T, F>(name: &str, work: F) -> Receiver<WorkerMessage<T>>
where
    T: Send + 'static,
    F: FnOnce(Sender<WorkerMessage<T>>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || work(tx));

    if let Err(e) = spawned {
        warn!("Failed to start {} worker: {}", name, e);
    }
    rx
}

/// Fetch the format list for `url`
pub fn spawn_fetch(ytdlp: YtDlp, url: String) -> Receiver<WorkerMessage<VideoInfo>> {
    spawn_worker("fetch", move |tx| {
        let message = match ytdlp.fetch_formats(&url) {
            Ok(info) => WorkerMessage::Finished(info),
            Err(e) => {
                warn!("Format fetch failed: {}", e);
                WorkerMessage::Failed(e.to_string())
            }
        };
        let _ = tx.send(message);
    })
}

/// Run a download, forwarding progress as it is parsed
pub fn spawn_download(ytdlp: YtDlp, job: DownloadJob) -> Receiver<WorkerMessage<()>> {
    spawn_worker("download", move |tx| {
        let tx_progress = tx.clone();
        let result = ytdlp.download(&job, move |event| {
            let message = match event {
                ProgressEvent::Downloading(update) => WorkerMessage::Progress(update),
                ProgressEvent::FileFinished => {
                    WorkerMessage::Status("Finishing download...".to_string())
                }
                ProgressEvent::Merging => {
                    WorkerMessage::Status("Merging video and audio...".to_string())
                }
            };
            let _ = tx_progress.send(message);
        });

        let message = match result {
            Ok(()) => WorkerMessage::Finished(()),
            Err(AppError::VideoUnavailable) => {
                warn!("Video is private or unavailable");
                WorkerMessage::Failed(AppError::VideoUnavailable.to_string())
            }
            Err(e) => {
                warn!("Download failed: {}", e);
                WorkerMessage::Failed(format!("Download failed: {}", e))
            }
        };
        let _ = tx.send(message);
    })
}

/// Ask the update endpoint whether a newer release exists.
///
/// Network and parse failures are logged and reported as "no update".
pub fn spawn_update_check(config: UpdateConfig) -> Receiver<WorkerMessage<Option<UpdateInfo>>> {
    spawn_worker("update-check", move |tx| {
        let result = VersionChecker::new(env!("CARGO_PKG_VERSION"), config.api_url)
            .and_then(|checker| checker.check_for_updates());

        let update = match result {
            Ok(update) => update,
            Err(e) => {
                warn!("Error checking for updates: {}", e);
                None
            }
        };
        let _ = tx.send(WorkerMessage::Finished(update));
    })
}

/// Download a release artifact; `Finished(None)` means it was cancelled
pub fn spawn_update_download(
    url: String,
    dir: PathBuf,
    artifact_name: String,
    cancel_flag: Arc<AtomicBool>,
) -> Receiver<WorkerMessage<Option<PathBuf>>> {
    spawn_worker("update-download", move |tx| {
        let client = Client::new();
        let tx_progress = tx.clone();
        let mut last_reported = None;
        let result = download_update(
            &client,
            &url,
            &dir,
            &artifact_name,
            &cancel_flag,
            move |progress| {
                // one report per whole percent, or per 64 KiB when the size is unknown
                let marker = progress
                    .percent()
                    .map(u64::from)
                    .unwrap_or(progress.downloaded / (64 * 1024));
                if last_reported == Some(marker) {
                    return;
                }
                last_reported = Some(marker);

                let _ = tx_progress.send(WorkerMessage::Progress(ProgressUpdate {
                    percent: progress.percent().map(f32::from).unwrap_or(0.0),
                    speed: "N/A".to_string(),
                    eta: "N/A".to_string(),
                }));
                let _ = tx_progress.send(WorkerMessage::Status(progress.label()));
            },
        );

        let message = match result {
            Ok(path) => WorkerMessage::Finished(path),
            Err(e) => {
                warn!("Update download failed: {}", e);
                WorkerMessage::Failed(format!("Failed to download update: {}", e))
            }
        };
        let _ = tx.send(message);
    })
}

/// Wait `delay`, then decide whether the rating prompt should appear.
///
/// Finishes with `true` when the prompt should be shown. Lookup errors
/// count as "not rated yet".
pub fn spawn_rating_gate(config: RatingConfig, delay: Duration) -> Receiver<WorkerMessage<bool>> {
    spawn_worker("rating-gate", move |tx| {
        thread::sleep(delay);

        let ip = SystemInfo::collect().ip_address;
        let rated = RatingStore::new(&config).and_then(|store| store.has_rated(&ip));
        let show = match rated {
            Ok(true) => {
                info!("User has already provided a rating");
                false
            }
            Ok(false) => true,
            Err(e) => {
                warn!("Error while checking previous rating: {}", e);
                true
            }
        };
        let _ = tx.send(WorkerMessage::Finished(show));
    })
}

/// Send a rating; failures are logged only
pub fn spawn_rating_submit(
    config: RatingConfig,
    stars: u8,
    review: String,
) -> Receiver<WorkerMessage<()>> {
    spawn_worker("rating-submit", move |tx| {
        let result = RatingRecord::new(stars, &review, &SystemInfo::collect())
            .and_then(|record| RatingStore::new(&config)?.submit(&record));

        if let Err(e) = result {
            warn!("Error sending rating: {}", e);
        }
        let _ = tx.send(WorkerMessage::Finished(()));
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait<T>(rx: &Receiver<WorkerMessage<T>>) -> WorkerMessage<T> {
        rx.recv_timeout(Duration::from_secs(30)).unwrap()
    }

    #[test]
    fn test_fetch_failure_is_reported() {
        let rx = spawn_fetch(
            YtDlp::new("/nonexistent/yt-dlp"),
            "https://example.com".to_string(),
        );
        match wait(&rx) {
            WorkerMessage::Failed(message) => assert!(message.contains("yt-dlp")),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_update_check_errors_mean_no_update() {
        let config = UpdateConfig {
            api_url: "http://127.0.0.1:9/version".to_string(),
            ..Default::default()
        };
        let rx = spawn_update_check(config);
        assert!(matches!(wait(&rx), WorkerMessage::Finished(None)));
    }

    #[test]
    fn test_unconfigured_rating_gate_still_shows() {
        let rx = spawn_rating_gate(RatingConfig::default(), Duration::ZERO);
        assert!(matches!(wait(&rx), WorkerMessage::Finished(true)));
    }

    #[test]
    fn test_rating_submit_always_finishes() {
        let rx = spawn_rating_submit(RatingConfig::default(), 9, String::new());
        assert!(matches!(wait(&rx), WorkerMessage::Finished(())));
    }
}
