use super::Version;
use crate::error::AppError;
use crate::utils::format_file_size;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bytes read per step while downloading an update
pub const CHUNK_SIZE: usize = 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Payload of the version endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateInfo {
    pub version: String,
    pub download_url: String,
}

/// Compares the running version against the remote endpoint
pub struct VersionChecker {
    current: Version,
    api_url: String,
    client: Client,
}

impl VersionChecker {
    pub fn new(current: &str, api_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("any-video-downloader/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            current: current.parse()?,
            api_url: api_url.into(),
            client,
        })
    }

    /// `Some` only when the remote version is strictly newer
    pub fn check_for_updates(&self) -> Result<Option<UpdateInfo>, AppError> {
        debug!("Checking for updates at {}", self.api_url);
        let response = self.client.get(&self.api_url).send()?;

        if response.status() != StatusCode::OK {
            warn!("Update endpoint answered {}", response.status());
            return Ok(None);
        }

        let info: UpdateInfo = response.json()?;
        Ok(self.newer(info))
    }

    fn newer(&self, info: UpdateInfo) -> Option<UpdateInfo> {
        match info.version.parse::<Version>() {
            Ok(remote) if remote > self.current => {
                info!("Update available: {} -> {}", self.current, remote);
                Some(info)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring update info: {}", e);
                None
            }
        }
    }
}

/// First free path for `name` in `dir`, adding " (1)", " (2)", ... before
/// the extension
pub fn unique_artifact_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let file_name = Path::new(name);
    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    let extension = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|counter| dir.join(format!("{} ({}){}", stem, counter, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Byte counters of a running update download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: u64,
}

impl DownloadProgress {
    /// Whole percent, `None` while the size is unknown
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        Some((self.downloaded.saturating_mul(100) / self.total).min(100) as u8)
    }

    pub fn label(&self) -> String {
        match self.percent() {
            Some(percent) => format!(
                "Downloading: {}% complete ({} / {})",
                percent,
                format_file_size(self.downloaded),
                format_file_size(self.total)
            ),
            None => format!("Downloading: {}", format_file_size(self.downloaded)),
        }
    }
}

/// Download the update artifact into `dir`.
///
/// Returns `Ok(None)` when cancelled. The partial file is removed on
/// cancellation and on any error.
pub fn download_update<F>(
    client: &Client,
    url: &str,
    dir: &Path,
    artifact_name: &str,
    cancel_flag: &AtomicBool,
    mut on_progress: F,
) -> Result<Option<PathBuf>, AppError>
where
    F: FnMut(DownloadProgress),
{
    std::fs::create_dir_all(dir)?;
    let path = unique_artifact_path(dir, artifact_name);
    info!("Downloading update from {} to {}", url, path.display());

    let result = stream_to_file(client, url, &path, cancel_flag, &mut on_progress);
    match result {
        Ok(true) => finalize_artifact(path, make_executable).map(Some),
        Ok(false) => {
            info!("Update download cancelled");
            let _ = std::fs::remove_file(&path);
            Ok(None)
        }
        Err(e) => {
            if path.exists() {
                let _ = std::fs::remove_file(&path);
            }
            Err(AppError::Update(e.to_string()))
        }
    }
}

/// Run the last step on a complete artifact, removing it if the step fails
fn finalize_artifact<F>(path: PathBuf, step: F) -> Result<PathBuf, AppError>
where
    F: FnOnce(&Path) -> Result<(), AppError>,
{
    match step(&path) {
        Ok(()) => Ok(path),
        Err(e) => {
            let _ = std::fs::remove_file(&path);
            Err(AppError::Update(e.to_string()))
        }
    }
}

/// `Ok(false)` when cancelled
fn stream_to_file(
    client: &Client,
    url: &str,
    path: &Path,
    cancel_flag: &AtomicBool,
    on_progress: &mut dyn FnMut(DownloadProgress),
) -> Result<bool, AppError> {
    let mut response = client.get(url).send()?.error_for_status()?;
    let total = response.content_length().unwrap_or(0);

    let mut file = File::create(path)?;
    let mut buffer = [0_u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        if cancel_flag.load(Ordering::Relaxed) {
            return Ok(false);
        }

        let read = response.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])?;
        downloaded += read as u64;
        on_progress(DownloadProgress { downloaded, total });
    }

    file.flush()?;
    Ok(true)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Serve `body` once over plain HTTP, returning the URL to fetch
    fn serve_once(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            // the client may hang up early when it cancels
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
        });
        format!("http://{}/artifact", addr)
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn test_unique_path_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        let name = "Any Video Url Downloader.exe";

        let first = unique_artifact_path(dir.path(), name);
        assert_eq!(first, dir.path().join(name));
        File::create(&first).unwrap();

        let second = unique_artifact_path(dir.path(), name);
        assert_eq!(second, dir.path().join("Any Video Url Downloader (1).exe"));
        File::create(&second).unwrap();

        let third = unique_artifact_path(dir.path(), name);
        assert_eq!(third, dir.path().join("Any Video Url Downloader (2).exe"));
    }

    #[test]
    fn test_unique_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("downloader")).unwrap();
        assert_eq!(
            unique_artifact_path(dir.path(), "downloader"),
            dir.path().join("downloader (1)")
        );
    }

    #[test]
    fn test_only_strictly_newer_versions_update() {
        let checker = VersionChecker::new("4.1.2", "http://localhost/version").unwrap();
        let info = |version: &str| UpdateInfo {
            version: version.to_string(),
            download_url: "http://localhost/app".to_string(),
        };

        assert!(checker.newer(info("4.1.3")).is_some());
        assert!(checker.newer(info("4.1.2")).is_none());
        assert!(checker.newer(info("4.0.9")).is_none());
        assert!(checker.newer(info("not-a-version")).is_none());
    }

    #[test]
    fn test_progress_label() {
        let progress = DownloadProgress {
            downloaded: 500_000,
            total: 2_000_000,
        };
        assert_eq!(progress.percent(), Some(25));
        let label = progress.label();
        assert!(label.starts_with("Downloading: 25% complete ("));
        assert!(label.ends_with("MB)"));

        let unknown = DownloadProgress {
            downloaded: 10,
            total: 0,
        };
        assert_eq!(unknown.percent(), None);
    }

    #[test]
    fn test_cancel_mid_transfer_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_once(vec![7_u8; 100_000]);
        let cancel = AtomicBool::new(false);
        let mut calls = 0;

        let result = download_update(
            &local_client(),
            &url,
            dir.path(),
            "artifact",
            &cancel,
            |_| {
                calls += 1;
                if calls == 3 {
                    cancel.store(true, Ordering::Relaxed);
                }
            },
        );

        assert!(matches!(result, Ok(None)));
        assert_eq!(calls, 3);
        assert!(!dir.path().join("artifact").exists());
    }

    #[test]
    fn test_complete_download_uses_free_name() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("artifact")).unwrap();
        let body: Vec<u8> = (0..5000_u32).map(|i| (i % 251) as u8).collect();
        let url = serve_once(body.clone());
        let cancel = AtomicBool::new(false);
        let mut last = None;

        let path = download_update(
            &local_client(),
            &url,
            dir.path(),
            "artifact",
            &cancel,
            |progress| last = Some(progress),
        )
        .unwrap()
        .unwrap();

        assert_eq!(path, dir.path().join("artifact (1)"));
        assert_eq!(std::fs::read(&path).unwrap(), body);
        let last = last.unwrap();
        assert_eq!(last.downloaded, body.len() as u64);
        assert_eq!(last.percent(), Some(100));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_failed_final_step_removes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact");
        File::create(&path).unwrap();

        let result = finalize_artifact(path.clone(), |_| {
            Err(AppError::Update("permission denied".to_string()))
        });
        assert!(matches!(result, Err(AppError::Update(_))));
        assert!(!path.exists());

        File::create(&path).unwrap();
        assert_eq!(finalize_artifact(path.clone(), make_executable).unwrap(), path);
    }

    #[test]
    fn test_failed_download_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = local_client();
        let cancel = AtomicBool::new(false);

        let result = download_update(
            &client,
            "http://127.0.0.1:9/update",
            dir.path(),
            "artifact",
            &cancel,
            |_| {},
        );
        assert!(result.is_err());
        assert!(!dir.path().join("artifact").exists());
    }
}
