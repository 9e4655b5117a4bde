//! Application Module
//!
//! Main application state and logic. Only the UI loop mutates `App`;
//! workers talk to it through channels drained in
//! [`App::process_worker_messages`].

use crate::config::AppConfig;
use crate::formats::{EnrichedFormat, FilterTag, FormatFilter, FormatSelector, enhance};
use crate::provider::{DownloadJob, VideoInfo, YtDlp, sanitize_filename};
use crate::rating::RatingDraft;
use crate::update::UpdateInfo;
use crate::utils::{DependencyStatus, disk_space, format_file_size};
use crate::worker::{self, WorkerMessage};
use ratatui::widgets::{ListState, TableState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;
use tracing::{info, warn};

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    FormatBrowser,
    FolderPicker,
}

/// Focusable controls of the home screen, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeFocus {
    Url,
    GetFormats,
    OutputFolder,
    Download,
}

impl HomeFocus {
    const ORDER: [HomeFocus; 4] = [
        HomeFocus::Url,
        HomeFocus::GetFormats,
        HomeFocus::OutputFolder,
        HomeFocus::Download,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Format browser focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFocus {
    Search,
    Table,
}

/// Rating dialog focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingFocus {
    Stars,
    Review,
}

/// Confirmation dialog action
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    ExitApp,
    DownloadUpdate(UpdateInfo),
    RunUpdate(PathBuf),
}

/// Dismissible message box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

/// Progress of a running update download
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProgress {
    pub percent: f32,
    pub label: String,
}

/// Main application state
pub struct App {
    pub current_screen: Screen,
    pub should_quit: bool,
    pub config: AppConfig,
    pub ytdlp: YtDlp,

    // Home
    pub home_focus: HomeFocus,
    pub url_input: String,
    pub output_dir: Option<PathBuf>,
    pub video_title: Option<String>,

    // Format browser
    pub formats: Vec<EnrichedFormat>,
    pub filter: FormatFilter,
    pub visible_rows: Vec<usize>,
    pub browser_focus: BrowserFocus,
    pub table_state: TableState,
    pub selector: FormatSelector,

    // Folder picker
    pub current_dir: PathBuf,
    pub dir_entries: Vec<PathBuf>,
    pub explorer_index: usize,
    pub explorer_list_state: ListState,

    // Download
    pub download_progress: f32,
    pub status: String,
    pub fetch_receiver: Option<Receiver<WorkerMessage<VideoInfo>>>,
    pub download_receiver: Option<Receiver<WorkerMessage<()>>>,

    // Update
    pub update_check_receiver: Option<Receiver<WorkerMessage<Option<UpdateInfo>>>>,
    pub update_receiver: Option<Receiver<WorkerMessage<Option<PathBuf>>>>,
    pub update_cancel_flag: Arc<AtomicBool>,
    pub update_progress: Option<UpdateProgress>,

    // Rating
    pub rating_gate_receiver: Option<Receiver<WorkerMessage<bool>>>,
    pub rating_submit_receiver: Option<Receiver<WorkerMessage<()>>>,
    pub rating_dialog: Option<RatingDraft>,
    pub rating_focus: RatingFocus,

    // UI state
    pub notification: Option<Notification>,
    pub confirm_dialog: Option<ConfirmAction>,
    pub confirm_selection: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let ytdlp = YtDlp::locate(config.download.ytdlp_path.as_deref());
        let output_dir = config.download.output_dir.clone();
        let current_dir = output_dir
            .clone()
            .filter(|dir| dir.is_dir())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut explorer_list_state = ListState::default();
        explorer_list_state.select(Some(0));

        Self {
            current_screen: Screen::Home,
            should_quit: false,
            config,
            ytdlp,
            home_focus: HomeFocus::Url,
            url_input: String::new(),
            output_dir,
            video_title: None,
            formats: Vec::new(),
            filter: FormatFilter::default(),
            visible_rows: Vec::new(),
            browser_focus: BrowserFocus::Table,
            table_state: TableState::default(),
            selector: FormatSelector::new(),
            current_dir,
            dir_entries: Vec::new(),
            explorer_index: 0,
            explorer_list_state,
            download_progress: 0.0,
            status: String::new(),
            fetch_receiver: None,
            download_receiver: None,
            update_check_receiver: None,
            update_receiver: None,
            update_cancel_flag: Arc::new(AtomicBool::new(false)),
            update_progress: None,
            rating_gate_receiver: None,
            rating_submit_receiver: None,
            rating_dialog: None,
            rating_focus: RatingFocus::Stars,
            notification: None,
            confirm_dialog: None,
            confirm_selection: false,
        }
    }

    /// Dependency check, update check and the delayed rating gate
    pub fn start_background_tasks(&mut self) {
        if let Some(problem) = DependencyStatus::check(self.ytdlp.binary()).problem() {
            self.notify_error("Missing Dependency", &problem);
        }

        if self.config.update.is_active() {
            self.update_check_receiver =
                Some(worker::spawn_update_check(self.config.update.clone()));
        }

        if self.config.rating.is_active() {
            let delay = Duration::from_secs(self.config.rating.delay_secs);
            self.rating_gate_receiver =
                Some(worker::spawn_rating_gate(self.config.rating.clone(), delay));
        }
    }

    // Notifications

    pub fn notify(&mut self, title: &str, message: &str) {
        self.notification = Some(Notification {
            title: title.to_string(),
            message: message.to_string(),
            is_error: false,
        });
    }

    pub fn notify_error(&mut self, title: &str, message: &str) {
        self.notification = Some(Notification {
            title: title.to_string(),
            message: message.to_string(),
            is_error: true,
        });
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn ask_confirm(&mut self, action: ConfirmAction) {
        self.confirm_dialog = Some(action);
        self.confirm_selection = false; // Default to "No"
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_receiver.is_some()
    }

    pub fn is_downloading(&self) -> bool {
        self.download_receiver.is_some()
    }

    /// Fetching and downloading share the yt-dlp controls
    pub fn is_busy(&self) -> bool {
        self.is_fetching() || self.is_downloading()
    }

    // Navigation

    pub fn navigate_to_home(&mut self) {
        self.current_screen = Screen::Home;
    }

    pub fn navigate_to_format_browser(&mut self) {
        self.browser_focus = BrowserFocus::Table;
        self.refresh_visible_rows();
        self.current_screen = Screen::FormatBrowser;
    }

    pub fn navigate_to_folder_picker(&mut self) {
        self.refresh_dir_entries();
        self.current_screen = Screen::FolderPicker;
    }

    // URL input

    pub fn push_url_char(&mut self, c: char) {
        self.url_input.push(c);
    }

    pub fn pop_url_char(&mut self) {
        self.url_input.pop();
    }

    /// Bracketed paste into whichever text field has focus
    pub fn paste(&mut self, text: &str) {
        let line = text.lines().next().unwrap_or_default().trim();
        match (self.current_screen, self.browser_focus) {
            (Screen::Home, _) if self.home_focus == HomeFocus::Url => self.url_input.push_str(line),
            (Screen::FormatBrowser, BrowserFocus::Search) => {
                self.filter.query.push_str(line);
                self.refresh_visible_rows();
            }
            _ => {}
        }
    }

    // Format fetching

    pub fn fetch_formats(&mut self) {
        if self.is_busy() {
            return;
        }

        let url = self.url_input.trim().to_string();
        if url.is_empty() {
            self.notify_error("Error", "Please enter a valid URL.");
            return;
        }

        info!("Requesting formats for {}", url);
        self.status = "Fetching available video formats...".to_string();
        self.fetch_receiver = Some(worker::spawn_fetch(self.ytdlp.clone(), url));
    }

    /// Replace the format list with a freshly fetched one
    pub fn load_formats(&mut self, info: VideoInfo) {
        self.formats = enhance(&info.formats);
        self.video_title = info.title;
        self.filter = FormatFilter::default();
        self.status.clear();
        info!("Loaded {} formats", self.formats.len());

        if self.formats.is_empty() {
            self.notify_error("Error", "No downloadable formats were found for this URL.");
            return;
        }
        self.navigate_to_format_browser();
    }

    // Format browser

    /// Recompute the visible rows, keeping the cursor on screen
    pub fn refresh_visible_rows(&mut self) {
        self.visible_rows = self.filter.visible_rows(&self.formats);
        let selected = match self.table_state.selected() {
            _ if self.visible_rows.is_empty() => None,
            Some(index) => Some(index.min(self.visible_rows.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    pub fn set_filter_tag(&mut self, tag: FilterTag) {
        self.filter.tag = tag;
        self.table_state.select(Some(0));
        self.refresh_visible_rows();
    }

    pub fn cycle_filter(&mut self, forward: bool) {
        let count = crate::formats::FILTER_OPTIONS.len();
        let current = self.filter.tag.control_index();
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        if let Some(tag) = FilterTag::from_control(next) {
            self.set_filter_tag(tag);
        }
    }

    pub fn push_query_char(&mut self, c: char) {
        self.filter.query.push(c);
        self.refresh_visible_rows();
    }

    pub fn pop_query_char(&mut self) {
        self.filter.query.pop();
        self.refresh_visible_rows();
    }

    pub fn browser_move_up(&mut self) {
        if let Some(index) = self.table_state.selected()
            && index > 0
        {
            self.table_state.select(Some(index - 1));
        }
    }

    pub fn browser_move_down(&mut self) {
        if let Some(index) = self.table_state.selected()
            && index + 1 < self.visible_rows.len()
        {
            self.table_state.select(Some(index + 1));
        }
    }

    /// Index into `formats` of the row under the cursor
    pub fn highlighted_row(&self) -> Option<usize> {
        self.table_state
            .selected()
            .and_then(|index| self.visible_rows.get(index).copied())
    }

    pub fn highlighted_format(&self) -> Option<&EnrichedFormat> {
        self.highlighted_row().and_then(|row| self.formats.get(row))
    }

    /// Commit the highlighted row and return to the home screen
    pub fn confirm_format_selection(&mut self) {
        let Some(row) = self.highlighted_row() else {
            self.notify_error("Error", "Please select a format first.");
            return;
        };

        match self.selector.select(&self.formats, row) {
            Ok(_) => {
                self.home_focus = HomeFocus::OutputFolder;
                self.navigate_to_home();
            }
            Err(e) => self.notify_error("Error", &e.to_string()),
        }
    }

    /// Label shown on the home screen for the current choice
    pub fn selected_format_label(&self) -> String {
        self.selector
            .current()
            .map(EnrichedFormat::summary)
            .unwrap_or_else(|| "No format selected".to_string())
    }

    // Folder picker

    pub fn refresh_dir_entries(&mut self) {
        self.dir_entries.clear();

        // Add parent directory
        if let Some(parent) = self.current_dir.parent()
            && parent != self.current_dir
        {
            self.dir_entries.push(PathBuf::from(".."));
        }

        if let Ok(entries) = std::fs::read_dir(&self.current_dir) {
            let mut paths: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .filter(|p| {
                    !p.file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
                })
                .collect();

            paths.sort_by_key(|p| p.file_name().map(|n| n.to_ascii_lowercase()));
            self.dir_entries.extend(paths);
        }

        self.explorer_index = 0;
        self.explorer_list_state.select(Some(0));
    }

    pub fn explorer_move_up(&mut self) {
        if self.explorer_index > 0 {
            self.explorer_index -= 1;
            self.explorer_list_state.select(Some(self.explorer_index));
        }
    }

    pub fn explorer_move_down(&mut self) {
        if self.explorer_index < self.dir_entries.len().saturating_sub(1) {
            self.explorer_index += 1;
            self.explorer_list_state.select(Some(self.explorer_index));
        }
    }

    pub fn enter_directory(&mut self) {
        let Some(selected) = self.dir_entries.get(self.explorer_index).cloned() else {
            return;
        };

        if selected == Path::new("..") {
            if let Some(parent) = self.current_dir.parent() {
                self.current_dir = parent.to_path_buf();
                self.refresh_dir_entries();
            }
        } else if selected.is_dir() {
            self.current_dir = selected;
            self.refresh_dir_entries();
        }
    }

    /// Use the highlighted folder, or the current one when ".." is highlighted
    pub fn choose_highlighted_folder(&mut self) {
        let chosen = match self.dir_entries.get(self.explorer_index) {
            Some(entry) if entry != Path::new("..") => entry.clone(),
            _ => self.current_dir.clone(),
        };
        self.set_output_dir(chosen);
    }

    pub fn choose_current_folder(&mut self) {
        self.set_output_dir(self.current_dir.clone());
    }

    fn set_output_dir(&mut self, dir: PathBuf) {
        info!("Output folder: {}", dir.display());
        self.output_dir = Some(dir);
        self.home_focus = HomeFocus::Download;
        self.navigate_to_home();
    }

    // Download

    pub fn start_download(&mut self) {
        if self.is_busy() {
            return;
        }

        let url = self.url_input.trim().to_string();
        if url.is_empty() {
            self.notify_error("Error", "Please enter a valid URL.");
            return;
        }

        let Some(output_dir) = self.output_dir.clone() else {
            self.notify_error("Error", "Please select an output directory.");
            return;
        };

        let Some(request) = self
            .selector
            .download_request(&self.config.download.remux_container)
        else {
            self.notify_error("Error", "Please select a format to download.");
            return;
        };

        if let Err(e) = std::fs::create_dir_all(&output_dir) {
            self.notify_error("Error", &format!("Could not create directory: {}", e));
            return;
        }

        if let Some(available) =
            disk_space::low_space(&output_dir, self.config.download.min_free_space_mb)
        {
            warn!("Low disk space in {}", output_dir.display());
            self.notify(
                "Low Disk Space",
                &format!(
                    "Only {} free in {}. The download may fail.",
                    format_file_size(available),
                    output_dir.display()
                ),
            );
        }

        let job = DownloadJob {
            url,
            output_dir,
            output_template: self.config.download.output_template.clone(),
            request,
        };

        self.download_progress = 0.0;
        self.status = match &self.video_title {
            Some(title) => format!("Downloading: {}", sanitize_filename(title)),
            None => "Starting download...".to_string(),
        };
        self.download_receiver = Some(worker::spawn_download(self.ytdlp.clone(), job));
    }

    // Update

    pub fn start_update_download(&mut self, update: UpdateInfo) {
        let dir = dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .unwrap_or_else(|| PathBuf::from("."));

        self.update_cancel_flag = Arc::new(AtomicBool::new(false));
        self.update_progress = Some(UpdateProgress {
            percent: 0.0,
            label: "Preparing download...".to_string(),
        });
        self.update_receiver = Some(worker::spawn_update_download(
            update.download_url,
            dir,
            self.config.update.artifact_name.clone(),
            self.update_cancel_flag.clone(),
        ));
    }

    pub fn cancel_update_download(&mut self) {
        self.update_cancel_flag.store(true, Ordering::Relaxed);
        if let Some(progress) = self.update_progress.as_mut() {
            progress.label = "Cancelling...".to_string();
        }
    }

    /// Launch the downloaded release and quit
    pub fn run_update(&mut self, path: &Path) {
        match std::process::Command::new(path).spawn() {
            Ok(_) => {
                info!("Started {}", path.display());
                self.should_quit = true;
            }
            Err(e) => self.notify_error(
                "Update Error",
                &format!("Could not start {}: {}", path.display(), e),
            ),
        }
    }

    pub fn execute_confirm_action(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::ExitApp => self.should_quit = true,
            ConfirmAction::DownloadUpdate(update) => self.start_update_download(update),
            ConfirmAction::RunUpdate(path) => self.run_update(&path),
        }
    }

    // Rating

    pub fn close_rating_dialog(&mut self) {
        self.rating_dialog = None;
    }

    /// Send the rating in the background; the dialog closes either way
    pub fn submit_rating(&mut self) {
        let Some(draft) = self.rating_dialog.take() else {
            return;
        };
        if !draft.can_send() {
            self.rating_dialog = Some(draft);
            return;
        }

        self.rating_submit_receiver = Some(worker::spawn_rating_submit(
            self.config.rating.clone(),
            draft.stars,
            draft.review,
        ));
    }

    // Worker messages

    pub fn process_worker_messages(&mut self) {
        for msg in drain(&mut self.fetch_receiver) {
            match msg {
                WorkerMessage::Finished(info) => self.load_formats(info),
                WorkerMessage::Failed(e) => {
                    self.status.clear();
                    self.notify_error("Error", &format!("Could not retrieve formats: {}", e));
                }
                WorkerMessage::Progress(_) | WorkerMessage::Status(_) => {}
            }
        }

        for msg in drain(&mut self.download_receiver) {
            match msg {
                WorkerMessage::Progress(update) => {
                    self.download_progress = update.percent;
                    self.status = update.status_text();
                }
                WorkerMessage::Status(status) => self.status = status,
                WorkerMessage::Finished(()) => {
                    self.download_progress = 100.0;
                    self.status = "Download complete!".to_string();
                    self.notify("Success", "Download completed successfully!");
                }
                WorkerMessage::Failed(e) => {
                    self.download_progress = 0.0;
                    self.status = "Download failed".to_string();
                    self.notify_error("Error", &e);
                }
            }
        }

        for msg in drain(&mut self.update_check_receiver) {
            if let WorkerMessage::Finished(Some(update)) = msg {
                self.ask_confirm(ConfirmAction::DownloadUpdate(update));
            }
        }

        for msg in drain(&mut self.update_receiver) {
            match msg {
                WorkerMessage::Progress(update) => {
                    if let Some(progress) = self.update_progress.as_mut() {
                        progress.percent = update.percent;
                    }
                }
                WorkerMessage::Status(label) => {
                    if let Some(progress) = self.update_progress.as_mut() {
                        progress.label = label;
                    }
                }
                WorkerMessage::Finished(Some(path)) => {
                    self.update_progress = None;
                    self.ask_confirm(ConfirmAction::RunUpdate(path));
                }
                WorkerMessage::Finished(None) => {
                    self.update_progress = None;
                    self.notify("Download Cancelled", "The update download was cancelled.");
                }
                WorkerMessage::Failed(e) => {
                    self.update_progress = None;
                    self.notify_error("Update Error", &e);
                }
            }
        }

        for msg in drain(&mut self.rating_gate_receiver) {
            if let WorkerMessage::Finished(true) = msg {
                self.rating_focus = RatingFocus::Stars;
                self.rating_dialog = Some(RatingDraft::default());
            }
        }

        for msg in drain(&mut self.rating_submit_receiver) {
            if let WorkerMessage::Finished(()) = msg {
                info!("Rating submission finished");
            }
        }
    }
}

/// Pull every pending message; the slot is cleared once the worker is done
fn drain<T>(slot: &mut Option<Receiver<WorkerMessage<T>>>) -> Vec<WorkerMessage<T>> {
    let mut messages = Vec::new();
    let mut finished = false;

    if let Some(rx) = slot.as_ref() {
        loop {
            match rx.try_recv() {
                Ok(msg) => {
                    finished = matches!(msg, WorkerMessage::Finished(_) | WorkerMessage::Failed(_));
                    messages.push(msg);
                    if finished {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    messages.push(WorkerMessage::Failed(
                        "Background task stopped unexpectedly".to_string(),
                    ));
                    finished = true;
                    break;
                }
            }
        }
    }

    if finished {
        *slot = None;
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::RawFormat;
    use serde_json::json;
    use std::sync::mpsc;

    fn app() -> App {
        let mut config = AppConfig::default();
        config.download.output_dir = None;
        App::new(config)
    }

    fn video_info() -> VideoInfo {
        let formats: Vec<RawFormat> = serde_json::from_value(json!([
            {"format_id": "18", "ext": "mp4", "height": 360, "vcodec": "avc1", "acodec": "mp4a"},
            {"format_id": "137", "ext": "mp4", "height": 1080, "vcodec": "avc1", "acodec": "none"},
            {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a", "abr": 128}
        ]))
        .unwrap();
        VideoInfo {
            title: Some("Clip".to_string()),
            formats,
        }
    }

    #[test]
    fn test_fetch_requires_url() {
        let mut app = app();
        app.url_input = "   ".to_string();
        app.fetch_formats();

        assert!(!app.is_fetching());
        let notification = app.notification.unwrap();
        assert_eq!(notification.message, "Please enter a valid URL.");
        assert!(notification.is_error);
    }

    #[test]
    fn test_download_validation_order() {
        let mut app = app();
        app.start_download();
        assert_eq!(
            app.notification.take().unwrap().message,
            "Please enter a valid URL."
        );

        app.url_input = "https://example.com/v".to_string();
        app.start_download();
        assert_eq!(
            app.notification.take().unwrap().message,
            "Please select an output directory."
        );

        let dir = tempfile::tempdir().unwrap();
        app.output_dir = Some(dir.path().to_path_buf());
        app.start_download();
        assert_eq!(
            app.notification.take().unwrap().message,
            "Please select a format to download."
        );
        assert!(!app.is_downloading());
    }

    #[test]
    fn test_filtered_selection_maps_to_full_list() {
        let mut app = app();
        app.load_formats(video_info());
        assert_eq!(app.current_screen, Screen::FormatBrowser);

        app.set_filter_tag(FilterTag::Audio);
        assert_eq!(app.visible_rows, vec![2]);
        assert_eq!(app.highlighted_row(), Some(2));

        app.confirm_format_selection();
        assert_eq!(app.current_screen, Screen::Home);
        assert_eq!(app.selector.current().unwrap().format_id(), "140");
        assert_eq!(
            app.selected_format_label(),
            "Code: 140 | Resolution: N/A | Ext: m4a"
        );
    }

    #[test]
    fn test_query_with_no_match_leaves_nothing_to_confirm() {
        let mut app = app();
        app.load_formats(video_info());
        for c in "nothing".chars() {
            app.push_query_char(c);
        }

        assert!(app.visible_rows.is_empty());
        assert_eq!(app.table_state.selected(), None);
        app.confirm_format_selection();
        assert!(app.selector.current().is_none());
        assert!(app.notification.is_some());
    }

    #[test]
    fn test_cursor_stays_inside_visible_rows() {
        let mut app = app();
        app.load_formats(video_info());
        app.browser_move_down();
        app.browser_move_down();
        app.browser_move_down();
        assert_eq!(app.table_state.selected(), Some(2));

        app.set_filter_tag(FilterTag::HighRes);
        assert_eq!(app.visible_rows, vec![1]);
        assert_eq!(app.highlighted_format().unwrap().format_id(), "137");
    }

    #[test]
    fn test_empty_fetch_stays_home() {
        let mut app = app();
        app.load_formats(VideoInfo::default());
        assert_eq!(app.current_screen, Screen::Home);
        assert!(app.notification.is_some());
    }

    #[test]
    fn test_fetch_failure_message() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        app.fetch_receiver = Some(rx);
        tx.send(WorkerMessage::Failed("boom".to_string())).unwrap();

        app.process_worker_messages();
        assert!(!app.is_fetching());
        assert_eq!(
            app.notification.unwrap().message,
            "Could not retrieve formats: boom"
        );
    }

    #[test]
    fn test_download_progress_and_completion() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        app.download_receiver = Some(rx);

        tx.send(WorkerMessage::Progress(crate::provider::ProgressUpdate {
            percent: 42.0,
            speed: "1MiB/s".to_string(),
            eta: "00:05".to_string(),
        }))
        .unwrap();
        app.process_worker_messages();
        assert!(app.is_downloading());
        assert_eq!(app.download_progress, 42.0);
        assert_eq!(
            app.status,
            "Downloading: 42.0% | Speed: 1MiB/s | ETA: 00:05"
        );

        tx.send(WorkerMessage::Finished(())).unwrap();
        app.process_worker_messages();
        assert!(!app.is_downloading());
        assert_eq!(app.status, "Download complete!");
    }

    #[test]
    fn test_dead_worker_releases_controls() {
        let mut app = app();
        let (tx, rx) = mpsc::channel::<WorkerMessage<()>>();
        app.download_receiver = Some(rx);
        drop(tx);

        app.process_worker_messages();
        assert!(!app.is_busy());
        assert!(app.notification.unwrap().is_error);
    }

    #[test]
    fn test_update_flow_dialogs() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        app.update_check_receiver = Some(rx);
        let update = UpdateInfo {
            version: "9.0.0".to_string(),
            download_url: "https://example.com/app".to_string(),
        };
        tx.send(WorkerMessage::Finished(Some(update.clone()))).unwrap();
        app.process_worker_messages();
        assert_eq!(app.confirm_dialog, Some(ConfirmAction::DownloadUpdate(update)));

        let (tx, rx) = mpsc::channel();
        app.confirm_dialog = None;
        app.update_receiver = Some(rx);
        app.update_progress = Some(UpdateProgress {
            percent: 0.0,
            label: String::new(),
        });
        tx.send(WorkerMessage::Finished(None)).unwrap();
        app.process_worker_messages();
        assert!(app.update_progress.is_none());
        assert_eq!(app.notification.unwrap().title, "Download Cancelled");
    }

    #[test]
    fn test_rating_gate_opens_dialog() {
        let mut app = app();
        let (tx, rx) = mpsc::channel();
        app.rating_gate_receiver = Some(rx);
        tx.send(WorkerMessage::Finished(true)).unwrap();

        app.process_worker_messages();
        assert_eq!(app.rating_dialog, Some(RatingDraft::default()));

        // no stars yet, nothing is sent
        app.submit_rating();
        assert!(app.rating_dialog.is_some());
        assert!(app.rating_submit_receiver.is_none());
    }

    #[test]
    fn test_home_focus_cycles() {
        assert_eq!(HomeFocus::Url.next(), HomeFocus::GetFormats);
        assert_eq!(HomeFocus::Download.next(), HomeFocus::Url);
        assert_eq!(HomeFocus::Url.previous(), HomeFocus::Download);
    }

    #[test]
    fn test_folder_picker_lists_only_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();

        let mut app = app();
        app.current_dir = dir.path().to_path_buf();
        app.navigate_to_folder_picker();

        let names: Vec<String> = app
            .dir_entries
            .iter()
            .map(|p| match p.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => p.to_string_lossy().to_string(),
            })
            .collect();
        assert_eq!(names, vec!["..", "A", "b"]);

        app.explorer_move_down();
        app.choose_highlighted_folder();
        assert_eq!(app.output_dir, Some(dir.path().join("A")));
        assert_eq!(app.current_screen, Screen::Home);
    }
}
