mod app;
mod config;
mod error;
mod formats;
mod provider;
mod rating;
mod ui;
mod update;
mod utils;
mod worker;

use anyhow::Context;
use app::{App, BrowserFocus, ConfirmAction, HomeFocus, RatingFocus, Screen};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use formats::FilterTag;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "any-video-downloader")]
#[command(version)]
#[command(about = "Download videos from any URL yt-dlp understands")]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Video URL to prefill
    url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = utils::init_logging();

    let config = AppConfig::load(cli.config.as_deref());
    let mut app = App::new(config);
    if let Some(url) = cli.url {
        app.url_input = url;
    }
    app.start_background_tasks();

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res.context("Application error")?;
    info!("Exiting");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        // Process any pending worker output
        app.process_worker_messages();

        // Draw UI
        terminal.draw(|f| {
            match app.current_screen {
                Screen::Home => ui::render_home(f, app),
                Screen::FormatBrowser => ui::render_format_browser(f, app),
                Screen::FolderPicker => ui::render_explorer(f, app),
            }
            // Overlays, lowest first
            if app.is_fetching() {
                ui::render_loading(f);
            }
            if app.rating_dialog.is_some() {
                ui::render_rating_dialog(f, app);
            }
            if app.update_progress.is_some() {
                ui::render_update_progress(f, app);
            }
            if app.confirm_dialog.is_some() {
                ui::render_confirm_dialog(f, app);
            }
            if app.notification.is_some() {
                ui::render_notification(f, app);
            }
        })?;

        // Handle input with timeout for progress updates
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Paste(text) => app.paste(&text),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.ask_confirm(ConfirmAction::ExitApp);
        return;
    }

    // Topmost overlay takes the key
    if app.notification.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_notification();
        }
        return;
    }
    if app.confirm_dialog.is_some() {
        handle_confirm_dialog_key(app, key.code);
        return;
    }
    if app.update_progress.is_some() {
        if key.code == KeyCode::Esc {
            app.cancel_update_download();
        }
        return;
    }
    if app.rating_dialog.is_some() {
        handle_rating_key(app, key.code);
        return;
    }
    if app.is_fetching() {
        return;
    }

    match app.current_screen {
        Screen::Home => handle_home_key(app, key.code),
        Screen::FormatBrowser => handle_format_browser_key(app, key.code),
        Screen::FolderPicker => handle_explorer_key(app, key.code),
    }
}

fn handle_confirm_dialog_key(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.confirm_dialog.take() {
                app.execute_confirm_action(action);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm_dialog = None;
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
            app.confirm_selection = !app.confirm_selection;
        }
        KeyCode::Enter => {
            if let Some(action) = app.confirm_dialog.take()
                && app.confirm_selection
            {
                app.execute_confirm_action(action);
            }
        }
        _ => {}
    }
}

fn handle_rating_key(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => return app.close_rating_dialog(),
        KeyCode::Enter => return app.submit_rating(),
        KeyCode::Tab | KeyCode::BackTab => {
            app.rating_focus = match app.rating_focus {
                RatingFocus::Stars => RatingFocus::Review,
                RatingFocus::Review => RatingFocus::Stars,
            };
            return;
        }
        _ => {}
    }

    let focus = app.rating_focus;
    let Some(draft) = app.rating_dialog.as_mut() else {
        return;
    };

    match (key, focus) {
        (KeyCode::Left | KeyCode::Char('h'), RatingFocus::Stars) => draft.decrease(),
        (KeyCode::Right | KeyCode::Char('l'), RatingFocus::Stars) => draft.increase(),
        (KeyCode::Char(c), RatingFocus::Stars) => {
            if let Some(stars) = c.to_digit(10) {
                draft.set_stars(stars as u8);
            }
        }
        (KeyCode::Char(c), RatingFocus::Review) => draft.review.push(c),
        (KeyCode::Backspace, RatingFocus::Review) => {
            draft.review.pop();
        }
        _ => {}
    }
}

fn handle_home_key(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.ask_confirm(ConfirmAction::ExitApp),
        KeyCode::Tab | KeyCode::Down => app.home_focus = app.home_focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.home_focus = app.home_focus.previous(),
        KeyCode::Enter => match app.home_focus {
            HomeFocus::Url | HomeFocus::GetFormats => app.fetch_formats(),
            HomeFocus::OutputFolder => app.navigate_to_folder_picker(),
            HomeFocus::Download => app.start_download(),
        },
        KeyCode::Char(c) if app.home_focus == HomeFocus::Url => app.push_url_char(c),
        KeyCode::Backspace if app.home_focus == HomeFocus::Url => app.pop_url_char(),
        KeyCode::Char('q') => app.ask_confirm(ConfirmAction::ExitApp),
        _ => {}
    }
}

fn handle_format_browser_key(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.navigate_to_home(),
        KeyCode::Enter => app.confirm_format_selection(),
        KeyCode::Tab | KeyCode::BackTab => {
            app.browser_focus = match app.browser_focus {
                BrowserFocus::Search => BrowserFocus::Table,
                BrowserFocus::Table => BrowserFocus::Search,
            };
        }
        KeyCode::Up => app.browser_move_up(),
        KeyCode::Down => app.browser_move_down(),
        KeyCode::Left => app.cycle_filter(false),
        KeyCode::Right => app.cycle_filter(true),
        KeyCode::Char(c) if app.browser_focus == BrowserFocus::Search => app.push_query_char(c),
        KeyCode::Backspace if app.browser_focus == BrowserFocus::Search => app.pop_query_char(),
        KeyCode::Char('k') => app.browser_move_up(),
        KeyCode::Char('j') => app.browser_move_down(),
        KeyCode::Char('/') => app.browser_focus = BrowserFocus::Search,
        KeyCode::Char(c) => {
            if let Some(tag) = c
                .to_digit(10)
                .and_then(|d| (d as usize).checked_sub(1))
                .and_then(FilterTag::from_control)
            {
                app.set_filter_tag(tag);
            }
        }
        _ => {}
    }
}

fn handle_explorer_key(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.navigate_to_home(),
        KeyCode::Up | KeyCode::Char('k') => app.explorer_move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.explorer_move_down(),
        KeyCode::Enter => app.enter_directory(),
        KeyCode::Char(' ') => app.choose_highlighted_folder(),
        KeyCode::Char('c') => app.choose_current_folder(),
        _ => {}
    }
}
