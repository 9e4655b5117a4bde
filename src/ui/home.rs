use super::common::{field_block, help_line};
use crate::app::{App, HomeFocus};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

pub fn render_home(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // url
            Constraint::Length(3), // buttons
            Constraint::Length(3), // selected format
            Constraint::Length(3), // output folder
            Constraint::Length(3), // progress
            Constraint::Min(2),    // status
            Constraint::Length(1), // version
            Constraint::Length(1), // help
        ])
        .margin(1)
        .split(f.area());

    // Title
    let title = Paragraph::new("Any Video URL Downloader")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE));
    f.render_widget(title, chunks[0]);

    // URL input
    let url_focused = app.home_focus == HomeFocus::Url;
    let url_text = if app.url_input.is_empty() && !url_focused {
        Span::styled("Paste a video URL", Style::default().fg(Color::DarkGray))
    } else if url_focused {
        Span::raw(format!("{}_", app.url_input))
    } else {
        Span::raw(app.url_input.clone())
    };
    let url = Paragraph::new(Line::from(url_text)).block(field_block("Video URL", url_focused));
    f.render_widget(url, chunks[1]);

    // Buttons
    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(chunks[2]);

    let busy = app.is_busy();
    render_button(f, buttons[0], "Get Formats", app.home_focus == HomeFocus::GetFormats, !busy);
    render_button(
        f,
        buttons[1],
        "Output Folder",
        app.home_focus == HomeFocus::OutputFolder,
        true,
    );
    let download_label = if app.is_downloading() {
        "Downloading..."
    } else {
        "Download"
    };
    render_button(f, buttons[2], download_label, app.home_focus == HomeFocus::Download, !busy);

    // Selected format
    let format_style = if app.selector.current().is_some() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let selected = Paragraph::new(app.selected_format_label())
        .style(format_style)
        .block(field_block("Selected Format", false));
    f.render_widget(selected, chunks[3]);

    // Output folder
    let output_text = app
        .output_dir
        .as_ref()
        .map(|dir| format!("Output: {}", dir.display()))
        .unwrap_or_else(|| "No output folder selected".to_string());
    let output = Paragraph::new(output_text).block(field_block("Output Folder", false));
    f.render_widget(output, chunks[4]);

    // Progress
    let gauge = Gauge::default()
        .block(field_block("Progress", false))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .percent(app.download_progress.clamp(0.0, 100.0) as u16);
    f.render_widget(gauge, chunks[5]);

    // Status
    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(status, chunks[6]);

    let version = Paragraph::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(version, chunks[7]);

    let help = Paragraph::new(help_line(&[
        ("Tab/↑↓", "Move"),
        ("Enter", "Activate"),
        ("Esc", "Quit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[8]);
}

fn render_button(
    f: &mut Frame,
    area: ratatui::layout::Rect,
    label: &str,
    focused: bool,
    enabled: bool,
) {
    let style = match (focused, enabled) {
        (_, false) => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
        (true, true) => Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(Color::White),
    };

    let button = Paragraph::new(label.to_string())
        .style(style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused {
                    Color::Cyan
                } else {
                    Color::DarkGray
                })),
        );
    f.render_widget(button, area);
}
