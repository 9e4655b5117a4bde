use super::common::centered_rect;
use crate::app::{App, ConfirmAction};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render_confirm_dialog(f: &mut Frame, app: &App) {
    let action = match &app.confirm_dialog {
        Some(a) => a,
        None => return,
    };

    let (title, message) = match action {
        ConfirmAction::ExitApp => (
            " Exit Application ".to_string(),
            "Are you sure you want to exit?".to_string(),
        ),
        ConfirmAction::DownloadUpdate(update) => (
            " Update Available ".to_string(),
            format!(
                "A new version ({}) is available!\nWould you like to download the update?",
                update.version
            ),
        ),
        ConfirmAction::RunUpdate(path) => (
            " Run Update ".to_string(),
            format!(
                "Update has been downloaded to:\n{}\n\nWould you like to run the new version now?",
                path.display()
            ),
        ),
    };

    // Calculate dialog area
    let area = centered_rect(60, 35, f.area());

    // Clear area behind the dialog
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(2),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(block, area);

    let msg = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(msg, chunks[1]);

    // Buttons
    let yes_style = if app.confirm_selection {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    let no_style = if !app.confirm_selection {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };

    let buttons = Line::from(vec![
        Span::styled(" Yes ", yes_style),
        Span::raw("    "),
        Span::styled(" No ", no_style),
    ]);

    let buttons_paragraph = Paragraph::new(buttons).alignment(Alignment::Center);
    f.render_widget(buttons_paragraph, chunks[2]);
}
