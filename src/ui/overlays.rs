use super::common::{centered_rect, help_line};
use crate::app::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

/// Shown while formats are being fetched
pub fn render_loading(f: &mut Frame) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let loading = Paragraph::new("\nFetching available video formats...\nPlease wait")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Loading "),
        );
    f.render_widget(loading, area);
}

pub fn render_notification(f: &mut Frame, app: &App) {
    let Some(notification) = &app.notification else {
        return;
    };

    let color = if notification.is_error {
        Color::Red
    } else {
        Color::Green
    };

    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", notification.title))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(area);

    let message = Paragraph::new(notification.message.as_str())
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(message, chunks[0]);

    let help = Paragraph::new(help_line(&[("Enter", "OK")])).alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);
}

pub fn render_update_progress(f: &mut Frame, app: &App) {
    let Some(progress) = &app.update_progress else {
        return;
    };

    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Downloading Update ");
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(area);

    let label = Paragraph::new(progress.label.as_str())
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    f.render_widget(label, chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .percent(progress.percent.clamp(0.0, 100.0) as u16);
    f.render_widget(gauge, chunks[1]);

    let help = Paragraph::new(help_line(&[("Esc", "Cancel")])).alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}
