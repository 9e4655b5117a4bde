use super::common::{centered_rect, field_block, help_line};
use crate::app::{App, RatingFocus};
use crate::rating::MAX_STARS;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render_rating_dialog(f: &mut Frame, app: &App) {
    let Some(draft) = &app.rating_dialog else {
        return;
    };

    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Rate Your Experience ")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(area);

    let title = Paragraph::new("How was your experience?")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let stars_focused = app.rating_focus == RatingFocus::Stars;
    let stars: Vec<Span> = (1..=MAX_STARS)
        .map(|star| {
            if star <= draft.stars {
                Span::styled("★ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("☆ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    let stars = Paragraph::new(Line::from(stars))
        .alignment(Alignment::Center)
        .block(field_block("Rating", stars_focused));
    f.render_widget(stars, chunks[1]);

    let review_focused = app.rating_focus == RatingFocus::Review;
    let (review_text, review_style) = if review_focused {
        (format!("{}_", draft.review), Style::default().fg(Color::White))
    } else if draft.review.is_empty() {
        (
            "Write your review here (optional)...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (draft.review.clone(), Style::default().fg(Color::White))
    };
    let review = Paragraph::new(review_text)
        .style(review_style)
        .wrap(Wrap { trim: false })
        .block(field_block("Review", review_focused));
    f.render_widget(review, chunks[2]);

    let send_action = if draft.can_send() {
        "Send Rating"
    } else {
        "Pick a rating first"
    };
    let help = Paragraph::new(help_line(&[
        ("←→/1-5", "Stars"),
        ("Tab", "Review"),
        ("Enter", send_action),
        ("Esc", "Cancel"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}
