use super::common::{field_block, help_line};
use crate::app::{App, BrowserFocus};
use crate::formats::FILTER_OPTIONS;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};

const COLUMNS: [&str; 7] = [
    "Code",
    "Extension",
    "Resolution",
    "FPS",
    "Video Codec",
    "Media Type",
    "Audio Status",
];

pub fn render_format_browser(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(f.area());

    // Search input
    let search_focused = app.browser_focus == BrowserFocus::Search;
    let query = if search_focused {
        format!("{}_", app.filter.query)
    } else if app.filter.query.is_empty() {
        "Filter formats by resolution, codec...".to_string()
    } else {
        app.filter.query.clone()
    };
    let query_style = if !search_focused && app.filter.query.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let search = Paragraph::new(query)
        .style(query_style)
        .block(field_block("Search Formats", search_focused));
    f.render_widget(search, chunks[0]);

    // Filter radio row
    let active = app.filter.tag.control_index();
    let mut radio = Vec::new();
    for (index, (label, _)) in FILTER_OPTIONS.iter().enumerate() {
        let (marker, style) = if index == active {
            (
                "(•) ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("( ) ", Style::default().fg(Color::White))
        };
        radio.push(Span::styled(format!("{}{}{}", marker, index + 1, ". "), style));
        radio.push(Span::styled(label.to_string(), style));
        radio.push(Span::raw("    "));
    }
    let filters = Paragraph::new(Line::from(radio)).block(field_block("Filter by", false));
    f.render_widget(filters, chunks[1]);

    // Table
    let header = Row::new(COLUMNS.iter().map(|c| {
        Cell::from(*c).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows: Vec<Row> = app
        .visible_rows
        .iter()
        .filter_map(|&row| app.formats.get(row))
        .map(|format| Row::new(format.display_columns()))
        .collect();

    let title = format!(
        "Formats ({}/{})",
        app.visible_rows.len(),
        app.formats.len()
    );
    let widths = [
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Min(20),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(field_block(&title, !search_focused))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(table, chunks[2], &mut app.table_state);

    // Preview
    let preview_text = app
        .highlighted_format()
        .map(|format| format.preview())
        .unwrap_or_else(|| "Selected Format: None".to_string());
    let preview = Paragraph::new(preview_text)
        .style(Style::default().fg(Color::Green))
        .block(field_block("Preview", false));
    f.render_widget(preview, chunks[3]);

    let help = Paragraph::new(help_line(&[
        ("↑↓", "Navigate"),
        ("←→/1-4", "Filter"),
        ("Tab", "Search"),
        ("Enter", "Select Format"),
        ("Esc", "Cancel"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}
