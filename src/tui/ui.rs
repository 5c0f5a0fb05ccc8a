use crate::coordinator::{Outcome, Phase};
use crate::tui::app::App;
use crate::tui::highlighter::highlight_suggestion;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Length(1), // Helper line
            Constraint::Min(3),    // Suggestions
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_query_input(f, app, chunks[0]);
    draw_helper(f, app, chunks[1]);
    draw_suggestions(f, app, chunks[2]);
    draw_status_bar(f, app, chunks[3]);
}

fn draw_query_input(f: &mut Frame, app: &App, area: Rect) {
    let input = app.coordinator.input();
    let paragraph = Paragraph::new(input)
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search words (Tab: accept, Enter: done, Esc: close) "),
        );

    f.render_widget(paragraph, area);

    let width = input.chars().count() as u16;
    f.set_cursor_position((area.x + width.min(area.width.saturating_sub(2)) + 1, area.y + 1));
}

fn draw_helper(f: &mut Frame, app: &App, area: Rect) {
    if let Some(message) = app.coordinator.helper_message() {
        let line = Line::styled(format!(" {}", message), Style::default().fg(Color::DarkGray));
        f.render_widget(Paragraph::new(line), area);
    }
}

fn draw_suggestions(f: &mut Frame, app: &App, area: Rect) {
    if !app.coordinator.dropdown_visible() {
        return;
    }

    let block = Block::default().borders(Borders::ALL).title(" Suggestions ");

    let placeholder = match app.coordinator.phase() {
        Phase::Debouncing { .. } | Phase::InFlight => Some(("Loading...", Color::DarkGray)),
        Phase::Settled(Outcome::Failure) => Some((
            app.coordinator.error().unwrap_or("An error occurred"),
            Color::Red,
        )),
        Phase::Settled(Outcome::Success) if app.coordinator.suggestions().is_empty() => {
            Some(("No matches found", Color::DarkGray))
        }
        _ => None,
    };

    if let Some((text, color)) = placeholder {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(color))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let query = app.coordinator.trimmed_query();
    let selected = app.coordinator.selected();

    let items: Vec<ListItem> = app
        .coordinator
        .suggestions()
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let style = if Some(i) == selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(highlight_suggestion(word, query, style)))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = format!("[{}] {}", app.source_label(), app.status_message);
    let status = Paragraph::new(text).style(Style::default().fg(Color::Cyan));

    f.render_widget(status, area);
}
