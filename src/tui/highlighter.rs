use crate::query::matched_prefix_len;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

/// Style for the part of a suggestion the user already typed
fn typed_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Split a suggestion into spans, emphasizing the prefix matched by `query`
pub fn highlight_suggestion(word: &str, query: &str, base: Style) -> Vec<Span<'static>> {
    match matched_prefix_len(word, query) {
        Some(end) if end > 0 => {
            let mut spans = vec![Span::styled(word[..end].to_string(), base.patch(typed_style()))];
            if end < word.len() {
                spans.push(Span::styled(word[end..].to_string(), base));
            }
            spans
        }
        _ => vec![Span::styled(word.to_string(), base)],
    }
}
