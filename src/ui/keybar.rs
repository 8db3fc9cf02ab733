use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::App;

pub fn draw_keybar(f: &mut Frame, area: Rect, app: &App) {
    let letters = app
        .current_question()
        .map(|q| q.option_count())
        .filter(|n| *n > 0)
        .map(|n| format!("a-{}", option_letter(n - 1).to_ascii_lowercase()))
        .unwrap_or_else(|| "a-z".to_string());

    let bindings: Vec<(&str, &str)> = vec![
        (letters.as_str(), "answer"),
        ("Enter", "save & next"),
        ("Ctrl+F", "mark & next"),
        ("Bksp", "clear"),
        ("arrows", "prev/next"),
        ("Shift+↑/↓", "scroll"),
        ("Ctrl+S", "submit"),
        ("Ctrl+Q", "quit"),
        ("?", "help"),
    ];

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}

/// `0 -> 'A'`, `1 -> 'B'`, and so on.
pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
