use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::App;
use crate::timer::format_minutes;

/// Longest slice of the description shown before the exam starts.
const DESCRIPTION_CHARS: usize = 400;

pub fn draw_setup(f: &mut Frame, area: Rect, app: &App) {
    let Some(quiz) = app.session.quiz() else {
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            quiz.title().to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Questions: ", Style::default().fg(Color::DarkGray)),
            Span::raw(quiz.question_count().to_string()),
            Span::styled("    Time: ", Style::default().fg(Color::DarkGray)),
            Span::raw(format_minutes(quiz.time_limit_seconds())),
        ]),
        Line::from(vec![
            Span::styled("Sections: ", Style::default().fg(Color::DarkGray)),
            Span::raw(quiz.sections().join(", ")),
        ]),
        Line::from(""),
    ];

    let description = quiz.description().trim();
    if !description.is_empty() {
        let mut excerpt: String = description.chars().take(DESCRIPTION_CHARS).collect();
        if description.chars().count() > DESCRIPTION_CHARS {
            excerpt.push('…');
        }
        lines.push(Line::from(excerpt));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(
        "The clock starts as soon as you begin and cannot be paused.",
    ));
    lines.push(Line::from(
        "The exam is submitted automatically when time runs out.",
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Start examination   [Esc] New document   [Ctrl+Q] Quit",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
