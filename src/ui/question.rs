use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui::Frame;

use crate::model::Question;
use crate::responses::Status;
use crate::state::App;
use crate::timer::format_minutes;
use crate::ui::keybar::option_letter;
use crate::ui::sidebar::status_icon;

pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push(current);
                current = word.to_string();
            }
        }
        result.push(current);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

/// Lettered options, the chosen one filled in.
pub(crate) fn option_lines(
    question: &Question,
    selected: Option<usize>,
    width: u16,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, option) in question.options().iter().enumerate() {
        let is_selected = selected == Some(i);
        let radio = if is_selected { "(●)" } else { "( )" };
        let style = if is_selected {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let prefix = format!("  {} {}. ", radio, option_letter(i));
        let prefix_len = prefix.chars().count();
        let wrapped = wrap_text(option, (width as usize).saturating_sub(prefix_len + 2));
        for (li, wline) in wrapped.into_iter().enumerate() {
            let lead = if li == 0 {
                Span::styled(prefix.clone(), style)
            } else {
                Span::raw(" ".repeat(prefix_len))
            };
            lines.push(Line::from(vec![lead, Span::styled(wline, style)]));
        }
    }
    lines
}

/// Splits off a box for the context above the question when there is one.
fn split_context(area: Rect, question: &Question) -> (Option<Rect>, Rect) {
    match question.context() {
        Some(context) if !context.trim().is_empty() => {
            let inner_width = area.width.saturating_sub(4) as usize;
            let wanted = wrap_text(context, inner_width).len() as u16 + 2;
            let max = area.height / 2;
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(wanted.min(max).max(3)), Constraint::Min(3)])
                .split(area);
            (Some(chunks[0]), chunks[1])
        }
        _ => (None, area),
    }
}

fn body_lines(app: &App, index: usize, question: &Question, width: u16) -> Vec<Line<'static>> {
    let view = app.session.view();
    let state = view.questions.get(index);
    let status = state.map_or(Status::NotVisited, |s| s.status);
    let selected = state.and_then(|s| s.selected);
    let spent = state.map_or(0, |s| s.time_spent);
    let (total, section) = app
        .session
        .quiz()
        .map_or((0, String::new()), |quiz| {
            (quiz.question_count(), quiz.section_label(question).to_string())
        });

    let (icon, icon_color) = status_icon(status);
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled(
                format!("  Question {} of {}", index + 1, total),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("   {}", section), Style::default().fg(Color::Yellow)),
            Span::styled(format!("   {} {}", icon, status.label()), Style::default().fg(icon_color)),
            Span::styled(
                format!("   {} on this question", format_minutes(spent)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
    ];

    for wline in wrap_text(question.prompt(), (width as usize).saturating_sub(4)) {
        lines.push(Line::from(Span::styled(
            format!("  {}", wline),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.extend(option_lines(question, selected, width));
    lines
}

/// Furthest the question body can scroll when drawn into `area`.
pub(crate) fn scroll_limit(app: &App, area: Rect) -> usize {
    let Some(question) = app.current_question() else {
        return 0;
    };
    let Some(index) = app.session.active_index() else {
        return 0;
    };
    let (_, body_area) = split_context(area, question);
    let lines = body_lines(app, index, question, body_area.width);
    lines.len().saturating_sub(body_area.height as usize)
}

pub fn draw_question(f: &mut Frame, area: Rect, app: &App) {
    let Some(index) = app.session.active_index() else {
        return;
    };
    let Some(question) = app.current_question() else {
        let p = Paragraph::new("No questions").block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };

    let (context_area, body_area) = split_context(area, question);
    if let (Some(rect), Some(context)) = (context_area, question.context()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Context ")
            .border_style(Style::default().fg(Color::DarkGray));
        let widget = Paragraph::new(context.to_string())
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(widget, rect);
    }

    let lines = body_lines(app, index, question, body_area.width);
    let max_scroll = lines.len().saturating_sub(body_area.height as usize);
    let scroll = app.question_scroll.min(max_scroll);
    f.render_widget(Paragraph::new(lines).scroll((scroll as u16, 0)), body_area);

    if max_scroll > 0 {
        let mut state = ScrollbarState::new(max_scroll).position(scroll);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            body_area,
            &mut state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("the quick brown fox", 9),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_option_lines_mark_selection() {
        let q = Question::new("q1", "p", vec!["red".into(), "blue".into()], 1);
        let lines = option_lines(&q, Some(1), 40);
        assert_eq!(lines.len(), 2);
        let second: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(second, "  (●) B. blue");
    }
}
