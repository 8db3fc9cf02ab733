use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::model::Quiz;
use crate::responses::Status;
use crate::session::QuestionState;
use crate::state::App;

/// One line of the question palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteRow {
    Section(String),
    Question(usize),
}

/// Questions grouped under their section, in declared section order. Questions
/// whose section is missing or undeclared come last under their own header.
pub fn palette_rows(quiz: &Quiz) -> Vec<PaletteRow> {
    let mut labels: Vec<&str> = quiz.sections().iter().map(|s| s.as_str()).collect();
    for q in quiz.questions() {
        let label = quiz.section_label(q);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    let mut rows = Vec::new();
    for label in labels {
        let members: Vec<usize> = quiz
            .questions()
            .iter()
            .enumerate()
            .filter(|(_, q)| quiz.section_label(q) == label)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }
        rows.push(PaletteRow::Section(label.to_string()));
        rows.extend(members.into_iter().map(PaletteRow::Question));
    }
    rows
}

pub fn status_icon(status: Status) -> (&'static str, Color) {
    match status {
        Status::NotVisited => ("·", Color::DarkGray),
        Status::NotAnswered => ("○", Color::LightRed),
        Status::Answered => ("✓", Color::Green),
        Status::Marked => ("⚑", Color::Magenta),
    }
}

fn scroll_offset(rows: &[PaletteRow], current: usize, height: usize) -> usize {
    let pos = rows
        .iter()
        .position(|r| *r == PaletteRow::Question(current))
        .unwrap_or(0);
    if height > 0 && pos >= height {
        pos + 1 - height
    } else {
        0
    }
}

/// Question under a clicked row of the palette, if any.
pub fn question_at(app: &App, area: Rect, row: u16) -> Option<usize> {
    let quiz = app.session.quiz()?;
    let rows = palette_rows(quiz);
    let height = area.height.saturating_sub(1) as usize;
    let rel = row.checked_sub(area.y + 1)? as usize;
    if rel >= height {
        return None;
    }
    let current = app.session.active_index().unwrap_or(0);
    match rows.get(scroll_offset(&rows, current, height) + rel)? {
        PaletteRow::Question(i) => Some(*i),
        PaletteRow::Section(_) => None,
    }
}

pub fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let Some(quiz) = app.session.quiz() else {
        return;
    };
    let view = app.session.view();
    let rows = palette_rows(quiz);
    let height = area.height.saturating_sub(1) as usize;
    let current = view.active_index;
    let offset = scroll_offset(&rows, current, height);
    let title_max = area.width.saturating_sub(10) as usize;

    let mut lines: Vec<Line> = Vec::new();
    for row in rows.iter().skip(offset).take(height) {
        match row {
            PaletteRow::Section(label) => {
                let (done, total) = section_progress(quiz, &view.questions, label);
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {}", label),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" {}/{}", done, total),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
            PaletteRow::Question(i) => {
                let status = view
                    .questions
                    .get(*i)
                    .map_or(Status::NotVisited, |q| q.status);
                let (icon, color) = status_icon(status);
                let is_current = *i == current;
                let bg = if is_current { Color::DarkGray } else { Color::Reset };
                let style = if is_current {
                    Style::default()
                        .fg(Color::White)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().bg(bg)
                };
                let prompt: String = quiz
                    .question(*i)
                    .map(|q| q.prompt().chars().take(title_max).collect())
                    .unwrap_or_default();

                lines.push(Line::from(vec![
                    Span::styled(if is_current { " ▸ " } else { "   " }, style),
                    Span::styled(format!("{} ", icon), Style::default().fg(color).bg(bg)),
                    Span::styled(format!("{:>3}. ", i + 1), style),
                    Span::styled(prompt, style),
                ]));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::RIGHT)
        .title(format!(" {} Questions ", quiz.question_count()))
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(lines).block(block), area);

    if rows.len() > height {
        let scrollbar_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: height as u16,
        };
        let mut scrollbar_state = ScrollbarState::new(rows.len().saturating_sub(height))
            .position(offset)
            .viewport_content_length(height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

/// Answered questions and total in one palette section.
fn section_progress(quiz: &Quiz, states: &[QuestionState], label: &str) -> (usize, usize) {
    let mut done = 0;
    let mut total = 0;
    for (i, q) in quiz.questions().iter().enumerate() {
        if quiz.section_label(q) != label {
            continue;
        }
        total += 1;
        if states.get(i).map_or(false, |s| s.status == Status::Answered) {
            done += 1;
        }
    }
    (done, total)
}
