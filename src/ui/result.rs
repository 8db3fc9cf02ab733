use std::rc::Rc;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::scoring::{QuestionReview, Report};
use crate::state::App;
use crate::timer::format_minutes;
use crate::ui::keybar::option_letter;
use crate::ui::question::wrap_text;
use crate::ui::sidebar::status_icon;

pub fn draw_result(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = app.session.report() else {
        return;
    };

    let chunks = split_result(area);

    draw_summary(f, chunks[0], report);
    draw_review(f, chunks[1], report, app.review_scroll);

    let mut keys = vec![Span::styled(
        " [R] Reattempt   [N] New document   [E] Export   [Q] Quit   ↑/↓ Scroll",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(ref notice) = app.notice {
        keys.push(Span::raw("   "));
        keys.push(Span::styled(notice.clone(), Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(keys)), chunks[2]);
}

fn split_result(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area)
}

/// Furthest the review can scroll on a result screen of size `area`.
pub(crate) fn review_scroll_limit(report: &Report, area: Rect) -> usize {
    let review = split_result(area)[1];
    let lines = review_lines(report, review.width.saturating_sub(2) as usize);
    lines.len().saturating_sub(review.height.saturating_sub(2) as usize)
}

fn draw_summary(f: &mut Frame, area: Rect, report: &Report) {
    let score_color = if report.accuracy_percent >= 70 {
        Color::Green
    } else if report.accuracy_percent >= 40 {
        Color::Yellow
    } else {
        Color::Red
    };
    let c = &report.status_counts;
    let mut lines = vec![
        Line::from(Span::styled(
            report.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "Score: {} / {} Marks   ({}%)",
                report.score, report.question_count, report.accuracy_percent
            ),
            Style::default()
                .fg(score_color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Total time: {}   Avg speed: {}s/q",
            format_minutes(report.total_time_seconds),
            report.average_time_seconds
        )),
        Line::from(format!(
            "Answered {}   Not answered {}   Marked {}   Not visited {}",
            c.answered, c.not_answered, c.marked, c.not_visited
        )),
    ];
    if report.attempt.forced {
        lines.push(Line::from(Span::styled(
            "Time ran out. The exam was submitted automatically.",
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Result ")
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

/// Detailed per-question review lines.
pub(crate) fn review_lines(report: &Report, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for q in &report.questions {
        push_question(&mut lines, q, width);
        lines.push(Line::from(""));
    }
    lines
}

fn push_question(lines: &mut Vec<Line<'static>>, q: &QuestionReview, width: usize) {
    let (icon, icon_color) = status_icon(q.status);
    let (verdict, verdict_color) = match (q.selected_option, q.is_correct) {
        (None, _) => ("skipped", Color::DarkGray),
        (Some(_), true) => ("correct", Color::Green),
        (Some(_), false) => ("wrong", Color::Red),
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("Q{}. ", q.number),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", icon), Style::default().fg(icon_color)),
        Span::styled(verdict, Style::default().fg(verdict_color)),
        Span::styled(
            format!("   {}   {}", q.section, format_minutes(q.time_spent_seconds)),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    if let Some(ref context) = q.context {
        for l in wrap_text(context, width.saturating_sub(4)) {
            lines.push(Line::from(Span::styled(
                format!("  │ {}", l),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    for l in wrap_text(&q.prompt, width.saturating_sub(2)) {
        lines.push(Line::from(format!("  {}", l)));
    }

    for (i, option) in q.options.iter().enumerate() {
        let is_correct = i == q.correct_option;
        let is_selected = q.selected_option == Some(i);
        let marker = match (is_selected, is_correct) {
            (_, true) => "✓",
            (true, false) => "✗",
            _ => " ",
        };
        let style = if is_correct {
            Style::default().fg(Color::Green)
        } else if is_selected {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let suffix = if is_selected { "  (your answer)" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("  {} {}. {}{}", marker, option_letter(i), option, suffix),
            style,
        )));
    }

    if !q.explanation.trim().is_empty() {
        for (i, l) in wrap_text(&q.explanation, width.saturating_sub(4)).into_iter().enumerate() {
            let lead = if i == 0 { "  → " } else { "    " };
            lines.push(Line::from(Span::styled(
                format!("{}{}", lead, l),
                Style::default().fg(Color::Cyan),
            )));
        }
    }
}

fn draw_review(f: &mut Frame, area: Rect, report: &Report, scroll: usize) {
    let lines = review_lines(report, area.width.saturating_sub(2) as usize);
    let visible = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    let scroll = scroll.min(max_scroll);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Review ")
        .title_style(Style::default().add_modifier(Modifier::BOLD));
    let widget = Paragraph::new(lines).block(block).scroll((scroll as u16, 0));
    f.render_widget(widget, area);

    if max_scroll > 0 {
        let mut state = ScrollbarState::new(max_scroll).position(scroll);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}
