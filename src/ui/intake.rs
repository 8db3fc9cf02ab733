use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::App;
use crate::ui::layout::centered_rect;

pub fn draw_idle(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "examdesk",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Turn a PDF question paper into a timed exam."),
        Line::from(""),
        Line::from(Span::styled("PDF path:", Style::default().fg(Color::DarkGray))),
        Line::from(vec![
            Span::styled(
                format!(" {}", app.path_input),
                Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 30)),
            ),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
    ];

    if let Some(err) = app.idle_error() {
        lines.push(Line::from(Span::styled(
            format!("✗ {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }
    if app.config.api_key.is_none() {
        lines.push(Line::from(Span::styled(
            "No API key set (EXAMDESK_API_KEY). Only cached documents can be opened.",
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "[Enter] Load   [Esc] Clear   [Ctrl+Q] Quit",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

pub fn draw_loading(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL);
    f.render_widget(block, area);

    let rect = centered_rect(60, 8, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(rect);

    let heading = Paragraph::new(Line::from(Span::styled(
        "Analyzing PDF contents",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(heading, rows[0]);

    let file = Paragraph::new(app.loading_file.as_str()).alignment(Alignment::Center);
    f.render_widget(file, rows[1]);

    let progress = app.loading_progress();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Rgb(30, 30, 30)))
        .ratio((progress / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", progress));
    f.render_widget(gauge, rows[3]);

    let hint = Paragraph::new(Span::styled(
        "[Esc] Cancel",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    f.render_widget(hint, rows[4]);
}
