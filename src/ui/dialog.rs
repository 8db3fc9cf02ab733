use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::state::{App, Dialog};
use crate::ui::layout::centered_rect;

pub fn draw_dialog(f: &mut Frame, area: Rect, app: &App) {
    let Some(dialog) = app.top_dialog() else {
        return;
    };

    match dialog {
        Dialog::ConfirmSubmit => draw_confirm_submit(f, area, app),
        Dialog::ConfirmQuit => draw_confirm_quit(f, area),
        Dialog::Help => draw_help(f, area),
    }
}

fn confirm_row() -> Line<'static> {
    Line::from(vec![
        Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ])
}

fn render_box(f: &mut Frame, area: Rect, lines: Vec<Line>, width: u16, color: Color) {
    let rect = centered_rect(width, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_confirm_submit(f: &mut Frame, area: Rect, app: &App) {
    let c = app.session.view().counts;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Submit the exam?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("   ✓ Answered       {:>4}", c.answered),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(
            format!("   ○ Not answered   {:>4}", c.not_answered),
            Style::default().fg(Color::LightRed),
        )),
        Line::from(Span::styled(
            format!("   ⚑ Marked         {:>4}", c.marked),
            Style::default().fg(Color::Magenta),
        )),
        Line::from(Span::styled(
            format!("   · Not visited    {:>4}", c.not_visited),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from("   Any selected option is scored."),
        Line::from(""),
        confirm_row(),
    ];
    render_box(f, area, lines, 42, Color::Yellow);
}

fn draw_confirm_quit(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Abandon this attempt?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   Your answers will be discarded."),
        Line::from(""),
        confirm_row(),
    ];
    render_box(f, area, lines, 42, Color::Yellow);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Key Bindings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   a-z, 1-9     Select an option"),
        Line::from("   Enter        Save & next"),
        Line::from("   Ctrl+N       Save & next"),
        Line::from("   Ctrl+F       Mark for review & next"),
        Line::from("   Bksp/Ctrl+X  Clear response"),
        Line::from("   arrows       Previous/Next question"),
        Line::from("   Shift+↑/↓    Scroll a long question"),
        Line::from("   PgUp/PgDn    Jump 5 questions"),
        Line::from("   Home/End     First/Last question"),
        Line::from("   Ctrl+S       Submit exam"),
        Line::from("   Ctrl+Q       Abandon attempt"),
        Line::from("   ?            This help"),
        Line::from(""),
        Line::from(Span::styled(
            "        [Esc] Close",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let rect = centered_rect(46, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(lines).block(block), rect);
}
