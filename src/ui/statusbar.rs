use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::App;

pub fn draw_statusbar(f: &mut Frame, area: Rect, app: &App) {
    let view = app.session.view();
    let c = &view.counts;

    let mut spans = vec![
        Span::styled(format!(" ✓ {} answered", c.answered), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(
            format!("○ {} not answered", c.not_answered),
            Style::default().fg(Color::LightRed),
        ),
        Span::raw("  "),
        Span::styled(format!("⚑ {} marked", c.marked), Style::default().fg(Color::Magenta)),
        Span::raw("  "),
        Span::styled(
            format!("· {} not visited", c.not_visited),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(ref notice) = app.notice {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
