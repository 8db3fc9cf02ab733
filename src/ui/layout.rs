use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub titlebar: Rect,
    pub sidebar: Rect,
    pub main: Rect,
    pub statusbar: Rect,
    pub keybar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title + clock
            Constraint::Min(5),    // palette + question
            Constraint::Length(1), // counts + notices
            Constraint::Length(1), // keys
        ])
        .split(area);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)])
        .split(vertical[1]);

    AppLayout {
        titlebar: vertical[0],
        sidebar: middle[0],
        main: middle[1],
        statusbar: vertical[2],
        keybar: vertical[3],
    }
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
