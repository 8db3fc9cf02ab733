pub mod dialog;
pub mod intake;
pub mod keybar;
pub mod layout;
pub mod question;
pub mod result;
pub mod setup;
pub mod sidebar;
pub mod statusbar;
pub mod titlebar;

use ratatui::layout::Rect;
use ratatui::Frame;

use crate::session::Phase;
use crate::state::App;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    match app.phase() {
        Phase::Idle => intake::draw_idle(f, area, app),
        Phase::Loading => intake::draw_loading(f, area, app),
        Phase::Setup => setup::draw_setup(f, area, app),
        Phase::InProgress => draw_exam(f, area, app),
        Phase::Completed => result::draw_result(f, area, app),
    }

    if app.has_dialog() {
        dialog::draw_dialog(f, area, app);
    }
}

/// Pull scroll offsets back inside their content after input or a resize.
pub fn clamp_scrolls(app: &mut App, area: Rect) {
    let question_limit = match app.phase() {
        Phase::InProgress => question::scroll_limit(app, layout::compute_layout(area).main),
        _ => 0,
    };
    app.question_scroll = app.question_scroll.min(question_limit);

    let review_limit = app
        .session
        .report()
        .map_or(0, |report| result::review_scroll_limit(report, area));
    app.review_scroll = app.review_scroll.min(review_limit);
}

fn draw_exam(f: &mut Frame, area: Rect, app: &App) {
    let layout = layout::compute_layout(area);

    titlebar::draw_titlebar(f, layout.titlebar, app);
    sidebar::draw_sidebar(f, layout.sidebar, app);
    question::draw_question(f, layout.main, app);
    statusbar::draw_statusbar(f, layout.statusbar, app);
    keybar::draw_keybar(f, layout.keybar, app);
}
