use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::Rect;
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use crate::extract::{spawn_extraction, ExtractionEvent, ExtractionProvider, SourceDocument};
use crate::report;
use crate::session::Phase;
use crate::state::{App, Dialog};
use crate::timer::{spawn_ticker, ClockEvent};
use crate::ui;

/// Run the portal until the user quits. Returns the app so the caller can
/// print the last report.
pub fn run_tui(mut app: App, provider: Arc<dyn ExtractionProvider>) -> Result<App, String> {
    enable_raw_mode().map_err(|e| format!("Cannot enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| format!("Cannot enter alternate screen: {}", e))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("Cannot create terminal: {}", e))?;

    // A path given on the command line is submitted straight away.
    if !app.path_input.trim().is_empty() {
        submit_path(&mut app, &provider);
    }

    let result = main_loop(&mut terminal, &mut app, &provider);

    app.stop_ticker();
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();

    result.map(|_| app)
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    provider: &Arc<dyn ExtractionProvider>,
) -> Result<(), String> {
    loop {
        let size = terminal.size().map_err(|e| format!("Size error: {}", e))?;
        let screen = Rect::new(0, 0, size.width, size.height);
        ui::clamp_scrolls(app, screen);
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| format!("Draw error: {}", e))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100)).map_err(|e| format!("Poll error: {}", e))? {
            match event::read().map_err(|e| format!("Read error: {}", e))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(key, app, provider);
                }
                Event::Mouse(mouse) => handle_mouse(mouse, app, screen),
                _ => {}
            }
        }

        drain_ticks(app);
        drain_extraction(app);
    }

    Ok(())
}

fn drain_ticks(app: &mut App) {
    let mut events = Vec::new();
    if let Some(ticker) = app.ticker.as_ref() {
        while let Some(ev) = ticker.try_recv() {
            events.push(ev);
        }
    }
    for ev in events {
        let result = app.session.tick(ev.epoch);
        if let Some(ClockEvent::Expired) = app.check(result) {
            on_completed(app);
        }
        if app.phase() != Phase::InProgress {
            app.stop_ticker();
            break;
        }
    }
}

fn drain_extraction(app: &mut App) {
    let event = match app.extraction_rx.as_ref().map(|rx| rx.try_recv()) {
        Some(Ok(ev)) => ev,
        Some(Err(std::sync::mpsc::TryRecvError::Disconnected)) => {
            app.extraction_rx = None;
            return;
        }
        _ => return,
    };
    app.extraction_rx = None;
    handle_extraction(event, app);
}

fn handle_extraction(event: ExtractionEvent, app: &mut App) {
    let result = app.session.finish_loading(event.epoch, event.result);
    if app.check(result) != Some(true) {
        return;
    }
    app.loading_started = None;
    if app.phase() == Phase::Setup {
        if let Some(seconds) = app.config.time_limit_override {
            let result = app.session.set_time_limit(seconds);
            app.check(result);
        }
    }
}

fn submit_path(app: &mut App, provider: &Arc<dyn ExtractionProvider>) {
    let raw = app.path_input.trim().trim_matches(|c| c == '"' || c == '\'');
    let path = PathBuf::from(raw);
    app.admission_error = None;

    let document = match SourceDocument::from_path(&path, app.config.max_document_bytes) {
        Ok(doc) => doc,
        Err(e) => {
            info!(path = %path.display(), error = %e, "document rejected");
            app.admission_error = Some(e.to_string());
            return;
        }
    };

    let result = app.session.begin_loading(&document);
    let Some(epoch) = app.check(result) else {
        return;
    };
    app.loading_file = document.file_name().to_string();
    app.loading_started = Some(Instant::now());
    app.extraction_rx = Some(spawn_extraction(Arc::clone(provider), document, epoch));
}

fn start_attempt(app: &mut App) {
    let result = app.session.start();
    if let Some(epoch) = app.check(result) {
        app.stop_ticker();
        app.ticker = Some(spawn_ticker(epoch));
        app.notice = None;
        app.question_scroll = 0;
        app.review_scroll = 0;
        app.exported_to = None;
    }
}

/// Back to the idle screen. Background work is stopped before the session
/// state goes away.
fn restart(app: &mut App) {
    app.stop_ticker();
    app.extraction_rx = None;
    let result = app.session.restart();
    app.check(result);
    app.loading_started = None;
    app.dialog_stack.clear();
    app.notice = None;
    app.question_scroll = 0;
    app.review_scroll = 0;
    app.exported_to = None;
}

fn submit(app: &mut App) {
    app.stop_ticker();
    let result = app.session.submit().map(|_| ());
    if app.check(result).is_some() {
        on_completed(app);
    }
}

fn on_completed(app: &mut App) {
    app.stop_ticker();
    app.dialog_stack.clear();
    app.review_scroll = 0;
    if app.config.export_path.is_some() {
        export_report(app);
    }
}

fn export_report(app: &mut App) {
    let Some(path) = app.config.export_path.clone() else {
        app.notice = Some("No export path configured (use --export)".to_string());
        return;
    };
    let Some(finished) = app.session.report() else {
        return;
    };
    match report::export(finished, &path) {
        Ok(()) => {
            info!(path = %path.display(), "report exported");
            app.notice = Some(format!("Report written to {}", path.display()));
            app.exported_to = Some(path);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "report export failed");
            app.notice = Some(format!("Export failed: {}", e));
        }
    }
}

fn handle_key(key: KeyEvent, app: &mut App, provider: &Arc<dyn ExtractionProvider>) {
    if app.has_dialog() {
        handle_dialog_key(key, app);
        return;
    }

    match app.phase() {
        Phase::Idle => handle_idle_key(key, app, provider),
        Phase::Loading => handle_loading_key(key, app),
        Phase::Setup => handle_setup_key(key, app),
        Phase::InProgress => handle_exam_key(key, app),
        Phase::Completed => handle_completed_key(key, app),
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn handle_idle_key(key: KeyEvent, app: &mut App, provider: &Arc<dyn ExtractionProvider>) {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        app.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Enter => {
            if !app.path_input.trim().is_empty() {
                submit_path(app, provider);
            }
        }
        KeyCode::Backspace => {
            app.path_input.pop();
        }
        KeyCode::Esc => {
            app.path_input.clear();
            app.admission_error = None;
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.path_input.push(c);
        }
        _ => {}
    }
}

fn handle_loading_key(key: KeyEvent, app: &mut App) {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        app.should_quit = true;
    } else if key.code == KeyCode::Esc {
        info!(file = %app.loading_file, "extraction cancelled");
        restart(app);
    }
}

fn handle_setup_key(key: KeyEvent, app: &mut App) {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        app.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Enter => start_attempt(app),
        KeyCode::Esc => restart(app),
        _ => {}
    }
}

fn handle_exam_key(key: KeyEvent, app: &mut App) {
    if is_ctrl(&key, 's') {
        app.push_dialog(Dialog::ConfirmSubmit);
        return;
    }
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        app.push_dialog(Dialog::ConfirmQuit);
        return;
    }
    if is_ctrl(&key, 'n') {
        save_and_next(app);
        return;
    }
    if is_ctrl(&key, 'f') {
        let result = app.session.mark_and_next();
        app.question_scroll = 0;
        if app.check(result) == Some(false) {
            app.notice = Some("Marked. This is the last question.".to_string());
        } else {
            app.notice = None;
        }
        return;
    }
    if is_ctrl(&key, 'x') {
        let result = app.session.clear();
        app.check(result);
        return;
    }

    if key.modifiers.contains(KeyModifiers::SHIFT) {
        match key.code {
            KeyCode::Up => {
                app.question_scroll = app.question_scroll.saturating_sub(1);
                return;
            }
            KeyCode::Down => {
                app.question_scroll += 1;
                return;
            }
            _ => {}
        }
    }

    let current = app.session.active_index().unwrap_or(0);
    let total = app.session.view().question_count;
    match key.code {
        KeyCode::Enter => save_and_next(app),
        KeyCode::Backspace | KeyCode::Delete => {
            let result = app.session.clear();
            app.check(result);
        }
        KeyCode::Char('?') => app.push_dialog(Dialog::Help),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(index) = option_for_key(c) {
                let count = app.current_question().map_or(0, |q| q.option_count());
                if index < count {
                    let result = app.session.select(index);
                    app.check(result);
                }
            }
        }
        KeyCode::Up | KeyCode::Left => visit(app, current.saturating_sub(1)),
        KeyCode::Down | KeyCode::Right => {
            if current + 1 < total {
                visit(app, current + 1);
            }
        }
        KeyCode::PageUp => visit(app, current.saturating_sub(5)),
        KeyCode::PageDown => visit(app, (current + 5).min(total.saturating_sub(1))),
        KeyCode::Home => visit(app, 0),
        KeyCode::End => visit(app, total.saturating_sub(1)),
        _ => {}
    }
}

/// `a`..`z` and `1`..`9` pick an option.
fn option_for_key(c: char) -> Option<usize> {
    match c {
        'a'..='z' => Some(c as usize - 'a' as usize),
        'A'..='Z' => Some(c as usize - 'A' as usize),
        '1'..='9' => Some(c as usize - '1' as usize),
        _ => None,
    }
}

fn visit(app: &mut App, index: usize) {
    if app.session.active_index() == Some(index) {
        return;
    }
    let result = app.session.visit(index);
    app.check(result);
    app.question_scroll = 0;
    app.notice = None;
}

fn save_and_next(app: &mut App) {
    let result = app.session.save_and_next();
    app.question_scroll = 0;
    if app.check(result) == Some(false) {
        app.notice = Some("Saved. This is the last question, press Ctrl+S to submit.".to_string());
    } else {
        app.notice = None;
    }
}

fn handle_completed_key(key: KeyEvent, app: &mut App) {
    if is_ctrl(&key, 'q') || is_ctrl(&key, 'c') {
        app.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => {
            let result = app.session.reattempt();
            if app.check(result).is_some() {
                app.notice = None;
                app.question_scroll = 0;
                app.review_scroll = 0;
                if let Some(seconds) = app.config.time_limit_override {
                    let result = app.session.set_time_limit(seconds);
                    app.check(result);
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            restart(app);
            app.path_input.clear();
        }
        KeyCode::Char('e') | KeyCode::Char('E') => export_report(app),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Up => app.review_scroll = app.review_scroll.saturating_sub(1),
        KeyCode::Down => app.review_scroll += 1,
        KeyCode::PageUp => app.review_scroll = app.review_scroll.saturating_sub(10),
        KeyCode::PageDown => app.review_scroll += 10,
        KeyCode::Home => app.review_scroll = 0,
        _ => {}
    }
}

fn handle_dialog_key(key: KeyEvent, app: &mut App) {
    let dialog = app.top_dialog().cloned();
    match dialog {
        Some(Dialog::ConfirmSubmit) => match key.code {
            KeyCode::Enter => {
                app.pop_dialog();
                submit(app);
            }
            KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::ConfirmQuit) => match key.code {
            KeyCode::Enter => {
                app.pop_dialog();
                info!("attempt abandoned");
                restart(app);
            }
            KeyCode::Esc => {
                app.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::Help) => match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter => {
                app.pop_dialog();
            }
            _ => {}
        },
        None => {}
    }
}

fn handle_mouse(mouse: MouseEvent, app: &mut App, size: Rect) {
    match app.phase() {
        Phase::InProgress if !app.has_dialog() => {}
        Phase::Completed => {
            match mouse.kind {
                MouseEventKind::ScrollUp => {
                    app.review_scroll = app.review_scroll.saturating_sub(3);
                }
                MouseEventKind::ScrollDown => app.review_scroll += 3,
                _ => {}
            }
            return;
        }
        _ => return,
    }

    let layout = ui::layout::compute_layout(size);
    let in_sidebar = contains(layout.sidebar, mouse.column, mouse.row);
    let in_question = contains(layout.main, mouse.column, mouse.row);
    let current = app.session.active_index().unwrap_or(0);
    let total = app.session.view().question_count;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if in_sidebar => {
            if let Some(index) = ui::sidebar::question_at(app, layout.sidebar, mouse.row) {
                visit(app, index);
            }
        }
        MouseEventKind::ScrollUp if in_sidebar => visit(app, current.saturating_sub(1)),
        MouseEventKind::ScrollDown if in_sidebar => {
            if current + 1 < total {
                visit(app, current + 1);
            }
        }
        MouseEventKind::ScrollUp if in_question => {
            app.question_scroll = app.question_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if in_question => app.question_scroll += 3,
        _ => {}
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

