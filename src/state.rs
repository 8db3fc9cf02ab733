use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use tracing::warn;

use crate::config::Config;
use crate::error::ExamError;
use crate::extract::ExtractionEvent;
use crate::model::Question;
use crate::session::{Phase, SessionController};
use crate::timer::Ticker;

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmSubmit,
    ConfirmQuit,
    Help,
}

/// Terminal front end state: the session controller plus view-only bits
/// (typed path, dialogs, scroll offsets) and handles to background work.
pub struct App {
    pub session: SessionController,
    pub config: Config,
    pub path_input: String,
    /// Document rejected before it was ever sent for extraction.
    pub admission_error: Option<String>,
    pub loading_file: String,
    pub loading_started: Option<Instant>,
    pub dialog_stack: Vec<Dialog>,
    pub notice: Option<String>,
    /// Offset into the active question, back to the top on every move.
    pub question_scroll: usize,
    pub review_scroll: usize,
    pub exported_to: Option<PathBuf>,
    pub should_quit: bool,
    pub ticker: Option<Ticker>,
    pub extraction_rx: Option<mpsc::Receiver<ExtractionEvent>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            session: SessionController::new(),
            config,
            path_input: String::new(),
            admission_error: None,
            loading_file: String::new(),
            loading_started: None,
            dialog_stack: Vec::new(),
            notice: None,
            question_scroll: 0,
            review_scroll: 0,
            exported_to: None,
            should_quit: false,
            ticker: None,
            extraction_rx: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Error to show on the idle screen, if any.
    pub fn idle_error(&self) -> Option<&str> {
        self.admission_error
            .as_deref()
            .or_else(|| self.session.last_error())
    }

    pub fn current_question(&self) -> Option<&Question> {
        let index = self.session.active_index()?;
        self.session.quiz()?.question(index)
    }

    /// Loading gauge, creeping towards 98% while the extraction runs.
    pub fn loading_progress(&self) -> f64 {
        let Some(started) = self.loading_started else {
            return 0.0;
        };
        // One step every 150ms: fast at first, then a slow crawl.
        let steps = (started.elapsed().as_millis() / 150) as i32;
        let mut progress = 0.0_f64;
        for _ in 0..steps.min(2000) {
            if progress < 90.0 {
                progress += (100.0 - progress) * 0.04;
            } else if progress < 98.0 {
                progress += 0.1;
            } else {
                break;
            }
        }
        progress
    }

    pub fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    /// Log and swallow errors that indicate a bug in the caller rather than
    /// anything the user did.
    pub fn check<T>(&mut self, result: Result<T, ExamError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, phase = %self.session.phase(), "action rejected");
                None
            }
        }
    }

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialog_stack.last()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialog_stack.push(dialog);
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }
}
