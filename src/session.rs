use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{ExamError, ExtractionError};
use crate::extract::{ExtractionProvider, SourceDocument};
use crate::model::{Quiz, RawQuiz};
use crate::navigation::Navigator;
use crate::responses::{ResponseStore, Status, StatusCounts};
use crate::scoring::{self, AttemptInfo, Report};
use crate::timer::{ClockEvent, SessionClock};

/// Lifecycle of the exam portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Loading,
    Setup,
    InProgress,
    Completed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Setup => "setup",
            Phase::InProgress => "in-progress",
            Phase::Completed => "completed",
        }
    }

    fn can_move_to(self, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, to),
            (Idle, Loading)
                | (Loading, Setup)
                | (Loading, Idle)
                | (Setup, InProgress)
                | (Setup, Idle)
                | (InProgress, Completed)
                | (InProgress, Idle)
                | (Completed, Setup)
                | (Completed, Idle)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one running or finished attempt.
#[derive(Debug)]
struct Attempt {
    store: ResponseStore,
    clock: SessionClock,
    nav: Navigator,
    started_at: DateTime<Utc>,
}

/// Per-question state exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionState {
    pub status: Status,
    pub selected: Option<usize>,
    pub time_spent: u64,
}

/// Read-only copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub active_index: usize,
    pub question_count: usize,
    pub remaining_seconds: u64,
    pub questions: Vec<QuestionState>,
    pub counts: StatusCounts,
    pub last_error: Option<String>,
}

/// Owner of the quiz, the response store, the clock and the active-question
/// pointer. Every mutation of session state goes through here.
#[derive(Debug)]
pub struct SessionController {
    phase: Phase,
    quiz: Option<Quiz>,
    source_sha256: Option<String>,
    attempt: Option<Attempt>,
    report: Option<Report>,
    last_error: Option<String>,
    epoch: u64,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            quiz: None,
            source_sha256: None,
            attempt: None,
            report: None,
            last_error: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// User-facing reason for the last failed extraction.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Changes whenever a new extraction or attempt begins. Background work
    /// (ticker, extraction worker) carries the epoch it was started under so
    /// late deliveries can be recognised and dropped.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn transition(&mut self, to: Phase) -> Result<(), ExamError> {
        if !self.phase.can_move_to(to) {
            return Err(ExamError::InvalidTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
            });
        }
        info!(from = %self.phase, to = %to, "phase change");
        self.phase = to;
        Ok(())
    }

    fn require(&self, phase: Phase) -> Result<(), ExamError> {
        if self.phase != phase {
            return Err(ExamError::InvalidState {
                expected: phase.to_string(),
                actual: self.phase.to_string(),
            });
        }
        Ok(())
    }

    /// `idle -> loading`. Returns the epoch the extraction result must carry.
    pub fn begin_loading(&mut self, document: &SourceDocument) -> Result<u64, ExamError> {
        self.transition(Phase::Loading)?;
        self.epoch += 1;
        self.last_error = None;
        self.source_sha256 = Some(document.sha256_hex());
        debug!(file = %document.file_name(), bytes = document.len(), "document submitted");
        Ok(self.epoch)
    }

    /// Apply an extraction result. A result for an older epoch (the user
    /// cancelled in the meantime) is dropped and `Ok(false)` is returned.
    pub fn finish_loading(
        &mut self,
        epoch: u64,
        result: Result<RawQuiz, ExtractionError>,
    ) -> Result<bool, ExamError> {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping stale extraction result");
            return Ok(false);
        }
        self.require(Phase::Loading)?;

        match result.and_then(|raw| raw.validate().map_err(ExtractionError::from)) {
            Ok(quiz) => {
                info!(
                    title = %quiz.title(),
                    questions = quiz.question_count(),
                    limit = quiz.time_limit_seconds(),
                    "quiz loaded"
                );
                self.quiz = Some(quiz);
                self.transition(Phase::Setup)?;
            }
            Err(e) => {
                warn!(error = %e, "extraction failed");
                self.last_error = Some(e.to_string());
                self.source_sha256 = None;
                self.transition(Phase::Idle)?;
            }
        }
        Ok(true)
    }

    /// Run an extraction synchronously: `idle -> loading -> setup | idle`.
    pub fn load(
        &mut self,
        provider: &dyn ExtractionProvider,
        document: &SourceDocument,
    ) -> Result<(), ExamError> {
        let epoch = self.begin_loading(document)?;
        let result = provider.extract(document);
        self.finish_loading(epoch, result)?;
        Ok(())
    }

    /// Change the time limit before starting.
    pub fn set_time_limit(&mut self, seconds: u64) -> Result<(), ExamError> {
        self.require(Phase::Setup)?;
        let quiz = self.quiz.as_ref().ok_or_else(|| missing_quiz(self.phase))?;
        self.quiz = Some(quiz.with_time_limit(seconds)?);
        Ok(())
    }

    /// `setup -> in-progress`: fresh responses, clock started, first question
    /// visited. Returns the epoch ticks must carry.
    pub fn start(&mut self) -> Result<u64, ExamError> {
        self.require(Phase::Setup)?;
        let quiz = self.quiz.as_ref().ok_or_else(|| missing_quiz(self.phase))?;

        let mut store = ResponseStore::initialize(quiz);
        let mut nav = Navigator::new(quiz);
        nav.visit(quiz, &mut store, 0)?;
        let mut clock = SessionClock::new(quiz.time_limit_seconds());

        self.transition(Phase::InProgress)?;
        clock.start();
        self.epoch += 1;
        self.report = None;
        self.attempt = Some(Attempt {
            store,
            clock,
            nav,
            started_at: Utc::now(),
        });
        Ok(self.epoch)
    }

    fn active(&mut self) -> Result<(&Quiz, &mut Attempt), ExamError> {
        self.require(Phase::InProgress)?;
        let phase = self.phase;
        match (self.quiz.as_ref(), self.attempt.as_mut()) {
            (Some(quiz), Some(attempt)) => Ok((quiz, attempt)),
            _ => Err(missing_quiz(phase)),
        }
    }

    /// Apply one clock tick. Ticks from an older epoch or outside
    /// `in-progress` are ignored. Expiry completes the session.
    pub fn tick(&mut self, epoch: u64) -> Result<ClockEvent, ExamError> {
        if epoch != self.epoch || self.phase != Phase::InProgress {
            return Ok(ClockEvent::Idle);
        }
        let (quiz, attempt) = self.active()?;
        let id = attempt.nav.current_id(quiz)?.to_string();
        let event = attempt.clock.tick(&mut attempt.store, &id)?;
        if event == ClockEvent::Expired {
            info!("time is up, submitting");
            self.complete(true)?;
        }
        Ok(event)
    }

    pub fn visit(&mut self, index: usize) -> Result<(), ExamError> {
        let (quiz, attempt) = self.active()?;
        attempt.nav.visit(quiz, &mut attempt.store, index)
    }

    pub fn select(&mut self, option_index: usize) -> Result<(), ExamError> {
        let (quiz, attempt) = self.active()?;
        attempt.nav.select(quiz, &mut attempt.store, option_index)
    }

    pub fn clear(&mut self) -> Result<(), ExamError> {
        let (quiz, attempt) = self.active()?;
        attempt.nav.clear(quiz, &mut attempt.store)
    }

    /// Returns `false` when already on the last question.
    pub fn save_and_next(&mut self) -> Result<bool, ExamError> {
        let (quiz, attempt) = self.active()?;
        attempt.nav.save_and_next(quiz, &mut attempt.store)
    }

    /// Returns `false` when already on the last question.
    pub fn mark_and_next(&mut self) -> Result<bool, ExamError> {
        let (quiz, attempt) = self.active()?;
        attempt.nav.mark_and_next(quiz, &mut attempt.store)
    }

    /// Manual submission: `in-progress -> completed`.
    pub fn submit(&mut self) -> Result<&Report, ExamError> {
        self.require(Phase::InProgress)?;
        self.complete(false)?;
        self.report.as_ref().ok_or_else(|| missing_quiz(self.phase))
    }

    fn complete(&mut self, forced: bool) -> Result<(), ExamError> {
        let phase = self.phase;
        let attempt = self.attempt.as_mut().ok_or_else(|| missing_quiz(phase))?;
        attempt.clock.stop();
        let snapshot = attempt.store.snapshot();
        let started_at = attempt.started_at;

        self.transition(Phase::Completed)?;
        let quiz = self.quiz.as_ref().ok_or_else(|| missing_quiz(self.phase))?;
        let report = scoring::score(self.phase, quiz, &snapshot)?.with_attempt(AttemptInfo {
            forced,
            started_at: Some(started_at),
            submitted_at: Some(Utc::now()),
            source_sha256: self.source_sha256.clone(),
        });
        info!(
            score = report.score,
            total = report.question_count,
            forced,
            "session completed"
        );
        self.report = Some(report);
        Ok(())
    }

    /// `completed -> setup` with the same quiz; previous responses are dropped.
    pub fn reattempt(&mut self) -> Result<(), ExamError> {
        self.transition(Phase::Setup)?;
        self.attempt = None;
        self.report = None;
        Ok(())
    }

    /// Back to `idle` from loading, setup, in-progress or completed. The clock
    /// is stopped before anything else is torn down.
    pub fn restart(&mut self) -> Result<(), ExamError> {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.clock.stop();
        }
        self.transition(Phase::Idle)?;
        self.epoch += 1;
        self.attempt = None;
        self.report = None;
        self.quiz = None;
        self.source_sha256 = None;
        Ok(())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.attempt.as_ref().map(|a| a.nav.current())
    }

    pub fn remaining_seconds(&self) -> Option<u64> {
        self.attempt.as_ref().map(|a| a.clock.remaining())
    }

    pub fn status_counts(&self) -> Option<StatusCounts> {
        self.attempt.as_ref().map(|a| a.store.status_counts())
    }

    pub fn view(&self) -> SessionView {
        let question_count = self.quiz.as_ref().map_or(0, |q| q.question_count());
        match &self.attempt {
            Some(attempt) => SessionView {
                phase: self.phase,
                active_index: attempt.nav.current(),
                question_count,
                remaining_seconds: attempt.clock.remaining(),
                questions: attempt
                    .store
                    .iter()
                    .map(|r| QuestionState {
                        status: r.status,
                        selected: r.selected,
                        time_spent: r.time_spent,
                    })
                    .collect(),
                counts: attempt.store.status_counts(),
                last_error: self.last_error.clone(),
            },
            None => SessionView {
                phase: self.phase,
                active_index: 0,
                question_count,
                remaining_seconds: self.quiz.as_ref().map_or(0, |q| q.time_limit_seconds()),
                questions: Vec::new(),
                counts: StatusCounts {
                    not_visited: question_count,
                    ..StatusCounts::default()
                },
                last_error: self.last_error.clone(),
            },
        }
    }
}

fn missing_quiz(phase: Phase) -> ExamError {
    ExamError::InvalidState {
        expected: "a loaded quiz".to_string(),
        actual: phase.to_string(),
    }
}
