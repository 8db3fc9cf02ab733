use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ExamError;
use crate::model::Quiz;
use crate::responses::{ResponseSnapshot, Status, StatusCounts};
use crate::session::Phase;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReview {
    pub number: usize,
    pub id: String,
    pub section: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub options: Vec<String>,
    pub selected_option: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
    pub status: Status,
    pub time_spent_seconds: u64,
    pub explanation: String,
}

/// Facts about the attempt that are not derived from the responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttemptInfo {
    /// Completed by the countdown rather than by the user.
    pub forced: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub source_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub score: usize,
    pub question_count: usize,
    pub accuracy_percent: u32,
    pub total_time_seconds: u64,
    pub average_time_seconds: u64,
    pub status_counts: StatusCounts,
    #[serde(flatten)]
    pub attempt: AttemptInfo,
    pub questions: Vec<QuestionReview>,
}

impl Report {
    pub fn with_attempt(mut self, attempt: AttemptInfo) -> Self {
        self.attempt = attempt;
        self
    }
}

/// Score a finished session. Pure: the same snapshot always yields the same
/// report. Refuses to run unless the session has completed.
pub fn score(phase: Phase, quiz: &Quiz, snapshot: &ResponseSnapshot) -> Result<Report, ExamError> {
    if phase != Phase::Completed {
        return Err(ExamError::InvalidState {
            expected: Phase::Completed.to_string(),
            actual: phase.to_string(),
        });
    }

    let mut questions = Vec::with_capacity(quiz.question_count());
    let mut total_time: u64 = 0;
    let mut active: u64 = 0;

    for (i, q) in quiz.questions().iter().enumerate() {
        let response = snapshot.get(q.id());
        let selected = response.and_then(|r| r.selected);
        let time_spent = response.map(|r| r.time_spent).unwrap_or(0);

        total_time += time_spent;
        if response.is_some_and(|r| r.has_activity()) {
            active += 1;
        }

        questions.push(QuestionReview {
            number: i + 1,
            id: q.id().to_string(),
            section: quiz.section_label(q).to_string(),
            prompt: q.prompt().to_string(),
            context: q.context().map(str::to_string),
            options: q.options().to_vec(),
            selected_option: selected,
            correct_option: q.correct_index(),
            is_correct: q.is_correct(selected),
            status: response.map(|r| r.status).unwrap_or(Status::NotVisited),
            time_spent_seconds: time_spent,
            explanation: q.explanation().to_string(),
        });
    }

    let score = questions.iter().filter(|q| q.is_correct).count();
    let count = quiz.question_count();
    let accuracy = if count == 0 {
        0
    } else {
        (score as f64 / count as f64 * 100.0).round() as u32
    };
    let average = (total_time as f64 / active.max(1) as f64).round() as u64;

    Ok(Report {
        title: quiz.title().to_string(),
        score,
        question_count: count,
        accuracy_percent: accuracy,
        total_time_seconds: total_time,
        average_time_seconds: average,
        status_counts: snapshot.status_counts(),
        attempt: AttemptInfo::default(),
        questions,
    })
}
