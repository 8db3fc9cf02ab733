use std::collections::HashMap;

use serde::Serialize;

use crate::error::ExamError;
use crate::model::Quiz;

/// Palette status of a question. Independent of whether an option is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    NotVisited,
    NotAnswered,
    Answered,
    Marked,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::NotVisited => "not visited",
            Status::NotAnswered => "not answered",
            Status::Answered => "answered",
            Status::Marked => "marked for review",
        }
    }
}

/// A user's interaction with one question during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub question_id: String,
    pub selected: Option<usize>,
    pub is_correct: bool,
    pub time_spent: u64,
    pub status: Status,
}

impl Response {
    /// Whether the question saw any activity at all during the session.
    pub fn has_activity(&self) -> bool {
        self.status != Status::NotVisited || self.selected.is_some() || self.time_spent > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub answered: usize,
    pub not_answered: usize,
    pub marked: usize,
    pub not_visited: usize,
}

impl StatusCounts {
    pub fn from_responses<'a>(responses: impl IntoIterator<Item = &'a Response>) -> Self {
        let mut counts = StatusCounts::default();
        for r in responses {
            match r.status {
                Status::Answered => counts.answered += 1,
                Status::NotAnswered => counts.not_answered += 1,
                Status::Marked => counts.marked += 1,
                Status::NotVisited => counts.not_visited += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone)]
struct Entry {
    response: Response,
    option_count: usize,
    correct_index: usize,
}

/// Per-question answer state for one session, in quiz order.
#[derive(Debug, Clone)]
pub struct ResponseStore {
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
}

impl ResponseStore {
    /// One `not-visited`, unselected response per question.
    pub fn initialize(quiz: &Quiz) -> Self {
        let mut entries = Vec::with_capacity(quiz.question_count());
        let mut by_id = HashMap::with_capacity(quiz.question_count());
        for (i, q) in quiz.questions().iter().enumerate() {
            by_id.insert(q.id().to_string(), i);
            entries.push(Entry {
                response: Response {
                    question_id: q.id().to_string(),
                    selected: None,
                    is_correct: false,
                    time_spent: 0,
                    status: Status::NotVisited,
                },
                option_count: q.option_count(),
                correct_index: q.correct_index(),
            });
        }
        Self { entries, by_id }
    }

    fn entry(&self, question_id: &str) -> Result<&Entry, ExamError> {
        self.by_id
            .get(question_id)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| ExamError::NotFound(question_id.to_string()))
    }

    fn entry_mut(&mut self, question_id: &str) -> Result<&mut Entry, ExamError> {
        match self.by_id.get(question_id) {
            Some(&i) => Ok(&mut self.entries[i]),
            None => Err(ExamError::NotFound(question_id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, question_id: &str) -> Result<&Response, ExamError> {
        self.entry(question_id).map(|e| &e.response)
    }

    pub fn get_at(&self, index: usize) -> Option<&Response> {
        self.entries.get(index).map(|e| &e.response)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Response> {
        self.entries.iter().map(|e| &e.response)
    }

    /// Record a selection. Status is left alone.
    pub fn select(&mut self, question_id: &str, option_index: usize) -> Result<(), ExamError> {
        let entry = self.entry_mut(question_id)?;
        if option_index >= entry.option_count {
            return Err(ExamError::InvalidSelection {
                question_id: question_id.to_string(),
                option_index,
                option_count: entry.option_count,
            });
        }
        entry.response.selected = Some(option_index);
        entry.response.is_correct = option_index == entry.correct_index;
        Ok(())
    }

    /// Drop the selection. Status is left alone.
    pub fn clear(&mut self, question_id: &str) -> Result<(), ExamError> {
        let entry = self.entry_mut(question_id)?;
        entry.response.selected = None;
        entry.response.is_correct = false;
        Ok(())
    }

    /// Plain overwrite; transition rules are enforced by the navigator.
    pub fn set_status(&mut self, question_id: &str, status: Status) -> Result<(), ExamError> {
        self.entry_mut(question_id)?.response.status = status;
        Ok(())
    }

    pub fn add_elapsed(&mut self, question_id: &str, seconds: i64) -> Result<(), ExamError> {
        if seconds < 0 {
            return Err(ExamError::InvalidArgument(format!(
                "elapsed time cannot be negative ({}s)",
                seconds
            )));
        }
        let entry = self.entry_mut(question_id)?;
        entry.response.time_spent = entry.response.time_spent.saturating_add(seconds as u64);
        Ok(())
    }

    /// Recomputed from the full collection on every call.
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_responses(self.iter())
    }

    pub fn total_elapsed(&self) -> u64 {
        self.iter().map(|r| r.time_spent).sum()
    }

    pub fn snapshot(&self) -> ResponseSnapshot {
        ResponseSnapshot {
            responses: self.iter().cloned().collect(),
        }
    }
}

/// Immutable point-in-time copy of every response, in quiz order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    responses: Vec<Response>,
}

impl ResponseSnapshot {
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn get(&self, question_id: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.question_id == question_id)
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_responses(&self.responses)
    }
}
