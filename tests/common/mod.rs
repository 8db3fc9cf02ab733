#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use examdesk::error::ExtractionError;
use examdesk::extract::{ExtractionProvider, SourceDocument};
use examdesk::model::{RawQuestion, RawQuiz};

pub fn raw_question(id: &str, correct: i64) -> RawQuestion {
    RawQuestion {
        id: id.to_string(),
        question: format!("Question {}", id),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer_index: correct,
        explanation: Some(format!("Because {}", id)),
        ..Default::default()
    }
}

/// Three questions, 90 seconds, correct answers 0, 1, 2.
pub fn three_question_quiz() -> RawQuiz {
    RawQuiz {
        title: "Practice Set".to_string(),
        description: "Three quick ones".to_string(),
        time_limit_seconds: 90,
        sections: vec!["General".to_string()],
        questions: vec![raw_question("q1", 0), raw_question("q2", 1), raw_question("q3", 2)],
    }
}

pub fn pdf(name: &str, body: &str) -> SourceDocument {
    let bytes = format!("%PDF-1.7\n{}\n%%EOF", body).into_bytes();
    SourceDocument::from_bytes(name, bytes, 1024 * 1024).unwrap()
}

/// Returns a canned result and counts how often it was asked.
pub struct FakeProvider {
    result: Mutex<Option<Result<RawQuiz, ExtractionError>>>,
    fixed: Option<RawQuiz>,
    pub calls: AtomicUsize,
}

impl FakeProvider {
    pub fn returning(quiz: RawQuiz) -> Self {
        Self {
            result: Mutex::new(None),
            fixed: Some(quiz),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_once(error: ExtractionError) -> Self {
        Self {
            result: Mutex::new(Some(Err(error))),
            fixed: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExtractionProvider for FakeProvider {
    fn extract(&self, _document: &SourceDocument) -> Result<RawQuiz, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.result.lock().unwrap().take() {
            return result;
        }
        self.fixed.clone().ok_or(ExtractionError::EmptyResponse)
    }
}

pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("examdesk_test_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
