use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ExamError;

/// Label used for questions whose section is missing or undeclared.
pub const UNLABELED_SECTION: &str = "Unlabeled";

/// Section assigned when the extracted document declares none.
pub const DEFAULT_SECTION: &str = "General";

/// A single multiple-choice question. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: String,
    prompt: String,
    context: Option<String>,
    section: Option<String>,
    options: Vec<String>,
    correct_index: usize,
    explanation: String,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            context: None,
            section: None,
            options,
            correct_index,
            explanation: String::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Shared directions text, copied verbatim onto every question of a set.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        selected == Some(self.correct_index)
    }
}

/// An extracted question set. Construct through [`Quiz::new`] or
/// [`RawQuiz::validate`]; both enforce the structural invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    title: String,
    description: String,
    sections: Vec<String>,
    time_limit_seconds: u64,
    questions: Vec<Question>,
}

impl Quiz {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        sections: Vec<String>,
        time_limit_seconds: u64,
        questions: Vec<Question>,
    ) -> Result<Self, ExamError> {
        if time_limit_seconds == 0 {
            return Err(ExamError::Validation(
                "time limit must be greater than zero".to_string(),
            ));
        }
        if questions.is_empty() {
            return Err(ExamError::Validation(
                "no questions were extracted".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, q) in questions.iter().enumerate() {
            let number = i + 1;
            if q.id.trim().is_empty() || !seen.insert(q.id.as_str()) {
                return Err(ExamError::Validation(format!(
                    "question {} has a missing or duplicate id",
                    number
                )));
            }
            check_question(number, q)?;
        }

        Ok(Self {
            title: title.into(),
            description: description.into(),
            sections,
            time_limit_seconds,
            questions,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn time_limit_seconds(&self) -> u64 {
        self.time_limit_seconds
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn question_by_id(&self, id: &str) -> Result<&Question, ExamError> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| ExamError::NotFound(id.to_string()))
    }

    pub fn index_of(&self, id: &str) -> Result<usize, ExamError> {
        self.questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| ExamError::NotFound(id.to_string()))
    }

    /// Section a question is displayed under. Sections that are missing or
    /// not declared by the quiz fall back to [`UNLABELED_SECTION`].
    pub fn section_label<'a>(&'a self, question: &'a Question) -> &'a str {
        match question.section() {
            Some(s) if self.sections.iter().any(|d| d == s) => s,
            _ => UNLABELED_SECTION,
        }
    }

    /// Same quiz with a different time limit, as chosen at setup.
    pub fn with_time_limit(&self, seconds: u64) -> Result<Self, ExamError> {
        if seconds == 0 {
            return Err(ExamError::InvalidArgument(
                "time limit must be greater than zero".to_string(),
            ));
        }
        let mut quiz = self.clone();
        quiz.time_limit_seconds = seconds;
        Ok(quiz)
    }
}

fn check_question(number: usize, q: &Question) -> Result<(), ExamError> {
    if q.prompt.trim().is_empty() {
        return Err(ExamError::Validation(format!(
            "question {} has no text",
            number
        )));
    }
    if q.options.len() < 2 {
        return Err(ExamError::Validation(format!(
            "question {} has {} option(s), at least 2 are required",
            number,
            q.options.len()
        )));
    }
    if q.correct_index >= q.options.len() {
        return Err(ExamError::Validation(format!(
            "question {} marks option {} as correct but only has {} options",
            number,
            q.correct_index,
            q.options.len()
        )));
    }
    Ok(())
}

/// Quiz exactly as returned by the extraction service, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuiz {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time_limit_seconds: i64,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl RawQuiz {
    /// Defensive check of an extraction result.
    ///
    /// Structural problems (no questions, fewer than two options, correct
    /// index out of range, non-positive time limit) reject the quiz. Cosmetic
    /// gaps are repaired: blank or duplicate ids become positional `qN`, an
    /// empty section list becomes `General`, blank context/section are dropped.
    pub fn validate(self) -> Result<Quiz, ExamError> {
        if self.time_limit_seconds <= 0 {
            return Err(ExamError::Validation(format!(
                "time limit must be greater than zero (got {})",
                self.time_limit_seconds
            )));
        }

        let mut sections: Vec<String> = self
            .sections
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if sections.is_empty() {
            sections.push(DEFAULT_SECTION.to_string());
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut questions = Vec::with_capacity(self.questions.len());
        for (i, raw) in self.questions.into_iter().enumerate() {
            let number = i + 1;
            let correct_index = usize::try_from(raw.correct_answer_index).map_err(|_| {
                ExamError::Validation(format!(
                    "question {} marks option {} as correct",
                    number, raw.correct_answer_index
                ))
            })?;

            let id = raw.id.trim().to_string();
            let id = if id.is_empty() || seen.contains(&id) {
                format!("q{}", number)
            } else {
                id
            };
            seen.insert(id.clone());

            let mut question = Question::new(
                id,
                raw.question.trim(),
                raw.options,
                correct_index,
            );
            if let Some(context) = non_blank(raw.context) {
                question = question.with_context(context);
            }
            if let Some(section) = non_blank(raw.section) {
                question = question.with_section(section);
            }
            if let Some(explanation) = non_blank(raw.explanation) {
                question = question.with_explanation(explanation);
            }
            questions.push(question);
        }

        let title = if self.title.trim().is_empty() {
            "Untitled exam".to_string()
        } else {
            self.title.trim().to_string()
        };

        Quiz::new(
            title,
            self.description.trim(),
            sections,
            self.time_limit_seconds as u64,
            questions,
        )
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_question(id: &str, options: usize, correct: i64) -> RawQuestion {
        RawQuestion {
            id: id.to_string(),
            question: format!("Question {}", id),
            options: (0..options).map(|i| format!("Option {}", i)).collect(),
            correct_answer_index: correct,
            ..Default::default()
        }
    }

    fn raw_quiz(questions: Vec<RawQuestion>) -> RawQuiz {
        RawQuiz {
            title: "Reasoning Mock".to_string(),
            description: "Mock test".to_string(),
            time_limit_seconds: 120,
            sections: vec!["Reasoning".to_string()],
            questions,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_quiz() {
        let quiz = raw_quiz(vec![raw_question("a", 4, 0), raw_question("b", 4, 3)])
            .validate()
            .unwrap();
        assert_eq!(quiz.question_count(), 2);
        assert_eq!(quiz.time_limit_seconds(), 120);
        assert_eq!(quiz.question(1).unwrap().correct_index(), 3);
    }

    #[test]
    fn test_validate_rejects_correct_index_out_of_bounds() {
        let err = raw_quiz(vec![raw_question("a", 4, 4)]).validate().unwrap_err();
        assert!(matches!(err, ExamError::Validation(_)));

        let err = raw_quiz(vec![raw_question("a", 4, -1)]).validate().unwrap_err();
        assert!(matches!(err, ExamError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_huge_and_negative_indices() {
        // Must not wrap into the option range on any target width.
        for correct in [i64::MIN, -(1 << 32), 1 << 32, (1 << 32) + 1, i64::MAX] {
            let err = raw_quiz(vec![raw_question("a", 4, correct)])
                .validate()
                .unwrap_err();
            assert!(matches!(err, ExamError::Validation(_)), "index {}", correct);
        }
    }

    #[test]
    fn test_validate_rejects_structural_problems() {
        assert!(raw_quiz(vec![]).validate().is_err());
        assert!(raw_quiz(vec![raw_question("a", 1, 0)]).validate().is_err());

        let mut no_time = raw_quiz(vec![raw_question("a", 4, 0)]);
        no_time.time_limit_seconds = 0;
        assert!(no_time.validate().is_err());
    }

    #[test]
    fn test_validate_repairs_ids_and_sections() {
        let mut raw = raw_quiz(vec![
            raw_question("", 2, 0),
            raw_question("x", 2, 1),
            raw_question("x", 2, 1),
        ]);
        raw.sections = vec!["  ".to_string()];
        let quiz = raw.validate().unwrap();

        let ids: Vec<&str> = quiz.questions().iter().map(|q| q.id()).collect();
        assert_eq!(ids, vec!["q1", "x", "q3"]);
        assert_eq!(quiz.sections(), &["General".to_string()]);
    }

    #[test]
    fn test_lookup_by_id() {
        let quiz = raw_quiz(vec![raw_question("a", 4, 0), raw_question("b", 4, 1)])
            .validate()
            .unwrap();
        assert_eq!(quiz.question_by_id("b").unwrap().correct_index(), 1);
        assert_eq!(quiz.index_of("b").unwrap(), 1);
        assert_eq!(
            quiz.question_by_id("zz").unwrap_err(),
            ExamError::NotFound("zz".to_string())
        );
    }

    #[test]
    fn test_undeclared_section_is_unlabeled() {
        let mut declared = raw_question("a", 2, 0);
        declared.section = Some("Reasoning".to_string());
        let mut undeclared = raw_question("b", 2, 0);
        undeclared.section = Some("History".to_string());
        let quiz = raw_quiz(vec![declared, undeclared, raw_question("c", 2, 0)])
            .validate()
            .unwrap();

        assert_eq!(quiz.section_label(quiz.question(0).unwrap()), "Reasoning");
        assert_eq!(quiz.section_label(quiz.question(1).unwrap()), UNLABELED_SECTION);
        assert_eq!(quiz.section_label(quiz.question(2).unwrap()), UNLABELED_SECTION);
    }

    #[test]
    fn test_raw_quiz_reads_camel_case_json() {
        let json = r#"{
            "title": "Bank PO Prelims",
            "description": "Full mock",
            "timeLimitSeconds": 90,
            "sections": ["Quantitative Aptitude"],
            "questions": [{
                "id": "1",
                "question": "2 + 2 = ?",
                "context": "Directions: answer the following.",
                "section": "Quantitative Aptitude",
                "options": ["3", "4", "5", "6"],
                "correctAnswerIndex": 1,
                "explanation": "Basic addition."
            }]
        }"#;
        let quiz = serde_json::from_str::<RawQuiz>(json).unwrap().validate().unwrap();
        let q = quiz.question(0).unwrap();
        assert_eq!(q.context(), Some("Directions: answer the following."));
        assert_eq!(q.explanation(), "Basic addition.");
        assert!(q.is_correct(Some(1)));
        assert!(!q.is_correct(None));
    }

    #[test]
    fn test_with_time_limit_rejects_zero() {
        let quiz = raw_quiz(vec![raw_question("a", 2, 0)]).validate().unwrap();
        assert_eq!(quiz.with_time_limit(600).unwrap().time_limit_seconds(), 600);
        assert!(quiz.with_time_limit(0).is_err());
    }
}
