use crate::error::ExamError;
use crate::model::Quiz;
use crate::responses::{ResponseStore, Status};

/// Active-question pointer and the status rules tied to moving it.
///
/// The index always lies in `[0, question_count)`. Selection state is never
/// touched by navigation; only the explicit save/mark actions change status.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: usize,
    count: usize,
}

impl Navigator {
    pub fn new(quiz: &Quiz) -> Self {
        Self {
            current: 0,
            count: quiz.question_count(),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn question_count(&self) -> usize {
        self.count
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.count
    }

    pub fn current_id<'a>(&self, quiz: &'a Quiz) -> Result<&'a str, ExamError> {
        quiz.question(self.current)
            .map(|q| q.id())
            .ok_or_else(|| ExamError::NotFound(format!("question #{}", self.current + 1)))
    }

    /// Make `index` the active question. A first visit turns `not-visited`
    /// into `not-answered`; any other status is kept as is.
    pub fn visit(
        &mut self,
        quiz: &Quiz,
        store: &mut ResponseStore,
        index: usize,
    ) -> Result<(), ExamError> {
        if index >= self.count {
            return Err(ExamError::InvalidArgument(format!(
                "question index {} is out of range (0..{})",
                index, self.count
            )));
        }
        self.current = index;
        let id = self.current_id(quiz)?;
        if store.get(id)?.status == Status::NotVisited {
            store.set_status(id, Status::NotAnswered)?;
        }
        Ok(())
    }

    pub fn select(
        &self,
        quiz: &Quiz,
        store: &mut ResponseStore,
        option_index: usize,
    ) -> Result<(), ExamError> {
        store.select(self.current_id(quiz)?, option_index)
    }

    pub fn clear(&self, quiz: &Quiz, store: &mut ResponseStore) -> Result<(), ExamError> {
        store.clear(self.current_id(quiz)?)
    }

    /// `answered` if something is selected, otherwise `not-answered`, then
    /// advance. Returns `false` on the last question, where it does not wrap.
    pub fn save_and_next(
        &mut self,
        quiz: &Quiz,
        store: &mut ResponseStore,
    ) -> Result<bool, ExamError> {
        let id = self.current_id(quiz)?;
        let status = if store.get(id)?.selected.is_some() {
            Status::Answered
        } else {
            Status::NotAnswered
        };
        store.set_status(id, status)?;
        self.advance(quiz, store)
    }

    /// `marked` regardless of selection, then advance as in `save_and_next`.
    pub fn mark_and_next(
        &mut self,
        quiz: &Quiz,
        store: &mut ResponseStore,
    ) -> Result<bool, ExamError> {
        let id = self.current_id(quiz)?;
        store.set_status(id, Status::Marked)?;
        self.advance(quiz, store)
    }

    fn advance(&mut self, quiz: &Quiz, store: &mut ResponseStore) -> Result<bool, ExamError> {
        if self.is_last() {
            return Ok(false);
        }
        self.visit(quiz, store, self.current + 1)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn setup() -> (Quiz, ResponseStore, Navigator) {
        let options = || vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let quiz = Quiz::new(
            "Nav",
            "",
            vec![],
            60,
            vec![
                Question::new("1", "One", options(), 0),
                Question::new("2", "Two", options(), 1),
                Question::new("3", "Three", options(), 2),
            ],
        )
        .unwrap();
        let store = ResponseStore::initialize(&quiz);
        let nav = Navigator::new(&quiz);
        (quiz, store, nav)
    }

    fn status(store: &ResponseStore, id: &str) -> Status {
        store.get(id).unwrap().status
    }

    #[test]
    fn test_visit_marks_not_answered_once() {
        let (quiz, mut store, mut nav) = setup();
        nav.visit(&quiz, &mut store, 0).unwrap();
        assert_eq!(status(&store, "1"), Status::NotAnswered);
        assert_eq!(status(&store, "2"), Status::NotVisited);
    }

    #[test]
    fn test_revisit_does_not_downgrade() {
        let (quiz, mut store, mut nav) = setup();
        nav.visit(&quiz, &mut store, 0).unwrap();
        nav.select(&quiz, &mut store, 0).unwrap();
        nav.save_and_next(&quiz, &mut store).unwrap();
        nav.mark_and_next(&quiz, &mut store).unwrap();

        nav.visit(&quiz, &mut store, 0).unwrap();
        nav.visit(&quiz, &mut store, 1).unwrap();
        assert_eq!(status(&store, "1"), Status::Answered);
        assert_eq!(status(&store, "2"), Status::Marked);
    }

    #[test]
    fn test_visit_out_of_range() {
        let (quiz, mut store, mut nav) = setup();
        nav.visit(&quiz, &mut store, 1).unwrap();
        assert!(matches!(
            nav.visit(&quiz, &mut store, 3).unwrap_err(),
            ExamError::InvalidArgument(_)
        ));
        assert_eq!(nav.current(), 1);
    }

    #[test]
    fn test_save_and_next_without_selection() {
        let (quiz, mut store, mut nav) = setup();
        nav.visit(&quiz, &mut store, 0).unwrap();
        assert!(nav.save_and_next(&quiz, &mut store).unwrap());
        assert_eq!(status(&store, "1"), Status::NotAnswered);
        assert_eq!(nav.current(), 1);
        assert_eq!(status(&store, "2"), Status::NotAnswered);
    }

    #[test]
    fn test_save_on_last_question_does_not_wrap() {
        let (quiz, mut store, mut nav) = setup();
        nav.visit(&quiz, &mut store, 2).unwrap();
        nav.select(&quiz, &mut store, 2).unwrap();
        assert!(!nav.save_and_next(&quiz, &mut store).unwrap());
        assert_eq!(nav.current(), 2);
        assert_eq!(status(&store, "3"), Status::Answered);
        assert!(!nav.mark_and_next(&quiz, &mut store).unwrap());
        assert_eq!(status(&store, "3"), Status::Marked);
    }

    #[test]
    fn test_jump_keeps_unsaved_selection() {
        let (quiz, mut store, mut nav) = setup();
        nav.visit(&quiz, &mut store, 0).unwrap();
        nav.select(&quiz, &mut store, 1).unwrap();
        nav.visit(&quiz, &mut store, 2).unwrap();

        let r = store.get("1").unwrap();
        assert_eq!(r.selected, Some(1));
        assert_eq!(r.status, Status::NotAnswered);
    }

    #[test]
    fn test_clear_keeps_status() {
        let (quiz, mut store, mut nav) = setup();
        nav.visit(&quiz, &mut store, 0).unwrap();
        nav.select(&quiz, &mut store, 0).unwrap();
        nav.mark_and_next(&quiz, &mut store).unwrap();
        nav.visit(&quiz, &mut store, 0).unwrap();
        nav.clear(&quiz, &mut store).unwrap();

        let r = store.get("1").unwrap();
        assert_eq!(r.selected, None);
        assert_eq!(r.status, Status::Marked);
    }
}
