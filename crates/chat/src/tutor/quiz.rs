//! Quiz progression over a question bank.

use super::answer::{alternatives, check_answer};
use super::bank::{coerce_choice_answer, Question, QuestionBank, QUIZ_LENGTH};
use aipa_core::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Outcome of one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    Incorrect { expected: String },
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct => write!(f, "✅ Correct!"),
            Self::Incorrect { expected } => {
                write!(f, "❌ Incorrect! The correct answer was: {}", expected)
            }
        }
    }
}

/// A quiz in progress.
///
/// The index runs from 0 to [`QUIZ_LENGTH`]; the quiz is finished once it
/// reaches [`QUIZ_LENGTH`], either by stepping past the last question or by
/// ending early. Answers may be resubmitted; the latest one counts.
#[derive(Debug, Clone)]
pub struct Quiz {
    bank: QuestionBank,
    index: usize,
    results: Vec<Option<bool>>,
}

impl Quiz {
    pub fn new(bank: QuestionBank) -> Self {
        let results = vec![None; bank.len()];
        Self {
            bank,
            index: 0,
            results,
        }
    }

    pub fn word(&self) -> &str {
        &self.bank.word
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Current question, `None` once finished.
    pub fn current(&self) -> Option<&Question> {
        if self.is_finished() {
            None
        } else {
            self.bank.get(self.index)
        }
    }

    /// Questions left after the current one.
    pub fn remaining(&self) -> usize {
        QUIZ_LENGTH.saturating_sub(self.index + 1)
    }

    /// Check `response` against the current question.
    ///
    /// # Errors
    /// Returns `AppError::Tutor` for a blank response or a finished quiz.
    pub fn submit(&mut self, response: &str) -> AppResult<Feedback> {
        let question = self
            .current()
            .ok_or_else(|| AppError::Tutor("The quiz is already finished".to_string()))?;

        if response.trim().is_empty() {
            return Err(AppError::Tutor(
                "Please enter or select an answer before submitting.".to_string(),
            ));
        }

        let expected = if question.has_choices() {
            coerce_choice_answer(&question.choices, &Value::String(question.answer.clone()))
        } else {
            question.answer.clone()
        };

        let given = question.resolve_response(response);
        let feedback = if check_answer(given, &expected) {
            Feedback::Correct
        } else {
            Feedback::Incorrect {
                expected: alternatives(&expected)[0].to_string(),
            }
        };

        tracing::debug!(
            "Question {} answered: {}",
            self.index + 1,
            feedback.is_correct()
        );
        if let Some(slot) = self.results.get_mut(self.index) {
            *slot = Some(feedback.is_correct());
        }

        Ok(feedback)
    }

    /// Move to the next question.
    pub fn next(&mut self) {
        self.index = self.index.min(QUIZ_LENGTH - 1) + 1;
    }

    /// Finish the quiz early.
    pub fn end(&mut self) {
        self.index = QUIZ_LENGTH;
    }

    pub fn is_finished(&self) -> bool {
        self.index >= QUIZ_LENGTH
    }

    /// (correct, answered) counts.
    pub fn score(&self) -> (usize, usize) {
        let answered = self.results.iter().flatten().count();
        let correct = self.results.iter().flatten().filter(|ok| **ok).count();
        (correct, answered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_through_quiz() {
        let mut quiz = Quiz::new(QuestionBank::fallback("tree"));
        assert_eq!(quiz.remaining(), 9);

        assert_eq!(quiz.submit("a").unwrap(), Feedback::Correct);
        quiz.next();
        assert_eq!(
            quiz.submit("b").unwrap(),
            Feedback::Incorrect {
                expected: "It relates to 'tree'".to_string()
            }
        );

        for _ in 0..20 {
            quiz.next();
        }
        assert!(quiz.is_finished());
        assert_eq!(quiz.index(), QUIZ_LENGTH);
        assert!(quiz.current().is_none());
        assert_eq!(quiz.score(), (1, 2));
    }

    #[test]
    fn test_blank_response_rejected() {
        let mut quiz = Quiz::new(QuestionBank::fallback("tree"));
        assert!(matches!(quiz.submit("   "), Err(AppError::Tutor(_))));
        assert_eq!(quiz.score(), (0, 0));
    }

    #[test]
    fn test_end_early() {
        let mut quiz = Quiz::new(QuestionBank::fallback("tree"));
        quiz.next();
        quiz.end();
        assert!(quiz.is_finished());
        assert!(quiz.submit("tree").is_err());
        assert_eq!(quiz.remaining(), 0);
    }

    #[test]
    fn test_alternatives_in_feedback() {
        let raw = r#"[{"type": "short_answer", "question": "Past of run?", "answer": "ran | has run"}]"#;
        let mut quiz = Quiz::new(QuestionBank::from_llm_json("run", raw).unwrap());

        assert!(quiz.submit("Has run").unwrap().is_correct());
        let feedback = quiz.submit("runned").unwrap();
        assert_eq!(
            feedback.to_string(),
            "❌ Incorrect! The correct answer was: ran"
        );
        assert_eq!(quiz.score(), (0, 1));
    }
}
