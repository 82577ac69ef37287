//! Question bank parsing and repair.

use super::answer::{choice_letter, match_choice};
use aipa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Questions per quiz.
pub const QUIZ_LENGTH: usize = 10;

/// Kind of quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    FillBlank,
    ShortAnswer,
}

impl QuestionKind {
    /// Map a model-supplied type name; anything unrecognized is short answer.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "multiple_choice" => Self::MultipleChoice,
            "fill_blank" | "fill-in-the-blank" | "fill in the blank" | "fill_in_the_blank" => {
                Self::FillBlank
            }
            _ => Self::ShortAnswer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::FillBlank => "fill_blank",
            Self::ShortAnswer => "short_answer",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    pub answer: String,
}

impl Question {
    /// Whether the question is answered by picking a choice.
    pub fn has_choices(&self) -> bool {
        self.kind == QuestionKind::MultipleChoice && !self.choices.is_empty()
    }

    /// Turn a typed response into the text that gets checked.
    ///
    /// For choice questions a letter or a 1-based number selects a choice;
    /// anything else is checked as typed.
    pub fn resolve_response<'a>(&'a self, response: &'a str) -> &'a str {
        if !self.has_choices() {
            return response;
        }

        if let Ok(n) = response.trim().parse::<usize>() {
            if (1..=self.choices.len()).contains(&n) {
                return &self.choices[n - 1];
            }
        }

        match_choice(&self.choices, response).unwrap_or(response)
    }

    /// Choices labelled "a) ...", "b) ...".
    pub fn labelled_choices(&self) -> Vec<String> {
        self.choices
            .iter()
            .enumerate()
            .map(|(i, choice)| match choice_letter(i) {
                Some(letter) => format!("{}) {}", letter, choice),
                None => choice.clone(),
            })
            .collect()
    }
}

/// Exactly [`QUIZ_LENGTH`] questions about one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub word: String,
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    question: Option<Value>,
    #[serde(default)]
    choices: Option<Value>,
    #[serde(default)]
    answer: Option<Value>,
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Map a model answer onto the exact text of one of `choices`.
///
/// Integers are tried as a 0-based then 1-based index; strings as a letter
/// or as normalized choice text. Falls back to the first choice.
pub fn coerce_choice_answer(choices: &[String], answer: &Value) -> String {
    if let Some(n) = answer.as_u64().and_then(|n| usize::try_from(n).ok()) {
        if n < choices.len() {
            return choices[n].clone();
        }
        if (1..=choices.len()).contains(&n) {
            return choices[n - 1].clone();
        }
    }

    let text = value_text(Some(answer));
    match match_choice(choices, &text) {
        Some(choice) => choice.to_string(),
        None => choices.first().cloned().unwrap_or(text),
    }
}

impl QuestionBank {
    /// Parse a bank from the model's reply and repair it to exactly
    /// [`QUIZ_LENGTH`] questions.
    ///
    /// # Errors
    /// Returns `AppError::Tutor` if the reply is not a JSON array.
    pub fn from_llm_json(word: &str, raw: &str) -> AppResult<Self> {
        let body = strip_code_fence(raw);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AppError::Tutor(format!("Question bank is not valid JSON: {}", e)))?;

        let Value::Array(items) = value else {
            return Err(AppError::Tutor(
                "Question bank must be a JSON array".to_string(),
            ));
        };

        let mut questions = Vec::with_capacity(QUIZ_LENGTH);
        for item in items.into_iter().take(QUIZ_LENGTH) {
            let raw_question: RawQuestion = match serde_json::from_value(item) {
                Ok(q) => q,
                Err(e) => {
                    tracing::debug!("Skipping malformed question: {}", e);
                    continue;
                }
            };

            if let Some(question) = Self::clean(raw_question) {
                questions.push(question);
            }
        }

        let parsed = questions.len();
        while questions.len() < QUIZ_LENGTH {
            questions.push(fallback_question(word, questions.len() + 1));
        }
        if parsed < QUIZ_LENGTH {
            tracing::warn!(
                "Question bank for '{}' had {} usable questions; topped up to {}",
                word,
                parsed,
                QUIZ_LENGTH
            );
        }

        Ok(Self {
            word: word.to_string(),
            questions,
        })
    }

    fn clean(raw: RawQuestion) -> Option<Question> {
        let kind = raw
            .kind
            .as_ref()
            .map_or(QuestionKind::ShortAnswer, |k| {
                QuestionKind::from_label(&value_text(Some(k)))
            });

        let question = value_text(raw.question.as_ref());
        if question.is_empty() {
            return None;
        }

        let choices: Vec<String> = match raw.choices {
            Some(Value::Array(items)) => items
                .iter()
                .map(|c| value_text(Some(c)))
                .collect(),
            _ => Vec::new(),
        };

        let answer_value = raw.answer.unwrap_or(Value::Null);
        let answer = if kind == QuestionKind::MultipleChoice && !choices.is_empty() {
            coerce_choice_answer(&choices, &answer_value)
        } else {
            value_text(Some(&answer_value))
        };

        Some(Question {
            kind,
            question,
            choices,
            answer,
        })
    }

    /// Bank made only of fallback questions.
    pub fn fallback(word: &str) -> Self {
        Self {
            word: word.to_string(),
            questions: (1..=QUIZ_LENGTH)
                .map(|position| fallback_question(word, position))
                .collect(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Stand-in question for 1-based `position` when the model gave too few.
fn fallback_question(word: &str, position: usize) -> Question {
    match position {
        0..=3 => {
            let answer = format!("It relates to '{}'", word);
            Question {
                kind: QuestionKind::MultipleChoice,
                question: format!("What does '{}' relate to in the explanation?", word),
                choices: vec![answer.clone(), "A color".to_string(), "A number".to_string()],
                answer,
            }
        }
        4..=6 => Question {
            kind: QuestionKind::FillBlank,
            question: "Fill in the blank: This word is about ____ (based on the explanation)."
                .to_string(),
            choices: Vec::new(),
            answer: word.to_string(),
        },
        _ => Question {
            kind: QuestionKind::ShortAnswer,
            question: format!(
                "In one or two words, what does '{}' mean (from the explanation)?",
                word
            ),
            choices: Vec::new(),
            answer: word.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_synonyms() {
        assert_eq!(QuestionKind::from_label("Fill-in-the-blank"), QuestionKind::FillBlank);
        assert_eq!(QuestionKind::from_label("fill in the blank"), QuestionKind::FillBlank);
        assert_eq!(QuestionKind::from_label("multiple_choice"), QuestionKind::MultipleChoice);
        assert_eq!(QuestionKind::from_label("true_false"), QuestionKind::ShortAnswer);
    }

    #[test]
    fn test_full_bank_parsed() {
        let items: Vec<Value> = (1..=12)
            .map(|i| json!({"id": i, "type": "short_answer", "question": format!("Q{}", i), "answer": "x"}))
            .collect();
        let raw = serde_json::to_string(&items).unwrap();

        let bank = QuestionBank::from_llm_json("apple", &raw).unwrap();
        assert_eq!(bank.len(), QUIZ_LENGTH);
        assert_eq!(bank.questions()[9].question, "Q10");
    }

    #[test]
    fn test_fenced_json_accepted() {
        let raw = "```json\n[{\"type\": \"fill_blank\", \"question\": \"An ___ a day\", \"answer\": \"apple\"}]\n```";
        let bank = QuestionBank::from_llm_json("apple", raw).unwrap();
        assert_eq!(bank.questions()[0].kind, QuestionKind::FillBlank);
        assert_eq!(bank.questions()[0].answer, "apple");
    }

    #[test]
    fn test_non_json_rejected() {
        assert!(matches!(
            QuestionBank::from_llm_json("apple", "Sorry, I can't."),
            Err(AppError::Tutor(_))
        ));
        assert!(QuestionBank::from_llm_json("apple", "{\"question\": \"x\"}").is_err());
    }

    #[test]
    fn test_choice_answer_coercion() {
        let choices = vec!["red".to_string(), "green".to_string(), "blue".to_string()];
        assert_eq!(coerce_choice_answer(&choices, &json!(0)), "red");
        assert_eq!(coerce_choice_answer(&choices, &json!(3)), "blue");
        assert_eq!(coerce_choice_answer(&choices, &json!("C")), "blue");
        assert_eq!(coerce_choice_answer(&choices, &json!("Green.")), "green");
        assert_eq!(coerce_choice_answer(&choices, &json!("purple")), "red");
    }

    #[test]
    fn test_items_without_question_dropped_and_topped_up() {
        let raw = json!([
            {"type": "multiple_choice", "question": "Color?", "choices": ["red", "blue"], "answer": "b"},
            {"type": "short_answer", "question": "   ", "answer": "x"},
            "not an object",
            {"type": "short_answer", "question": "Plural?", "answer": 2}
        ])
        .to_string();

        let bank = QuestionBank::from_llm_json("cat", &raw).unwrap();
        assert_eq!(bank.len(), QUIZ_LENGTH);

        let questions = bank.questions();
        assert_eq!(questions[0].answer, "blue");
        assert_eq!(questions[1].question, "Plural?");
        assert_eq!(questions[1].answer, "2");

        // positions 3..=10 are fallbacks keyed by their 1-based position
        assert_eq!(questions[2].kind, QuestionKind::MultipleChoice);
        assert_eq!(questions[2].answer, "It relates to 'cat'");
        assert_eq!(questions[3].kind, QuestionKind::FillBlank);
        assert_eq!(questions[5].kind, QuestionKind::FillBlank);
        assert_eq!(questions[6].kind, QuestionKind::ShortAnswer);
        assert_eq!(questions[9].answer, "cat");
    }

    #[test]
    fn test_resolve_response() {
        let bank = QuestionBank::fallback("sun");
        let mc = &bank.questions()[0];
        assert_eq!(mc.resolve_response("a"), "It relates to 'sun'");
        assert_eq!(mc.resolve_response("3"), "A number");
        assert_eq!(mc.resolve_response("a color"), "A color");
        assert_eq!(mc.resolve_response("moon"), "moon");

        let blank = &bank.questions()[4];
        assert_eq!(blank.resolve_response("b"), "b");
        assert_eq!(mc.labelled_choices()[1], "b) A color");
    }
}
