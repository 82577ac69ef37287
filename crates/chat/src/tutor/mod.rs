//! English word tutor.
//!
//! A lesson explains a word, quizzes the student with ten questions built
//! from that explanation and finishes with feedback on a sentence the
//! student writes.

mod answer;
mod bank;
mod quiz;

pub use answer::{alternatives, check_answer, normalize_answer};
pub use bank::{coerce_choice_answer, Question, QuestionBank, QuestionKind, QUIZ_LENGTH};
pub use quiz::{Feedback, Quiz};

use aipa_core::{AppError, AppResult};
use aipa_llm::{LlmClient, LlmRequest};
use aipa_prompt::{build_tutor_prompt, templates};
use std::path::PathBuf;
use std::sync::Arc;

/// Runs the tutor prompts against a provider.
pub struct Tutor {
    client: Arc<dyn LlmClient>,
    model: String,
    workspace: PathBuf,
}

/// A word explanation and its quiz.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub word: String,
    pub explanation: String,
    pub quiz: Quiz,
}

fn require_text<'a>(value: &'a str, what: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Tutor(format!("Please enter {}.", what)));
    }
    Ok(trimmed)
}

impl Tutor {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            workspace: PathBuf::from("."),
        }
    }

    /// Workspace searched for prompt overrides.
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    async fn run(&self, prompt_id: &str, variables: &[(&str, &str)]) -> AppResult<String> {
        let built = build_tutor_prompt(&self.workspace, prompt_id, variables)?;
        let request = LlmRequest::prompt(built.system.as_deref(), built.user, self.model.clone());

        tracing::debug!("Running tutor prompt {}", prompt_id);
        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }

    /// Child-friendly explanation of `word`.
    pub async fn explain_word(&self, word: &str) -> AppResult<String> {
        let word = require_text(word, "a word")?;
        self.run(templates::TUTOR_EXPLAIN_WORD, &[("word", word)]).await
    }

    /// Ask the model for a question bank grounded in `explanation`.
    pub async fn build_bank(&self, word: &str, explanation: &str) -> AppResult<QuestionBank> {
        let word = require_text(word, "a word")?;
        let count = QUIZ_LENGTH.to_string();
        let raw = self
            .run(
                templates::TUTOR_QUESTION_BANK,
                &[
                    ("word", word),
                    ("explanation", explanation),
                    ("count", count.as_str()),
                ],
            )
            .await?;

        QuestionBank::from_llm_json(word, &raw)
    }

    /// Explain `word` and prepare its quiz.
    pub async fn start_lesson(&self, word: &str) -> AppResult<Lesson> {
        let word = require_text(word, "a word")?;
        let explanation = self.explain_word(word).await?;
        let bank = self.build_bank(word, &explanation).await?;

        tracing::info!("Lesson ready for '{}'", word);
        Ok(Lesson {
            word: word.to_string(),
            explanation,
            quiz: Quiz::new(bank),
        })
    }

    /// Feedback on a sentence using `word`.
    pub async fn review_sentence(&self, word: &str, sentence: &str) -> AppResult<String> {
        let word = require_text(word, "a word")?;
        let sentence = require_text(sentence, "a sentence before submitting")?;
        self.run(
            templates::TUTOR_SENTENCE_REVIEW,
            &[("word", word), ("sentence", sentence)],
        )
        .await
    }

    /// Step-by-step feedback on a paragraph.
    pub async fn review_writing(&self, text: &str) -> AppResult<String> {
        let text = require_text(text, "a sentence or paragraph")?;
        self.run(templates::TUTOR_WRITING_REVIEW, &[("text", text)])
            .await
    }
}
