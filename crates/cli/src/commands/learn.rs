//! Learn command handler.
//!
//! Runs a word lesson: explanation, quiz and a closing sentence review.

use super::{client_for, prompt_line};
use crate::output::render_for_terminal;
use aipa_chat::tutor::QUIZ_LENGTH;
use aipa_chat::{Quiz, Tutor};
use aipa_core::{config::AppConfig, AppResult};
use clap::Args;

/// Learn an English word
#[derive(Args, Debug)]
pub struct LearnCommand {
    /// The word to learn
    pub word: String,

    /// Only print the explanation
    #[arg(long)]
    pub explain_only: bool,
}

impl LearnCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing learn command");

        let tutor = Tutor::new(client_for(config)?, config.model.clone())
            .with_workspace(&config.workspace);
        let color = !config.no_color;

        if self.explain_only {
            let explanation = tutor.explain_word(&self.word).await?;
            print!("{}", render_for_terminal(&explanation, color));
            return Ok(());
        }

        let mut lesson = tutor.start_lesson(&self.word).await?;
        print!("{}", render_for_terminal(&lesson.explanation, color));
        println!();

        if !run_quiz(&mut lesson.quiz)? {
            return Ok(());
        }

        let (correct, answered) = lesson.quiz.score();
        println!(
            "🎉 You've completed all {} questions! ({} of {} answered correctly)",
            QUIZ_LENGTH, correct, answered
        );

        loop {
            let prompt = format!("Write a sentence using '{}': ", lesson.word);
            let Some(sentence) = prompt_line(&prompt)? else {
                return Ok(());
            };
            if sentence.trim().is_empty() {
                println!("Please enter a sentence before submitting.");
                continue;
            }

            let review = tutor.review_sentence(&lesson.word, &sentence).await?;
            print!("{}", render_for_terminal(&review, color));
            return Ok(());
        }
    }
}

/// Walk through the quiz; returns false if input ended early.
///
/// Each question accepts answers until the student types `next` (or an
/// empty line after answering) to move on, or `end` to stop.
fn run_quiz(quiz: &mut Quiz) -> AppResult<bool> {
    while let Some(question) = quiz.current().cloned() {
        println!("\nQuestion {} of {}: {}", quiz.index() + 1, QUIZ_LENGTH, question.question);
        for choice in question.labelled_choices() {
            println!("  {}", choice);
        }

        let mut answered = false;
        loop {
            let Some(line) = prompt_line("Your answer (or 'next' / 'end'): ")? else {
                return Ok(false);
            };

            match line.trim() {
                "next" => break,
                "end" => {
                    quiz.end();
                    return Ok(true);
                }
                "" if answered => break,
                response => match quiz.submit(response) {
                    Ok(feedback) => {
                        println!("{}", feedback);
                        answered = true;
                    }
                    Err(e) => println!("{}", e),
                },
            }
        }

        quiz.next();
        if !quiz.is_finished() {
            println!("{} questions left.", quiz.remaining() + 1);
        }
    }

    Ok(true)
}
