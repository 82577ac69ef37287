//! Review command handler.
//!
//! Sends a piece of English writing to the tutor for feedback.

use super::{client_for, read_stdin};
use crate::output::render_for_terminal;
use aipa_chat::Tutor;
use aipa_core::{config::AppConfig, AppResult};
use clap::Args;

/// Get feedback on English writing
#[derive(Args, Debug)]
pub struct ReviewCommand {
    /// Sentence or paragraph to review (reads stdin when omitted)
    pub text: Option<String>,
}

impl ReviewCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing review command");

        let text = match self.text {
            Some(ref text) => text.clone(),
            None => read_stdin()?,
        };

        let tutor = Tutor::new(client_for(config)?, config.model.clone())
            .with_workspace(&config.workspace);
        let review = tutor.review_writing(&text).await?;

        print!("{}", render_for_terminal(&review, !config.no_color));
        Ok(())
    }
}
