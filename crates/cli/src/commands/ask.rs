//! Ask command handler.
//!
//! Handles one-shot questions with optional text or document context.

use super::{client_for, print_json};
use crate::output::render_for_terminal;
use aipa_chat::{Assistant, ChatSession};
use aipa_core::{config::AppConfig, AppError, AppResult};
use aipa_prompt::ChatMode;
use aipa_retrieval::Document;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

/// Ask a question with optional context
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub prompt: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "prompt")]
    pub file: Option<PathBuf>,

    /// Free-text context the answer should use
    #[arg(long, conflicts_with = "document")]
    pub context: Option<String>,

    /// PDF or text document to ground the answer in
    #[arg(short, long)]
    pub document: Option<PathBuf>,

    /// Answer style (chatty, coder, pro)
    #[arg(long)]
    pub mode: Option<ChatMode>,

    /// Stream tokens as they arrive (implies --raw)
    #[arg(long)]
    pub stream: bool,

    /// Print the answer without segment rendering
    #[arg(long)]
    pub raw: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "stream")]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self
            .get_prompt()?
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| AppError::Config("No prompt provided".to_string()))?;

        let mut session = ChatSession::from_settings(&config.chat)?;
        if let Some(mode) = self.mode {
            session.mode = mode;
        }
        // One-shot questions never replay memory
        session.memory_enabled = false;

        if let Some(ref path) = self.document {
            let document = Document::load(path)?;
            session.attach_document(&document.name, &document.text, config.chat.chunk_words)?;
        }

        let assistant = Assistant::new(client_for(config)?, config.model.clone())
            .with_workspace(&config.workspace)
            .with_top_k(config.chat.top_k);

        if self.stream {
            let answer = assistant
                .ask_streaming(&mut session, &question, self.context.as_deref(), |token| {
                    print!("{}", token);
                    std::io::stdout().flush().ok();
                })
                .await?;
            println!();
            log_usage(answer.usage.as_ref());
            return Ok(());
        }

        let answer = assistant
            .ask(&mut session, &question, self.context.as_deref())
            .await?;

        if self.json {
            return print_json(&serde_json::json!({
                "answer": answer.content,
                "model": answer.model,
                "provider": config.provider,
                "mode": session.mode,
                "usage": answer.usage,
                "metadata": {
                    "promptId": answer.prompt_id,
                    "document": session.document().map(|d| d.name.clone()),
                    "contextChunks": answer.context_chunks,
                }
            }));
        }

        if self.raw {
            println!("{}", answer.content);
        } else {
            print!("{}", render_for_terminal(&answer.content, !config.no_color));
        }
        log_usage(answer.usage.as_ref());

        Ok(())
    }

    /// Get the question from the argument or the file.
    fn get_prompt(&self) -> AppResult<Option<String>> {
        if let Some(ref prompt) = self.prompt {
            return Ok(Some(prompt.clone()));
        }
        match self.file {
            Some(ref path) => Ok(Some(std::fs::read_to_string(path)?)),
            None => Ok(None),
        }
    }
}

fn log_usage(usage: Option<&aipa_llm::LlmUsage>) {
    if let Some(usage) = usage {
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }
}
