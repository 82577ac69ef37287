//! Chat command handler.
//!
//! Interactive conversation loop with slash commands.

use super::{client_for, prompt_line};
use crate::output::render_for_terminal;
use aipa_chat::{Assistant, ChatSession};
use aipa_core::{config::AppConfig, AppResult};
use aipa_prompt::ChatMode;
use aipa_retrieval::Document;
use clap::Args;
use std::path::{Path, PathBuf};

const HELP: &str = "Commands:
  /clear               wipe the conversation and memory
  /memory on|off       toggle conversation memory
  /mode chatty|coder|pro
  /context TEXT        set free-text context (empty to remove)
  /document FILE       attach a PDF or text document
  /detach              drop the attached document
  /quit                leave";

/// Interactive conversation
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// PDF or text document to ground answers in
    #[arg(short, long)]
    pub document: Option<PathBuf>,

    /// Answer style (chatty, coder, pro)
    #[arg(long)]
    pub mode: Option<ChatMode>,

    /// Start with conversation memory enabled
    #[arg(long)]
    pub memory: bool,
}

enum Step {
    Continue,
    Quit,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut session = ChatSession::from_settings(&config.chat)?;
        if let Some(mode) = self.mode {
            session.mode = mode;
        }
        session.memory_enabled |= self.memory;

        if let Some(ref path) = self.document {
            attach(&mut session, path, config.chat.chunk_words)?;
        }

        let assistant = Assistant::new(client_for(config)?, config.model.clone())
            .with_workspace(&config.workspace)
            .with_top_k(config.chat.top_k);

        println!(
            "AIPA chat ({} / {}, mode {}). Type /help for commands.",
            assistant.provider_name(),
            config.model,
            session.mode
        );

        let mut context: Option<String> = None;

        while let Some(line) = prompt_line("> ")? {
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                match self.command(input, &mut session, &mut context, config) {
                    Ok(Step::Quit) => break,
                    Ok(Step::Continue) => {}
                    Err(e) => eprintln!("{}", e),
                }
                continue;
            }

            match assistant.ask(&mut session, input, context.as_deref()).await {
                Ok(answer) => print!("{}", render_for_terminal(&answer.content, !config.no_color)),
                // The conversation survives provider failures
                Err(e) => eprintln!("{}", e),
            }
        }

        tracing::debug!("Chat ended after {} log entries", session.log().len());
        Ok(())
    }

    fn command(
        &self,
        input: &str,
        session: &mut ChatSession,
        context: &mut Option<String>,
        config: &AppConfig,
    ) -> AppResult<Step> {
        let (name, arg) = match input.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (input, ""),
        };

        match name {
            "/quit" | "/exit" => return Ok(Step::Quit),
            "/help" => println!("{}", HELP),
            "/clear" => {
                session.clear();
                println!("Chat history and memory cleared!");
            }
            "/memory" => {
                match arg {
                    "on" => session.memory_enabled = true,
                    "off" => session.memory_enabled = false,
                    _ => {}
                }
                println!(
                    "Memory is {} ({} messages kept)",
                    if session.memory_enabled { "on" } else { "off" },
                    session.memory().len()
                );
            }
            "/mode" => {
                if !arg.is_empty() {
                    session.mode = arg.parse()?;
                }
                println!("Mode: {}", session.mode);
            }
            "/context" => {
                *context = (!arg.is_empty()).then(|| arg.to_string());
                println!(
                    "{}",
                    if context.is_some() { "Context set." } else { "Context removed." }
                );
            }
            "/document" => attach(session, Path::new(arg), config.chat.chunk_words)?,
            "/detach" => match session.detach_document() {
                Some(document) => println!("Detached {}", document.name),
                None => println!("No document attached."),
            },
            other => println!("Unknown command: {}. Type /help for commands.", other),
        }

        Ok(Step::Continue)
    }
}

fn attach(session: &mut ChatSession, path: &Path, chunk_words: usize) -> AppResult<()> {
    let document = Document::load(path)?;
    let chunks = session.attach_document(&document.name, &document.text, chunk_words)?;
    println!("Document {} processed successfully ({} chunks).", document.name, chunks);
    Ok(())
}
