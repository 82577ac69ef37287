//! Command handlers for the AIPA CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod learn;
pub mod prompts;
pub mod render;
pub mod retrieve;
pub mod review;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use learn::LearnCommand;
pub use prompts::PromptsCommand;
pub use render::RenderCommand;
pub use retrieve::RetrieveCommand;
pub use review::ReviewCommand;

use aipa_core::{config::AppConfig, AppError, AppResult};
use aipa_llm::{create_client, LlmClient};
use std::io::{BufRead, Read, Write};
use std::sync::Arc;

/// Build the client for the configured provider.
pub(crate) fn client_for(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = config.provider_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
}

/// Read all of stdin.
pub(crate) fn read_stdin() -> AppResult<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// Print `prompt` and read one line from stdin; `None` at end of input.
pub(crate) fn prompt_line(prompt: &str) -> AppResult<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
