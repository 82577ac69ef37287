//! LLM integration crate for AIPA.
//!
//! This crate provides a provider-agnostic abstraction for chat-completion
//! backends. Every provider takes a full message transcript so that system
//! prompts and conversation memory travel with each request.
//!
//! # Providers
//! - **OpenAI**: hosted chat completions (default)
//! - **DeepSeek**: OpenAI-compatible API at `https://api.deepseek.com`
//! - **Ollama**: local LLM runtime
//! - **Mock**: scripted replies for tests
//!
//! # Example
//! ```no_run
//! use aipa_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::prompt(None, "Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage, Role,
};
pub use factory::create_client;
pub use providers::{MockLlmClient, OllamaClient, OpenAiClient};
pub use types::ProviderType;
