//! Prompt system for AIPA.
//!
//! This crate provides:
//! - Answer modes with their system prompts
//! - Built-in Handlebars templates for chat and tutoring
//! - YAML overrides from the workspace's `.aipa/prompts/`

pub mod builder;
pub mod loader;
pub mod templates;
pub mod types;

pub use builder::{build_chat_prompt, build_prompt, build_tutor_prompt};
pub use loader::{list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, ChatMode, PromptContext, PromptDefinition};
