//! Prompt types for AIPA.
//!
//! This module defines the domain entities for the prompt system.

use aipa_core::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Answer style selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Free conversation, no system prompt
    Chatty,

    /// Programming assistant
    Coder,

    /// Concise, structured consulting answers
    #[default]
    Pro,
}

impl ChatMode {
    /// System prompt sent ahead of the conversation, if any.
    pub fn system_prompt(&self) -> Option<&'static str> {
        match self {
            Self::Chatty => None,
            Self::Coder => Some(
                "You are a skilled programmer. \
                 Write clean, well-structured, and well-commented code. \
                 Use consistent formatting, clear variable names, \
                 and explain your approach where useful.",
            ),
            Self::Pro => Some(
                "You are a professional consultant. \
                 Provide responses that are clear, concise, and well-structured. \
                 Use simple, easy-to-read language while maintaining a professional tone. \
                 If the content is lengthy, organize it into sections and use bullet points \
                 or numbered lists for better readability.",
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chatty => "chatty",
            Self::Coder => "coder",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chatty" => Ok(Self::Chatty),
            "coder" => Ok(Self::Coder),
            "pro" => Ok(Self::Pro),
            other => Err(AppError::Prompt(format!(
                "Unknown chat mode: {}. Expected chatty, coder or pro",
                other
            ))),
        }
    }
}

/// Grounding material attached to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptContext<'a> {
    #[default]
    None,

    /// Free text pasted by the user
    Text(&'a str),

    /// Chunks retrieved from an attached document, best first
    Document(&'a [&'a str]),
}

/// A prompt definition, built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Template string with Handlebars syntax
    pub template: String,
}

impl PromptDefinition {
    pub fn new(id: &str, title: &str, template: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            template: template.to_string(),
        }
    }
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(
        system: Option<String>,
        user: String,
        source_prompt_id: String,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                resolved_variables,
            },
        }
    }
}
