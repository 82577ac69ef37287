//! Prompt builder for rendering templates and injecting context.

use crate::loader::load_prompt;
use crate::templates::{CHAT_DOCUMENT_CONTEXT, CHAT_QUESTION, CHAT_TEXT_CONTEXT};
use crate::types::{BuiltPrompt, ChatMode, PromptContext, PromptDefinition};
use aipa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;
use std::path::Path;

/// Separator placed between retrieved document chunks.
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Build a prompt from a definition and input variables.
///
/// # Example
/// ```
/// use aipa_prompt::{build_prompt, templates};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = templates::builtin(templates::CHAT_QUESTION).unwrap();
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is Rust?".to_string());
///
/// let built = build_prompt(&def, vars, None)?;
/// assert!(built.user.contains("'''What is Rust?'''"));
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
    system: Option<&str>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        system.map(str::to_string),
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Build the prompt for a chat question in the given mode.
///
/// Blank text context and an empty chunk list fall back to the bare
/// question template.
pub fn build_chat_prompt(
    workspace_path: &Path,
    mode: ChatMode,
    question: &str,
    context: PromptContext<'_>,
) -> AppResult<BuiltPrompt> {
    let mut variables = HashMap::new();
    variables.insert("question".to_string(), question.to_string());

    let prompt_id = match context {
        PromptContext::Text(text) if !text.trim().is_empty() => {
            variables.insert("context".to_string(), text.to_string());
            CHAT_TEXT_CONTEXT
        }
        PromptContext::Document(chunks) if !chunks.is_empty() => {
            variables.insert("context".to_string(), chunks.join(CHUNK_SEPARATOR));
            CHAT_DOCUMENT_CONTEXT
        }
        _ => CHAT_QUESTION,
    };

    let definition = load_prompt(workspace_path, prompt_id)?;
    build_prompt(&definition, variables, mode.system_prompt())
}

/// Build one of the tutor prompts; tutor prompts carry no system message.
pub fn build_tutor_prompt(
    workspace_path: &Path,
    prompt_id: &str,
    variables: &[(&str, &str)],
) -> AppResult<BuiltPrompt> {
    let definition = load_prompt(workspace_path, prompt_id)?;
    let variables = variables
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    build_prompt(&definition, variables, None)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{TUTOR_QUESTION_BANK, TUTOR_SENTENCE_REVIEW};
    use tempfile::TempDir;

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("prompt".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{prompt}}", &vars);
        assert_eq!(result.unwrap(), "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut vars = HashMap::new();
        vars.insert("q".to_string(), "<b> & \"x\"".to_string());
        assert_eq!(render_template("{{q}}", &vars).unwrap(), "<b> & \"x\"");
    }

    #[test]
    fn test_render_template_missing_variable() {
        let vars = HashMap::new();
        assert_eq!(render_template("Question: {{missing}}", &vars).unwrap(), "Question: ");
    }

    #[test]
    fn test_question_only() {
        let temp_dir = TempDir::new().unwrap();
        let built = build_chat_prompt(
            temp_dir.path(),
            ChatMode::Chatty,
            "Why?",
            PromptContext::None,
        )
        .unwrap();

        assert_eq!(built.user, "Answer the following question.\n\n'''Why?'''");
        assert!(built.system.is_none());
        assert_eq!(built.metadata.source_prompt_id, CHAT_QUESTION);
    }

    #[test]
    fn test_text_context() {
        let temp_dir = TempDir::new().unwrap();
        let built = build_chat_prompt(
            temp_dir.path(),
            ChatMode::Pro,
            "Who wins?",
            PromptContext::Text("The hare naps."),
        )
        .unwrap();

        assert_eq!(
            built.user,
            "Answer the following question using the provided context.\n\n\
             Question:\n'''Who wins?'''\n\nContext:\n'''The hare naps.'''"
        );
        assert_eq!(built.system.as_deref(), ChatMode::Pro.system_prompt());
    }

    #[test]
    fn test_blank_text_context_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let built = build_chat_prompt(
            temp_dir.path(),
            ChatMode::Pro,
            "Who wins?",
            PromptContext::Text("  \n"),
        )
        .unwrap();
        assert_eq!(built.metadata.source_prompt_id, CHAT_QUESTION);
    }

    #[test]
    fn test_document_context_joins_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let chunks = ["first chunk", "second chunk"];
        let built = build_chat_prompt(
            temp_dir.path(),
            ChatMode::Coder,
            "Summarize",
            PromptContext::Document(&chunks),
        )
        .unwrap();

        assert!(built.user.starts_with("Answer the following question using the provided PDF context."));
        assert!(built.user.ends_with("'''first chunk\n\nsecond chunk'''"));
        assert_eq!(built.metadata.source_prompt_id, CHAT_DOCUMENT_CONTEXT);
    }

    #[test]
    fn test_tutor_prompt_variables() {
        let temp_dir = TempDir::new().unwrap();
        let built = build_tutor_prompt(
            temp_dir.path(),
            TUTOR_QUESTION_BANK,
            &[("word", "apple"), ("explanation", "A fruit."), ("count", "10")],
        )
        .unwrap();

        assert!(built.system.is_none());
        assert!(built.user.contains("Create exactly 10 questions"));
        assert!(built.user.contains("word \"apple\""));
        assert!(built.user.contains("\"id\": 1,"));

        let review = build_tutor_prompt(
            temp_dir.path(),
            TUTOR_SENTENCE_REVIEW,
            &[("word", "apple"), ("sentence", "I eat apple.")],
        )
        .unwrap();
        assert!(review.user.contains("\"I eat apple.\""));
    }
}
