//! Question answering over a chat session.

use crate::session::ChatSession;
use aipa_core::AppResult;
use aipa_llm::{LlmClient, LlmRequest, LlmUsage};
use aipa_prompt::{build_chat_prompt, PromptContext};
use aipa_retrieval::DEFAULT_TOP_K;
use futures::StreamExt;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Answer returned by [`Assistant::ask`].
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub content: String,
    pub model: String,

    /// Template the question was rendered with
    #[serde(rename = "promptId")]
    pub prompt_id: String,

    /// Document chunks handed to the model, best first
    #[serde(rename = "contextChunks")]
    pub context_chunks: Vec<String>,

    pub usage: Option<LlmUsage>,
}

/// Sends session questions to a provider.
pub struct Assistant {
    client: Arc<dyn LlmClient>,
    model: String,
    workspace: PathBuf,
    top_k: usize,
}

struct PreparedRequest {
    request: LlmRequest,
    prompt_id: String,
    context_chunks: Vec<String>,
}

impl Assistant {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            workspace: PathBuf::from("."),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Workspace searched for prompt overrides.
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Ask `question` and record the exchange in the session.
    ///
    /// An attached document takes precedence over `context`. Provider
    /// failures are returned as errors and leave the session untouched.
    pub async fn ask(
        &self,
        session: &mut ChatSession,
        question: &str,
        context: Option<&str>,
    ) -> AppResult<Answer> {
        let prepared = self.prepare(session, question, context, false)?;

        let response = self.client.complete(&prepared.request).await?;
        session.record_exchange(question, &response.content);

        Ok(Answer {
            content: response.content,
            model: response.model,
            prompt_id: prepared.prompt_id,
            context_chunks: prepared.context_chunks,
            usage: Some(response.usage),
        })
    }

    /// Streaming variant of [`ask`](Self::ask); `on_token` sees each fragment.
    pub async fn ask_streaming<F>(
        &self,
        session: &mut ChatSession,
        question: &str,
        context: Option<&str>,
        mut on_token: F,
    ) -> AppResult<Answer>
    where
        F: FnMut(&str) + Send,
    {
        let prepared = self.prepare(session, question, context, true)?;

        let mut stream = self.client.stream(&prepared.request).await?;
        let mut content = String::new();
        let mut usage = None;

        while let Some(result) = stream.next().await {
            let chunk = result?;
            if !chunk.content.is_empty() {
                on_token(&chunk.content);
                content.push_str(&chunk.content);
            }
            if chunk.done {
                usage = chunk.usage;
                break;
            }
        }

        let content = content.trim().to_string();
        session.record_exchange(question, &content);

        Ok(Answer {
            content,
            model: prepared.request.model,
            prompt_id: prepared.prompt_id,
            context_chunks: prepared.context_chunks,
            usage,
        })
    }

    fn prepare(
        &self,
        session: &ChatSession,
        question: &str,
        context: Option<&str>,
        stream: bool,
    ) -> AppResult<PreparedRequest> {
        let chunks: Vec<&str> = match session.document() {
            Some(document) => {
                let chunks = document.index.top_k(question, self.top_k);
                tracing::debug!(
                    "Retrieved {} chunks from '{}'",
                    chunks.len(),
                    document.name
                );
                chunks
            }
            None => Vec::new(),
        };

        let prompt_context = match (session.document(), context) {
            (Some(_), _) => PromptContext::Document(&chunks),
            (None, Some(text)) => PromptContext::Text(text),
            (None, None) => PromptContext::None,
        };

        let built = build_chat_prompt(&self.workspace, session.mode, question, prompt_context)?;
        let messages = session.build_messages(built.system.as_deref(), &built.user);

        let mut request = LlmRequest::new(messages, self.model.clone());
        if stream {
            request = request.with_streaming();
        }

        tracing::debug!(
            "Prepared {} request with {} messages ({})",
            self.client.provider_name(),
            request.messages.len(),
            built.metadata.source_prompt_id
        );

        Ok(PreparedRequest {
            request,
            prompt_id: built.metadata.source_prompt_id,
            context_chunks: chunks.into_iter().map(str::to_string).collect(),
        })
    }
}
