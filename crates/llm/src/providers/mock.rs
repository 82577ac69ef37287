//! Scripted provider for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use aipa_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Mock client replaying queued replies.
///
/// Each call pops the next scripted reply; once the script runs out the
/// client echoes the last user message. Every request is recorded so tests
/// can inspect exactly what would have been sent.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that answers with `replies`, in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        for reply in replies {
            client.push_reply(reply);
        }
        client
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.replies).push_back(Ok(reply.into()));
    }

    /// Queue a provider failure.
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.replies).push_back(Err(AppError::Llm(message.into())));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        lock(&self.requests).clone()
    }

    fn next_reply(&self, request: &LlmRequest) -> AppResult<String> {
        lock(&self.requests).push(request.clone());

        match lock(&self.replies).pop_front() {
            Some(reply) => reply,
            None => Ok(format!(
                "Echo: {}",
                request.last_user_message().unwrap_or_default()
            )),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let content = self.next_reply(request)?;
        tracing::debug!("Mock reply: {} bytes", content.len());

        Ok(LlmResponse {
            content: content.trim().to_string(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
            done: true,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        let content = self.next_reply(request)?;
        let model = request.model.clone();

        let mut chunks: Vec<AppResult<LlmStreamChunk>> = content
            .split_inclusive(' ')
            .map(|word| {
                Ok(LlmStreamChunk {
                    content: word.to_string(),
                    model: model.clone(),
                    done: false,
                    usage: None,
                })
            })
            .collect();
        chunks.push(Ok(LlmStreamChunk {
            content: String::new(),
            model,
            done: true,
            usage: Some(LlmUsage::default()),
        }));

        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_scripted_replies_then_echo() {
        let client = MockLlmClient::with_replies(["first"]);
        let request = LlmRequest::prompt(None, "hello", "m");

        assert_eq!(client.complete(&request).await.unwrap().content, "first");
        assert_eq!(
            client.complete(&request).await.unwrap().content,
            "Echo: hello"
        );
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let client = MockLlmClient::new();
        client.push_error("rate limited");
        let request = LlmRequest::prompt(None, "hello", "m");
        assert!(matches!(
            client.complete(&request).await,
            Err(AppError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn test_stream_reassembles() {
        let client = MockLlmClient::with_replies(["one two three"]);
        let request = LlmRequest::prompt(None, "count", "m");

        let mut stream = client.stream(&request).await.unwrap();
        let mut text = String::new();
        let mut finished = false;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            text.push_str(&chunk.content);
            finished = chunk.done;
        }

        assert_eq!(text, "one two three");
        assert!(finished);
    }
}
