//! Conversation state for the assistant.

use aipa_core::config::ChatSettings;
use aipa_core::AppResult;
use aipa_llm::{ChatMessage, Role};
use aipa_prompt::ChatMode;
use aipa_retrieval::{index_text, ChunkIndex};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Messages replayed to the model when memory is on.
pub const DEFAULT_MEMORY_WINDOW: usize = 20;

/// One entry of the visible conversation log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// A document indexed for retrieval.
#[derive(Debug, Clone)]
pub struct AttachedDocument {
    pub name: String,
    pub index: Arc<ChunkIndex>,
}

/// State of one assistant conversation.
///
/// The log holds what the user sees, newest exchange first. Memory holds
/// the raw questions and answers replayed to the model, oldest first, and
/// never grows past `memory_window`.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub mode: ChatMode,
    pub memory_enabled: bool,
    pub memory_window: usize,
    log: Vec<LogEntry>,
    memory: Vec<ChatMessage>,
    document: Option<AttachedDocument>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(ChatMode::default())
    }
}

impl ChatSession {
    pub fn new(mode: ChatMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            mode,
            memory_enabled: false,
            memory_window: DEFAULT_MEMORY_WINDOW,
            log: Vec::new(),
            memory: Vec::new(),
            document: None,
        }
    }

    /// Create a session from the `chat` section of the configuration.
    pub fn from_settings(settings: &ChatSettings) -> AppResult<Self> {
        let mut session = Self::new(settings.mode.parse()?);
        session.memory_enabled = settings.memory;
        session.memory_window = settings.memory_window;
        Ok(session)
    }

    /// Messages for the next request: system, remembered turns, then the prompt.
    pub fn build_messages(&self, system: Option<&str>, user_prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.memory.len() + 2);

        if let Some(system) = system.filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system));
        }

        if self.memory_enabled {
            let start = self.memory.len().saturating_sub(self.exchange_window());
            messages.extend_from_slice(&self.memory[start..]);
        }

        messages.push(ChatMessage::user(user_prompt));
        messages
    }

    /// Record a finished exchange.
    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        let at = Utc::now();
        self.log.insert(
            0,
            LogEntry {
                role: Role::Assistant,
                content: assistant.to_string(),
                at,
            },
        );
        self.log.insert(
            0,
            LogEntry {
                role: Role::User,
                content: user.to_string(),
                at,
            },
        );

        if self.memory_enabled {
            self.memory.push(ChatMessage::user(user));
            self.memory.push(ChatMessage::assistant(assistant));
            let excess = self.memory.len().saturating_sub(self.exchange_window());
            self.memory.drain(..excess);
        }

        tracing::debug!(
            session = %self.id,
            log = self.log.len(),
            memory = self.memory.len(),
            "Recorded exchange"
        );
    }

    /// The memory window rounded down to whole question and answer pairs,
    /// so remembered turns always start with a user message.
    fn exchange_window(&self) -> usize {
        self.memory_window - self.memory_window % 2
    }

    /// Index `text` and make it the active document; returns the chunk count.
    ///
    /// On error the previously attached document is kept.
    pub fn attach_document(
        &mut self,
        name: impl Into<String>,
        text: &str,
        chunk_words: usize,
    ) -> AppResult<usize> {
        let name = name.into();
        let index = index_text(text, chunk_words)?;
        let chunks = index.len();

        tracing::info!("Attached document '{}' ({} chunks)", name, chunks);
        self.document = Some(AttachedDocument {
            name,
            index: Arc::new(index),
        });
        Ok(chunks)
    }

    pub fn detach_document(&mut self) -> Option<AttachedDocument> {
        self.document.take()
    }

    pub fn document(&self) -> Option<&AttachedDocument> {
        self.document.as_ref()
    }

    /// Conversation log, newest exchange first.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn memory(&self) -> &[ChatMessage] {
        &self.memory
    }

    /// Wipe the log and the memory; mode, flags and document stay.
    pub fn clear(&mut self) {
        self.log.clear();
        self.memory.clear();
    }
}
