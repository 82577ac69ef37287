//! Conversation layer for AIPA.
//!
//! Ties prompts, retrieval and an LLM client together:
//! - [`ChatSession`]: log, memory window and attached document
//! - [`Assistant`]: answers questions within a session
//! - [`tutor`]: the English word tutor and its quiz

pub mod assistant;
pub mod session;
pub mod tutor;

pub use assistant::{Answer, Assistant};
pub use session::{AttachedDocument, ChatSession, LogEntry, DEFAULT_MEMORY_WINDOW};
pub use tutor::{Feedback, Lesson, Question, QuestionBank, QuestionKind, Quiz, Tutor};
