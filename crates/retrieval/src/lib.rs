//! Document retrieval for grounded chat.
//!
//! A document is split into fixed word windows, indexed with TF-IDF, and
//! queried by cosine similarity to pick the chunks handed to the model as
//! context.

pub mod chunker;
pub mod document;
pub mod index;
pub mod tfidf;

// Re-export commonly used types
pub use chunker::{chunk_words, DEFAULT_CHUNK_WORDS};
pub use document::{Document, DocumentFormat};
pub use index::{ChunkIndex, ScoredChunk, DEFAULT_TOP_K};
pub use tfidf::{SparseVector, TfidfVectorizer};

use aipa_core::AppResult;

/// Chunk `text` and build its index in one step.
pub fn index_text(text: &str, chunk_size: usize) -> AppResult<ChunkIndex> {
    ChunkIndex::build(chunk_words(text, chunk_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aipa_core::AppError;

    #[test]
    fn test_index_text_blank_document() {
        assert!(matches!(
            index_text("   \n ", DEFAULT_CHUNK_WORDS),
            Err(AppError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_index_text_retrieves_relevant_window() {
        let text = "lions roar loudly\ntigers hunt nightly\nwhales sing underwater";
        let index = index_text(text, 3).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.top_k("Whales?", 1), vec!["whales sing underwater"]);
    }
}
