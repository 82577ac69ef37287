//! In-memory chunk index with cosine-similarity retrieval.

use aipa_core::{AppError, AppResult};
use serde::Serialize;

use crate::tfidf::{SparseVector, TfidfVectorizer};

/// Chunks returned per query when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 4;

/// One retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk<'a> {
    /// Position of the chunk in the indexed document
    pub index: usize,
    pub score: f64,
    pub text: &'a str,
}

/// TF-IDF index over the chunks of one document.
///
/// Built once, then only read; a new document gets a new index.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    chunks: Vec<String>,
    vectorizer: TfidfVectorizer,
    chunk_vectors: Vec<SparseVector>,
}

impl ChunkIndex {
    /// Fit the vectorizer on `chunks` and vectorize every chunk.
    ///
    /// Returns [`AppError::EmptyCorpus`] for an empty chunk list or chunks
    /// without a single indexable word.
    pub fn build(chunks: Vec<String>) -> AppResult<Self> {
        if chunks.is_empty() {
            return Err(AppError::EmptyCorpus);
        }

        let vectorizer = TfidfVectorizer::fit(&chunks)?;
        let chunk_vectors: Vec<SparseVector> = chunks
            .iter()
            .map(|chunk| vectorizer.transform(chunk))
            .collect();

        tracing::debug!(
            "Built chunk index: {} chunks, {} terms",
            chunks.len(),
            vectorizer.vocabulary_size()
        );

        Ok(Self {
            chunks,
            vectorizer,
            chunk_vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// The `k` chunks most similar to `query`, best first.
    ///
    /// `k` is clamped to the number of chunks. Ties keep document order, so a
    /// query with no known words returns the first `k` chunks.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<&str> {
        self.top_k_scored(query, k)
            .into_iter()
            .map(|scored| scored.text)
            .collect()
    }

    /// Like [`ChunkIndex::top_k`], with chunk positions and scores.
    pub fn top_k_scored(&self, query: &str, k: usize) -> Vec<ScoredChunk<'_>> {
        let query_vector = self.vectorizer.transform(query);

        let mut scored: Vec<ScoredChunk<'_>> = self
            .chunks
            .iter()
            .zip(&self.chunk_vectors)
            .enumerate()
            .map(|(index, (text, vector))| ScoredChunk {
                index,
                score: query_vector.cosine(vector),
                text,
            })
            .collect();

        // Stable sort keeps document order among equal scores.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k.min(self.chunks.len()));

        if query_vector.is_zero() {
            tracing::debug!("Query has no indexed terms; returning leading chunks");
        } else {
            tracing::debug!(
                "Retrieved {} chunks (top score: {:.3})",
                scored.len(),
                scored.first().map(|s| s.score).unwrap_or(0.0)
            );
        }

        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_cat_chunks_outrank_dog_chunk() {
        let index = ChunkIndex::build(chunks(&["cat cat", "dog", "cat"])).unwrap();
        let top = index.top_k_scored("cat", 2);

        let positions: Vec<usize> = top.iter().map(|s| s.index).collect();
        assert_eq!(positions.len(), 2);
        assert!(positions.contains(&0));
        assert!(positions.contains(&2));
        assert!(top.iter().all(|s| s.score > 0.0));
    }

    #[test]
    fn test_cat_sentences_outrank_dog_sentence() {
        let index =
            ChunkIndex::build(chunks(&["the cat sat", "the dog ran", "a cat meowed loudly"]))
                .unwrap();

        assert_eq!(
            index.top_k("cat", 2),
            vec!["the cat sat", "a cat meowed loudly"]
        );

        let top = index.top_k_scored("cat", 3);
        assert_eq!(top[0].index, 0);
        assert!((top[0].score - 0.518).abs() < 1e-3);
        assert_eq!(top[1].index, 2);
        assert!((top[1].score - 0.474).abs() < 1e-3);
        assert_eq!(top[2].index, 1);
        assert_eq!(top[2].score, 0.0);
    }

    #[test]
    fn test_double_occurrence_never_ranks_lower() {
        let index = ChunkIndex::build(chunks(&[
            "cat sits on the mat",
            "cat cat sits on the mat",
            "dog sits on the mat",
        ]))
        .unwrap();
        let top = index.top_k_scored("cat", 3);

        assert_eq!(top[0].index, 1);
        assert_eq!(top[1].index, 0);
        assert!(top[0].score >= top[1].score);
        assert_eq!(top[2].index, 2);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(matches!(
            ChunkIndex::build(Vec::new()),
            Err(AppError::EmptyCorpus)
        ));
        assert!(matches!(
            ChunkIndex::build(chunks(&["? !", "-"])),
            Err(AppError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_k_is_clamped() {
        let index = ChunkIndex::build(chunks(&["one", "two"])).unwrap();
        assert_eq!(index.top_k("one", 10).len(), 2);
        assert!(index.top_k("one", 0).is_empty());
    }

    #[test]
    fn test_unknown_query_keeps_document_order() {
        let index = ChunkIndex::build(chunks(&["alpha", "beta", "gamma"])).unwrap();
        let top = index.top_k_scored("zeta", 2);

        assert_eq!(top.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1]);
        assert!(top.iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn test_top_k_returns_chunk_text() {
        let index = ChunkIndex::build(chunks(&[
            "rust ownership and borrowing",
            "python list comprehension",
        ]))
        .unwrap();
        assert_eq!(
            index.top_k("how does borrowing work", DEFAULT_TOP_K),
            vec!["rust ownership and borrowing", "python list comprehension"]
        );
    }
}
