//! TF-IDF vectorization over a fixed vocabulary.

use std::collections::{BTreeMap, HashMap};

use aipa_core::{AppError, AppResult};

/// Sparse vector stored as `(term index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        Self { entries }
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Scale to unit length; the zero vector stays zero.
    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    /// Cosine similarity; 0.0 when either side is the zero vector.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            0.0
        } else {
            self.dot(other) / denom
        }
    }
}

/// Lowercased word tokens of at least two alphanumeric or `_` characters.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_lowercase)
}

/// Vocabulary and inverse document frequencies fitted on a corpus.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit the vocabulary and smoothed IDF `ln((1 + n) / (1 + df)) + 1`.
    ///
    /// Fails with [`AppError::EmptyCorpus`] when the documents contain no
    /// tokens at all.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> AppResult<Self> {
        // BTreeMap keeps term indices in sorted term order.
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for document in documents {
            let mut seen: Vec<String> = tokenize(document.as_ref()).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(AppError::EmptyCorpus);
        }

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self { vocabulary, idf })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// L2-normalized TF-IDF vector of `text`; unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        SparseVector::from_sorted(entries).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("The cat's snake_case, a 42-x!").collect();
        assert_eq!(tokens, vec!["the", "cat", "snake_case", "42"]);
    }

    #[test]
    fn test_fit_idf_values() {
        let vectorizer = TfidfVectorizer::fit(&["cat dog", "cat"]).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 2);

        let cat = vectorizer.term_index("cat").unwrap();
        let dog = vectorizer.term_index("dog").unwrap();
        assert!((vectorizer.idf[cat] - 1.0).abs() < 1e-12);
        assert!((vectorizer.idf[dog] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_fit_without_tokens_is_empty_corpus() {
        assert!(matches!(
            TfidfVectorizer::fit(&["a b c", "!!"]),
            Err(AppError::EmptyCorpus)
        ));
        assert!(matches!(
            TfidfVectorizer::fit::<&str>(&[]),
            Err(AppError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_transform_is_unit_length() {
        let vectorizer = TfidfVectorizer::fit(&["red green blue", "red red"]).unwrap();
        let v = vectorizer.transform("red green green");
        assert!((v.norm() - 1.0).abs() < 1e-9);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_unknown_terms_give_zero_vector() {
        let vectorizer = TfidfVectorizer::fit(&["alpha beta"]).unwrap();
        let v = vectorizer.transform("gamma delta");
        assert!(v.is_zero());
        assert_eq!(v.cosine(&vectorizer.transform("alpha")), 0.0);
    }

    #[test]
    fn test_cosine_of_identical_vectors() {
        let vectorizer = TfidfVectorizer::fit(&["one two three"]).unwrap();
        let v = vectorizer.transform("one two");
        assert!((v.cosine(&v) - 1.0).abs() < 1e-9);
    }
}
