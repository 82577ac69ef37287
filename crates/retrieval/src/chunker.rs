//! Fixed-size word chunking.

/// Words per chunk used when the caller has no preference.
pub const DEFAULT_CHUNK_WORDS: usize = 300;

/// Split text into consecutive windows of `chunk_size` words.
///
/// Words are separated by any whitespace and re-joined with single spaces.
/// Windows do not overlap; the last one may be shorter. A `chunk_size` of 0
/// is treated as 1.
pub fn chunk_words(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    let chunks: Vec<String> = words
        .chunks(chunk_size)
        .map(|window| window.join(" "))
        .collect();

    tracing::debug!(
        "Chunked {} words into {} chunks (size: {})",
        words.len(),
        chunks.len(),
        chunk_size
    );

    chunks
}
