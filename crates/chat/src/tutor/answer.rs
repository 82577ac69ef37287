//! Answer normalization and checking.

use regex::Regex;
use std::sync::LazyLock;

static NON_ANSWER_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9'\s]+").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static ALTERNATIVE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[|;,]").unwrap());

/// Lowercase, replace anything but `[a-z0-9']` with spaces, collapse whitespace.
pub fn normalize_answer(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let cleaned = NON_ANSWER_CHARS.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

/// Accepted answers listed in `expected`, separated by `|`, `;` or `,`.
///
/// Blank alternatives are dropped; an expected answer with no usable
/// alternative is taken as a whole.
pub fn alternatives(expected: &str) -> Vec<&str> {
    let parts: Vec<&str> = ALTERNATIVE_SEPARATOR
        .split(expected)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        vec![expected.trim()]
    } else {
        parts
    }
}

/// Whether `given` matches any alternative of `expected` after normalization.
pub fn check_answer(given: &str, expected: &str) -> bool {
    let given = normalize_answer(given);
    alternatives(expected)
        .into_iter()
        .any(|alternative| normalize_answer(alternative) == given)
}

/// Letter label for the choice at `index` ("a", "b", ...).
pub(crate) fn choice_letter(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'a' + i))
}

/// Resolve a reference to one of `choices`: a letter, or the normalized text.
pub(crate) fn match_choice<'a>(choices: &'a [String], answer: &str) -> Option<&'a str> {
    let normalized = normalize_answer(answer);

    let mut letters = normalized.chars();
    if let (Some(letter), None) = (letters.next(), letters.next()) {
        if let Some(choice) = (0..choices.len())
            .find(|i| choice_letter(*i) == Some(letter))
            .map(|i| choices[i].as_str())
        {
            return Some(choice);
        }
    }

    choices
        .iter()
        .find(|choice| normalize_answer(choice) == normalized)
        .map(String::as_str)
}
