//! Math notation normalization.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static PAREN_INLINE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\(\s*([^)]+?)\s*\\\)").unwrap());

/// Rewrite `\( x \)` inline math as `$x$`.
///
/// Runs once over the whole text before line classification, so that every
/// later stage only has to understand dollar-delimited inline math.
pub fn normalize_inline_math(text: &str) -> Cow<'_, str> {
    PAREN_INLINE_MATH.replace_all(text, |caps: &regex::Captures<'_>| format!("${}$", &caps[1]))
}
