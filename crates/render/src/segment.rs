//! Typed runs of classified text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Content kind of a classified run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Plain text, rendered as Markdown
    Prose,

    /// Code between triple-backtick fences
    FencedCode,

    /// Unfenced code recognized from its first line
    InferredCode,

    /// SQL statement block
    Sql,

    /// HTML markup block
    Html,

    /// CSS rule or declaration block
    Css,

    /// Lines carrying `$...$` math or raw LaTeX control sequences
    InlineMath,

    /// Block-level formula
    DisplayMath,
}

impl SegmentKind {
    /// Kinds rendered as source code with an optional language tag.
    pub fn is_code(&self) -> bool {
        matches!(
            self,
            Self::FencedCode | Self::InferredCode | Self::Sql | Self::Html | Self::Css
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prose => "prose",
            Self::FencedCode => "fenced_code",
            Self::InferredCode => "inferred_code",
            Self::Sql => "sql",
            Self::Html => "html",
            Self::Css => "css",
            Self::InlineMath => "inline_math",
            Self::DisplayMath => "display_math",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delimiter text consumed around a segment's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum Delimiters {
    /// Delimiters on their own lines (code fences, multi-line math).
    /// `close` is `None` when the input ended before the closing line.
    Block { open: String, close: Option<String> },

    /// Delimiters sharing the content's line, e.g. `$$ x^2 $$`.
    Inline { open: String, close: String },
}

/// A maximal run of text classified under one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,

    /// Explicit fence tag or guessed language; only set for code-like kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Exact source lines of the run, joined with `\n`
    pub content: String,

    /// Source line indices `[start, end)`, delimiter lines included
    pub lines: Range<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiters: Option<Delimiters>,
}

impl Segment {
    pub(crate) fn plain(kind: SegmentKind, lines: Range<usize>, content: String) -> Self {
        Self {
            kind,
            language: None,
            content,
            lines,
            delimiters: None,
        }
    }

    pub(crate) fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.is_empty());
        self
    }

    pub(crate) fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = Some(delimiters);
        self
    }

    /// Number of lines that hold content, excluding delimiter lines.
    fn content_line_count(&self) -> usize {
        let delimiter_lines = match &self.delimiters {
            Some(Delimiters::Block { close, .. }) => 1 + usize::from(close.is_some()),
            _ => 0,
        };
        self.lines.len().saturating_sub(delimiter_lines)
    }

    /// The source text of this segment with its consumed delimiters restored.
    pub fn source_text(&self) -> String {
        match &self.delimiters {
            None => self.content.clone(),
            Some(Delimiters::Inline { open, close }) => {
                format!("{}{}{}", open, self.content, close)
            }
            Some(Delimiters::Block { open, close }) => {
                let mut text = open.clone();
                if self.content_line_count() > 0 {
                    text.push('\n');
                    text.push_str(&self.content);
                }
                if let Some(close) = close {
                    text.push('\n');
                    text.push_str(close);
                }
                text
            }
        }
    }
}

/// Rebuild the classified text from its segments.
///
/// Lines not covered by any segment are blank separator lines and are
/// restored as empty lines; `total_lines` is the line count of the input.
///
/// The result is the text [`classify`](crate::classify) scanned, after inline
/// math normalization: `\( x \)` comes back as `$x$`. Input without
/// `\( .. \)` math is rebuilt exactly.
pub fn reconstruct(segments: &[Segment], total_lines: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut next_line = 0;

    for segment in segments {
        while next_line < segment.lines.start {
            parts.push(String::new());
            next_line += 1;
        }
        parts.push(segment.source_text());
        next_line = segment.lines.end;
    }

    while next_line < total_lines {
        parts.push(String::new());
        next_line += 1;
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_source_text() {
        let segment = Segment::plain(SegmentKind::FencedCode, 0..3, "x = 1".to_string())
            .with_delimiters(Delimiters::Block {
                open: "```python".to_string(),
                close: Some("```".to_string()),
            });
        assert_eq!(segment.source_text(), "```python\nx = 1\n```");
    }

    #[test]
    fn test_empty_block_source_text() {
        let segment = Segment::plain(SegmentKind::FencedCode, 0..2, String::new())
            .with_delimiters(Delimiters::Block {
                open: "```".to_string(),
                close: Some("```".to_string()),
            });
        assert_eq!(segment.source_text(), "```\n```");
    }

    #[test]
    fn test_inline_source_text() {
        let segment = Segment::plain(SegmentKind::DisplayMath, 4..5, " x^2 ".to_string())
            .with_delimiters(Delimiters::Inline {
                open: "$$".to_string(),
                close: "$$".to_string(),
            });
        assert_eq!(segment.source_text(), "$$ x^2 $$");
    }

    #[test]
    fn test_reconstruct_fills_gaps() {
        let segments = vec![
            Segment::plain(SegmentKind::Sql, 0..1, "SELECT 1".to_string()),
            Segment::plain(SegmentKind::Prose, 2..3, "done".to_string()),
        ];
        assert_eq!(reconstruct(&segments, 4), "SELECT 1\n\ndone\n");
    }

    #[test]
    fn test_empty_language_is_dropped() {
        let segment = Segment::plain(SegmentKind::FencedCode, 0..1, "x".to_string())
            .with_language(Some(String::new()));
        assert_eq!(segment.language, None);
    }
}
