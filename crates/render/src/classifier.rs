//! Mixed-content classifier.
//!
//! A single forward scan over lines drives a finite-state machine. At most one
//! mode is active at a time and its lines sit in the one pending buffer; every
//! transition out of a mode flushes that buffer into a [`Segment`] before the
//! next mode starts, so segments can never interleave.
//!
//! The whole state machine is the [`step`] function: given the active mode and
//! the features of the current line it returns what to do with the line.

use crate::language::{detect_sql_dialect, guess_language};
use crate::math::normalize_inline_math;
use crate::patterns::{DisplayTrigger, LineClass, LineFeatures};
use crate::segment::{Delimiters, Segment, SegmentKind};

/// Language of inferred code. The code-start patterns are Python-shaped, so a
/// block ended by another line is tagged with it, and a block still open at
/// end of input falls back to it when the guesser cannot place it.
const INFERRED_CODE_LANGUAGE: &str = "python";

/// Active buffering mode.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode<'a> {
    Prose,
    InlineMath,
    Code,
    Sql,
    Html,
    Css,
    Fence { tag: Option<&'a str> },
    Display { close: &'static str },
}

/// What to do with the current line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action<'a> {
    /// Add the line to the pending buffer.
    Append,

    /// Add the line, then flush: it is the block's last line.
    AppendAndFlush,

    /// The line is the closing delimiter of a fence or math block.
    Close,

    /// Flush the pending buffer, then handle the same line with no mode active.
    FlushAndReprocess,

    /// Start a buffer whose first content line is this line.
    Start(Mode<'a>),

    /// Start a buffer whose opening delimiter is this line.
    StartDelimited(Mode<'a>),

    /// The line is a complete block on its own.
    StartAndFlush(Mode<'a>),

    /// Emit a complete one-line display formula.
    EmitDisplay {
        open: &'a str,
        content: &'a str,
        close: &'a str,
    },
}

/// The transition table.
fn step<'a>(mode: Option<&Mode<'a>>, line: &LineFeatures<'a>) -> Action<'a> {
    let Some(mode) = mode else {
        return start(line);
    };

    match mode {
        Mode::Fence { .. } => {
            if line.fence {
                Action::Close
            } else {
                Action::Append
            }
        }
        Mode::Display { close } => {
            if line.stripped == *close {
                Action::Close
            } else {
                Action::Append
            }
        }
        _ if line.forces_flush() => Action::FlushAndReprocess,
        Mode::Prose => match line.class {
            LineClass::Prose => Action::Append,
            _ => Action::FlushAndReprocess,
        },
        Mode::InlineMath => match line.class {
            LineClass::RawFormula | LineClass::InlineMath => Action::Append,
            _ => Action::FlushAndReprocess,
        },
        Mode::Code => {
            if line.blank || line.code_continuation {
                Action::Append
            } else {
                Action::FlushAndReprocess
            }
        }
        Mode::Sql => Action::Append,
        Mode::Html => {
            if line.html_end {
                Action::AppendAndFlush
            } else {
                Action::Append
            }
        }
        Mode::Css => {
            if line.css_end {
                Action::AppendAndFlush
            } else {
                Action::Append
            }
        }
    }
}

/// Transitions out of the idle state.
fn start<'a>(line: &LineFeatures<'a>) -> Action<'a> {
    match &line.class {
        LineClass::Display(DisplayTrigger::SingleLine {
            open,
            content,
            close,
        }) => Action::EmitDisplay {
            open: *open,
            content: *content,
            close: *close,
        },
        LineClass::Display(DisplayTrigger::Open { close }) => {
            Action::StartDelimited(Mode::Display { close: *close })
        }
        LineClass::RawFormula | LineClass::InlineMath => Action::Start(Mode::InlineMath),
        LineClass::Fence { tag } => Action::StartDelimited(Mode::Fence { tag: *tag }),
        LineClass::CodeStart => Action::Start(Mode::Code),
        LineClass::SqlStart => Action::Start(Mode::Sql),
        LineClass::HtmlStart => {
            // A one-line document closes on its own line.
            if line.html_end {
                Action::StartAndFlush(Mode::Html)
            } else {
                Action::Start(Mode::Html)
            }
        }
        LineClass::CssStart => {
            if line.css_end {
                Action::StartAndFlush(Mode::Css)
            } else {
                Action::Start(Mode::Css)
            }
        }
        LineClass::Prose => Action::Start(Mode::Prose),
    }
}

/// Lines collected for the active mode.
struct Pending<'a> {
    mode: Mode<'a>,
    start: usize,
    open: Option<&'a str>,
    lines: Vec<&'a str>,
}

struct Classifier<'a> {
    pending: Option<Pending<'a>>,
    segments: Vec<Segment>,
    end_of_input: bool,
}

impl<'a> Classifier<'a> {
    fn new() -> Self {
        Self {
            pending: None,
            segments: Vec::new(),
            end_of_input: false,
        }
    }

    fn run(mut self, text: &'a str) -> Vec<Segment> {
        for (index, line) in text.split('\n').enumerate() {
            let features = LineFeatures::of(line);
            self.feed(index, line, &features);
        }

        // Modes are exclusive, so at most one buffer is still open here; an
        // unterminated fence or math block is flushed without its closing line.
        self.end_of_input = true;
        self.flush_before_reprocess();
        self.flush(None);
        self.segments
    }

    fn feed(&mut self, index: usize, line: &'a str, features: &LineFeatures<'a>) {
        match step(self.pending.as_ref().map(|p| &p.mode), features) {
            Action::Append => self.append(line),
            Action::AppendAndFlush => {
                self.append(line);
                self.flush(None);
            }
            Action::Close => self.flush(Some(line)),
            Action::FlushAndReprocess => {
                let ended_code = matches!(self.pending, Some(Pending { mode: Mode::Code, .. }));
                self.flush_before_reprocess();
                if ended_code {
                    // The line that ended the code block cannot start another one.
                    self.feed(index, line, &features.after_code());
                } else {
                    self.feed(index, line, features);
                }
            }
            Action::Start(mode) => {
                self.pending = Some(Pending {
                    mode,
                    start: index,
                    open: None,
                    lines: vec![line],
                });
            }
            Action::StartDelimited(mode) => {
                self.pending = Some(Pending {
                    mode,
                    start: index,
                    open: Some(line),
                    lines: Vec::new(),
                });
            }
            Action::StartAndFlush(mode) => {
                self.pending = Some(Pending {
                    mode,
                    start: index,
                    open: None,
                    lines: vec![line],
                });
                self.flush(None);
            }
            Action::EmitDisplay {
                open,
                content,
                close,
            } => {
                self.segments.push(
                    Segment::plain(SegmentKind::DisplayMath, index..index + 1, content.to_string())
                        .with_delimiters(Delimiters::Inline {
                            open: open.to_string(),
                            close: close.to_string(),
                        }),
                );
            }
        }
    }

    fn append(&mut self, line: &'a str) {
        if let Some(pending) = self.pending.as_mut() {
            pending.lines.push(line);
        }
    }

    /// Flush before a mode switch. Trailing blank lines of code and SQL
    /// buffers are handed to a fresh prose buffer instead of the block.
    fn flush_before_reprocess(&mut self) {
        let trailing = match self.pending.as_mut() {
            Some(pending) if matches!(pending.mode, Mode::Code | Mode::Sql) => {
                split_trailing_blank(pending)
            }
            _ => None,
        };

        self.flush(None);
        self.pending = trailing;
    }

    fn flush(&mut self, close: Option<&'a str>) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        if let Some(segment) = build_segment(pending, close, self.end_of_input) {
            tracing::debug!(
                kind = %segment.kind,
                language = segment.language.as_deref().unwrap_or(""),
                lines = ?segment.lines,
                "Flushed segment"
            );
            self.segments.push(segment);
        }
    }
}

/// Move trailing blank lines out of a buffer into a new prose buffer.
fn split_trailing_blank<'a>(pending: &mut Pending<'a>) -> Option<Pending<'a>> {
    let keep = pending
        .lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |i| i + 1);

    if keep == pending.lines.len() {
        return None;
    }

    let blank = pending.lines.split_off(keep);
    Some(Pending {
        mode: Mode::Prose,
        start: pending.start + keep,
        open: None,
        lines: blank,
    })
}

fn build_segment(
    pending: Pending<'_>,
    close: Option<&str>,
    end_of_input: bool,
) -> Option<Segment> {
    let content = pending.lines.join("\n");
    let line_count =
        usize::from(pending.open.is_some()) + pending.lines.len() + usize::from(close.is_some());
    let lines = pending.start..pending.start + line_count;

    let segment = match pending.mode {
        Mode::Prose => {
            if content.trim().is_empty() {
                return None;
            }
            Segment::plain(SegmentKind::Prose, lines, content)
        }
        Mode::InlineMath => Segment::plain(SegmentKind::InlineMath, lines, content),
        Mode::Code => {
            let language = if end_of_input {
                guess_language(&content).unwrap_or_else(|| INFERRED_CODE_LANGUAGE.to_string())
            } else {
                INFERRED_CODE_LANGUAGE.to_string()
            };
            Segment::plain(SegmentKind::InferredCode, lines, content).with_language(Some(language))
        }
        Mode::Sql => {
            let language = detect_sql_dialect(&content)
                .map(|d| d.tag())
                .unwrap_or("sql");
            Segment::plain(SegmentKind::Sql, lines, content).with_language(Some(language.into()))
        }
        Mode::Html => {
            Segment::plain(SegmentKind::Html, lines, content).with_language(Some("html".into()))
        }
        Mode::Css => {
            Segment::plain(SegmentKind::Css, lines, content).with_language(Some("css".into()))
        }
        Mode::Fence { tag } => {
            let language = tag
                .map(str::to_string)
                .or_else(|| guess_language(&content));
            Segment::plain(SegmentKind::FencedCode, lines, content)
                .with_language(language)
                .with_delimiters(block_delimiters(pending.open, close))
        }
        Mode::Display { .. } => Segment::plain(SegmentKind::DisplayMath, lines, content)
            .with_delimiters(block_delimiters(pending.open, close)),
    };

    Some(segment)
}

fn block_delimiters(open: Option<&str>, close: Option<&str>) -> Delimiters {
    Delimiters::Block {
        open: open.unwrap_or_default().to_string(),
        close: close.map(str::to_string),
    }
}

/// Classify text into typed segments in document order.
///
/// Inline `\( .. \)` math is first rewritten to `$..$`; line ranges and
/// segment content refer to that normalized text, so
/// [`reconstruct`](crate::reconstruct) yields the normalized text rather than
/// the original delimiters. Never fails: unterminated blocks are flushed as-is.
pub fn classify(text: &str) -> Vec<Segment> {
    let normalized = normalize_inline_math(text);
    Classifier::new().run(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
        segments.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_plain_prose_is_one_segment() {
        let segments = classify("Hello there.\nThis is prose.\n\nStill prose.");
        assert_eq!(kinds(&segments), vec![SegmentKind::Prose]);
        assert_eq!(segments[0].lines, 0..4);
    }

    #[test]
    fn test_empty_input() {
        assert!(classify("").is_empty());
        assert!(classify("\n\n").is_empty());
    }

    #[test]
    fn test_fenced_code_with_tag() {
        let segments = classify("Intro\n```rust\nfn main() {}\n```\nOutro");
        assert_eq!(
            kinds(&segments),
            vec![SegmentKind::Prose, SegmentKind::FencedCode, SegmentKind::Prose]
        );
        assert_eq!(segments[1].language.as_deref(), Some("rust"));
        assert_eq!(segments[1].content, "fn main() {}");
        assert_eq!(segments[1].lines, 1..4);
    }

    #[test]
    fn test_fenced_code_keeps_trigger_lines_verbatim() {
        let text = "```\nSELECT 1\n$$\n<div>\n```";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::FencedCode]);
        assert_eq!(segments[0].content, "SELECT 1\n$$\n<div>");
    }

    #[test]
    fn test_untagged_fence_uses_guesser() {
        let segments = classify("```\nSELECT * FROM t RETURNING id\n```");
        assert_eq!(segments[0].language.as_deref(), Some("postgresql"));
    }

    #[test]
    fn test_unterminated_fence_fails_open() {
        let text = "Look:\n```python\nx = 1\n\nprint(x)";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::Prose, SegmentKind::FencedCode]);
        assert_eq!(segments[1].content, "x = 1\n\nprint(x)");
        assert_eq!(segments[1].language.as_deref(), Some("python"));
        assert_eq!(
            segments[1].delimiters,
            Some(Delimiters::Block {
                open: "```python".to_string(),
                close: None
            })
        );
    }

    #[test]
    fn test_inferred_code_ends_at_first_plain_line() {
        let text = "import os\n\ndef main():\n    print(os.name)\n\nThat prints the OS name.";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode, SegmentKind::Prose]);
        assert_eq!(segments[0].content, "import os");
        assert_eq!(segments[0].lines, 0..1);
        assert_eq!(segments[0].language.as_deref(), Some("python"));
        // The blank separator travels with the prose that follows.
        assert_eq!(
            segments[1].content,
            "\ndef main():\n    print(os.name)\n\nThat prints the OS name."
        );
        assert_eq!(segments[1].lines, 1..6);
    }

    #[test]
    fn test_inferred_code_continuations() {
        let text = "def main():\n    print(os.name)\n\n    return 0\n# done\nThat prints the OS name.";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode, SegmentKind::Prose]);
        assert_eq!(
            segments[0].content,
            "def main():\n    print(os.name)\n\n    return 0\n# done"
        );
        assert_eq!(segments[1].content, "That prints the OS name.");
    }

    #[test]
    fn test_code_start_line_does_not_continue_code() {
        let segments = classify("x = 1\ny = 2\nprint(x)");
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode, SegmentKind::Prose]);
        assert_eq!(segments[0].content, "x = 1");
        assert_eq!(segments[1].content, "y = 2\nprint(x)");
        assert_eq!(segments[1].lines, 1..3);
    }

    #[test]
    fn test_code_resumes_after_prose_line() {
        let segments = classify("x = 1\nthen\ny = 2");
        assert_eq!(
            kinds(&segments),
            vec![SegmentKind::InferredCode, SegmentKind::Prose, SegmentKind::InferredCode]
        );
        assert_eq!(segments[2].content, "y = 2");
    }

    #[test]
    fn test_ended_inferred_code_is_python_despite_sql_string() {
        let text = "def fetch(db):\n    return db.run(\"SELECT id FROM users LIMIT 5\")\nThat fetches five rows.";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode, SegmentKind::Prose]);
        assert_eq!(segments[0].language.as_deref(), Some("python"));
    }

    #[test]
    fn test_interrupted_inferred_code_is_python() {
        let segments = classify("query = \"SELECT id FROM t LIMIT 5\"\n```\nx\n```");
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode, SegmentKind::FencedCode]);
        assert_eq!(segments[0].language.as_deref(), Some("python"));
    }

    #[test]
    fn test_inferred_code_at_end_of_input_is_guessed() {
        let segments = classify("query = \"SELECT id FROM t LIMIT 5\"");
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode]);
        assert_eq!(segments[0].language.as_deref(), Some("mysql"));
    }

    #[test]
    fn test_inferred_code_ending_line_is_reprocessed() {
        let segments = classify("x = compute()\nSELECT * FROM t");
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode, SegmentKind::Sql]);
    }

    #[test]
    fn test_sql_absorbs_following_lines() {
        let text = "SELECT id\nFROM users\n\nWHERE id = 1;\nmore text";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::Sql]);
        assert_eq!(segments[0].lines, 0..5);
        assert_eq!(segments[0].language.as_deref(), Some("sql"));
    }

    #[test]
    fn test_sql_ends_at_display_math() {
        let segments = classify("SELECT 1\n\n$$x^2$$");
        assert_eq!(kinds(&segments), vec![SegmentKind::Sql, SegmentKind::DisplayMath]);
        assert_eq!(segments[0].content, "SELECT 1");
        assert_eq!(segments[1].lines, 2..3);
    }

    #[test]
    fn test_sql_without_select_is_generic() {
        let segments = classify("INSERT INTO t VALUES (1);");
        assert_eq!(segments[0].language.as_deref(), Some("sql"));
    }

    #[test]
    fn test_html_block_until_closing_tag() {
        let text = "<html>\n<body>\n\n<p>Hi</p>\n</body>\nAfter";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::Html, SegmentKind::Prose]);
        assert_eq!(segments[0].lines, 0..5);
        assert_eq!(segments[0].language.as_deref(), Some("html"));
    }

    #[test]
    fn test_css_block_until_closing_brace() {
        let text = ".card {\n  color: red;\n\n  margin: 0;\n}\nDone";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::Css, SegmentKind::Prose]);
        assert_eq!(segments[0].content, ".card {\n  color: red;\n\n  margin: 0;\n}");
    }

    #[test]
    fn test_one_line_css_rule() {
        let segments = classify("a { color: blue; }\nText");
        assert_eq!(kinds(&segments), vec![SegmentKind::Css, SegmentKind::Prose]);
        assert_eq!(segments[0].lines, 0..1);
    }

    #[test]
    fn test_multiline_display_math() {
        let text = "Formula:\n$$\na^2 + b^2\n\n= c^2\n$$\nEnd";
        let segments = classify(text);
        assert_eq!(
            kinds(&segments),
            vec![SegmentKind::Prose, SegmentKind::DisplayMath, SegmentKind::Prose]
        );
        assert_eq!(segments[1].content, "a^2 + b^2\n\n= c^2");
        assert_eq!(segments[1].lines, 1..6);
    }

    #[test]
    fn test_bracket_display_math_blocks() {
        let segments = classify("[\nx + y\n]\n\\[\nz\n\\]");
        assert_eq!(
            kinds(&segments),
            vec![SegmentKind::DisplayMath, SegmentKind::DisplayMath]
        );
        assert_eq!(segments[0].content, "x + y");
        assert_eq!(segments[1].content, "z");
    }

    #[test]
    fn test_unterminated_display_math_is_kept() {
        let segments = classify("$$\nx + 1");
        assert_eq!(kinds(&segments), vec![SegmentKind::DisplayMath]);
        assert_eq!(segments[0].content, "x + 1");
        assert_eq!(
            segments[0].delimiters,
            Some(Delimiters::Block {
                open: "$$".to_string(),
                close: None
            })
        );
    }

    #[test]
    fn test_display_math_interrupts_inferred_code() {
        let segments = classify("total = 1\n[ x = 2 ]\n    indented");
        assert_eq!(
            kinds(&segments),
            vec![
                SegmentKind::InferredCode,
                SegmentKind::DisplayMath,
                SegmentKind::Prose
            ]
        );
    }

    #[test]
    fn test_raw_formula_lines_group() {
        let text = "\\frac{a}{b}\n\\sqrt{x}\nplain";
        let segments = classify(text);
        assert_eq!(kinds(&segments), vec![SegmentKind::InlineMath, SegmentKind::Prose]);
        assert_eq!(segments[0].content, "\\frac{a}{b}\n\\sqrt{x}");
    }

    #[test]
    fn test_paren_inline_math_is_normalized() {
        let segments = classify("The root is \\( x = 2 \\) here.");
        assert_eq!(kinds(&segments), vec![SegmentKind::InlineMath]);
        assert_eq!(segments[0].content, "The root is $x = 2$ here.");
    }

    #[test]
    fn test_code_wins_over_sql_on_tie() {
        let segments = classify("with conn.cursor() as cur:\n    cur.execute(q)");
        assert_eq!(kinds(&segments), vec![SegmentKind::InferredCode]);
    }

    #[test]
    fn test_blank_gap_between_blocks_has_no_segment() {
        let segments = classify("```\na\n```\n\n```\nb\n```");
        assert_eq!(
            kinds(&segments),
            vec![SegmentKind::FencedCode, SegmentKind::FencedCode]
        );
        assert_eq!(segments[0].lines, 0..3);
        assert_eq!(segments[1].lines, 4..7);
    }
}
