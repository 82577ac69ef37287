//! Renderer dispatch.
//!
//! The classifier decides what each run of text is; a [`Renderer`] decides
//! how it looks. [`RendererMap`] wires plain per-kind callbacks into a
//! renderer, and [`MarkdownRenderer`] turns segments back into Markdown for
//! terminals and logs.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::classifier::classify;
use crate::segment::{Segment, SegmentKind};

/// Receives classified segments in document order.
pub trait Renderer {
    fn render(&mut self, segment: &Segment);
}

impl<F> Renderer for F
where
    F: FnMut(&Segment),
{
    fn render(&mut self, segment: &Segment) {
        self(segment)
    }
}

type Callback<'a> = Box<dyn FnMut(&str, Option<&str>) + 'a>;

/// A renderer assembled from per-kind `(content, language)` callbacks.
///
/// `InlineMath` falls back to the `Prose` callback and `InferredCode` to the
/// `FencedCode` callback. Segments whose kind has no callback are skipped.
#[derive(Default)]
pub struct RendererMap<'a> {
    callbacks: HashMap<SegmentKind, Callback<'a>>,
}

impl<'a> RendererMap<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the callback for one kind, replacing any previous one.
    pub fn on<F>(mut self, kind: SegmentKind, callback: F) -> Self
    where
        F: FnMut(&str, Option<&str>) + 'a,
    {
        self.callbacks.insert(kind, Box::new(callback));
        self
    }

    pub fn handles(&self, kind: SegmentKind) -> bool {
        self.resolve(kind).is_some()
    }

    fn resolve(&self, kind: SegmentKind) -> Option<SegmentKind> {
        if self.callbacks.contains_key(&kind) {
            return Some(kind);
        }

        let fallback = match kind {
            SegmentKind::InlineMath => SegmentKind::Prose,
            SegmentKind::InferredCode => SegmentKind::FencedCode,
            _ => return None,
        };
        self.callbacks.contains_key(&fallback).then_some(fallback)
    }
}

impl Renderer for RendererMap<'_> {
    fn render(&mut self, segment: &Segment) {
        let Some(target) = self.resolve(segment.kind) else {
            tracing::debug!(kind = %segment.kind, "No renderer registered, skipping segment");
            return;
        };

        if let Some(callback) = self.callbacks.get_mut(&target) {
            callback(&segment.content, segment.language.as_deref());
        }
    }
}

/// Renders segments as Markdown.
///
/// Code-like segments are re-fenced with their language tag, display math is
/// wrapped in `$$` blocks, and prose passes through unchanged.
#[derive(Debug, Default)]
pub struct MarkdownRenderer {
    output: String,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    fn separate(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with("\n\n") {
            if !self.output.ends_with('\n') {
                self.output.push('\n');
            }
            self.output.push('\n');
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&mut self, segment: &Segment) {
        self.separate();

        match segment.kind {
            kind if kind.is_code() => {
                let _ = writeln!(
                    self.output,
                    "```{}\n{}\n```",
                    segment.language.as_deref().unwrap_or(""),
                    segment.content
                );
            }
            SegmentKind::DisplayMath => {
                let _ = writeln!(self.output, "$$\n{}\n$$", segment.content.trim());
            }
            _ => {
                self.output.push_str(segment.content.trim_matches('\n'));
                self.output.push('\n');
            }
        }
    }
}

/// Classify `text` and hand every segment to `renderer`, in order.
///
/// Never fails: malformed or unbalanced delimiters degrade to best-effort
/// segments, so every line of the input reaches the renderer or is blank.
pub fn classify_and_render<R>(text: &str, renderer: &mut R)
where
    R: Renderer + ?Sized,
{
    for segment in classify(text) {
        renderer.render(&segment);
    }
}

/// Convenience wrapper rendering `text` to Markdown.
pub fn render_markdown(text: &str) -> String {
    let mut renderer = MarkdownRenderer::new();
    classify_and_render(text, &mut renderer);
    renderer.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_is_a_renderer() {
        let mut seen = Vec::new();
        classify_and_render("Hi\n```\nx\n```", &mut |s: &Segment| seen.push(s.kind));
        assert_eq!(seen, vec![SegmentKind::Prose, SegmentKind::FencedCode]);
    }

    #[test]
    fn test_map_dispatches_in_order() {
        let calls = RefCell::new(Vec::new());
        let mut map = RendererMap::new()
            .on(SegmentKind::Prose, |content, _| {
                calls.borrow_mut().push(format!("prose:{}", content))
            })
            .on(SegmentKind::Sql, |content, language| {
                calls
                    .borrow_mut()
                    .push(format!("{}:{}", language.unwrap_or("?"), content))
            });

        classify_and_render("Query:\nSELECT * FROM DUAL", &mut map);
        drop(map);

        assert_eq!(
            calls.into_inner(),
            vec!["prose:Query:".to_string(), "oracle-sql:SELECT * FROM DUAL".to_string()]
        );
    }

    #[test]
    fn test_map_fallbacks() {
        let calls = RefCell::new(Vec::new());
        let mut map = RendererMap::new()
            .on(SegmentKind::Prose, |_, _| calls.borrow_mut().push("prose"))
            .on(SegmentKind::FencedCode, |_, _| calls.borrow_mut().push("code"));

        assert!(map.handles(SegmentKind::InlineMath));
        assert!(map.handles(SegmentKind::InferredCode));
        assert!(!map.handles(SegmentKind::Html));

        classify_and_render("Let $x$ be 1.\nimport os\n<div>\n</body>", &mut map);
        drop(map);

        assert_eq!(calls.into_inner(), vec!["prose", "code"]);
    }

    #[test]
    fn test_markdown_refences_code() {
        let markdown = render_markdown("Run this:\nfor name in names:\n    print(name)\nDone.");
        assert_eq!(
            markdown,
            "Run this:\n\n```python\nfor name in names:\n    print(name)\n```\n\nDone.\n"
        );
    }

    #[test]
    fn test_markdown_display_math() {
        assert_eq!(render_markdown("[ x^2 ]"), "$$\nx^2\n$$\n");
    }

    #[test]
    fn test_markdown_empty_input() {
        assert_eq!(render_markdown(""), "");
    }
}
