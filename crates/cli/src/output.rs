//! Terminal presentation of classified text.

use aipa_render::{classify_and_render, Renderer, Segment, SegmentKind};
use std::fmt::Write as _;

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Renders segments for a terminal, framing code and math blocks with a
/// header naming their language or kind.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    output: String,
    color: bool,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self {
            output: String::new(),
            color,
        }
    }

    pub fn into_string(self) -> String {
        self.output
    }

    fn rule(&mut self, label: &str) {
        let line = format!("── {} ──", label);
        if self.color {
            let _ = writeln!(self.output, "{}{}{}", DIM, line, RESET);
        } else {
            let _ = writeln!(self.output, "{}", line);
        }
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, segment: &Segment) {
        match segment.kind {
            kind if kind.is_code() => {
                let label = segment.language.as_deref().unwrap_or(kind.as_str()).to_string();
                self.rule(&label);
                let _ = writeln!(self.output, "{}", segment.content);
                self.rule("end");
            }
            SegmentKind::DisplayMath => {
                self.rule("math");
                let _ = writeln!(self.output, "{}", segment.content.trim());
                self.rule("end");
            }
            _ => {
                let _ = writeln!(self.output, "{}", segment.content);
            }
        }
    }
}

/// Classify `text` and format it for the terminal.
pub fn render_for_terminal(text: &str, color: bool) -> String {
    let mut renderer = TerminalRenderer::new(color);
    classify_and_render(text, &mut renderer);
    renderer.into_string()
}
