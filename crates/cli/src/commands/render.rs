//! Render command handler.
//!
//! Classifies a file or stdin and prints the segments.

use super::{print_json, read_stdin};
use crate::output::render_for_terminal;
use aipa_core::AppResult;
use aipa_render::{classify, render_markdown};
use clap::Args;
use std::path::PathBuf;

/// Split mixed text into typed segments
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// File to classify (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Print the segments as JSON
    #[arg(long)]
    pub json: bool,

    /// Print normalized Markdown instead of framed blocks
    #[arg(long, conflicts_with = "json")]
    pub markdown: bool,

    /// Disable colored output
    #[arg(long)]
    pub plain: bool,
}

impl RenderCommand {
    pub fn execute(&self) -> AppResult<()> {
        tracing::info!("Executing render command");

        let text = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => read_stdin()?,
        };

        if self.json {
            let segments = classify(&text);
            tracing::debug!("Classified {} segments", segments.len());
            return print_json(&segments);
        }

        if self.markdown {
            print!("{}", render_markdown(&text));
        } else {
            let color = !self.plain && std::env::var("NO_COLOR").is_err();
            print!("{}", render_for_terminal(&text, color));
        }

        Ok(())
    }
}
