//! Retrieve command handler.
//!
//! Indexes a document and prints the chunks closest to a query.

use super::print_json;
use aipa_core::{config::AppConfig, AppResult};
use aipa_retrieval::{index_text, Document};
use clap::Args;
use std::path::PathBuf;

/// Show the document chunks most similar to a query
#[derive(Args, Debug)]
pub struct RetrieveCommand {
    /// PDF or text document to search
    #[arg(short, long)]
    pub document: PathBuf,

    /// Query text
    #[arg(short, long)]
    pub query: String,

    /// Number of chunks to return
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Words per chunk
    #[arg(long)]
    pub chunk_words: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RetrieveCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing retrieve command");

        let top_k = self.top_k.unwrap_or(config.chat.top_k);
        let chunk_words = self.chunk_words.unwrap_or(config.chat.chunk_words);

        let document = Document::load(&self.document)?;
        let index = index_text(&document.text, chunk_words)?;
        tracing::debug!(
            "Indexed '{}' ({}): {} chunks",
            document.name,
            document.format.as_str(),
            index.len()
        );

        let results = index.top_k_scored(&self.query, top_k);

        if self.json {
            return print_json(&serde_json::json!({
                "document": document.name,
                "chunks": index.len(),
                "query": self.query,
                "results": results,
            }));
        }

        for result in &results {
            println!(
                "[chunk {} | score {:.4}]\n{}\n",
                result.index + 1,
                result.score,
                result.text
            );
        }

        Ok(())
    }
}
