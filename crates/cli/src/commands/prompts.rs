//! Prompts command handler.
//!
//! Lists prompt templates and shows their source.

use super::print_json;
use aipa_core::{config::AppConfig, AppResult};
use aipa_prompt::{list_prompts, load_prompt};
use clap::Args;

/// List the available prompt templates
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Print the template of this prompt
    #[arg(long)]
    pub show: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        if let Some(ref id) = self.show {
            let definition = load_prompt(&config.workspace, id)?;
            if self.json {
                return print_json(&definition);
            }
            println!("# {} ({})\n\n{}", definition.title, definition.id, definition.template);
            return Ok(());
        }

        let ids = list_prompts(&config.workspace)?;
        if self.json {
            return print_json(&ids);
        }
        for id in ids {
            println!("{}", id);
        }
        Ok(())
    }
}
