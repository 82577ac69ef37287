//! AIPA CLI
//!
//! Main entry point for the `aipa` command-line tool: an AI personal
//! assistant with document-grounded answers, mixed-content rendering and an
//! English word tutor.

mod commands;
mod output;

use aipa_core::{config::AppConfig, logging, AppResult};
use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, LearnCommand, PromptsCommand, RenderCommand, RetrieveCommand,
    ReviewCommand,
};
use std::path::PathBuf;

/// AIPA - AI personal assistant
#[derive(Parser, Debug)]
#[command(name = "aipa")]
#[command(about = "AI personal assistant with document-grounded answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "AIPA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "AIPA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, deepseek, ollama, mock)
    #[arg(short, long, global = true, env = "AIPA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "AIPA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split mixed text into prose, code, SQL, markup and math segments
    Render(RenderCommand),

    /// Show the document chunks most similar to a query
    Retrieve(RetrieveCommand),

    /// Ask a single question with optional context
    Ask(AskCommand),

    /// Interactive conversation
    Chat(ChatCommand),

    /// Learn an English word with an explanation and a quiz
    Learn(LearnCommand),

    /// Get gentle feedback on a piece of English writing
    Review(ReviewCommand),

    /// List the available prompt templates
    Prompts(PromptsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Render(_) => "render",
            Self::Retrieve(_) => "retrieve",
            Self::Ask(_) => "ask",
            Self::Chat(_) => "chat",
            Self::Learn(_) => "learn",
            Self::Review(_) => "review",
            Self::Prompts(_) => "prompts",
        }
    }

    /// Commands that never call a provider.
    fn is_offline(&self) -> bool {
        matches!(self, Self::Render(_) | Self::Retrieve(_) | Self::Prompts(_))
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from the chosen workspace
    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("AIPA CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    if !cli.command.is_offline() {
        config.validate()?;
    }

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Render(cmd) => cmd.execute(),
        Commands::Retrieve(cmd) => cmd.execute(&config),
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Learn(cmd) => cmd.execute(&config).await,
        Commands::Review(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
