//! Configuration management for AIPA.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.aipa/config.yaml` or `AIPA_CONFIG`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 4] = ["openai", "deepseek", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .aipa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("openai", "deepseek", "ollama")
    pub provider: String,

    /// Model identifier for the active provider
    pub model: String,

    /// API key override for the active provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider table from config.yaml
    pub llm: Option<LlmConfig>,

    /// Chat and retrieval defaults
    pub chat: ChatSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
///
/// The provider kind is the key under `llm.providers`; hosted providers name
/// the environment variable holding their key instead of the key itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub model: String,

    #[serde(rename = "apiKeyEnv", default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Defaults for the assistant session and document retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Assistant persona: "chatty", "coder" or "pro"
    pub mode: String,

    /// Whether conversation memory starts enabled
    pub memory: bool,

    /// Number of past messages replayed when memory is enabled, rounded down
    /// to whole exchanges
    #[serde(rename = "memoryWindow")]
    pub memory_window: usize,

    /// Words per document chunk
    #[serde(rename = "chunkWords")]
    pub chunk_words: usize,

    /// Chunks retrieved per question
    #[serde(rename = "topK")]
    pub top_k: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            mode: "pro".to_string(),
            memory: false,
            memory_window: 20,
            chunk_words: 300,
            top_k: 4,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    chat: Option<ChatSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-5-mini".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            chat: ChatSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `AIPA_WORKSPACE`: Override workspace path
    /// - `AIPA_CONFIG`: Path to config file
    /// - `AIPA_PROVIDER`: LLM provider
    /// - `AIPA_MODEL`: Model identifier
    /// - `AIPA_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`load`](Self::load), with the workspace and config file chosen
    /// up front so the right YAML file is read.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match workspace {
            Some(workspace) => config.workspace = workspace,
            None => {
                if let Ok(workspace) = std::env::var("AIPA_WORKSPACE") {
                    config.workspace = PathBuf::from(workspace);
                }
            }
        }

        config.config_file =
            config_file.or_else(|| std::env::var("AIPA_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.aipa_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Ok(provider) = std::env::var("AIPA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("AIPA_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("AIPA_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(chat) = config_file.chat {
            result.chat = chat;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model.clone();
            }
            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            // A provider switch without an explicit model picks up that provider's model.
            if model.is_none() {
                self.model = self
                    .get_provider_config(&provider)
                    .map(|pc| pc.model)
                    .unwrap_or_else(|| default_model(&provider).to_string());
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .aipa directory.
    pub fn aipa_dir(&self) -> PathBuf {
        self.workspace.join(".aipa")
    }

    /// Get a provider's configuration, if the config file declares one.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Endpoint override for a provider, if configured.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider).and_then(|pc| pc.endpoint)
    }

    /// Resolve the API key for a provider.
    ///
    /// `AIPA_API_KEY` wins, then the env var named by `apiKeyEnv`, then the
    /// conventional `<PROVIDER>_API_KEY` variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = self
            .get_provider_config(provider)
            .and_then(|pc| pc.api_key_env)
            .unwrap_or_else(|| default_key_env(provider));

        std::env::var(env_var).ok()
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        let keyless = matches!(provider.as_str(), "ollama" | "mock");
        if !keyless && self.resolve_api_key(&provider).is_none() {
            let env_var = self
                .get_provider_config(&provider)
                .and_then(|pc| pc.api_key_env)
                .unwrap_or_else(|| default_key_env(&provider));
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                env_var
            )));
        }

        if self.chat.chunk_words == 0 {
            return Err(AppError::Config("chat.chunkWords must be positive".to_string()));
        }

        Ok(())
    }
}

/// Model used when neither the config file nor the CLI names one.
pub fn default_model(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "deepseek" => "deepseek-chat",
        "ollama" => "llama3.2",
        _ => "gpt-5-mini",
    }
}

fn default_key_env(provider: &str) -> String {
    format!("{}_API_KEY", provider.to_uppercase())
}
