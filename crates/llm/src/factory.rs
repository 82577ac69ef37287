//! LLM provider factory.
//!
//! Builds the client for a configured provider name, injecting the endpoint
//! override and API key resolved by the caller.

use crate::client::LlmClient;
use crate::providers::{MockLlmClient, OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use aipa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "deepseek", "ollama", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by the hosted providers
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or its API key is
/// missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let api_key = api_key.filter(|k| !k.trim().is_empty());
    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(AppError::Config(format!(
            "Provider '{}' requires an API key",
            provider_type.as_str()
        )));
    }

    tracing::debug!(
        "Creating {} client (endpoint: {})",
        provider_type.as_str(),
        endpoint.unwrap_or("default")
    );

    let key = api_key.unwrap_or_default();
    let client: Arc<dyn LlmClient> = match (provider_type, endpoint) {
        (ProviderType::OpenAi, None) => Arc::new(OpenAiClient::openai(key)),
        (ProviderType::DeepSeek, None) => Arc::new(OpenAiClient::deepseek(key)),
        (ProviderType::OpenAi | ProviderType::DeepSeek, Some(url)) => Arc::new(
            OpenAiClient::with_base_url(provider_type.as_str(), url, key),
        ),
        (ProviderType::Ollama, url) => Arc::new(OllamaClient::with_base_url(
            url.unwrap_or(crate::providers::ollama::OLLAMA_BASE_URL),
        )),
        (ProviderType::Mock, _) => Arc::new(MockLlmClient::new()),
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_deepseek_client() {
        let client = create_client("DeepSeek", None, Some("sk-test")).unwrap();
        assert_eq!(client.provider_name(), "deepseek");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, Some("  ")) {
            Err(err) => assert!(err.to_string().contains("requires an API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
