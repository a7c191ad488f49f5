//! Provider module for legalchat
//!
//! This module contains the chat model abstraction and the Azure OpenAI
//! implementation.

pub mod azure;
pub mod base;

pub use azure::AzureOpenAiProvider;
pub use base::{CompletionResponse, Message, Provider, Role, TokenUsage};

use crate::config::ProviderConfig;
use crate::error::{LegalchatError, Result};

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if the provider type is unknown or the provider cannot be
/// initialized (missing endpoint, deployment, or credentials)
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "azure_openai" => Ok(Box::new(AzureOpenAiProvider::new(config.azure.clone())?)),
        other => Err(LegalchatError::Config(format!("Unknown provider type: {}", other)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AzureOpenAiConfig;

    #[test]
    fn test_create_provider_invalid_type() {
        let config = ProviderConfig {
            provider_type: "invalid".to_string(),
            azure: AzureOpenAiConfig::default(),
        };
        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn test_create_provider_azure() {
        let config = ProviderConfig {
            provider_type: "azure_openai".to_string(),
            azure: AzureOpenAiConfig {
                endpoint: "https://example.openai.azure.com".to_string(),
                api_key: Some("key".to_string()),
                deployment: "gpt-4o".to_string(),
                ..Default::default()
            },
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "gpt-4o");
    }

    #[test]
    fn test_create_provider_without_credentials_fails() {
        let config = ProviderConfig {
            provider_type: "azure_openai".to_string(),
            azure: AzureOpenAiConfig {
                endpoint: "https://example.openai.azure.com".to_string(),
                api_key: None,
                deployment: "gpt-4o".to_string(),
                ..Default::default()
            },
        };
        assert!(create_provider(&config).is_err());
    }
}
