//! Azure OpenAI provider implementation for legalchat
//!
//! This module implements the Provider trait against an Azure OpenAI chat
//! completions deployment. One call sends the full ordered message list and
//! returns the first choice's text.

use crate::config::AzureOpenAiConfig;
use crate::error::{LegalchatError, Result};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Azure OpenAI chat completions provider
///
/// # Examples
///
/// ```no_run
/// use legalchat::config::AzureOpenAiConfig;
/// use legalchat::providers::{AzureOpenAiProvider, Message, Provider};
///
/// # async fn example() -> legalchat::error::Result<()> {
/// let config = AzureOpenAiConfig {
///     endpoint: "https://my-resource.openai.azure.com".to_string(),
///     api_key: Some("key".to_string()),
///     deployment: "gpt-4o".to_string(),
///     ..Default::default()
/// };
/// let provider = AzureOpenAiProvider::new(config)?;
/// let reply = provider.complete(&[Message::human("Hello!")]).await?;
/// println!("{}", reply.content);
/// # Ok(())
/// # }
/// ```
pub struct AzureOpenAiProvider {
    client: Client,
    config: AzureOpenAiConfig,
    api_key: String,
}

/// Request body for the chat completions endpoint
#[derive(Debug, Serialize)]
struct AzureRequest {
    messages: Vec<AzureMessage>,
    temperature: f32,
}

/// Wire message
#[derive(Debug, Serialize, Deserialize)]
struct AzureMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// Response body from the chat completions endpoint
#[derive(Debug, Deserialize)]
struct AzureResponse {
    #[serde(default)]
    choices: Vec<AzureChoice>,
    #[serde(default)]
    usage: Option<AzureUsage>,
}

#[derive(Debug, Deserialize)]
struct AzureChoice {
    message: AzureMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzureUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    error: AzureErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AzureErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

impl AzureOpenAiProvider {
    /// Create a new Azure OpenAI provider instance
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` when no API key is configured and
    /// `Config` when the endpoint or deployment is missing.
    pub fn new(config: AzureOpenAiConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(LegalchatError::Config(
                "Azure OpenAI endpoint is not set (AZURE_OPENAI_ENDPOINT)".to_string(),
            )
            .into());
        }

        if config.deployment.trim().is_empty() {
            return Err(LegalchatError::Config(
                "Azure OpenAI deployment is not set (AZURE_OPENAI_DEPLOYMENT_NAME)".to_string(),
            )
            .into());
        }

        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LegalchatError::MissingCredentials("azure_openai".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("legalchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                LegalchatError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "Initialized Azure OpenAI provider: endpoint={}, deployment={}, api_version={}",
            config.endpoint,
            config.deployment,
            config.api_version
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Full chat completions URL for the configured deployment
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::config::AzureOpenAiConfig;
    /// use legalchat::providers::AzureOpenAiProvider;
    ///
    /// let provider = AzureOpenAiProvider::new(AzureOpenAiConfig {
    ///     endpoint: "https://res.openai.azure.com/".to_string(),
    ///     api_key: Some("key".to_string()),
    ///     deployment: "legal-gpt".to_string(),
    ///     api_version: "2024-02-15-preview".to_string(),
    ///     ..Default::default()
    /// })
    /// .unwrap();
    /// assert_eq!(
    ///     provider.completions_url(),
    ///     "https://res.openai.azure.com/openai/deployments/legal-gpt/chat/completions?api-version=2024-02-15-preview"
    /// );
    /// ```
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }

    fn convert_messages(messages: &[Message]) -> Vec<AzureMessage> {
        messages
            .iter()
            .map(|m| AzureMessage {
                role: m.role().as_api_str().to_string(),
                content: Some(m.content().to_string()),
            })
            .collect()
    }

    fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<AzureErrorBody>(body) {
            Ok(parsed) => match parsed.error.code {
                Some(code) => format!("{} ({}): {}", status, code, parsed.error.message),
                None => format!("{}: {}", status, parsed.error.message),
            },
            Err(_) => format!("{}: {}", status, body),
        }
    }
}

#[async_trait]
impl Provider for AzureOpenAiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = AzureRequest {
            messages: Self::convert_messages(messages),
            temperature: self.config.temperature,
        };

        tracing::debug!(
            "Sending Azure OpenAI request: {} messages, deployment={}",
            request.messages.len(),
            self.config.deployment
        );

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Azure OpenAI request failed: {}", e);
                LegalchatError::GenerationFailed(format!("Azure OpenAI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = Self::describe_error(status, &error_text);
            tracing::error!("Azure OpenAI returned error {}", detail);
            return Err(LegalchatError::GenerationFailed(format!(
                "Azure OpenAI returned error {}",
                detail
            ))
            .into());
        }

        let azure_response: AzureResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Azure OpenAI response: {}", e);
            LegalchatError::GenerationFailed(format!(
                "Failed to parse Azure OpenAI response: {}",
                e
            ))
        })?;

        let choice = azure_response.choices.into_iter().next().ok_or_else(|| {
            LegalchatError::GenerationFailed("Azure OpenAI response has no choices".to_string())
        })?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(LegalchatError::GenerationFailed(
                "Azure OpenAI filtered the response content".to_string(),
            )
            .into());
        }

        let content = choice.message.content.ok_or_else(|| {
            LegalchatError::GenerationFailed("Azure OpenAI response has no content".to_string())
        })?;

        let response = match azure_response.usage {
            Some(usage) => {
                tracing::debug!(
                    "Azure OpenAI usage: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
                CompletionResponse::with_usage(
                    content,
                    TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
                )
            }
            None => CompletionResponse::new(content),
        };

        Ok(response)
    }

    fn model_name(&self) -> String {
        self.config.deployment.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AzureOpenAiConfig {
        AzureOpenAiConfig {
            endpoint: "https://example.openai.azure.com".to_string(),
            api_key: Some("test-key".to_string()),
            deployment: "legal-gpt".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = AzureOpenAiProvider::new(test_config()).unwrap();
        assert_eq!(provider.model_name(), "legal-gpt");
    }

    #[test]
    fn test_missing_api_key_is_missing_credentials() {
        let mut config = test_config();
        config.api_key = Some("   ".to_string());
        let err = match AzureOpenAiProvider::new(config) {
            Ok(_) => panic!("expected missing credentials"),
            Err(err) => err,
        };
        assert!(matches!(
            LegalchatError::kind_of(&err),
            Some(LegalchatError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let mut config = test_config();
        config.endpoint = String::new();
        assert!(AzureOpenAiProvider::new(config).is_err());
    }

    #[test]
    fn test_missing_deployment_is_config_error() {
        let mut config = test_config();
        config.deployment = " ".to_string();
        assert!(AzureOpenAiProvider::new(config).is_err());
    }

    #[test]
    fn test_completions_url_uses_default_api_version() {
        let provider = AzureOpenAiProvider::new(test_config()).unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://example.openai.azure.com/openai/deployments/legal-gpt/chat/completions?api-version=2025-01-01-preview"
        );
    }

    #[test]
    fn test_convert_messages_maps_roles() {
        let converted = AzureOpenAiProvider::convert_messages(&[
            Message::system("instructions"),
            Message::human("question"),
            Message::assistant("answer"),
        ]);
        let roles: Vec<&str> = converted.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(converted[1].content.as_deref(), Some("question"));
    }

    #[test]
    fn test_describe_error_uses_error_envelope() {
        let body = r#"{"error":{"code":"429","message":"Rate limit reached"}}"#;
        let detail =
            AzureOpenAiProvider::describe_error(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(detail.contains("Rate limit reached"));
        assert!(detail.contains("429"));
    }

    #[test]
    fn test_describe_error_falls_back_to_raw_body() {
        let detail =
            AzureOpenAiProvider::describe_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(detail.contains("upstream down"));
    }
}
