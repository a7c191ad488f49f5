//! Base provider trait and common types for legalchat
//!
//! This module defines the Provider trait that the model backend implements,
//! along with the role-tagged message type shared by the responder, the
//! message store, and the batch jobs.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instruction placed at the head of every prompt
    System,
    /// The person chatting with the assistant
    Human,
    /// The model
    Assistant,
}

impl Role {
    /// Discriminant written to the `type` column of the chat history store
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::providers::Role;
    ///
    /// assert_eq!(Role::Assistant.as_type_str(), "ai");
    /// assert_eq!(Role::from_type_str("human"), Some(Role::Human));
    /// ```
    pub fn as_type_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "human",
            Role::Assistant => "ai",
        }
    }

    /// Parse a stored `type` discriminant
    ///
    /// Accepts the chat-API spellings (`user`, `assistant`) as aliases so rows
    /// written by other tools replay correctly.
    pub fn from_type_str(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Role::System),
            "human" | "user" => Some(Role::Human),
            "ai" | "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    /// Role name used on the chat completions wire format
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::Human => write!(f, "human"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single conversation message
///
/// Each variant carries the message text. Serialized as
/// `{"role": "...", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    /// System instruction
    System(String),
    /// Human turn
    Human(String),
    /// Assistant turn
    Assistant(String),
}

impl Message {
    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::providers::{Message, Role};
    ///
    /// let msg = Message::system("You are a legal assistant");
    /// assert_eq!(msg.role(), Role::System);
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Message::System(content.into())
    }

    /// Creates a new human message
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::providers::{Message, Role};
    ///
    /// let msg = Message::human("What was the outcome?");
    /// assert_eq!(msg.role(), Role::Human);
    /// assert_eq!(msg.content(), "What was the outcome?");
    /// ```
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human(content.into())
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant(content.into())
    }

    /// Build a message from a role and its text
    pub fn from_parts(role: Role, content: impl Into<String>) -> Self {
        match role {
            Role::System => Message::System(content.into()),
            Role::Human => Message::Human(content.into()),
            Role::Assistant => Message::Assistant(content.into()),
        }
    }

    /// The speaker of this message
    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::Human(_) => Role::Human,
            Message::Assistant(_) => Role::Assistant,
        }
    }

    /// The message text
    pub fn content(&self) -> &str {
        match self {
            Message::System(c) | Message::Human(c) | Message::Assistant(c) => c,
        }
    }
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the model endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with reply text and optional token usage
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The reply text from the model
    pub content: String,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::providers::CompletionResponse;
    ///
    /// let response = CompletionResponse::new("The appeal was dismissed.");
    /// assert!(response.usage.is_none());
    /// ```
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(content: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            content: content.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for the chat model backend
///
/// A provider takes an ordered list of role-tagged messages and returns the
/// model's reply. Implementations report every failure (network, HTTP
/// status, quota, malformed body) as
/// [`LegalchatError::GenerationFailed`](crate::error::LegalchatError::GenerationFailed).
///
/// # Examples
///
/// ```no_run
/// use legalchat::providers::{Provider, Message, CompletionResponse};
/// use legalchat::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
///         let last = messages.last().map(|m| m.content()).unwrap_or_default();
///         Ok(CompletionResponse::new(last))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation with the given messages
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse>;

    /// Name of the deployment or model answering requests
    fn model_name(&self) -> String {
        "unknown".to_string()
    }
}
