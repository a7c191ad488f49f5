//! Error types for legalchat
//!
//! This module defines the error kinds surfaced by the store, the model
//! provider, and the batch jobs, using `thiserror` for ergonomic error
//! handling.

use thiserror::Error;

/// Main error type for legalchat operations
///
/// Callers that need to react to a specific failure kind (for example the
/// chat loop recovering from a failed turn) classify an `anyhow::Error` with
/// [`LegalchatError::kind_of`] or `downcast_ref::<LegalchatError>()`.
#[derive(Error, Debug)]
pub enum LegalchatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backing store could not be opened, read, or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The model call failed or produced unusable output
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Batch input file is neither a JSON array nor newline-delimited JSON
    #[error("Input format error: {0}")]
    InputFormat(String),

    /// Missing credentials for the model endpoint
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LegalchatError {
    /// Returns the `LegalchatError` at the root of an `anyhow` chain, if any
    ///
    /// # Examples
    ///
    /// ```
    /// use legalchat::error::LegalchatError;
    ///
    /// let err: anyhow::Error = LegalchatError::GenerationFailed("quota".into()).into();
    /// assert!(matches!(
    ///     LegalchatError::kind_of(&err),
    ///     Some(LegalchatError::GenerationFailed(_))
    /// ));
    /// ```
    pub fn kind_of(err: &anyhow::Error) -> Option<&LegalchatError> {
        err.downcast_ref::<LegalchatError>()
            .or_else(|| err.chain().find_map(|e| e.downcast_ref::<LegalchatError>()))
    }

    /// True for failures that abort a single chat turn but not the session
    pub fn is_turn_recoverable(&self) -> bool {
        matches!(
            self,
            LegalchatError::GenerationFailed(_) | LegalchatError::StorageUnavailable(_)
        )
    }
}

/// Result type alias for legalchat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
