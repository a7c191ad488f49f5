//! History-backed responder
//!
//! Turns one user utterance into one model reply while threading the
//! session's stored history through every call. The store is the only
//! source of truth: history is replayed on every turn and never cached.

use crate::error::{LegalchatError, Result};
use crate::providers::{Message, Provider};
use crate::storage::MessageStore;
use std::sync::Arc;

/// Wraps a provider with automatic history injection and persistence
pub struct Responder {
    provider: Box<dyn Provider>,
    store: Arc<dyn MessageStore>,
    system_prompt: String,
}

impl Responder {
    /// Create a responder
    ///
    /// # Arguments
    ///
    /// * `provider` - Model backend
    /// * `store` - Message store holding the chat history
    /// * `system_prompt` - Instruction placed before the history on every turn
    pub fn new(
        provider: Box<dyn Provider>,
        store: Arc<dyn MessageStore>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            system_prompt: system_prompt.into(),
        }
    }

    /// The store this responder persists to
    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// The instruction prepended to every prompt
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Prompt for one turn: system instruction, full history, new human turn
    pub fn build_prompt(&self, history: Vec<Message>, user_input: &str) -> Vec<Message> {
        let mut prompt = Vec::with_capacity(history.len() + 2);
        prompt.push(Message::system(self.system_prompt.as_str()));
        prompt.extend(history);
        prompt.push(Message::human(user_input));
        prompt
    }

    /// Produce a reply for `user_input` in `session_id`
    ///
    /// On success the human turn and then the reply are appended to the
    /// store, so history grows by exactly two messages.
    ///
    /// # Errors
    ///
    /// * `StorageUnavailable` if history cannot be replayed or appended
    /// * `GenerationFailed` if the model call fails or returns an empty
    ///   reply; nothing is written in that case
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use legalchat::config::Config;
    /// # use legalchat::providers::create_provider;
    /// # use legalchat::{Responder, SqliteStorage};
    /// # use std::sync::Arc;
    /// # tokio_test::block_on(async {
    /// let config = Config::default();
    /// let store = Arc::new(SqliteStorage::from_config(&config.storage).unwrap());
    /// let provider = create_provider(&config.provider).unwrap();
    /// let responder = Responder::new(provider, store, config.chat.system_prompt);
    ///
    /// let reply = responder.respond("session-1", "What is res judicata?").await.unwrap();
    /// println!("Bot: {}", reply);
    /// # });
    /// ```
    pub async fn respond(&self, session_id: &str, user_input: &str) -> Result<String> {
        let history: Vec<Message> = self
            .store
            .replay(session_id)?
            .into_iter()
            .map(|stored| stored.message)
            .collect();

        tracing::debug!(
            "Session {}: replayed {} messages",
            session_id,
            history.len()
        );

        let prompt = self.build_prompt(history, user_input);

        let completion = self
            .provider
            .complete(&prompt)
            .await
            .map_err(as_generation_failure)?;

        if let Some(usage) = completion.usage {
            tracing::debug!(
                "Session {}: {} prompt tokens, {} completion tokens",
                session_id,
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let reply = completion.content;
        if reply.trim().is_empty() {
            return Err(LegalchatError::GenerationFailed(
                "model returned an empty reply".to_string(),
            )
            .into());
        }

        self.store.append(session_id, &Message::human(user_input))?;
        self.store
            .append(session_id, &Message::assistant(reply.as_str()))?;

        Ok(reply)
    }
}

/// Keep an existing `GenerationFailed`, wrap anything else as one
fn as_generation_failure(err: anyhow::Error) -> anyhow::Error {
    match LegalchatError::kind_of(&err) {
        Some(LegalchatError::GenerationFailed(_)) => err,
        _ => LegalchatError::GenerationFailed(format!("{:#}", err)).into(),
    }
}
