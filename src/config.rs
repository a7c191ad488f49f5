//! Configuration management for legalchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{LegalchatError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure for legalchat
///
/// Holds everything the chat loop and the batch jobs need: the model
/// endpoint, the store location and collection names, the chat system
/// prompt, and the dataset-preparation file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model provider configuration
    pub provider: ProviderConfig,
    /// Store location and collection names
    #[serde(default)]
    pub storage: StorageConfig,
    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Dataset preparation settings
    #[serde(default)]
    pub prepare: PrepareConfig,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Azure OpenAI deployment configuration
    #[serde(default)]
    pub azure: AzureOpenAiConfig,
}

fn default_provider_type() -> String {
    "azure_openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            azure: AzureOpenAiConfig::default(),
        }
    }
}

/// Azure OpenAI deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    #[serde(default)]
    pub endpoint: String,

    /// API key; normally supplied through `AZURE_OPENAI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Deployment name the requests are routed to
    #[serde(default)]
    pub deployment: String,

    /// `api-version` query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Sampling temperature; kept low for repeatable answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_version() -> String {
    "2025-01-01-preview".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            deployment: String::new(),
            api_version: default_api_version(),
            temperature: default_temperature(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file; defaults to the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Collection names, one per logical purpose
    #[serde(default)]
    pub collections: CollectionsConfig,
}

/// Collection (table) names inside the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Chat turns of every session
    #[serde(default = "default_chat_history_collection")]
    pub chat_history: String,
    /// Phase-1 fine-tune examples
    #[serde(default = "default_phase1_collection")]
    pub phase1: String,
    /// Phase-1 examples produced in test mode
    #[serde(default = "default_phase1_test_collection")]
    pub phase1_test: String,
    /// Phase-2 fine-tune examples
    #[serde(default = "default_phase2_collection")]
    pub phase2: String,
    /// Phase-2 examples produced in test mode
    #[serde(default = "default_phase2_test_collection")]
    pub phase2_test: String,
}

fn default_chat_history_collection() -> String {
    "legal_chat_history".to_string()
}

fn default_phase1_collection() -> String {
    "phase1_finetune".to_string()
}

fn default_phase1_test_collection() -> String {
    "phase1_test".to_string()
}

fn default_phase2_collection() -> String {
    "phase2_finetune".to_string()
}

fn default_phase2_test_collection() -> String {
    "phase2_test".to_string()
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            chat_history: default_chat_history_collection(),
            phase1: default_phase1_collection(),
            phase1_test: default_phase1_test_collection(),
            phase2: default_phase2_collection(),
            phase2_test: default_phase2_test_collection(),
        }
    }
}

impl CollectionsConfig {
    fn all(&self) -> [&str; 5] {
        [
            &self.chat_history,
            &self.phase1,
            &self.phase1_test,
            &self.phase2,
            &self.phase2_test,
        ]
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Instruction placed before the history on every turn
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

/// Instruction shared by the chat assistant and the fine-tune examples
pub const LEGAL_ASSISTANT_PROMPT: &str =
    "You are a legal assistant expert in Indian Supreme Court judgments.";

fn default_system_prompt() -> String {
    LEGAL_ASSISTANT_PROMPT.to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

/// How batch jobs treat an existing output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Add new lines after existing content; reruns accumulate duplicates
    #[default]
    Append,
    /// Start every run from an empty file
    Truncate,
}

impl FromStr for OutputMode {
    type Err = LegalchatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(OutputMode::Append),
            "truncate" => Ok(OutputMode::Truncate),
            other => Err(LegalchatError::Config(format!(
                "Invalid output mode: {}. Must be one of: append, truncate",
                other
            ))),
        }
    }
}

/// Dataset preparation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Phase-1 case-summary input (JSON array or newline-delimited JSON)
    #[serde(default = "default_phase1_input")]
    pub phase1_input: PathBuf,

    /// Phase-2 case-summary input
    #[serde(default = "default_phase2_input")]
    pub phase2_input: PathBuf,

    /// Phase-1 output file
    #[serde(default = "default_phase1_output")]
    pub phase1_output: PathBuf,

    /// Phase-1 output file in test mode
    #[serde(default = "default_phase1_test_output")]
    pub phase1_test_output: PathBuf,

    /// Phase-2 output file
    #[serde(default = "default_phase2_output")]
    pub phase2_output: PathBuf,

    /// Phase-2 output file in test mode
    #[serde(default = "default_phase2_test_output")]
    pub phase2_test_output: PathBuf,

    /// The only record processed in test mode
    #[serde(default = "default_test_record_id")]
    pub test_record_id: String,

    /// Append to or truncate existing output files
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Q&A pairs requested per case in phase 1
    #[serde(default = "default_qa_pairs")]
    pub qa_pairs_per_record: usize,
}

fn default_phase1_input() -> PathBuf {
    PathBuf::from("fixed_remaining.json")
}

fn default_phase2_input() -> PathBuf {
    PathBuf::from("fixed.json")
}

fn default_phase1_output() -> PathBuf {
    PathBuf::from("scjm_ft_phase1.jsonl")
}

fn default_phase1_test_output() -> PathBuf {
    PathBuf::from("test_phase1.jsonl")
}

fn default_phase2_output() -> PathBuf {
    PathBuf::from("scjm_ft_phase2.jsonl")
}

fn default_phase2_test_output() -> PathBuf {
    PathBuf::from("test_phase2.jsonl")
}

/// Record id processed by `--test` runs
pub const DEFAULT_TEST_RECORD_ID: &str =
    "Ramakant_Ambalal_Choksi_vs_Harish_Ambalal_Choksi_on_22_November_2024_1";

fn default_test_record_id() -> String {
    DEFAULT_TEST_RECORD_ID.to_string()
}

fn default_qa_pairs() -> usize {
    3
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            phase1_input: default_phase1_input(),
            phase2_input: default_phase2_input(),
            phase1_output: default_phase1_output(),
            phase1_test_output: default_phase1_test_output(),
            phase2_output: default_phase2_output(),
            phase2_test_output: default_phase2_test_output(),
            test_record_id: default_test_record_id(),
            output_mode: OutputMode::default(),
            qa_pairs_per_record: default_qa_pairs(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LegalchatError::Config(format!("Failed to read config file: {}", e)))?;
        let config: Self = serde_yaml::from_str(&contents)
            .map_err(LegalchatError::Yaml)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        let azure = &mut self.provider.azure;

        if let Ok(endpoint) = std::env::var("AZURE_OPENAI_ENDPOINT") {
            azure.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("AZURE_OPENAI_API_KEY") {
            azure.api_key = Some(api_key);
        }

        if let Ok(deployment) = std::env::var("AZURE_OPENAI_DEPLOYMENT_NAME") {
            azure.deployment = deployment;
        }

        if let Ok(api_version) = std::env::var("AZURE_OPENAI_API_VERSION") {
            azure.api_version = api_version;
        }

        if let Ok(temperature) = std::env::var("LEGALCHAT_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                azure.temperature = value;
            } else {
                tracing::warn!("Invalid LEGALCHAT_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(store_path) = std::env::var("LEGALCHAT_STORE_PATH") {
            self.storage.path = Some(PathBuf::from(store_path));
        }

        if let Ok(prompt) = std::env::var("LEGALCHAT_SYSTEM_PROMPT") {
            self.chat.system_prompt = prompt;
        }

        if let Ok(input) = std::env::var("LEGALCHAT_INPUT") {
            self.prepare.phase1_input = PathBuf::from(&input);
            self.prepare.phase2_input = PathBuf::from(input);
        }

        if let Ok(mode) = std::env::var("LEGALCHAT_OUTPUT_MODE") {
            match mode.parse() {
                Ok(value) => self.prepare.output_mode = value,
                Err(e) => tracing::warn!("Ignoring LEGALCHAT_OUTPUT_MODE: {}", e),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.storage_path {
            tracing::info!("Using store override from CLI: {}", path);
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    ///
    /// Checks ranges and names. Presence of the endpoint, deployment, and
    /// API key is checked when the provider is built, so commands that never
    /// call the model (such as `history`) work without credentials.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["azure_openai"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(LegalchatError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        let azure = &self.provider.azure;
        if !azure.endpoint.is_empty() {
            url::Url::parse(&azure.endpoint).map_err(|e| {
                LegalchatError::Config(format!(
                    "Invalid Azure OpenAI endpoint {}: {}",
                    azure.endpoint, e
                ))
            })?;
        }

        if azure.api_version.trim().is_empty() {
            return Err(
                LegalchatError::Config("api_version cannot be empty".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&azure.temperature) {
            return Err(LegalchatError::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if azure.timeout_seconds == 0 {
            return Err(
                LegalchatError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        for name in self.storage.collections.all() {
            if !is_valid_collection_name(name) {
                return Err(LegalchatError::Config(format!(
                    "Invalid collection name: {:?}. Use letters, digits and underscores",
                    name
                ))
                .into());
            }
        }

        if self.chat.system_prompt.trim().is_empty() {
            return Err(
                LegalchatError::Config("chat.system_prompt cannot be empty".to_string()).into(),
            );
        }

        if self.prepare.qa_pairs_per_record == 0 {
            return Err(LegalchatError::Config(
                "prepare.qa_pairs_per_record must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

/// Collection names become SQLite table names, so only a safe subset is allowed
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
            chat: ChatConfig::default(),
            prepare: PrepareConfig::default(),
        }
    }
}
