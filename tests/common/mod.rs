use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use legalchat::config::{AzureOpenAiConfig, Config};
use legalchat::storage::SqliteStorage;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SqliteStorage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("legal_db.sqlite");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Azure settings pointing at a mock server
#[allow(dead_code)]
pub fn azure_config(endpoint: &str) -> AzureOpenAiConfig {
    AzureOpenAiConfig {
        endpoint: endpoint.to_string(),
        api_key: Some("test-key".to_string()),
        deployment: "legal-gpt".to_string(),
        api_version: "2024-02-15-preview".to_string(),
        timeout_seconds: 5,
        ..Default::default()
    }
}

/// Full configuration with every file and the store under `dir`
#[allow(dead_code)]
pub fn config_in(dir: &TempDir, endpoint: &str) -> Config {
    let mut config = Config::default();
    config.provider.azure = azure_config(endpoint);
    config.storage.path = Some(dir.path().join("legal_db.sqlite"));
    config.prepare.phase1_output = dir.path().join("scjm_ft_phase1.jsonl");
    config.prepare.phase1_test_output = dir.path().join("test_phase1.jsonl");
    config.prepare.phase2_output = dir.path().join("scjm_ft_phase2.jsonl");
    config.prepare.phase2_test_output = dir.path().join("test_phase2.jsonl");
    config
}

/// Chat completions body with a single choice
#[allow(dead_code)]
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
    })
}

/// Path the provider posts to for the `legal-gpt` deployment
#[allow(dead_code)]
pub const COMPLETIONS_PATH: &str = "/openai/deployments/legal-gpt/chat/completions";
