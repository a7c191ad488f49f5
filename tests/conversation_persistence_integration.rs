use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use legalchat::error::LegalchatError;
use legalchat::providers::{create_provider, Message, Role};
use legalchat::storage::{MessageStore, SqliteStorage};
use legalchat::Responder;

mod common;

const SYSTEM_PROMPT: &str = "You are a legal assistant expert in Indian Supreme Court judgments.";

fn responder_for(server: &MockServer, store: Arc<dyn MessageStore>) -> Responder {
    let provider_config = legalchat::config::ProviderConfig {
        provider_type: "azure_openai".to_string(),
        azure: common::azure_config(&server.uri()),
    };
    let provider = create_provider(&provider_config).expect("provider");
    Responder::new(provider, store, SYSTEM_PROMPT)
}

#[tokio::test]
async fn test_chat_turn_persists_human_then_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::completion_body("The appeal was dismissed.")),
        )
        .mount(&server)
        .await;

    let (storage, _tmp) = common::create_temp_storage();
    let store = Arc::new(storage);
    let responder = responder_for(&server, store.clone());

    let reply = responder
        .respond("s1", "What was the outcome of case X?")
        .await
        .unwrap();
    assert_eq!(reply, "The appeal was dismissed.");

    let messages = store.replay("s1").unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message, Message::human("What was the outcome of case X?"));
    assert_eq!(messages[1].message, Message::assistant("The appeal was dismissed."));
    assert!(messages[0].timestamp < messages[1].timestamp);
}

/// History written in one process is replayed by the next one
#[tokio::test]
async fn test_history_survives_store_reopen() {
    let server = MockServer::start().await;

    // Array matching is prefix-based, so the longer second-turn prompt is
    // mounted first to take precedence.
    Mock::given(method("POST"))
        .and(path(common::COMPLETIONS_PATH))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": "Who were the parties?"},
                {"role": "assistant", "content": "Two brothers."},
                {"role": "user", "content": "What did they dispute?"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::completion_body("A family property.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(common::COMPLETIONS_PATH))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": "Who were the parties?"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::completion_body("Two brothers.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::TempDir::new().unwrap();
    let db_path = tmp.path().join("legal_db.sqlite");

    {
        let store = Arc::new(SqliteStorage::new_with_path(&db_path).unwrap());
        let responder = responder_for(&server, store);
        responder.respond("family", "Who were the parties?").await.unwrap();
    }

    let store = Arc::new(SqliteStorage::new_with_path(&db_path).unwrap());
    let responder = responder_for(&server, store.clone());
    let reply = responder
        .respond("family", "What did they dispute?")
        .await
        .unwrap();
    assert_eq!(reply, "A family property.");

    let roles: Vec<Role> = store
        .replay("family")
        .unwrap()
        .iter()
        .map(|m| m.message.role())
        .collect();
    assert_eq!(
        roles,
        vec![Role::Human, Role::Assistant, Role::Human, Role::Assistant]
    );
}

#[tokio::test]
async fn test_failed_turn_leaves_history_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let (storage, _tmp) = common::create_temp_storage();
    let store = Arc::new(storage);
    store.append("s", &Message::human("earlier")).unwrap();
    store.append("s", &Message::assistant("earlier reply")).unwrap();

    let responder = responder_for(&server, store.clone());
    let err = responder.respond("s", "new question").await.unwrap_err();
    assert!(matches!(
        LegalchatError::kind_of(&err),
        Some(LegalchatError::GenerationFailed(_))
    ));
    assert_eq!(store.replay("s").unwrap().len(), 2);
}

#[tokio::test]
async fn test_sessions_are_isolated_and_clearable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::completion_body("ok")))
        .mount(&server)
        .await;

    let (storage, _tmp) = common::create_temp_storage();
    let store = Arc::new(storage);
    let responder = responder_for(&server, store.clone());

    for _ in 0..3 {
        responder.respond("a", "question").await.unwrap();
    }
    responder.respond("b", "question").await.unwrap();

    assert_eq!(store.replay("a").unwrap().len(), 6);
    assert_eq!(store.replay("b").unwrap().len(), 2);

    store.clear("a").unwrap();
    store.clear("a").unwrap();
    assert!(store.replay("a").unwrap().is_empty());
    assert_eq!(store.replay("b").unwrap().len(), 2);
    assert!(store.replay("never-used").unwrap().is_empty());

    let sessions = store.list_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, "b");
}
