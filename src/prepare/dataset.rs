//! Fine-tune example types and model-reply parsing

use crate::error::{LegalchatError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One chat message inside a fine-tune example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuneMessage {
    pub role: String,
    pub content: String,
    /// Training weight; only phase-2 assistant replies carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u8>,
}

impl FineTuneMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            weight: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// One output line: `{"messages": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuneExample {
    pub messages: Vec<FineTuneMessage>,
}

impl FineTuneExample {
    /// Prefix `turns` with the system message
    pub fn with_system(system: &str, turns: Vec<FineTuneMessage>) -> Self {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(FineTuneMessage::system(system));
        messages.extend(turns);
        Self { messages }
    }

    /// Serialize as a single JSONL line (no trailing newline)
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The document mirrored into the store
    pub fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Weight given to an assistant reply without a usable model-supplied one
pub const DEFAULT_WEIGHT: u8 = 1;

/// Remove a surrounding Markdown code fence
///
/// Handles both ```` ```json ```` and bare ```` ``` ```` openers. Text
/// without a leading fence is returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn generation_error(msg: impl Into<String>) -> anyhow::Error {
    LegalchatError::GenerationFailed(msg.into()).into()
}

/// Read `role` and `content` strings from a message object
fn message_fields(value: &Value) -> Option<(&str, &str)> {
    let role = value.get("role")?.as_str()?;
    let content = value.get("content")?.as_str()?;
    Some((role, content))
}

/// Parse a phase-1 reply into Q&A blocks
///
/// The reply must be a JSON list of message lists. Malformed blocks are
/// dropped with a warning; the well-formed rest are returned. Blocks come
/// back without the system message.
///
/// # Errors
///
/// Returns `GenerationFailed` when the reply is empty, is not JSON, or is
/// not a list.
pub fn parse_qa_blocks(raw: &str) -> Result<Vec<Vec<FineTuneMessage>>> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(generation_error("empty response"));
    }

    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| generation_error(format!("response is not valid JSON: {}", e)))?;

    let blocks = parsed
        .as_array()
        .ok_or_else(|| generation_error("response is not a list"))?;

    let mut result = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        match parse_qa_block(block) {
            Some(turns) => result.push(turns),
            None => tracing::warn!("Skipping malformed Q&A block {}", index),
        }
    }

    Ok(result)
}

fn parse_qa_block(block: &Value) -> Option<Vec<FineTuneMessage>> {
    let items = block.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| {
            let (role, content) = message_fields(item)?;
            Some(FineTuneMessage::new(role, content))
        })
        .collect()
}

/// Parse a phase-2 reply into one weighted conversation
///
/// The reply must be an object with a non-empty `messages` list. Model
/// supplied system messages are dropped. Every assistant reply gets its
/// weight when it is 0 or 1 and [`DEFAULT_WEIGHT`] otherwise; other roles
/// carry no weight.
///
/// # Errors
///
/// Returns `GenerationFailed` when the reply is empty, not JSON, not an
/// object with `messages`, or contains a message without string `role` and
/// `content`.
pub fn parse_conversation(raw: &str) -> Result<Vec<FineTuneMessage>> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(generation_error("empty response"));
    }

    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| generation_error(format!("response is not valid JSON: {}", e)))?;

    let messages = parsed
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| generation_error("response has no 'messages' list"))?;

    let mut turns = Vec::with_capacity(messages.len());
    for (index, item) in messages.iter().enumerate() {
        let (role, content) = message_fields(item)
            .ok_or_else(|| generation_error(format!("message {} lacks role or content", index)))?;

        match role {
            "system" => continue,
            "assistant" => {
                let weight = match item.get("weight").and_then(Value::as_u64) {
                    Some(w @ (0 | 1)) => w as u8,
                    _ => DEFAULT_WEIGHT,
                };
                turns.push(FineTuneMessage::new(role, content).with_weight(weight));
            }
            _ => turns.push(FineTuneMessage::new(role, content)),
        }
    }

    if turns.is_empty() {
        return Err(generation_error("conversation has no messages"));
    }

    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  [2]  "), "[2]");
        assert_eq!(strip_code_fences("```json\n[3]"), "[3]");
    }

    #[test]
    fn test_phase1_scenario_line() {
        let blocks = parse_qa_blocks(
            r#"[[{"role":"user","content":"Q1"},{"role":"assistant","content":"A1"}]]"#,
        )
        .unwrap();
        assert_eq!(blocks.len(), 1);

        let example = FineTuneExample::with_system("SYS", blocks[0].clone());
        assert_eq!(
            example.to_json_line().unwrap(),
            r#"{"messages":[{"role":"system","content":"SYS"},{"role":"user","content":"Q1"},{"role":"assistant","content":"A1"}]}"#
        );
    }

    #[test]
    fn test_phase1_fenced_reply() {
        let raw = "```json\n[[{\"role\":\"user\",\"content\":\"Q\"},{\"role\":\"assistant\",\"content\":\"A\"}],\n [{\"role\":\"user\",\"content\":\"Q2\"},{\"role\":\"assistant\",\"content\":\"A2\"}]]\n```";
        assert_eq!(parse_qa_blocks(raw).unwrap().len(), 2);
    }

    #[test]
    fn test_phase1_rejects_empty_and_non_list() {
        for raw in ["", "   ", "```json\n```", r#"{"messages": []}"#, "not json"] {
            let err = parse_qa_blocks(raw).unwrap_err();
            assert!(
                matches!(
                    LegalchatError::kind_of(&err),
                    Some(LegalchatError::GenerationFailed(_))
                ),
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_phase1_drops_malformed_blocks() {
        let raw = r#"[
            [{"role":"user","content":"Q1"},{"role":"assistant","content":"A1"}],
            "not a block",
            [],
            [{"role":"user"}],
            [{"role":"user","content":"Q2"},{"role":"assistant","content":"A2"}]
        ]"#;
        let blocks = parse_qa_blocks(raw).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1][0].content, "Q2");
    }

    #[test]
    fn test_phase2_weights() {
        let raw = r#"{"messages":[
            {"role":"user","content":"What was held?","weight":1},
            {"role":"assistant","content":"Appeal dismissed.","weight":0},
            {"role":"user","content":"Why?"},
            {"role":"assistant","content":"Because limitation had expired.","weight":1}
        ]}"#;
        let turns = parse_conversation(raw).unwrap();
        let weights: Vec<Option<u8>> = turns.iter().map(|m| m.weight).collect();
        assert_eq!(weights, vec![None, Some(0), None, Some(1)]);
    }

    #[test]
    fn test_phase2_invalid_or_missing_weight_defaults() {
        let raw = r#"{"messages":[
            {"role":"user","content":"Q"},
            {"role":"assistant","content":"A"},
            {"role":"user","content":"Q2"},
            {"role":"assistant","content":"A2","weight":7},
            {"role":"user","content":"Q3"},
            {"role":"assistant","content":"A3","weight":"0"}
        ]}"#;
        let turns = parse_conversation(raw).unwrap();
        assert_eq!(turns[1].weight, Some(DEFAULT_WEIGHT));
        assert_eq!(turns[3].weight, Some(DEFAULT_WEIGHT));
        assert_eq!(turns[5].weight, Some(DEFAULT_WEIGHT));
    }

    #[test]
    fn test_phase2_drops_model_system_message() {
        let raw = r#"```json
{"messages":[{"role":"system","content":"x"},{"role":"user","content":"Q"},{"role":"assistant","content":"A","weight":0}]}
```"#;
        let turns = parse_conversation(raw).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, "user");
    }

    #[test]
    fn test_phase2_rejects_bad_shapes() {
        for raw in [
            "",
            "[]",
            r#"{"conversation": []}"#,
            r#"{"messages": []}"#,
            r#"{"messages": [{"role": "user"}]}"#,
        ] {
            assert!(parse_conversation(raw).is_err(), "input {:?}", raw);
        }
    }

    #[test]
    fn test_example_document_matches_line() {
        let example = FineTuneExample::with_system(
            "SYS",
            vec![
                FineTuneMessage::new("user", "Q"),
                FineTuneMessage::new("assistant", "A").with_weight(0),
            ],
        );
        let doc = example.to_document().unwrap();
        assert_eq!(doc["messages"][2]["weight"], 0);
        assert!(doc["messages"][1].get("weight").is_none());
        let reparsed: Value = serde_json::from_str(&example.to_json_line().unwrap()).unwrap();
        assert_eq!(reparsed, doc);
    }
}
