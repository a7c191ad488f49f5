//! Case-summary input records
//!
//! Input files are either a JSON array of records or newline-delimited JSON
//! with one record per line. Trimmed content starting with `[` selects the
//! array form.

use crate::error::{LegalchatError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// One case summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Unique case identifier, e.g. `A_vs_B_1`
    pub id: String,

    /// Free-text summary of the judgment
    pub summary: String,

    #[serde(default)]
    pub case_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub legal_issues: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub acts_cited: Vec<String>,

    #[serde(default)]
    pub final_outcome: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl CaseRecord {
    /// Create a record with only the required fields
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            case_type: None,
            legal_issues: Vec::new(),
            acts_cited: Vec::new(),
            final_outcome: None,
        }
    }
}

/// Read and parse an input file
///
/// # Errors
///
/// Returns `InputFormat` when the file cannot be read or any record fails to
/// parse. Parse errors carry the line and column.
pub fn load_records(path: &Path) -> Result<Vec<CaseRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        LegalchatError::InputFormat(format!("cannot read {}: {}", path.display(), e))
    })?;

    let records = parse_records(&content).map_err(|e| -> anyhow::Error {
        let detail = match LegalchatError::kind_of(&e) {
            Some(LegalchatError::InputFormat(msg)) => msg.clone(),
            _ => format!("{:#}", e),
        };
        LegalchatError::InputFormat(format!("{}: {}", path.display(), detail)).into()
    })?;

    tracing::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse input content in either supported layout
pub fn parse_records(content: &str) -> Result<Vec<CaseRecord>> {
    if content.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<CaseRecord>>(content).map_err(|e| -> anyhow::Error {
            LegalchatError::InputFormat(format!(
                "{} at line {}, column {}",
                e,
                e.line(),
                e.column()
            ))
            .into()
        })
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str::<CaseRecord>(line).map_err(|e| -> anyhow::Error {
                    LegalchatError::InputFormat(format!(
                        "{} at line {}, column {}",
                        e,
                        index + 1,
                        e.column()
                    ))
                    .into()
                })
            })
            .collect()
    }
}
