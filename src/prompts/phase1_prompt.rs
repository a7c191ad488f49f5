//! Phase-1 prompt: factual Q&A pairs from a case summary

use super::join_list;
use crate::config::LEGAL_ASSISTANT_PROMPT;
use crate::prepare::records::CaseRecord;

/// Instruction sent with every phase-1 generation request
pub const PHASE1_GENERATION_INSTRUCTION: &str = "You are a legal assistant expert in Indian Supreme Court judgments. Generate concise Q&A for factual fine-tuning.";

/// System message heading every phase-1 example
pub const PHASE1_SYSTEM_MESSAGE: &str = LEGAL_ASSISTANT_PROMPT;

/// Generates the phase-1 request for one record
///
/// The model is asked for `pairs` user/assistant exchanges returned as a
/// JSON list of message lists. Missing optional fields render as empty.
///
/// # Examples
///
/// ```
/// use legalchat::prepare::records::CaseRecord;
/// use legalchat::prompts::phase1_prompt::generate_phase1_prompt;
///
/// let mut record = CaseRecord::new("A_vs_B_1", "S");
/// record.acts_cited = vec!["Y Act".to_string()];
/// let prompt = generate_phase1_prompt(&record, 3);
/// assert!(prompt.contains("exactly 3 pairs"));
/// assert!(prompt.contains("ACTS CITED: Y Act"));
/// ```
pub fn generate_phase1_prompt(record: &CaseRecord, pairs: usize) -> String {
    format!(
        r#"Given the following case summary, generate exactly {pairs} pairs of question-answer messages to teach a model about this case.
Each pair should follow the OpenAI chat format with 'user' and 'assistant' roles and be returned as a JSON list of message lists.
Example format:
[ [{{"role": "user", "content": "Q1"}}, {{"role": "assistant", "content": "A1"}}], ... ]

SUMMARY:
{summary}

CASE TYPE: {case_type}
LEGAL ISSUES: {issues}
ACTS CITED: {acts}
FINAL OUTCOME: {outcome}"#,
        pairs = pairs,
        summary = record.summary,
        case_type = record.case_type.as_deref().unwrap_or(""),
        issues = join_list(&record.legal_issues),
        acts = join_list(&record.acts_cited),
        outcome = record.final_outcome.as_deref().unwrap_or(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> CaseRecord {
        CaseRecord {
            id: "A_vs_B_1".to_string(),
            summary: "The appellant challenged the partition decree.".to_string(),
            case_type: Some("Civil Appeal".to_string()),
            legal_issues: vec!["partition".to_string(), "limitation".to_string()],
            acts_cited: vec!["Hindu Succession Act".to_string()],
            final_outcome: Some("Appeal dismissed".to_string()),
        }
    }

    #[test]
    fn test_prompt_lists_all_fields() {
        let prompt = generate_phase1_prompt(&full_record(), 3);
        assert!(prompt.contains("SUMMARY:\nThe appellant challenged the partition decree."));
        assert!(prompt.contains("CASE TYPE: Civil Appeal"));
        assert!(prompt.contains("LEGAL ISSUES: partition, limitation"));
        assert!(prompt.contains("ACTS CITED: Hindu Succession Act"));
        assert!(prompt.contains("FINAL OUTCOME: Appeal dismissed"));
    }

    #[test]
    fn test_prompt_contains_format_example() {
        let prompt = generate_phase1_prompt(&full_record(), 3);
        assert!(prompt.contains(r#"[ [{"role": "user", "content": "Q1"}"#));
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let prompt = generate_phase1_prompt(&CaseRecord::new("x", "s"), 5);
        assert!(prompt.contains("exactly 5 pairs"));
        assert!(prompt.contains("CASE TYPE: \n"));
        assert!(prompt.ends_with("FINAL OUTCOME: "));
    }

    #[test]
    fn test_system_message_is_chat_prompt() {
        assert_eq!(
            PHASE1_SYSTEM_MESSAGE,
            "You are a legal assistant expert in Indian Supreme Court judgments."
        );
        assert!(PHASE1_GENERATION_INSTRUCTION.starts_with(PHASE1_SYSTEM_MESSAGE));
    }
}
