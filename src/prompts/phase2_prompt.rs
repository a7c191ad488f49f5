//! Phase-2 prompt: a weighted multi-turn conversation per case

use super::join_list;
use crate::prepare::records::CaseRecord;

/// Generation instruction and system message of every phase-2 example
pub const PHASE2_SYSTEM_MESSAGE: &str = "You are a helpful and reliable legal assistant trained on Indian Supreme Court judgments. Your task is to answer legal questions factually and clearly based on the provided case details.";

/// Generates the phase-2 request for one record
///
/// Asks for one conversation: a factual question and answer followed by a
/// reasoning follow-up and answer, returned as an object under `messages`
/// with `weight` 0 on factual replies and 1 on reasoning replies.
pub fn generate_phase2_prompt(record: &CaseRecord) -> String {
    format!(
        "Given the following Supreme Court judgment summary, simulate a multi-turn chat between a user and an assistant.\n\
         The user first asks a factual question. The assistant answers. Then the user asks a follow-up reasoning question.\n\
         Return the full conversation as a single JSON object under 'messages', including 'weight': 0 for factual and 1 for reasoning replies.\n\
         SUMMARY:\n{}\n\nLEGAL ISSUES: {}\nFINAL OUTCOME: {}",
        record.summary,
        join_list(&record.legal_issues),
        record.final_outcome.as_deref().unwrap_or(""),
    )
}
