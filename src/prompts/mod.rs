//! Generation prompts for the dataset-preparation phases
//!
//! Each phase sends the model two messages: a fixed generation instruction
//! and a prompt built from one case record. The examples written to the
//! output carry a separate per-phase system message.

pub mod phase1_prompt;
pub mod phase2_prompt;

use crate::cli::Phase;
use crate::prepare::records::CaseRecord;
use crate::providers::Message;

/// Builds the generation request for one record
///
/// # Arguments
///
/// * `phase` - Which dataset is being generated
/// * `record` - The case to describe
/// * `qa_pairs` - Number of Q&A pairs requested (phase 1 only)
///
/// # Examples
///
/// ```
/// use legalchat::cli::Phase;
/// use legalchat::prepare::records::CaseRecord;
/// use legalchat::prompts::build_generation_messages;
///
/// let record = CaseRecord::new("A_vs_B_1", "The appeal concerned a partition suit.");
/// let messages = build_generation_messages(Phase::Phase1, &record, 3);
/// assert_eq!(messages.len(), 2);
/// assert!(messages[1].content().contains("partition suit"));
/// ```
pub fn build_generation_messages(
    phase: Phase,
    record: &CaseRecord,
    qa_pairs: usize,
) -> Vec<Message> {
    match phase {
        Phase::Phase1 => vec![
            Message::system(phase1_prompt::PHASE1_GENERATION_INSTRUCTION),
            Message::human(phase1_prompt::generate_phase1_prompt(record, qa_pairs)),
        ],
        Phase::Phase2 => vec![
            Message::system(phase2_prompt::PHASE2_SYSTEM_MESSAGE),
            Message::human(phase2_prompt::generate_phase2_prompt(record)),
        ],
    }
}

/// System message placed first in every example written for `phase`
pub fn example_system_message(phase: Phase) -> &'static str {
    match phase {
        Phase::Phase1 => phase1_prompt::PHASE1_SYSTEM_MESSAGE,
        Phase::Phase2 => phase2_prompt::PHASE2_SYSTEM_MESSAGE,
    }
}

/// Joins a list field the way the prompts present it
pub(crate) fn join_list(items: &[String]) -> String {
    items.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Role;

    #[test]
    fn test_generation_messages_are_system_then_human() {
        let record = CaseRecord::new("A_vs_B_1", "S");
        for phase in [Phase::Phase1, Phase::Phase2] {
            let messages = build_generation_messages(phase, &record, 3);
            assert_eq!(messages[0].role(), Role::System);
            assert_eq!(messages[1].role(), Role::Human);
        }
    }

    #[test]
    fn test_example_system_messages_differ_per_phase() {
        assert_ne!(
            example_system_message(Phase::Phase1),
            example_system_message(Phase::Phase2)
        );
        assert!(example_system_message(Phase::Phase2).contains("helpful and reliable"));
    }

    #[test]
    fn test_phase2_generation_instruction_is_its_system_message() {
        let record = CaseRecord::new("A_vs_B_1", "S");
        let messages = build_generation_messages(Phase::Phase2, &record, 3);
        assert_eq!(messages[0].content(), example_system_message(Phase::Phase2));
    }

    #[test]
    fn test_join_list() {
        assert_eq!(join_list(&[]), "");
        assert_eq!(
            join_list(&["res judicata".to_string(), "limitation".to_string()]),
            "res judicata, limitation"
        );
    }
}
