// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly: system instruction, knowledge block, recent history,
//! and the new visitor message.

use advisor_core::traits::{ChatPrompt, ChatTurn};
use advisor_core::types::Message;
use advisor_retrieval::KnowledgeBundle;

/// Used when no system instruction has ever been configured.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful course advisor for an education academy. \
    Answer questions about courses, enrollment, pricing, and schedules using the provided \
    knowledge. If you cannot answer from the knowledge provided, say so honestly.";

/// Builds the full prompt for one turn.
///
/// The knowledge block is folded into the system instruction so the model
/// treats it as grounding rather than conversation. Entries come before
/// document excerpts, each under its own label.
pub fn assemble(
    instruction: Option<&str>,
    knowledge: &KnowledgeBundle,
    history: &[Message],
    user_message: &str,
) -> ChatPrompt {
    let mut system = instruction.unwrap_or(DEFAULT_INSTRUCTION).to_string();

    if !knowledge.is_empty() {
        system.push_str("\n\nRelevant knowledge:");
        for item in &knowledge.entries {
            system.push_str(&format!("\n[Entry] {}: {}", item.title, item.excerpt));
        }
        for item in &knowledge.documents {
            system.push_str(&format!("\n[Document] {}: {}", item.title, item.excerpt));
        }
    }

    ChatPrompt {
        system_instruction: Some(system),
        history: history
            .iter()
            .map(|m| ChatTurn {
                role: m.role,
                text: m.message_text.clone(),
            })
            .collect(),
        user_message: user_message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::types::Role;
    use advisor_retrieval::KnowledgeContext;

    fn message(role: Role, text: &str) -> Message {
        Message {
            id: 1,
            session_id: "s1".into(),
            role,
            message_text: text.into(),
            timestamp: "2026-01-01T00:00:00.000Z".into(),
            needs_human_help: false,
            confidence_score: None,
        }
    }

    #[test]
    fn falls_back_to_default_instruction() {
        let prompt = assemble(None, &KnowledgeBundle::default(), &[], "hi");
        assert_eq!(prompt.system_instruction.as_deref(), Some(DEFAULT_INSTRUCTION));
        assert!(prompt.history.is_empty());
        assert_eq!(prompt.user_message, "hi");
    }

    #[test]
    fn knowledge_block_lists_entries_before_documents() {
        let knowledge = KnowledgeBundle {
            entries: vec![KnowledgeContext {
                title: "Pricing".into(),
                excerpt: "Plans start at 99.".into(),
                category: None,
            }],
            documents: vec![KnowledgeContext {
                title: "Syllabus".into(),
                excerpt: "Week one covers basics.".into(),
                category: None,
            }],
        };

        let prompt = assemble(Some("Be brief."), &knowledge, &[], "price?");
        let system = prompt.system_instruction.unwrap();
        assert!(system.starts_with("Be brief."));
        let entry_pos = system.find("[Entry] Pricing").unwrap();
        let doc_pos = system.find("[Document] Syllabus").unwrap();
        assert!(entry_pos < doc_pos);
    }

    #[test]
    fn history_becomes_ordered_turns() {
        let history = vec![
            message(Role::User, "hello"),
            message(Role::Model, "hi, how can I help?"),
        ];
        let prompt = assemble(None, &KnowledgeBundle::default(), &history, "a question");
        assert_eq!(prompt.history.len(), 2);
        assert_eq!(prompt.history[0].role, Role::User);
        assert_eq!(prompt.history[1].text, "hi, how can I help?");
    }
}
