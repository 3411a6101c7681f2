// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model shared across the Advisor workspace.
//!
//! Timestamps are RFC 3339 strings throughout; SQLite stores them as TEXT
//! and lexical order matches chronological order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum accepted size for an uploaded knowledge document (10 MiB).
pub const MAX_DOCUMENT_BYTES: i64 = 10 * 1024 * 1024;

/// Lifecycle status of a chat session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Default conversational state.
    Active,
    /// A low-confidence turn or escalation flagged this session for triage.
    NeedsHelp,
    /// Terminal state set by an operator; never re-triggers notification.
    Resolved,
}

/// Author of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The website visitor.
    User,
    /// The AI advisor.
    Model,
    /// A human operator replying through the escalation relay.
    Agent,
}

/// A visitor conversation session.
///
/// `session_id` is an opaque token generated client-side at first contact
/// and is immutable once created. Resolution is a soft state; rows are never
/// deleted by normal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub started_at: String,
    pub last_activity_at: String,
    pub is_active: bool,
    /// One-shot flag for the first-contact Telegram notification.
    pub telegram_notified: bool,
    /// When set, visitor messages bypass the LLM and go straight to the relay.
    pub handoff_active: bool,
    pub status: SessionStatus,
}

/// A single turn in a session. Append-only once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// AUTOINCREMENT rowid; breaks wall-clock timestamp ties and doubles as
    /// the polling cursor.
    pub id: i64,
    pub session_id: String,
    pub role: Role,
    pub message_text: String,
    pub timestamp: String,
    pub needs_human_help: bool,
    /// Heuristic confidence in [0, 1]; absent for visitor and operator turns.
    pub confidence_score: Option<f64>,
}

/// A curated knowledge-base entry consumed by the retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    /// Higher priority wins retrieval ties.
    pub priority: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Allow-listed kinds for uploaded knowledge documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Doc,
    Docx,
}

/// An uploaded document whose extracted text feeds the retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub title: String,
    pub file_path: String,
    pub file_kind: FileKind,
    pub file_size: i64,
    /// `None` when text extraction failed; such documents are never retrieved.
    pub extracted_text: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
}

/// One version of the AI system instruction. History is append-only; at most
/// one version is active at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInstruction {
    pub id: String,
    pub instruction_text: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: Option<String>,
}

/// Parse a comma-joined tag string from the admin edit form into a tag set.
///
/// `"a, b"` parses to `["a", "b"]`; empty segments are dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Join a tag set back into the comma-joined edit format.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_status_round_trips_through_strings() {
        assert_eq!(SessionStatus::NeedsHelp.to_string(), "needs_help");
        assert_eq!(
            SessionStatus::from_str("needs_help").unwrap(),
            SessionStatus::NeedsHelp
        );
        assert_eq!(SessionStatus::from_str("active").unwrap(), SessionStatus::Active);
        assert_eq!(
            SessionStatus::from_str("resolved").unwrap(),
            SessionStatus::Resolved
        );
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!(Role::from_str("user").is_ok());
        assert!(Role::from_str("model").is_ok());
        assert!(Role::from_str("agent").is_ok());
        assert!(Role::from_str("system").is_err());
    }

    #[test]
    fn file_kind_matches_extensions() {
        assert_eq!(FileKind::from_str("pdf").unwrap(), FileKind::Pdf);
        assert_eq!(FileKind::from_str("docx").unwrap(), FileKind::Docx);
        assert!(FileKind::from_str("exe").is_err());
    }

    #[test]
    fn tags_round_trip_through_edit_format() {
        let tags = vec!["a".to_string(), "b".to_string()];
        let joined = join_tags(&tags);
        assert_eq!(joined, "a, b");
        assert_eq!(parse_tags(&joined), tags);
    }

    #[test]
    fn parse_tags_drops_empty_segments() {
        assert_eq!(parse_tags("a,, b , "), vec!["a".to_string(), "b".to_string()]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ").is_empty());
    }
}
