// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core error and domain types for the Advisor chat backend.
//!
//! Every other crate in the workspace depends on this one for the shared
//! [`AdvisorError`] type and the session/message/knowledge domain model.

pub mod error;
pub mod replies;
pub mod traits;
pub mod types;

pub use error::AdvisorError;
pub use traits::{ChatPrompt, ChatProvider, ChatTurn};
pub use types::{
    FileKind, KnowledgeDocument, KnowledgeEntry, Message, Role, Session, SessionStatus,
    SystemInstruction, join_tags, parse_tags, MAX_DOCUMENT_BYTES,
};
