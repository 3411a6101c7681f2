// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `advisor-core::types`; this module
//! re-exports them and provides row-mapping helpers for enum columns.

use std::str::FromStr;

pub use advisor_core::types::{
    FileKind, KnowledgeDocument, KnowledgeEntry, Message, Role, Session, SessionStatus,
    SystemInstruction,
};

/// Parse a TEXT column into a strum-backed enum, surfacing bad data as a
/// rusqlite conversion error instead of a panic.
pub(crate) fn parse_enum_column<T>(idx: usize, raw: String) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
