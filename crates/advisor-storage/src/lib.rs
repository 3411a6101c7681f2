// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Advisor chat backend.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread; message ordering relies on the AUTOINCREMENT rowid plus the
//! stored timestamp, never on client-supplied ordering.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;

use chrono::{SecondsFormat, Utc};

/// Current UTC time as an RFC 3339 string with millisecond precision.
///
/// Lexical order of these strings matches chronological order, which the
/// message-log ordering invariant relies on.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
