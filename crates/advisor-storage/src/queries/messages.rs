// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log queries.
//!
//! The log is append-only: rows are inserted and read, never updated or
//! deleted. Reads order by (timestamp, id) so that turns written within the
//! same millisecond still come back in insertion order.

use advisor_core::AdvisorError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{Message, Role, parse_enum_column};
use crate::now_timestamp;

fn message_from_row(row: &Row<'_>) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: parse_enum_column(2, row.get::<_, String>(2)?)?,
        message_text: row.get(3)?,
        timestamp: row.get(4)?,
        needs_human_help: row.get(5)?,
        confidence_score: row.get(6)?,
    })
}

const MESSAGE_COLUMNS: &str =
    "id, session_id, role, message_text, timestamp, needs_human_help, confidence_score";

/// Append a message to the log and bump the session's activity timestamp.
///
/// Returns the stored row including its assigned id.
pub async fn append_message(
    db: &Database,
    session_id: &str,
    role: Role,
    message_text: &str,
    needs_human_help: bool,
    confidence_score: Option<f64>,
) -> Result<Message, AdvisorError> {
    let session_id = session_id.to_string();
    let message_text = message_text.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages
                 (session_id, role, message_text, timestamp, needs_human_help, confidence_score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session_id,
                    role.to_string(),
                    message_text,
                    now,
                    needs_human_help,
                    confidence_score
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.execute(
                "UPDATE sessions SET last_activity_at = ?2 WHERE session_id = ?1",
                params![session_id, now],
            )?;
            let message = conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                message_from_row,
            )?;
            Ok(message)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a session's messages in log order, optionally only those after the
/// given cursor id. `after_id` of `None` returns the full history.
pub async fn list_messages(
    db: &Database,
    session_id: &str,
    after_id: Option<i64>,
) -> Result<Vec<Message>, AdvisorError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let cursor = after_id.unwrap_or(0);
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE session_id = ?1 AND id > ?2
                 ORDER BY timestamp ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![session_id, cursor], message_from_row)?;
            let messages = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the most recent `limit` messages for a session, oldest first.
///
/// Used for prompt history and stuck-session notification context.
pub async fn recent_messages(
    db: &Database,
    session_id: &str,
    limit: i64,
) -> Result<Vec<Message>, AdvisorError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM (
                     SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE session_id = ?1
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?2
                 ) ORDER BY timestamp ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![session_id, limit], message_from_row)?;
            let messages = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// First visitor message of a session, if any. Used for the first-contact
/// notification excerpt.
pub async fn first_user_message(
    db: &Database,
    session_id: &str,
) -> Result<Option<Message>, AdvisorError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let message = conn
                .query_row(
                    &format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE session_id = ?1 AND role = 'user'
                         ORDER BY timestamp ASC, id ASC LIMIT 1"
                    ),
                    params![session_id],
                    message_from_row,
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(message)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
