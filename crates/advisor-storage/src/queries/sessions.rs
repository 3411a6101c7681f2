// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session queries.
//!
//! Sessions are created lazily on first message and never deleted by normal
//! flow; resolution and deactivation are soft state transitions.

use advisor_core::AdvisorError;
use rusqlite::{Row, params};

use crate::database::Database;
use crate::models::{Session, SessionStatus, parse_enum_column};
use crate::now_timestamp;

fn session_from_row(row: &Row<'_>) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        session_id: row.get(0)?,
        started_at: row.get(1)?,
        last_activity_at: row.get(2)?,
        is_active: row.get(3)?,
        telegram_notified: row.get(4)?,
        handoff_active: row.get(5)?,
        status: parse_enum_column(6, row.get::<_, String>(6)?)?,
    })
}

const SESSION_COLUMNS: &str = "session_id, started_at, last_activity_at, is_active, \
                               telegram_notified, handoff_active, status";

/// Create the session if it does not exist, then bump its activity timestamp.
///
/// Idempotent: concurrent calls for the same id produce exactly one row.
pub async fn ensure_session(db: &Database, session_id: &str) -> Result<Session, AdvisorError> {
    let session_id = session_id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO sessions (session_id, started_at, last_activity_at)
                 VALUES (?1, ?2, ?2)",
                params![session_id, now],
            )?;
            conn.execute(
                "UPDATE sessions SET last_activity_at = ?2 WHERE session_id = ?1",
                params![session_id, now],
            )?;
            let session = conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
                params![session_id],
                session_from_row,
            )?;
            Ok(session)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a session by id.
pub async fn get_session(
    db: &Database,
    session_id: &str,
) -> Result<Option<Session>, AdvisorError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let session = conn
                .query_row(
                    &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
                    params![session_id],
                    session_from_row,
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(session)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a session's status. Resolving also deactivates the session and
/// ends any human handoff.
pub async fn set_status(
    db: &Database,
    session_id: &str,
    status: SessionStatus,
) -> Result<bool, AdvisorError> {
    let session_id = session_id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let changed = match status {
                SessionStatus::Resolved => conn.execute(
                    "UPDATE sessions
                     SET status = ?2, is_active = 0, handoff_active = 0, last_activity_at = ?3
                     WHERE session_id = ?1",
                    params![session_id, status.to_string(), now],
                )?,
                _ => conn.execute(
                    "UPDATE sessions SET status = ?2, last_activity_at = ?3 WHERE session_id = ?1",
                    params![session_id, status.to_string(), now],
                )?,
            };
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Enable or disable human handoff for a session.
pub async fn set_handoff(
    db: &Database,
    session_id: &str,
    handoff: bool,
) -> Result<bool, AdvisorError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions SET handoff_active = ?2 WHERE session_id = ?1",
                params![session_id, handoff],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark the one-shot first-contact notification as sent.
pub async fn set_notified(db: &Database, session_id: &str) -> Result<bool, AdvisorError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions SET telegram_notified = 1 WHERE session_id = ?1",
                params![session_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List sessions, most recently active first, optionally filtered by status.
pub async fn list_sessions(
    db: &Database,
    status: Option<SessionStatus>,
    limit: i64,
) -> Result<Vec<Session>, AdvisorError> {
    db.connection()
        .call(move |conn| {
            let sessions = match status {
                Some(status) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = ?1
                         ORDER BY last_activity_at DESC LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![status.to_string(), limit], session_from_row)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SESSION_COLUMNS} FROM sessions
                         ORDER BY last_activity_at DESC LIMIT ?1"
                    ))?;
                    let rows = stmt.query_map(params![limit], session_from_row)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(sessions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
