// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base entry queries.
//!
//! Tags are stored as a comma-joined TEXT column and parsed back into a
//! `Vec<String>` on read, matching the admin edit format.

use advisor_core::AdvisorError;
use advisor_core::types::{join_tags, parse_tags};
use rusqlite::{Row, params};
use uuid::Uuid;

use crate::database::Database;
use crate::models::KnowledgeEntry;
use crate::now_timestamp;

fn entry_from_row(row: &Row<'_>) -> Result<KnowledgeEntry, rusqlite::Error> {
    let raw_tags: Option<String> = row.get(4)?;
    Ok(KnowledgeEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        tags: raw_tags.map(|t| parse_tags(&t)).unwrap_or_default(),
        is_active: row.get(5)?,
        priority: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const ENTRY_COLUMNS: &str =
    "id, title, content, category, tags, is_active, priority, created_at, updated_at";

/// Insert a new knowledge entry and return it with its generated id.
pub async fn create_entry(
    db: &Database,
    title: &str,
    content: &str,
    category: Option<&str>,
    tags: &[String],
    priority: i64,
) -> Result<KnowledgeEntry, AdvisorError> {
    let id = Uuid::new_v4().to_string();
    let title = title.to_string();
    let content = content.to_string();
    let category = category.map(str::to_string);
    let tags = join_tags(tags);
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO knowledge_entries
                 (id, title, content, category, tags, is_active, priority, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?7)",
                params![id, title, content, category, tags, priority, now],
            )?;
            let entry = conn.query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM knowledge_entries WHERE id = ?1"),
                params![id],
                entry_from_row,
            )?;
            Ok(entry)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace an entry's editable fields. Returns the updated row, or `None`
/// when the id is unknown.
pub async fn update_entry(
    db: &Database,
    id: &str,
    title: &str,
    content: &str,
    category: Option<&str>,
    tags: &[String],
    priority: i64,
    is_active: bool,
) -> Result<Option<KnowledgeEntry>, AdvisorError> {
    let id = id.to_string();
    let title = title.to_string();
    let content = content.to_string();
    let category = category.map(str::to_string);
    let tags = join_tags(tags);
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE knowledge_entries
                 SET title = ?2, content = ?3, category = ?4, tags = ?5,
                     priority = ?6, is_active = ?7, updated_at = ?8
                 WHERE id = ?1",
                params![id, title, content, category, tags, priority, is_active, now],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let entry = conn.query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM knowledge_entries WHERE id = ?1"),
                params![id],
                entry_from_row,
            )?;
            Ok(Some(entry))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete an entry. Returns whether a row was removed.
pub async fn delete_entry(db: &Database, id: &str) -> Result<bool, AdvisorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM knowledge_entries WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All entries, newest update first. Admin listing.
pub async fn list_entries(db: &Database) -> Result<Vec<KnowledgeEntry>, AdvisorError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM knowledge_entries ORDER BY updated_at DESC"
            ))?;
            let rows = stmt.query_map([], entry_from_row)?;
            let entries = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active entries ordered for the retriever: priority first, then recency.
pub async fn list_active_entries(db: &Database) -> Result<Vec<KnowledgeEntry>, AdvisorError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM knowledge_entries
                 WHERE is_active = 1
                 ORDER BY priority DESC, updated_at DESC"
            ))?;
            let rows = stmt.query_map([], entry_from_row)?;
            let entries = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
