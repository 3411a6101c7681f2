// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System instruction history queries.
//!
//! Instruction versions are append-only; at most one row is active at a
//! time, and the flip happens inside a single transaction so readers never
//! observe zero or two active instructions.

use advisor_core::AdvisorError;
use rusqlite::{Row, params};
use uuid::Uuid;

use crate::database::Database;
use crate::models::SystemInstruction;
use crate::now_timestamp;

fn instruction_from_row(row: &Row<'_>) -> Result<SystemInstruction, rusqlite::Error> {
    Ok(SystemInstruction {
        id: row.get(0)?,
        instruction_text: row.get(1)?,
        is_active: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        created_by: row.get(5)?,
    })
}

const INSTRUCTION_COLUMNS: &str =
    "id, instruction_text, is_active, created_at, updated_at, created_by";

/// Insert a new instruction version and make it the single active one.
pub async fn insert_and_activate(
    db: &Database,
    instruction_text: &str,
    created_by: Option<&str>,
) -> Result<SystemInstruction, AdvisorError> {
    let id = Uuid::new_v4().to_string();
    let instruction_text = instruction_text.to_string();
    let created_by = created_by.map(str::to_string);
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE system_instructions SET is_active = 0, updated_at = ?1 WHERE is_active = 1",
                params![now],
            )?;
            tx.execute(
                "INSERT INTO system_instructions
                 (id, instruction_text, is_active, created_at, updated_at, created_by)
                 VALUES (?1, ?2, 1, ?3, ?3, ?4)",
                params![id, instruction_text, now, created_by],
            )?;
            let instruction = tx.query_row(
                &format!("SELECT {INSTRUCTION_COLUMNS} FROM system_instructions WHERE id = ?1"),
                params![id],
                instruction_from_row,
            )?;
            tx.commit()?;
            Ok(instruction)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Make an existing instruction version the single active one. Returns
/// whether the id was found.
pub async fn activate(db: &Database, id: &str) -> Result<bool, AdvisorError> {
    let id = id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let exists: i64 = tx.query_row(
                "SELECT COUNT(*) FROM system_instructions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Ok(false);
            }
            tx.execute(
                "UPDATE system_instructions SET is_active = 0, updated_at = ?1 WHERE is_active = 1",
                params![now],
            )?;
            tx.execute(
                "UPDATE system_instructions SET is_active = 1, updated_at = ?2 WHERE id = ?1",
                params![id, now],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The currently active instruction, if any.
pub async fn get_active(db: &Database) -> Result<Option<SystemInstruction>, AdvisorError> {
    db.connection()
        .call(move |conn| {
            let instruction = conn
                .query_row(
                    &format!(
                        "SELECT {INSTRUCTION_COLUMNS} FROM system_instructions WHERE is_active = 1"
                    ),
                    [],
                    instruction_from_row,
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(instruction)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Full version history, newest first.
pub async fn list_instructions(db: &Database) -> Result<Vec<SystemInstruction>, AdvisorError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {INSTRUCTION_COLUMNS} FROM system_instructions ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], instruction_from_row)?;
            let instructions = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(instructions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
