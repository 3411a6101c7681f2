// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge document queries.
//!
//! The blob itself lives on disk under the configured documents directory;
//! rows here track metadata plus the extracted text the retriever consumes.

use advisor_core::AdvisorError;
use advisor_core::types::{join_tags, parse_tags};
use rusqlite::{Row, params};
use uuid::Uuid;

use crate::database::Database;
use crate::models::{FileKind, KnowledgeDocument, parse_enum_column};
use crate::now_timestamp;

fn document_from_row(row: &Row<'_>) -> Result<KnowledgeDocument, rusqlite::Error> {
    let raw_tags: Option<String> = row.get(7)?;
    Ok(KnowledgeDocument {
        id: row.get(0)?,
        title: row.get(1)?,
        file_path: row.get(2)?,
        file_kind: parse_enum_column(3, row.get::<_, String>(3)?)?,
        file_size: row.get(4)?,
        extracted_text: row.get(5)?,
        category: row.get(6)?,
        tags: raw_tags.map(|t| parse_tags(&t)).unwrap_or_default(),
        is_active: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const DOCUMENT_COLUMNS: &str = "id, title, file_path, file_kind, file_size, extracted_text, \
                                category, tags, is_active, created_at";

/// Record an uploaded document. Size and kind validation happens in the
/// gateway before the blob is written; this only persists metadata.
#[allow(clippy::too_many_arguments)]
pub async fn create_document(
    db: &Database,
    title: &str,
    file_path: &str,
    file_kind: FileKind,
    file_size: i64,
    extracted_text: Option<&str>,
    category: Option<&str>,
    tags: &[String],
) -> Result<KnowledgeDocument, AdvisorError> {
    let id = Uuid::new_v4().to_string();
    let title = title.to_string();
    let file_path = file_path.to_string();
    let extracted_text = extracted_text.map(str::to_string);
    let category = category.map(str::to_string);
    let tags = join_tags(tags);
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO knowledge_documents
                 (id, title, file_path, file_kind, file_size, extracted_text,
                  category, tags, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
                params![
                    id,
                    title,
                    file_path,
                    file_kind.to_string(),
                    file_size,
                    extracted_text,
                    category,
                    tags,
                    now
                ],
            )?;
            let document = conn.query_row(
                &format!("SELECT {DOCUMENT_COLUMNS} FROM knowledge_documents WHERE id = ?1"),
                params![id],
                document_from_row,
            )?;
            Ok(document)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a document by id.
pub async fn get_document(
    db: &Database,
    id: &str,
) -> Result<Option<KnowledgeDocument>, AdvisorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let document = conn
                .query_row(
                    &format!("SELECT {DOCUMENT_COLUMNS} FROM knowledge_documents WHERE id = ?1"),
                    params![id],
                    document_from_row,
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(document)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All documents, newest first.
pub async fn list_documents(db: &Database) -> Result<Vec<KnowledgeDocument>, AdvisorError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DOCUMENT_COLUMNS} FROM knowledge_documents ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], document_from_row)?;
            let documents = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(documents)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active documents with extracted text, for the retriever.
pub async fn list_retrievable_documents(
    db: &Database,
) -> Result<Vec<KnowledgeDocument>, AdvisorError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DOCUMENT_COLUMNS} FROM knowledge_documents
                 WHERE is_active = 1 AND extracted_text IS NOT NULL
                 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], document_from_row)?;
            let documents = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(documents)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a document row, returning its on-disk path so the caller can
/// remove the blob as well. `None` when the id is unknown.
pub async fn delete_document(db: &Database, id: &str) -> Result<Option<String>, AdvisorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let path: Option<String> = conn
                .query_row(
                    "SELECT file_path FROM knowledge_documents WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            if path.is_some() {
                conn.execute("DELETE FROM knowledge_documents WHERE id = ?1", params![id])?;
            }
            Ok(path)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_test_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("documents_test.db");
        Database::open(path.to_str().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn create_and_get_round_trips_metadata() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;

        let doc = create_document(
            &db,
            "Syllabus",
            "/var/lib/advisor/docs/syllabus.pdf",
            FileKind::Pdf,
            4096,
            Some("course outline text"),
            Some("courses"),
            &["syllabus".to_string()],
        )
        .await
        .unwrap();

        let fetched = get_document(&db, &doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.file_kind, FileKind::Pdf);
        assert_eq!(fetched.file_size, 4096);
        assert_eq!(fetched.extracted_text.as_deref(), Some("course outline text"));
        assert_eq!(fetched.tags, vec!["syllabus".to_string()]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn retrievable_listing_excludes_unextracted_documents() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;

        create_document(&db, "good", "/d/a.pdf", FileKind::Pdf, 10, Some("text"), None, &[])
            .await
            .unwrap();
        create_document(&db, "failed", "/d/b.docx", FileKind::Docx, 10, None, None, &[])
            .await
            .unwrap();

        let retrievable = list_retrievable_documents(&db).await.unwrap();
        assert_eq!(retrievable.len(), 1);
        assert_eq!(retrievable[0].title, "good");

        assert_eq!(list_documents(&db).await.unwrap().len(), 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_returns_the_blob_path() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;

        let doc = create_document(&db, "t", "/d/x.doc", FileKind::Doc, 1, None, None, &[])
            .await
            .unwrap();

        let path = delete_document(&db, &doc.id).await.unwrap();
        assert_eq!(path.as_deref(), Some("/d/x.doc"));
        assert!(delete_document(&db, &doc.id).await.unwrap().is_none());
        assert!(get_document(&db, &doc.id).await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
