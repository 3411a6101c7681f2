// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge retriever: scans active entries and extracted document text,
//! scores them lexically, and hands back excerpts for prompt assembly.

use advisor_core::AdvisorError;
use advisor_core::types::{KnowledgeDocument, KnowledgeEntry};
use advisor_storage::Database;
use advisor_storage::queries::{documents, knowledge};
use tracing::debug;

use crate::scorer::{excerpt, query_terms, score_text};

/// Retrieval limits, taken from the chat section of the config.
#[derive(Debug, Clone, Copy)]
pub struct RetrieverParams {
    /// Max curated entries returned per query.
    pub retrieval_limit: usize,
    /// Max documents returned per query.
    pub document_limit: usize,
    /// Excerpt length cap in characters.
    pub excerpt_max_chars: usize,
}

/// One retrieved snippet ready for prompt assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeContext {
    pub title: String,
    pub excerpt: String,
    pub category: Option<String>,
}

/// Result of one retrieval pass. Entries and documents stay separate so the
/// prompt can present them under distinct labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBundle {
    pub entries: Vec<KnowledgeContext>,
    pub documents: Vec<KnowledgeContext>,
}

impl KnowledgeBundle {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.documents.is_empty()
    }
}

/// Lexical retriever over the knowledge base.
pub struct Retriever {
    db: Database,
    params: RetrieverParams,
}

impl Retriever {
    pub fn new(db: Database, params: RetrieverParams) -> Self {
        Self { db, params }
    }

    /// Retrieve the best-matching entries and documents for a query.
    ///
    /// Zero-score candidates are dropped entirely; an empty or all-stop-word
    /// query returns nothing rather than the whole knowledge base.
    pub async fn retrieve(&self, query: &str) -> Result<KnowledgeBundle, AdvisorError> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(KnowledgeBundle::default());
        }

        let entries = knowledge::list_active_entries(&self.db).await?;
        let docs = documents::list_retrievable_documents(&self.db).await?;

        let bundle = KnowledgeBundle {
            entries: self.rank_entries(&entries, &terms),
            documents: self.rank_documents(&docs, &terms),
        };

        debug!(
            query_terms = terms.len(),
            entries = bundle.entries.len(),
            documents = bundle.documents.len(),
            "knowledge retrieval complete"
        );
        Ok(bundle)
    }

    /// Score curated entries over title, content, and tags. Ties break on
    /// priority, then on most recent update; the active listing already
    /// delivers candidates in that order, so a stable sort preserves it.
    fn rank_entries(&self, entries: &[KnowledgeEntry], terms: &[String]) -> Vec<KnowledgeContext> {
        let mut scored: Vec<(u32, &KnowledgeEntry)> = entries
            .iter()
            .filter_map(|entry| {
                let haystack = format!(
                    "{} {} {}",
                    entry.title.to_lowercase(),
                    entry.content.to_lowercase(),
                    entry.tags.join(" ").to_lowercase()
                );
                let score = score_text(&haystack, terms);
                (score > 0).then_some((score, entry))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(self.params.retrieval_limit)
            .map(|(_, entry)| KnowledgeContext {
                title: entry.title.clone(),
                excerpt: excerpt(&entry.content, self.params.excerpt_max_chars),
                category: entry.category.clone(),
            })
            .collect()
    }

    /// Score documents over title and extracted text. Documents without
    /// extracted text never reach this point.
    fn rank_documents(
        &self,
        docs: &[KnowledgeDocument],
        terms: &[String],
    ) -> Vec<KnowledgeContext> {
        let mut scored: Vec<(u32, &KnowledgeDocument)> = docs
            .iter()
            .filter_map(|doc| {
                let text = doc.extracted_text.as_deref()?;
                let haystack = format!("{} {}", doc.title.to_lowercase(), text.to_lowercase());
                let score = score_text(&haystack, terms);
                (score > 0).then_some((score, doc))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(self.params.document_limit)
            .filter_map(|(_, doc)| {
                doc.extracted_text.as_deref().map(|text| KnowledgeContext {
                    title: doc.title.clone(),
                    excerpt: excerpt(text, self.params.excerpt_max_chars),
                    category: doc.category.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::types::FileKind;
    use tempfile::tempdir;

    const PARAMS: RetrieverParams = RetrieverParams {
        retrieval_limit: 5,
        document_limit: 3,
        excerpt_max_chars: 500,
    };

    async fn open_test_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("retrieval_test.db");
        Database::open(path.to_str().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn empty_query_returns_nothing() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;
        knowledge::create_entry(&db, "Pricing", "Plans start at 99.", None, &[], 0)
            .await
            .unwrap();

        let retriever = Retriever::new(db.clone(), PARAMS);
        assert!(retriever.retrieve("").await.unwrap().is_empty());
        assert!(retriever.retrieve("is a of").await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn matching_entries_outrank_weaker_ones() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;

        knowledge::create_entry(
            &db,
            "Course pricing",
            "The price depends on the course. Price tiers are listed per course.",
            Some("sales"),
            &["price".to_string()],
            0,
        )
        .await
        .unwrap();
        knowledge::create_entry(&db, "Refunds", "One mention of price here.", None, &[], 0)
            .await
            .unwrap();
        knowledge::create_entry(&db, "Schedule", "Classes run weekly.", None, &[], 0)
            .await
            .unwrap();

        let retriever = Retriever::new(db.clone(), PARAMS);
        let bundle = retriever.retrieve("what is the price").await.unwrap();

        // Zero-score "Schedule" is dropped; the price-dense entry leads.
        assert_eq!(bundle.entries.len(), 2);
        assert_eq!(bundle.entries[0].title, "Course pricing");
        assert_eq!(bundle.entries[1].title, "Refunds");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn priority_breaks_score_ties() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;

        knowledge::create_entry(&db, "Low", "enrollment info", None, &[], 1)
            .await
            .unwrap();
        knowledge::create_entry(&db, "High", "enrollment info", None, &[], 9)
            .await
            .unwrap();

        let retriever = Retriever::new(db.clone(), PARAMS);
        let bundle = retriever.retrieve("enrollment").await.unwrap();
        assert_eq!(bundle.entries[0].title, "High");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;

        for i in 0..8 {
            knowledge::create_entry(&db, &format!("E{i}"), "enrollment info", None, &[], 0)
                .await
                .unwrap();
        }

        let retriever = Retriever::new(
            db.clone(),
            RetrieverParams {
                retrieval_limit: 3,
                ..PARAMS
            },
        );
        assert_eq!(retriever.retrieve("enrollment").await.unwrap().entries.len(), 3);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn documents_contribute_excerpted_text() {
        let dir = tempdir().unwrap();
        let db = open_test_db(&dir).await;

        let long_text = format!("visa requirements {}", "x".repeat(600));
        documents::create_document(
            &db,
            "Visa guide",
            "/d/visa.pdf",
            FileKind::Pdf,
            100,
            Some(&long_text),
            None,
            &[],
        )
        .await
        .unwrap();
        // No extracted text, must never surface.
        documents::create_document(&db, "Broken", "/d/b.pdf", FileKind::Pdf, 100, None, None, &[])
            .await
            .unwrap();

        let retriever = Retriever::new(db.clone(), PARAMS);
        let bundle = retriever.retrieve("visa requirements").await.unwrap();

        assert!(bundle.entries.is_empty());
        assert_eq!(bundle.documents.len(), 1);
        assert_eq!(bundle.documents[0].title, "Visa guide");
        assert!(bundle.documents[0].excerpt.ends_with("..."));
        assert!(bundle.documents[0].excerpt.chars().count() <= 503);

        db.close().await.unwrap();
    }
}
