// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical knowledge retrieval over curated entries and uploaded documents.
//!
//! Scoring is term-frequency over lowercased substrings; no embeddings and
//! no index. The active knowledge set is small enough that a linear scan per
//! query is cheaper than maintaining anything smarter.

pub mod retriever;
pub mod scorer;

pub use retriever::{KnowledgeBundle, KnowledgeContext, Retriever, RetrieverParams};
pub use scorer::{excerpt, query_terms, score_text};
