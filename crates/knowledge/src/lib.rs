//! FAQ knowledge base.
//!
//! Loads a FAQ corpus from JSON documents, indexes its questions with a
//! lexical TF-IDF model, and answers free-text queries with the best-matching
//! stored answer, a conversational rewrite of it, or a fallback.
//!
//! Startup is two-phase: [`corpus::load_corpus`] then [`Retriever::build`].
//! [`open`] does both from an [`AppConfig`].

pub mod catalog;
pub mod compose;
pub mod corpus;
pub mod index;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use catalog::{CategoryTemplates, PhraseSubstitution, ResponseCatalog};
pub use corpus::{load_corpus, load_corpus_file};
pub use index::{similarity, FeatureSpace, SparseVector};
pub use retriever::{Retriever, RetrieverOptions, ANSWER_THRESHOLD, CONTEXTUAL_THRESHOLD};
pub use types::{Category, Corpus, FaqEntry, FaqTable, ScoredMatch};

use faqbot_core::{AppConfig, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Summary of a built retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Number of FAQ entries
    pub entries: usize,

    /// Number of vocabulary terms
    pub vocabulary: usize,

    /// Entries per source document
    pub sources: BTreeMap<String, usize>,
}

/// Load the corpus and catalog named by `config` and build a retriever.
pub fn open(config: &AppConfig) -> AppResult<Retriever> {
    let start = Instant::now();

    let corpus = corpus::load_corpus(&config.data_dir)?;
    let catalog = ResponseCatalog::load_or_default(config.catalog_file.as_deref())?;

    let retriever = Retriever::build(
        corpus,
        RetrieverOptions {
            max_features: config.max_features,
            catalog,
        },
    )?;

    tracing::info!(
        "FAQ retriever ready in {:.2}s",
        start.elapsed().as_secs_f64()
    );

    Ok(retriever)
}

/// Collect statistics for a built retriever.
pub fn stats(retriever: &Retriever) -> IndexStats {
    let mut sources = BTreeMap::new();
    for entry in retriever.corpus().iter() {
        *sources.entry(entry.source.clone()).or_insert(0) += 1;
    }

    IndexStats {
        entries: retriever.len(),
        vocabulary: retriever.feature_space().len(),
        sources,
    }
}
