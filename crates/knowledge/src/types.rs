//! FAQ knowledge type definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A tabular attachment of a FAQ answer (e.g. a fee schedule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqTable {
    /// Column headers, in display order
    pub columns: Vec<String>,

    /// Row cells, each aligned with `columns`
    pub rows: Vec<Vec<String>>,
}

/// A single question/answer pair of the corpus.
///
/// By the time an entry reaches the index, any table, bullet points and note
/// have already been merged into `answer` by the corpus loader. They are kept
/// on the entry for callers that want the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Question text as written in the source document
    pub question: String,

    /// Answer text returned to users
    pub answer: String,

    /// Name of the document the entry came from
    #[serde(default)]
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<FaqTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_points: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<BTreeSet<String>>,
}

impl FaqEntry {
    /// Create an entry from a question and answer only.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            source: String::new(),
            table: None,
            bullet_points: None,
            note: None,
            keywords: None,
        }
    }

    /// Set the source document name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// The ordered, read-only collection of FAQ entries.
///
/// An entry's position is its identity: scored matches refer back to it by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    entries: Vec<FaqEntry>,
}

impl Corpus {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FaqEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaqEntry> {
        self.entries.iter()
    }

    /// Questions in corpus order, as fed to the index builder.
    pub fn questions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.question.as_str()).collect()
    }
}

impl From<Vec<FaqEntry>> for Corpus {
    fn from(entries: Vec<FaqEntry>) -> Self {
        Self::new(entries)
    }
}

/// A corpus entry scored against one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// Position of the entry in the corpus
    pub entry_index: usize,

    /// Cosine similarity in [0, 1]
    pub score: f32,
}

/// Topic of a query, used to pick conversational templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fee,
    Payment,
    Card,
    Technical,
    General,
}

impl Category {
    /// Keyed categories in match priority order; `General` is the catch-all.
    pub const PRIORITY: [Category; 4] = [
        Category::Fee,
        Category::Payment,
        Category::Card,
        Category::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fee => "fee",
            Category::Payment => "payment",
            Category::Card => "card",
            Category::Technical => "technical",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
