//! Lexical TF-IDF index over the corpus questions.
//!
//! Text is lowercased, split into Unicode words of at least two characters,
//! and expanded into unigrams plus adjacent-word bigrams. Each term is
//! weighted by smoothed inverse document frequency
//! `ln((1 + n) / (1 + df)) + 1`, and vectors are L2-normalized so cosine
//! similarity reduces to a dot product over shared terms.

use faqbot_core::{AppError, AppResult};
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Shortest token, in characters, that enters the vocabulary.
const MIN_TOKEN_CHARS: usize = 2;

/// Sparse weighted term vector, sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Build from unsorted `(column, weight)` pairs; zero weights are dropped.
    pub fn from_pairs(mut pairs: Vec<(usize, f32)>) -> Self {
        pairs.retain(|(_, w)| *w != 0.0);
        pairs.sort_by_key(|(col, _)| *col);
        Self { entries: pairs }
    }

    /// True when the text shared no vocabulary with the corpus.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of non-zero terms.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, f32)> {
        self.entries.iter()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Fixed vocabulary and IDF weights derived from the corpus questions.
///
/// Built once and never mutated, so it can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f32>,
    document_count: usize,
}

impl FeatureSpace {
    /// Build the feature space from corpus questions.
    ///
    /// When more than `max_features` distinct terms occur, the ones with the
    /// highest total frequency across the corpus are kept (ties broken by the
    /// term itself), so the result is fully determined by the input.
    pub fn build<S: AsRef<str>>(questions: &[S], max_features: usize) -> AppResult<Self> {
        if questions.is_empty() {
            return Err(AppError::EmptyCorpus);
        }
        if max_features == 0 {
            return Err(AppError::InvalidArgument(
                "max_features must be at least 1".to_string(),
            ));
        }

        let mut total_counts: HashMap<String, usize> = HashMap::new();
        let mut document_freq: HashMap<String, usize> = HashMap::new();

        for question in questions {
            let counts = term_counts(question.as_ref());
            for (term, count) in counts {
                *total_counts.entry(term.clone()).or_insert(0) += count;
                *document_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = total_counts.into_iter().collect();
        if ranked.len() > max_features {
            ranked.sort_by(|(ta, ca), (tb, cb)| cb.cmp(ca).then_with(|| ta.cmp(tb)));
            ranked.truncate(max_features);
            tracing::debug!("Vocabulary capped at {} terms", max_features);
        }

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = questions.len() as f64;
        let idf: Vec<f32> = terms
            .iter()
            .map(|term| {
                let df = document_freq.get(term).copied().unwrap_or(0) as f64;
                (((1.0 + n) / (1.0 + df)).ln() + 1.0) as f32
            })
            .collect();

        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        if terms.is_empty() {
            tracing::warn!("Corpus questions produced an empty vocabulary; every query will fall back");
        }

        Ok(Self {
            vocabulary,
            terms,
            idf,
            document_count: questions.len(),
        })
    }

    /// Project text into the feature space.
    ///
    /// Terms the corpus never used carry no weight.
    pub fn vectorize(&self, text: &str) -> SparseVector {
        let pairs = term_counts(text)
            .into_iter()
            .filter_map(|(term, count)| {
                self.vocabulary
                    .get(&term)
                    .map(|&col| (col, count as f32 * self.idf[col]))
            })
            .collect();

        SparseVector::from_pairs(pairs).normalized()
    }

    /// Number of terms in the vocabulary.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of questions the space was built from.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Vocabulary terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&col| self.idf[col])
    }
}

/// Cosine similarity in [0, 1]; 0 when either side is the zero vector.
pub fn similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let (norm_a, norm_b) = (a.norm(), b.norm());
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // Merge-join over the sorted columns
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0f32;
    while i < a.entries.len() && j < b.entries.len() {
        let (ca, wa) = a.entries[i];
        let (cb, wb) = b.entries[j];
        match ca.cmp(&cb) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += wa * wb;
                i += 1;
                j += 1;
            }
        }
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Lowercased word tokens of at least two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .unicode_words()
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Unigrams followed by space-joined bigrams.
pub fn extract_terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let bigrams: Vec<String> = tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();

    let mut terms = tokens;
    terms.extend(bigrams);
    terms
}

fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in extract_terms(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_single_chars_and_punctuation() {
        let tokens = tokenize("Phí phát hành thẻ là 0 đồng?");
        assert_eq!(tokens, vec!["phí", "phát", "hành", "thẻ", "là", "đồng"]);
    }

    #[test]
    fn test_extract_terms_includes_bigrams() {
        let terms = extract_terms("Mở thẻ tín dụng");
        assert!(terms.contains(&"mở".to_string()));
        assert!(terms.contains(&"mở thẻ".to_string()));
        assert!(terms.contains(&"tín dụng".to_string()));
        assert_eq!(terms.len(), 4 + 3);
    }

    #[test]
    fn test_build_rejects_empty_corpus() {
        let questions: Vec<&str> = vec![];
        assert!(matches!(
            FeatureSpace::build(&questions, 5000),
            Err(AppError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_build_rejects_zero_cap() {
        assert!(matches!(
            FeatureSpace::build(&["phí thẻ"], 0),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_idf_is_lower_for_common_terms() {
        let space = FeatureSpace::build(
            &["phí thường niên thẻ", "mở thẻ online", "khóa thẻ tạm thời"],
            5000,
        )
        .unwrap();

        let common = space.idf("thẻ").unwrap();
        let rare = space.idf("online").unwrap();
        assert!(common < rare);
        // Term in every document: ln(4/4) + 1
        assert!((common - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vocabulary_cap_keeps_most_frequent() {
        let space = FeatureSpace::build(&["thẻ thẻ thẻ phí phí online"], 2).unwrap();
        assert_eq!(space.len(), 2);
        assert_eq!(space.terms(), &["phí".to_string(), "thẻ".to_string()]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let questions = ["Làm sao mở thẻ?", "Phí rút tiền mặt?", "Đổi mã PIN ở đâu?"];
        let a = FeatureSpace::build(&questions, 5).unwrap();
        let b = FeatureSpace::build(&questions, 5).unwrap();
        assert_eq!(a.terms(), b.terms());
        assert_eq!(a.vectorize("mở thẻ"), b.vectorize("mở thẻ"));
    }

    #[test]
    fn test_vectorize_is_unit_length() {
        let space = FeatureSpace::build(&["phí phát hành thẻ", "mở thẻ"], 5000).unwrap();
        let v = space.vectorize("phí phát hành");
        assert!((v.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_vocabulary_is_zero() {
        let space = FeatureSpace::build(&["phí phát hành thẻ"], 5000).unwrap();
        let v = space.vectorize("asdkjaslkdj random gibberish");
        assert!(v.is_zero());
        assert_eq!(similarity(&v, &space.vectorize("phí thẻ")), 0.0);
    }

    #[test]
    fn test_similarity_identical_and_disjoint() {
        let space = FeatureSpace::build(&["mở thẻ online", "phí rút tiền"], 5000).unwrap();
        let a = space.vectorize("mở thẻ online");
        let b = space.vectorize("phí rút tiền");
        assert!(similarity(&a, &a) > 0.999);
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_similarity_not_nan_for_zero_vectors() {
        let zero = SparseVector::default();
        let s = similarity(&zero, &zero);
        assert_eq!(s, 0.0);
        assert!(!s.is_nan());
    }
}
