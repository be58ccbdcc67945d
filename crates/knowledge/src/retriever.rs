//! FAQ retrieval: scoring, confidence policy and reply composition.

use crate::catalog::ResponseCatalog;
use crate::compose::{append_additional_info, compose_natural, FallbackTemplates};
use crate::index::{similarity, FeatureSpace, SparseVector};
use crate::types::{Category, Corpus, FaqEntry, ScoredMatch};
use faqbot_core::config::DEFAULT_MAX_FEATURES;
use faqbot_core::{AnswerMode, AppError, AppResult};
use rand::Rng;

/// Minimum best-match score for `answer` to reply from the corpus.
pub const ANSWER_THRESHOLD: f32 = 0.20;

/// Minimum score for `contextual_answer`, applied to the best match and
/// (strictly) to the runner-up.
pub const CONTEXTUAL_THRESHOLD: f32 = 0.15;

/// Number of candidates considered per answer.
const ANSWER_CANDIDATES: usize = 3;

/// Build-time options of a retriever.
#[derive(Debug, Clone)]
pub struct RetrieverOptions {
    /// Vocabulary cap of the lexical index
    pub max_features: usize,

    /// Keywords and templates used for replies
    pub catalog: ResponseCatalog,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            catalog: ResponseCatalog::default(),
        }
    }
}

/// Read-only FAQ retriever.
///
/// Holds the corpus, its feature space and the precomputed vector of every
/// corpus question. Nothing is mutated after `build`, so one instance can be
/// shared across request handlers behind an `Arc`.
#[derive(Debug)]
pub struct Retriever {
    corpus: Corpus,
    space: FeatureSpace,
    question_vectors: Vec<SparseVector>,
    catalog: ResponseCatalog,
    fallbacks: FallbackTemplates,
}

impl Retriever {
    /// Index a loaded corpus.
    ///
    /// Fails with `AppError::EmptyCorpus` when there is nothing to index.
    pub fn build(corpus: Corpus, options: RetrieverOptions) -> AppResult<Self> {
        options.catalog.validate()?;

        let space = FeatureSpace::build(&corpus.questions(), options.max_features)?;
        let question_vectors: Vec<SparseVector> = corpus
            .iter()
            .map(|entry| space.vectorize(&entry.question))
            .collect();
        let fallbacks = FallbackTemplates::new(&options.catalog.fallbacks)?;

        tracing::info!(
            "Built FAQ index: {} entries, {} terms (cap {})",
            corpus.len(),
            space.len(),
            options.max_features
        );

        Ok(Self {
            corpus,
            space,
            question_vectors,
            catalog: options.catalog,
            fallbacks,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Entry behind a scored match.
    pub fn entry(&self, index: usize) -> AppResult<&FaqEntry> {
        self.corpus.get(index).ok_or_else(|| {
            AppError::Other(format!(
                "Match refers to entry {} but the corpus has {}",
                index,
                self.corpus.len()
            ))
        })
    }

    /// The `k` best-scoring entries, highest first.
    ///
    /// Equal scores keep corpus order, so earlier entries win ties.
    pub fn top_k(&self, query: &str, k: usize) -> AppResult<Vec<ScoredMatch>> {
        if k == 0 {
            return Err(AppError::InvalidArgument("k must be at least 1".to_string()));
        }

        let query_vector = self.space.vectorize(query);

        let mut matches: Vec<ScoredMatch> = self
            .question_vectors
            .iter()
            .enumerate()
            .map(|(entry_index, v)| ScoredMatch {
                entry_index,
                score: similarity(&query_vector, v),
            })
            .collect();

        // Stable sort keeps insertion order among ties
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(k);

        tracing::debug!(
            query_terms = query_vector.nnz(),
            scores = ?matches.iter().map(|m| (m.entry_index, m.score)).collect::<Vec<_>>(),
            "Scored query"
        );

        Ok(matches)
    }

    /// Topic of a query by keyword, in priority order fee, payment, card,
    /// technical; `General` when nothing matches.
    pub fn categorize(&self, query: &str) -> Category {
        let query = query.to_lowercase();

        Category::PRIORITY
            .into_iter()
            .find(|&category| {
                self.catalog
                    .keywords(category)
                    .iter()
                    .filter(|kw| !kw.is_empty())
                    .any(|kw| query.contains(&kw.to_lowercase()))
            })
            .unwrap_or(Category::General)
    }

    /// Answer a query, drawing template choices from the thread-local RNG.
    pub fn answer(&self, query: &str, naturalize: bool) -> AppResult<String> {
        self.answer_with_rng(query, naturalize, &mut rand::thread_rng())
    }

    /// Answer a query.
    ///
    /// Below `ANSWER_THRESHOLD` the reply is a fallback. Otherwise it is the
    /// best match's stored answer, verbatim or rewritten conversationally.
    pub fn answer_with_rng<R: Rng + ?Sized>(
        &self,
        query: &str,
        naturalize: bool,
        rng: &mut R,
    ) -> AppResult<String> {
        let matches = self.top_k(query, ANSWER_CANDIDATES)?;

        let best = match matches.first() {
            Some(best) if best.score >= ANSWER_THRESHOLD => *best,
            other => {
                tracing::info!(
                    best_score = other.map(|m| m.score).unwrap_or(0.0),
                    "No confident match, falling back"
                );
                return self.fallback_with_rng(query, rng);
            }
        };

        let entry = self.entry(best.entry_index)?;
        if !naturalize {
            return Ok(entry.answer.clone());
        }

        Ok(self.naturalize(query, entry, rng))
    }

    /// Natural answer plus the runner-up, using the thread-local RNG.
    pub fn contextual_answer(&self, query: &str) -> AppResult<String> {
        self.contextual_answer_with_rng(query, &mut rand::thread_rng())
    }

    /// Natural answer plus the runner-up match as additional information.
    ///
    /// Falls back below `CONTEXTUAL_THRESHOLD`. When the runner-up scores above
    /// `CONTEXTUAL_THRESHOLD` its stored answer is appended under the catalog's
    /// label; matches after the runner-up are never included. Without a
    /// qualifying runner-up this is `answer(query, true)`.
    pub fn contextual_answer_with_rng<R: Rng + ?Sized>(
        &self,
        query: &str,
        rng: &mut R,
    ) -> AppResult<String> {
        let matches = self.top_k(query, ANSWER_CANDIDATES)?;

        let best = match matches.first() {
            Some(best) if best.score >= CONTEXTUAL_THRESHOLD => *best,
            other => {
                tracing::info!(
                    best_score = other.map(|m| m.score).unwrap_or(0.0),
                    "No contextual match, falling back"
                );
                return self.fallback_with_rng(query, rng);
            }
        };

        match matches.get(1) {
            Some(second) if second.score > CONTEXTUAL_THRESHOLD => {
                let primary = self.naturalize(query, self.entry(best.entry_index)?, rng);
                let runner_up = self.entry(second.entry_index)?;

                tracing::debug!(
                    best = best.entry_index,
                    runner_up = second.entry_index,
                    "Appending runner-up answer"
                );

                Ok(append_additional_info(
                    &primary,
                    &self.catalog.additional_info_label,
                    &runner_up.answer,
                ))
            }
            _ => self.answer_with_rng(query, true, rng),
        }
    }

    /// Reply in the given style, using the thread-local RNG.
    pub fn reply(&self, query: &str, mode: AnswerMode) -> AppResult<String> {
        self.reply_with_rng(query, mode, &mut rand::thread_rng())
    }

    pub fn reply_with_rng<R: Rng + ?Sized>(
        &self,
        query: &str,
        mode: AnswerMode,
        rng: &mut R,
    ) -> AppResult<String> {
        match mode {
            AnswerMode::Raw => self.answer_with_rng(query, false, rng),
            AnswerMode::Natural => self.answer_with_rng(query, true, rng),
            AnswerMode::Contextual => self.contextual_answer_with_rng(query, rng),
        }
    }

    /// "Not understood" reply, using the thread-local RNG.
    pub fn fallback(&self, query: &str) -> AppResult<String> {
        self.fallback_with_rng(query, &mut rand::thread_rng())
    }

    /// One of the catalog's fallback replies, embedding the query and pointing
    /// the user to human support.
    pub fn fallback_with_rng<R: Rng + ?Sized>(&self, query: &str, rng: &mut R) -> AppResult<String> {
        self.fallbacks.render(query, rng)
    }

    /// Every fallback reply the catalog can produce for `query`.
    pub fn fallback_variants(&self, query: &str) -> AppResult<Vec<String>> {
        self.fallbacks.render_all(query)
    }

    fn naturalize<R: Rng + ?Sized>(&self, query: &str, entry: &FaqEntry, rng: &mut R) -> String {
        let category = self.categorize(query);
        tracing::debug!(%category, "Composing natural reply");
        compose_natural(&entry.answer, category, &self.catalog, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn retriever(entries: &[(&str, &str)]) -> Retriever {
        let corpus = Corpus::new(entries.iter().map(|(q, a)| FaqEntry::new(*q, *a)).collect());
        Retriever::build(corpus, RetrieverOptions::default()).unwrap()
    }

    fn sample() -> Retriever {
        retriever(&[
            ("Phí phát hành thẻ là bao nhiêu?", "Phí phát hành thẻ là 0 đồng."),
            ("Làm thế nào để mở thẻ tín dụng?", "Bạn mở thẻ tại quầy hoặc trên ứng dụng."),
            ("Thanh toán dư nợ thẻ như thế nào?", "Bạn thanh toán qua VCB Digibank."),
        ])
    }

    #[test]
    fn test_build_rejects_empty_corpus() {
        let result = Retriever::build(Corpus::default(), RetrieverOptions::default());
        assert!(matches!(result, Err(AppError::EmptyCorpus)));
    }

    #[test]
    fn test_top_k_rejects_zero() {
        assert!(matches!(
            sample().top_k("thẻ", 0),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_top_k_sorted_and_truncated() {
        let r = sample();
        let matches = r.top_k("mở thẻ tín dụng", 2).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].entry_index, 1);
        assert!(matches[0].score >= matches[1].score);
    }

    #[test]
    fn test_top_k_larger_than_corpus() {
        let matches = sample().top_k("thẻ", 10).unwrap();
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let r = retriever(&[("alpha beta", "1"), ("alpha beta", "2"), ("gamma", "3")]);
        let matches = r.top_k("alpha beta", 3).unwrap();
        assert_eq!(matches[0].entry_index, 0);
        assert_eq!(matches[1].entry_index, 1);
        assert_eq!(matches[0].score, matches[1].score);
    }

    #[test]
    fn test_categorize_priority() {
        let r = sample();
        assert_eq!(r.categorize("Phí thanh toán trễ hạn?"), Category::Fee);
        assert_eq!(r.categorize("THANH TOÁN dư nợ thẻ"), Category::Payment);
        assert_eq!(r.categorize("Khóa thẻ ra sao"), Category::Card);
        assert_eq!(r.categorize("Quên mật khẩu đăng nhập"), Category::Technical);
        assert_eq!(r.categorize("Giờ làm việc chi nhánh?"), Category::General);
        assert_eq!(r.categorize(""), Category::General);
    }

    #[test]
    fn test_raw_answer_is_verbatim() {
        let r = sample();
        let answer = r.answer("Phí phát hành thẻ là bao nhiêu?", false).unwrap();
        assert_eq!(answer, "Phí phát hành thẻ là 0 đồng.");
    }

    #[test]
    fn test_natural_answer_contains_body() {
        let r = sample();
        let mut rng = StdRng::seed_from_u64(11);
        let answer = r
            .answer_with_rng("Phí phát hành thẻ là bao nhiêu?", true, &mut rng)
            .unwrap();
        // Fee templates put an intro before the body, so it is lowercased
        assert!(answer.contains("phí phát hành thẻ là 0 đồng."));
    }

    #[test]
    fn test_gibberish_falls_back() {
        let r = sample();
        let query = "asdkjaslkdj random gibberish";
        let reply = r.answer(query, false).unwrap();
        assert!(reply.contains(query));
        assert!(r.fallback_variants(query).unwrap().contains(&reply));
    }

    #[test]
    fn test_reply_modes() {
        let r = sample();
        let q = "Phí phát hành thẻ là bao nhiêu?";
        assert_eq!(
            r.reply(q, AnswerMode::Raw).unwrap(),
            "Phí phát hành thẻ là 0 đồng."
        );
        assert!(!r.reply(q, AnswerMode::Natural).unwrap().is_empty());
        assert!(!r.reply(q, AnswerMode::Contextual).unwrap().is_empty());
    }

    #[test]
    fn test_retriever_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Retriever>();
    }
}
