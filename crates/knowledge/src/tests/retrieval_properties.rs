//! Tests for end-to-end retrieval behavior over small corpora.

use crate::catalog::ResponseCatalog;
use crate::retriever::{Retriever, RetrieverOptions};
use crate::types::{Category, Corpus, FaqEntry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to build a retriever over question/answer pairs.
    fn build(entries: &[(&str, &str)]) -> Retriever {
        let corpus = Corpus::new(
            entries
                .iter()
                .map(|(q, a)| FaqEntry::new(*q, *a).with_source("test.json"))
                .collect(),
        );
        Retriever::build(corpus, RetrieverOptions::default()).unwrap()
    }

    fn card_faq() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Phí phát hành thẻ là bao nhiêu?", "Phí phát hành thẻ là 0 đồng."),
            (
                "Phí thường niên thẻ tín dụng là bao nhiêu?",
                "Phí thường niên từ 100.000 đến 800.000 đồng tùy hạng thẻ.",
            ),
            (
                "Làm sao để mở thẻ tín dụng?",
                "Quý khách mang CCCD đến chi nhánh hoặc đăng ký trên VCB Digibank.",
            ),
            (
                "Thanh toán dư nợ thẻ tín dụng bằng cách nào?",
                "Bạn có thể thanh toán qua VCB Digibank, ATM hoặc tại quầy.",
            ),
            (
                "Quên mật khẩu đăng nhập ứng dụng thì làm gì?",
                "Chọn Quên mật khẩu trên màn hình đăng nhập và làm theo hướng dẫn.",
            ),
            (
                "Giờ làm việc của chi nhánh?",
                "Từ 8h đến 17h các ngày trong tuần.",
            ),
        ]
    }

    #[test]
    fn test_verbatim_questions_rank_first() {
        let faq = card_faq();
        let retriever = build(&faq);

        for (i, (question, _)) in faq.iter().enumerate() {
            let matches = retriever.top_k(question, 3).unwrap();
            assert_eq!(matches[0].entry_index, i, "question: {}", question);
            assert!(
                matches[0].score >= 0.99,
                "score {} for {}",
                matches[0].score,
                question
            );
        }
    }

    #[test]
    fn test_scores_are_bounded_and_descending() {
        let retriever = build(&card_faq());
        let matches = retriever.top_k("phí thẻ tín dụng", 6).unwrap();

        assert_eq!(matches.len(), 6);
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(matches.iter().all(|m| (0.0..=1.0).contains(&m.score)));
    }

    #[test]
    fn test_zero_overlap_scores_zero_and_falls_back() {
        let retriever = build(&card_faq());
        let query = "zzzz qqqq xxxx";

        let matches = retriever.top_k(query, 3).unwrap();
        assert_eq!(matches[0].score, 0.0);

        let reply = retriever.answer(query, true).unwrap();
        assert!(reply.contains(query));
        assert!(retriever.fallback_variants(query).unwrap().contains(&reply));
    }

    #[test]
    fn test_raw_answer_is_byte_identical() {
        let faq = card_faq();
        let retriever = build(&faq);

        for (question, answer) in &faq {
            assert_eq!(&retriever.answer(question, false).unwrap(), answer);
        }
    }

    #[test]
    fn test_categorize_fee_beats_payment() {
        let retriever = build(&card_faq());
        assert_eq!(
            retriever.categorize("phí thanh toán chậm là bao nhiêu"),
            Category::Fee
        );
        assert_eq!(
            retriever.categorize("thanh toán bằng thẻ"),
            Category::Payment
        );
    }

    #[test]
    fn test_natural_answer_applies_substitutions() {
        let retriever = build(&card_faq());
        let mut rng = StdRng::seed_from_u64(5);

        let reply = retriever
            .answer_with_rng("Làm sao để mở thẻ tín dụng?", true, &mut rng)
            .unwrap();

        assert!(!reply.contains("Quý khách"));
        assert!(reply.contains("mang CCCD đến chi nhánh"));
    }

    #[test]
    fn test_contextual_appends_only_runner_up() {
        let answers = [
            "Hạn mức hạng vàng là 50 triệu.",
            "Hạn mức hạng bạc là 30 triệu.",
            "Hạn mức hạng đồng là 10 triệu.",
        ];
        let retriever = build(&[
            ("thẻ tín dụng vàng", answers[0]),
            ("thẻ tín dụng bạc", answers[1]),
            ("thẻ tín dụng đồng", answers[2]),
        ]);
        let label = &retriever.catalog().additional_info_label;

        let matches = retriever.top_k("thẻ tín dụng", 3).unwrap();
        assert!(matches.iter().all(|m| m.score > 0.15));
        let primary = answers[matches[0].entry_index];
        let runner_up = answers[matches[1].entry_index];
        let third = answers[matches[2].entry_index];

        let mut rng = StdRng::seed_from_u64(9);
        let reply = retriever
            .contextual_answer_with_rng("thẻ tín dụng", &mut rng)
            .unwrap();

        // Card templates put an intro first, so the body starts lowercase
        assert!(reply.contains(&crate::compose::lowercase_first(primary)));
        assert!(reply.ends_with(&format!("\n\n{} {}", label, runner_up)));
        assert!(!reply.contains(third));
        assert_eq!(reply.matches(label.as_str()).count(), 1);
    }

    #[test]
    fn test_contextual_without_runner_up_matches_answer() {
        let retriever = build(&[
            ("Phí phát hành thẻ là bao nhiêu?", "Phí phát hành thẻ là 0 đồng."),
            ("Giờ làm việc của chi nhánh?", "Từ 8h đến 17h."),
        ]);
        let label = retriever.catalog().additional_info_label.clone();
        let query = "Phí phát hành thẻ là bao nhiêu?";

        let contextual = retriever
            .contextual_answer_with_rng(query, &mut StdRng::seed_from_u64(21))
            .unwrap();
        let natural = retriever
            .answer_with_rng(query, true, &mut StdRng::seed_from_u64(21))
            .unwrap();

        assert_eq!(contextual, natural);
        assert!(!contextual.contains(&label));
    }

    #[test]
    fn test_contextual_falls_back_below_threshold() {
        let retriever = build(&card_faq());
        let query = "asdkjaslkdj";
        let reply = retriever.contextual_answer(query).unwrap();
        assert!(retriever.fallback_variants(query).unwrap().contains(&reply));
    }

    #[test]
    fn test_scores_between_thresholds_split_answer_and_contextual() {
        let retriever = build(&[
            ("aa bb cc dd ee ff gg hh", "Answer one."),
            ("ii jj kk ll mm nn oo pp", "Answer two."),
            ("qq rr ss tt uu vv ww xx", "Answer three."),
        ]);
        let label = retriever.catalog().additional_info_label.clone();
        let query = "aa ii";

        // Each side shares one of fifteen terms: 1/sqrt(2) * 1/sqrt(15)
        let matches = retriever.top_k(query, 3).unwrap();
        assert_eq!(matches[0].entry_index, 0);
        assert_eq!(matches[1].entry_index, 1);
        for m in &matches[..2] {
            assert!((m.score - 0.1826).abs() < 1e-3, "score {}", m.score);
        }
        assert_eq!(matches[2].score, 0.0);

        // Below the answer threshold
        let fallbacks = retriever.fallback_variants(query).unwrap();
        assert!(fallbacks.contains(&retriever.answer(query, false).unwrap()));
        assert!(fallbacks.contains(&retriever.answer(query, true).unwrap()));

        // Above the contextual threshold, with a qualifying runner-up
        let reply = retriever
            .contextual_answer_with_rng(query, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert!(!fallbacks.contains(&reply));
        assert!(reply.contains("Answer one."));
        assert!(reply.ends_with(&format!("\n\n{} Answer two.", label)));
    }

    #[test]
    fn test_contextual_without_runner_up_uses_answer_threshold() {
        let retriever = build(&[
            ("aa bb cc dd ee ff gg hh", "Answer one."),
            (
                "ii ja jb jc jd je jf jg jh ji jj jk jl jm jn jo jp jq jr js jt ju jv jw jx jy jz ka kb kc",
                "Answer two.",
            ),
            ("qq rr ss tt uu vv ww xx", "Answer three."),
        ]);
        let query = "aa ii";

        // Best 1/sqrt(2) * 1/sqrt(15), runner-up 1/sqrt(2) * 1/sqrt(59)
        let matches = retriever.top_k(query, 3).unwrap();
        assert_eq!(matches[0].entry_index, 0);
        assert!(matches[0].score >= 0.15 && matches[0].score < 0.20);
        assert!(matches[1].score > 0.0 && matches[1].score <= 0.15);

        let fallbacks = retriever.fallback_variants(query).unwrap();
        let reply = retriever
            .contextual_answer_with_rng(query, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert!(fallbacks.contains(&reply));
    }

    #[test]
    fn test_top_k_is_idempotent() {
        let retriever = build(&card_faq());
        let first = retriever.top_k("mở thẻ ở đâu", 3).unwrap();
        let second = retriever.top_k("mở thẻ ở đâu", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_entry_scenario() {
        let retriever = build(&[(
            "Phí phát hành thẻ là bao nhiêu?",
            "Phí phát hành thẻ là 0 đồng.",
        )]);

        assert_eq!(
            retriever
                .answer("Phí phát hành thẻ là bao nhiêu?", false)
                .unwrap(),
            "Phí phát hành thẻ là 0 đồng."
        );

        let query = "asdkjaslkdj random gibberish";
        let reply = retriever.answer(query, true).unwrap();
        let expected = ResponseCatalog::default()
            .fallbacks
            .iter()
            .map(|t| t.replace("{{query}}", query))
            .collect::<Vec<_>>();
        assert!(expected.contains(&reply));
    }

    #[test]
    fn test_concurrent_queries_share_one_retriever() {
        let retriever = Arc::new(build(&card_faq()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let retriever = Arc::clone(&retriever);
                std::thread::spawn(move || {
                    let query = if i % 2 == 0 {
                        "Phí phát hành thẻ là bao nhiêu?"
                    } else {
                        "Giờ làm việc của chi nhánh?"
                    };
                    retriever.answer(query, false).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let answer = handle.join().unwrap();
            if i % 2 == 0 {
                assert_eq!(answer, "Phí phát hành thẻ là 0 đồng.");
            } else {
                assert_eq!(answer, "Từ 8h đến 17h các ngày trong tuần.");
            }
        }
    }
}
