// src/scoring/mod.rs

pub mod normalize;
pub mod similarity;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use normalize::normalize;
pub use similarity::{FuzzyScorer, SimilarityScorer, TokenOverlapScorer};

/// Minimum similarity score for a completion answer to count as correct.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 90.0;

/// Leading choice letter, e.g. "A) because..." -> "A".
static CHOICE_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-D])").unwrap());

/// Outcome of evaluating a single answer.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub is_correct: bool,
    pub similarity_score: f64,
    pub method: &'static str,
}

/// Evaluates a participant's answer against the correct answer.
///
/// MCQ answers are matched on the leading choice letter, case-insensitively
/// and tolerating trailing punctuation or text; no fuzzy logic applies.
/// Completion answers are normalized on both sides and scored by the
/// injected scorer; `threshold` decides correctness. An unknown question
/// type is a non-fatal default: incorrect with a zero score.
pub fn evaluate(
    scorer: &dyn SimilarityScorer,
    answer_text: &str,
    correct_answer: &str,
    question_type: &str,
    threshold: f64,
) -> Evaluation {
    match question_type {
        "mcq" => {
            let cleaned = answer_text.trim().to_uppercase();
            let choice = CHOICE_LETTER
                .captures(&cleaned)
                .map(|c| c[1].to_string())
                .unwrap_or(cleaned);

            let is_correct = choice == correct_answer.trim().to_uppercase();
            Evaluation {
                is_correct,
                similarity_score: if is_correct { 100.0 } else { 0.0 },
                method: "exact_match",
            }
        }
        "completion" => {
            let raw = scorer.score(&normalize(answer_text), &normalize(correct_answer));
            // one decimal, matching what gets persisted
            let similarity_score = (raw * 10.0).round() / 10.0;
            Evaluation {
                is_correct: similarity_score >= threshold,
                similarity_score,
                method: scorer.name(),
            }
        }
        other => {
            tracing::warn!("Unknown question type '{}', treating answer as incorrect", other);
            Evaluation {
                is_correct: false,
                similarity_score: 0.0,
                method: "unknown",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scorer returning a fixed value, for exercising the threshold logic.
    struct FixedScorer(f64);

    impl SimilarityScorer for FixedScorer {
        fn score(&self, _answer: &str, _correct: &str) -> f64 {
            self.0
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn mcq_accepts_leading_letter_with_trailing_text() {
        let scorer = FuzzyScorer;
        let eval = evaluate(&scorer, "a) because...", "A", "mcq", DEFAULT_SIMILARITY_THRESHOLD);
        assert!(eval.is_correct);
        assert_eq!(eval.similarity_score, 100.0);
        assert_eq!(eval.method, "exact_match");
    }

    #[test]
    fn mcq_wrong_letter_scores_zero() {
        let scorer = FuzzyScorer;
        let eval = evaluate(&scorer, "B", "A", "mcq", DEFAULT_SIMILARITY_THRESHOLD);
        assert!(!eval.is_correct);
        assert_eq!(eval.similarity_score, 0.0);
    }

    #[test]
    fn mcq_ignores_fuzzy_similarity() {
        let scorer = FixedScorer(100.0);
        let eval = evaluate(&scorer, "D", "A", "mcq", DEFAULT_SIMILARITY_THRESHOLD);
        assert!(!eval.is_correct);
    }

    #[test]
    fn completion_exactly_at_threshold_is_correct() {
        let scorer = FixedScorer(90.0);
        let eval = evaluate(&scorer, "x", "y", "completion", 90.0);
        assert!(eval.is_correct);
        assert_eq!(eval.similarity_score, 90.0);
    }

    #[test]
    fn completion_just_below_threshold_is_incorrect() {
        let scorer = FixedScorer(89.9);
        let eval = evaluate(&scorer, "x", "y", "completion", 90.0);
        assert!(!eval.is_correct);
        assert_eq!(eval.similarity_score, 89.9);
    }

    #[test]
    fn completion_single_substitution_scores_ninety() {
        let scorer = FuzzyScorer;
        let eval = evaluate(&scorer, "abcdefghij", "abcdefghix", "completion", 90.0);
        assert!(eval.is_correct);
        assert_eq!(eval.similarity_score, 90.0);
    }

    #[test]
    fn completion_fuzzy_match_with_filler_words() {
        let scorer = FuzzyScorer;
        let eval = evaluate(&scorer, "be star event", "Be Star", "completion", 90.0);
        assert!(eval.is_correct);
        assert_eq!(eval.method, "fuzzy_match");
    }

    #[test]
    fn completion_arabic_variants_match() {
        let scorer = FuzzyScorer;
        // same word spelled with alef-hamza + tashkeel vs bare letters
        let eval = evaluate(&scorer, "أَحمَد", "احمد", "completion", 90.0);
        assert!(eval.is_correct);
        assert_eq!(eval.similarity_score, 100.0);
    }

    #[test]
    fn unknown_question_type_is_nonfatal_default() {
        let scorer = FuzzyScorer;
        let eval = evaluate(&scorer, "anything", "anything", "essay", 90.0);
        assert!(!eval.is_correct);
        assert_eq!(eval.similarity_score, 0.0);
        assert_eq!(eval.method, "unknown");
    }
}
