// src/scoring/similarity.rs

use std::collections::BTreeSet;

/// Strategy for scoring two already-normalized strings on a 0-100 scale.
///
/// Implementations are interchangeable at service construction time, so the
/// multi-metric scorer and the plain token-overlap fallback can be swapped
/// without touching the evaluator.
pub trait SimilarityScorer: Send + Sync {
    /// Returns a similarity score in [0, 100].
    ///
    /// Either input empty must yield 0; equal inputs must yield 100.
    fn score(&self, answer: &str, correct: &str) -> f64;

    /// Human-readable name reported as the evaluation method.
    fn name(&self) -> &'static str;
}

/// Multi-metric fuzzy scorer.
///
/// Computes four similarity metrics and keeps the best: whole-string ratio,
/// best-window partial ratio, token-sort ratio and token-set ratio. Word
/// reordering, filler words and partial phrases are each caught by a
/// different metric, so a legitimate paraphrase is never penalized by the
/// one metric that happens to dislike it.
#[derive(Debug, Default)]
pub struct FuzzyScorer;

impl SimilarityScorer for FuzzyScorer {
    fn score(&self, answer: &str, correct: &str) -> f64 {
        if answer.is_empty() || correct.is_empty() {
            return 0.0;
        }
        if answer == correct {
            return 100.0;
        }

        let a: Vec<char> = answer.chars().collect();
        let b: Vec<char> = correct.chars().collect();

        [
            ratio(&a, &b),
            partial_ratio(&a, &b),
            token_sort_ratio(answer, correct),
            token_set_ratio(answer, correct),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    fn name(&self) -> &'static str {
        "fuzzy_match"
    }
}

/// Fallback scorer: Jaccard overlap of whitespace-split token sets, scaled
/// to the same 0-100 range as the fuzzy scorer.
#[derive(Debug, Default)]
pub struct TokenOverlapScorer;

impl SimilarityScorer for TokenOverlapScorer {
    fn score(&self, answer: &str, correct: &str) -> f64 {
        if answer.is_empty() || correct.is_empty() {
            return 0.0;
        }

        let a: BTreeSet<&str> = answer.split_whitespace().collect();
        let b: BTreeSet<&str> = correct.split_whitespace().collect();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let intersection = a.intersection(&b).count();
        let union = a.union(&b).count();
        intersection as f64 / union as f64 * 100.0
    }

    fn name(&self) -> &'static str {
        "token_overlap"
    }
}

/// Length of the longest common subsequence, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
        curr[0] = 0;
    }

    prev[b.len()]
}

/// Whole-string similarity based on insert/delete edit distance:
/// `2 * LCS / (|a| + |b|) * 100`. Reaches 100 only for identical inputs.
fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    2.0 * lcs_len(a, b) as f64 / total as f64 * 100.0
}

/// Best ratio of the shorter string against any same-length window of the
/// longer one, so a correct phrase embedded in extra text still scores high.
fn partial_ratio(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }

    let mut best = 0.0f64;
    for start in 0..=(long.len() - short.len()) {
        best = best.max(ratio(short, &long[start..start + short.len()]));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Ratio after sorting the tokens of both sides, neutralizing word order.
fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let sorted = |s: &str| -> String {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    };

    let (sa, sb) = (sorted(a), sorted(b));
    ratio(
        &sa.chars().collect::<Vec<_>>(),
        &sb.chars().collect::<Vec<_>>(),
    )
}

/// Ratio over deduplicated token sets: the shared tokens are compared against
/// each side's full sorted token list, and the best pairing wins. An answer
/// whose tokens are a superset of the reference scores 100.
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();

    let shared = set_a.intersection(&set_b).copied().collect::<Vec<_>>();
    let only_a = set_a.difference(&set_b).copied().collect::<Vec<_>>();
    let only_b = set_b.difference(&set_a).copied().collect::<Vec<_>>();

    let base = shared.join(" ");
    let full_a = join_tokens(&base, &only_a.join(" "));
    let full_b = join_tokens(&base, &only_b.join(" "));

    let chars = |s: &str| s.chars().collect::<Vec<_>>();
    let (base, full_a, full_b) = (chars(&base), chars(&full_a), chars(&full_b));

    ratio(&base, &full_a)
        .max(ratio(&base, &full_b))
        .max(ratio(&full_a, &full_b))
}

fn join_tokens(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{left} {right}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_score_100() {
        let scorer = FuzzyScorer;
        assert_eq!(scorer.score("be star", "be star"), 100.0);
        assert_eq!(scorer.score("مرحبا بكم", "مرحبا بكم"), 100.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        let scorer = FuzzyScorer;
        assert_eq!(scorer.score("", "be star"), 0.0);
        assert_eq!(scorer.score("be star", ""), 0.0);
        assert_eq!(scorer.score("", ""), 0.0);
    }

    #[test]
    fn whole_string_ratio_is_exact_for_single_substitution() {
        let a: Vec<char> = "abcdefghij".chars().collect();
        let b: Vec<char> = "abcdefghix".chars().collect();
        // 9 shared characters out of 10+10
        assert_eq!(ratio(&a, &b), 90.0);
    }

    #[test]
    fn extra_filler_words_still_match_via_token_set() {
        let scorer = FuzzyScorer;
        // token-set: the reference tokens are a subset of the answer tokens
        assert_eq!(scorer.score("be star event", "be star"), 100.0);
    }

    #[test]
    fn word_reordering_matches_via_token_sort() {
        let scorer = FuzzyScorer;
        assert_eq!(scorer.score("star be", "be star"), 100.0);
    }

    #[test]
    fn embedded_phrase_matches_via_partial_ratio() {
        let a: Vec<char> = "star".chars().collect();
        let b: Vec<char> = "be star event".chars().collect();
        assert_eq!(partial_ratio(&a, &b), 100.0);
    }

    #[test]
    fn unrelated_strings_score_low() {
        let scorer = FuzzyScorer;
        assert!(scorer.score("qqq www", "be star") < 50.0);
    }

    #[test]
    fn token_overlap_fallback_is_comparable_scale() {
        let scorer = TokenOverlapScorer;
        assert_eq!(scorer.score("be star", "be star"), 100.0);
        assert_eq!(scorer.score("", "be star"), 0.0);
        // 2 shared tokens, 3 in the union
        let score = scorer.score("be star event", "be star");
        assert!((score - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn lcs_handles_disjoint_and_nested_inputs() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(lcs_len(&chars("abc"), &chars("xyz")), 0);
        assert_eq!(lcs_len(&chars("abc"), &chars("aXbXc")), 3);
        assert_eq!(lcs_len(&chars(""), &chars("abc")), 0);
    }
}
