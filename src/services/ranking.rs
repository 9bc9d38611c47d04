//! Blended similarity scorer.
//!
//! Ranks candidate shows against a seed embedding (the title the user is
//! asking about) and a weighted memory of past preference signals. The
//! scorer is a pure function of its arguments: it holds no state and never
//! mutates its inputs.
use std::collections::HashSet;

use crate::models::{CandidateItem, MemoryItem, MemorySource, ScoredCandidate};

/// Added to the magnitude product so zero vectors score 0 instead of NaN
pub const SIMILARITY_EPSILON: f64 = 1e-6;
/// Share of the final score taken by accumulated memory affinity
pub const MEMORY_BLEND: f64 = 0.35;
/// Share of the final score taken by similarity to the seed
pub const SEED_BLEND: f64 = 0.65;
pub const LONG_TERM_MULTIPLIER: f64 = 1.0;
pub const SHORT_TERM_MULTIPLIER: f64 = 1.3;
/// Number of candidates returned by a ranking call
pub const TOP_K: usize = 3;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid memory weight: {0} (must be finite and non-negative)")]
    InvalidWeight(f64),

    #[error("Embedding contains a non-finite value")]
    NonFiniteEmbedding,

    #[error("Score for candidate {0} is not finite")]
    NonFiniteScore(String),
}

impl MemorySource {
    /// Recency bias applied to a memory item's contribution
    pub fn multiplier(self) -> f64 {
        match self {
            MemorySource::LongTerm => LONG_TERM_MULTIPLIER,
            MemorySource::ShortTerm => SHORT_TERM_MULTIPLIER,
        }
    }
}

/// Cosine similarity with an epsilon-guarded denominator
///
/// Returns a value in roughly [-1, 1]. Vectors of different length are
/// rejected rather than truncated, as are NaN or infinite components.
///
/// When the products overflow, both vectors are rescaled by their largest
/// component and the similarity is computed again.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, RankingError> {
    check_dimension(a.len(), b.len())?;
    check_finite(a)?;
    check_finite(b)?;

    if let Some(sim) = raw_cosine(a, b) {
        return Ok(sim);
    }

    let (a, b) = (rescale(a), rescale(b));
    Ok(raw_cosine(&a, &b).unwrap_or(0.0))
}

/// `None` if the dot product or the magnitude product overflows
fn raw_cosine(a: &[f64], b: &[f64]) -> Option<f64> {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let magnitude = norm_a * norm_b;

    if !dot.is_finite() || !magnitude.is_finite() {
        return None;
    }
    Some(dot / (magnitude + SIMILARITY_EPSILON))
}

/// Divides every component by the largest absolute one
fn rescale(v: &[f64]) -> Vec<f64> {
    let max = v.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if max == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / max).collect()
}

/// Ranks candidates and returns the top [`TOP_K`] by blended score
pub fn rank(
    candidates: &[CandidateItem],
    memory: &[MemoryItem],
    seed_embedding: &[f64],
) -> Result<Vec<ScoredCandidate>, RankingError> {
    rank_excluding(candidates, memory, seed_embedding, &HashSet::new())
}

/// Same as [`rank`], but drops candidates whose ID is in `excluded` first
///
/// Excluded candidates are never compared, so they are not validated either.
/// Every remaining input is validated before any score is computed; the
/// first violation rejects the whole call.
pub fn rank_excluding(
    candidates: &[CandidateItem],
    memory: &[MemoryItem],
    seed_embedding: &[f64],
    excluded: &HashSet<String>,
) -> Result<Vec<ScoredCandidate>, RankingError> {
    let eligible: Vec<&CandidateItem> = candidates
        .iter()
        .filter(|c| !excluded.contains(&c.id))
        .collect();

    let excluded_count = candidates.len() - eligible.len();

    if eligible.is_empty() {
        return Ok(Vec::new());
    }

    validate(&eligible, memory, seed_embedding.len())?;

    let mut scored = eligible
        .into_iter()
        .map(|candidate| score_candidate(candidate, memory, seed_embedding))
        .collect::<Result<Vec<_>, _>>()?;

    // Stable sort: equal scores keep their input order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(TOP_K);

    tracing::debug!(
        candidates = candidates.len(),
        excluded = excluded_count,
        memory = memory.len(),
        returned = scored.len(),
        "Ranked candidates"
    );

    Ok(scored)
}

fn validate(
    candidates: &[&CandidateItem],
    memory: &[MemoryItem],
    dimension: usize,
) -> Result<(), RankingError> {
    for item in memory {
        if !item.weight.is_finite() || item.weight < 0.0 {
            return Err(RankingError::InvalidWeight(item.weight));
        }
        check_dimension(dimension, item.embedding.len())?;
        check_finite(&item.embedding)?;
    }

    for candidate in candidates {
        check_dimension(dimension, candidate.embedding.len())?;
        check_finite(&candidate.embedding)?;
    }

    Ok(())
}

fn check_finite(embedding: &[f64]) -> Result<(), RankingError> {
    if embedding.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(RankingError::NonFiniteEmbedding)
    }
}

fn check_dimension(expected: usize, actual: usize) -> Result<(), RankingError> {
    if expected != actual {
        return Err(RankingError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

fn score_candidate(
    candidate: &CandidateItem,
    memory: &[MemoryItem],
    seed_embedding: &[f64],
) -> Result<ScoredCandidate, RankingError> {
    let mut memory_affinity = 0.0;
    for item in memory {
        let sim = cosine_similarity(&candidate.embedding, &item.embedding)?;
        memory_affinity += sim * item.weight * item.source.multiplier();
    }

    let seed_sim = cosine_similarity(&candidate.embedding, seed_embedding)?;

    // Adding 0.0 turns -0.0 into 0.0 so it ties with 0.0 under total_cmp
    let score = memory_affinity * MEMORY_BLEND + seed_sim * SEED_BLEND + 0.0;
    if !score.is_finite() {
        return Err(RankingError::NonFiniteScore(candidate.id.clone()));
    }

    Ok(ScoredCandidate {
        id: candidate.id.clone(),
        embedding: candidate.embedding.clone(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-5;

    fn candidate(id: &str, embedding: &[f64]) -> CandidateItem {
        CandidateItem::new(id, embedding.to_vec())
    }

    fn memory(embedding: &[f64], weight: f64, source: MemorySource) -> MemoryItem {
        MemoryItem::new(embedding.to_vec(), weight, source)
    }

    fn ids(scored: &[ScoredCandidate]) -> Vec<&str> {
        scored.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_cosine_self_similarity() {
        let a = [0.3, -1.2, 4.0];
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let zero = [0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &zero).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&zero, &[1.0, 2.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = [1.0, 2.0, -0.5];
        let b = [-3.0, 0.25, 7.0];
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((sim + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            RankingError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_rank_empty_candidates() {
        let result = rank(&[], &[], &[1.0, 0.0]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_rank_empty_candidates_ignores_memory() {
        let bad_memory = [memory(&[1.0, 0.0, 0.0], -1.0, MemorySource::LongTerm)];
        let result = rank(&[], &bad_memory, &[1.0, 0.0]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_rank_single_candidate_seed_only() {
        let c = candidate("A", &[0.2, 0.9, -0.4]);
        let result = rank(&[c.clone()], &[], &c.embedding).unwrap();

        assert_eq!(result.len(), 1);
        let expected = SEED_BLEND * cosine_similarity(&c.embedding, &c.embedding).unwrap();
        assert!((result[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rank_orthogonal_scenario() {
        let candidates = [candidate("A", &[1.0, 0.0]), candidate("B", &[0.0, 1.0])];
        let result = rank(&candidates, &[], &[1.0, 0.0]).unwrap();

        assert_eq!(ids(&result), vec!["A", "B"]);
        assert!((result[0].score - 0.65).abs() < TOLERANCE);
        assert_eq!(result[1].score, 0.0);
    }

    #[test]
    fn test_rank_reorders_by_score() {
        let candidates = [
            candidate("far", &[0.0, 1.0]),
            candidate("near", &[1.0, 0.1]),
            candidate("opposite", &[-1.0, 0.0]),
        ];
        let result = rank(&candidates, &[], &[1.0, 0.0]).unwrap();

        assert_eq!(ids(&result), vec!["near", "far", "opposite"]);
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        let candidates: Vec<CandidateItem> = (0..6)
            .map(|i| candidate(&format!("c{}", i), &[1.0, i as f64]))
            .collect();
        let result = rank(&candidates, &[], &[1.0, 0.0]).unwrap();

        assert_eq!(result.len(), TOP_K);
        assert_eq!(ids(&result), vec!["c0", "c1", "c2"]);
    }

    #[test]
    fn test_rank_fewer_than_top_k_not_padded() {
        let candidates = [candidate("A", &[1.0, 0.0]), candidate("B", &[0.5, 0.5])];
        let result = rank(&candidates, &[], &[1.0, 0.0]).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_rank_is_sorted_descending() {
        let candidates = [
            candidate("a", &[0.1, 0.9]),
            candidate("b", &[0.9, 0.1]),
            candidate("c", &[0.5, 0.5]),
            candidate("d", &[-0.3, 0.7]),
        ];
        let mem = [memory(&[0.0, 1.0], 0.8, MemorySource::ShortTerm)];
        let result = rank(&candidates, &mem, &[1.0, 0.0]).unwrap();

        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let candidates = [
            candidate("first", &[0.0, 1.0]),
            candidate("second", &[0.0, 2.0]),
            candidate("third", &[0.0, 3.0]),
            candidate("fourth", &[0.0, 4.0]),
        ];
        let result = rank(&candidates, &[], &[1.0, 0.0]).unwrap();

        assert_eq!(ids(&result), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let candidates = [
            candidate("a", &[0.3, 0.4, 0.5]),
            candidate("b", &[0.9, -0.1, 0.2]),
            candidate("c", &[-0.2, 0.8, 0.1]),
        ];
        let mem = [
            memory(&[0.1, 0.2, 0.3], 1.5, MemorySource::LongTerm),
            memory(&[0.7, 0.0, -0.2], 0.5, MemorySource::ShortTerm),
        ];
        let seed = [0.4, 0.4, 0.4];

        let first = rank(&candidates, &mem, &seed).unwrap();
        let second = rank(&candidates, &mem, &seed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_term_weighted_more_than_long_term() {
        let candidates = [candidate("A", &[1.0, 1.0])];
        let seed = [0.0, 0.0];
        let long = [memory(&[1.0, 0.0], 2.0, MemorySource::LongTerm)];
        let short = [memory(&[1.0, 0.0], 2.0, MemorySource::ShortTerm)];

        let long_score = rank(&candidates, &long, &seed).unwrap()[0].score;
        let short_score = rank(&candidates, &short, &seed).unwrap()[0].score;

        assert!(long_score > 0.0);
        assert!((short_score / long_score - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_memory_contribution_formula() {
        let c = candidate("A", &[1.0, 0.0]);
        let mem = [memory(&[1.0, 0.0], 0.5, MemorySource::LongTerm)];
        let result = rank(&[c], &mem, &[0.0, 1.0]).unwrap();

        let sim = 1.0 / (1.0 + SIMILARITY_EPSILON);
        let expected = sim * 0.5 * MEMORY_BLEND;
        assert!((result[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rank_candidate_dimension_mismatch() {
        let candidates = [candidate("A", &[1.0, 0.0, 0.0])];
        let err = rank(&candidates, &[], &[1.0, 0.0]).unwrap_err();

        assert!(matches!(err, RankingError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_rank_memory_dimension_mismatch() {
        let candidates = [candidate("A", &[1.0, 0.0])];
        let mem = [memory(&[1.0], 1.0, MemorySource::LongTerm)];
        let err = rank(&candidates, &mem, &[1.0, 0.0]).unwrap_err();

        assert_eq!(
            err,
            RankingError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_rank_rejects_whole_call_on_one_bad_candidate() {
        let candidates = [
            candidate("good", &[1.0, 0.0]),
            candidate("bad", &[1.0]),
            candidate("also_good", &[0.0, 1.0]),
        ];
        assert!(rank(&candidates, &[], &[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_rank_negative_weight() {
        let candidates = [candidate("A", &[1.0, 0.0])];
        let mem = [memory(&[1.0, 0.0], -0.1, MemorySource::ShortTerm)];
        let err = rank(&candidates, &mem, &[1.0, 0.0]).unwrap_err();

        assert_eq!(err, RankingError::InvalidWeight(-0.1));
    }

    #[test]
    fn test_rank_nan_weight_rejected() {
        let candidates = [candidate("A", &[1.0, 0.0])];
        let mem = [memory(&[1.0, 0.0], f64::NAN, MemorySource::LongTerm)];

        assert!(matches!(
            rank(&candidates, &mem, &[1.0, 0.0]),
            Err(RankingError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_zero_weight_is_allowed() {
        let candidates = [candidate("A", &[1.0, 0.0])];
        let mem = [memory(&[1.0, 0.0], 0.0, MemorySource::LongTerm)];
        let result = rank(&candidates, &mem, &[1.0, 0.0]).unwrap();

        assert!((result[0].score - 0.65).abs() < TOLERANCE);
    }

    #[test]
    fn test_zero_vector_candidate_scores_zero() {
        let candidates = [candidate("zero", &[0.0, 0.0])];
        let mem = [memory(&[1.0, 0.0], 1.0, MemorySource::ShortTerm)];
        let result = rank(&candidates, &mem, &[1.0, 0.0]).unwrap();

        assert_eq!(result[0].score, 0.0);
        assert!(result[0].score.is_finite());
    }

    #[test]
    fn test_cosine_large_components_stay_finite() {
        let sim = cosine_similarity(&[1e200, 1e200], &[1e200, 0.0]).unwrap();
        assert!((sim - std::f64::consts::FRAC_1_SQRT_2).abs() < TOLERANCE);

        let sim = cosine_similarity(&[1.0, 0.0], &[1e200, 0.0]).unwrap();
        assert!((sim - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_cosine_rejects_non_finite_components() {
        assert_eq!(
            cosine_similarity(&[f64::NAN, 0.0], &[1.0, 0.0]),
            Err(RankingError::NonFiniteEmbedding)
        );
        assert_eq!(
            cosine_similarity(&[1.0, 0.0], &[f64::INFINITY, 0.0]),
            Err(RankingError::NonFiniteEmbedding)
        );
    }

    #[test]
    fn test_rank_large_embeddings_produce_finite_scores() {
        let candidates = [candidate("big", &[1e200, 1e200]), candidate("unit", &[1.0, 0.0])];
        let result = rank(&candidates, &[], &[1e200, 0.0]).unwrap();

        assert!(result.iter().all(|c| c.score.is_finite()));
        assert_eq!(ids(&result), vec!["unit", "big"]);
        assert!((result[0].score - SEED_BLEND).abs() < TOLERANCE);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json[1]["score"].is_f64());
    }

    #[test]
    fn test_rank_rejects_non_finite_candidate() {
        let candidates = [candidate("ok", &[1.0, 0.0]), candidate("inf", &[f64::INFINITY, 0.0])];
        assert_eq!(
            rank(&candidates, &[], &[1.0, 0.0]),
            Err(RankingError::NonFiniteEmbedding)
        );
    }

    #[test]
    fn test_rank_infinite_weight_rejected() {
        let candidates = [candidate("A", &[1.0, 0.0])];
        let mem = [memory(&[1.0, 0.0], f64::INFINITY, MemorySource::LongTerm)];

        assert_eq!(
            rank(&candidates, &mem, &[1.0, 0.0]),
            Err(RankingError::InvalidWeight(f64::INFINITY))
        );
    }

    #[test]
    fn test_rank_overflowing_score_rejected() {
        let candidates = [candidate("A", &[1.0, 0.0])];
        let mem = [
            memory(&[1.0, 0.0], f64::MAX, MemorySource::ShortTerm),
            memory(&[1.0, 0.0], f64::MAX, MemorySource::ShortTerm),
        ];

        assert_eq!(
            rank(&candidates, &mem, &[1.0, 0.0]),
            Err(RankingError::NonFiniteScore("A".to_string()))
        );
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let candidates = [candidate("pos", &[0.0, 1.0]), candidate("neg", &[0.0, -1.0])];
        let result = rank(&candidates, &[], &[1.0, 0.0]).unwrap();

        assert_eq!(ids(&result), vec!["pos", "neg"]);
    }

    #[test]
    fn test_rank_excluding_drops_ids() {
        let candidates = [
            candidate("A", &[1.0, 0.0]),
            candidate("B", &[0.9, 0.1]),
            candidate("C", &[0.0, 1.0]),
        ];
        let excluded: HashSet<String> = ["A".to_string()].into_iter().collect();
        let result = rank_excluding(&candidates, &[], &[1.0, 0.0], &excluded).unwrap();

        assert_eq!(ids(&result), vec!["B", "C"]);
    }

    #[test]
    fn test_rank_excluding_skips_validation_of_excluded() {
        let candidates = [candidate("bad", &[1.0, 0.0, 0.0]), candidate("ok", &[1.0, 0.0])];
        let excluded: HashSet<String> = ["bad".to_string()].into_iter().collect();
        let result = rank_excluding(&candidates, &[], &[1.0, 0.0], &excluded).unwrap();

        assert_eq!(ids(&result), vec!["ok"]);
    }

    #[test]
    fn test_rank_does_not_mutate_inputs() {
        let candidates = vec![candidate("A", &[1.0, 2.0]), candidate("B", &[2.0, 1.0])];
        let mem = vec![memory(&[1.0, 1.0], 1.0, MemorySource::LongTerm)];
        let seed = vec![0.5, 0.5];
        let (c_before, m_before, s_before) = (candidates.clone(), mem.clone(), seed.clone());

        rank(&candidates, &mem, &seed).unwrap();

        assert_eq!(candidates, c_before);
        assert_eq!(mem, m_before);
        assert_eq!(seed, s_before);
    }
}
