//! Threshold policy deciding between auto-accept and manual review.

use super::types::{MatchOutcome, MatchSource, MatchStatus, Suggestion};
use crate::services::catalog::FuzzyHit;
use crate::services::config::MatcherThresholds;

const DISTANCE_WEIGHT: f64 = 0.7;
const SIMILARITY_WEIGHT: f64 = 0.3;

/// Blend of trigram distance and similarity, clamped to [0, 1].
pub fn blend_score(distance: f64, similarity: f64) -> f64 {
    let raw = (1.0 - distance).max(0.0) * DISTANCE_WEIGHT + similarity * SIMILARITY_WEIGHT;
    raw.clamp(0.0, 1.0)
}

/// Scored suggestions in store ranking order.
pub fn score_hits(hits: &[FuzzyHit]) -> Vec<Suggestion> {
    hits.iter()
        .map(|hit| Suggestion::from_card(&hit.card, blend_score(hit.distance, hit.similarity)))
        .collect()
}

/// Whether the top candidate may be chosen without review.
pub fn should_auto_accept(top: f64, second: Option<f64>, thresholds: &MatcherThresholds) -> bool {
    match second {
        None => true,
        Some(second) => {
            top >= thresholds.auto_accept
                || (top >= thresholds.strong_score && top - second >= thresholds.min_gap)
        }
    }
}

/// Decide a fuzzy stage outcome. `None` when there is no candidate.
pub fn decide_fuzzy(
    suggestions: Vec<Suggestion>,
    thresholds: &MatcherThresholds,
    source: MatchSource,
) -> Option<MatchOutcome> {
    let top = suggestions.first()?;
    let top_score = top.score;
    let top_id = top.card_id;
    let second = suggestions.get(1).map(|s| s.score);

    let outcome = if should_auto_accept(top_score, second, thresholds) {
        MatchOutcome {
            status: MatchStatus::Fuzzy,
            confidence: top_score.min(1.0),
            chosen_id: Some(top_id),
            suggestions,
            source,
        }
    } else {
        MatchOutcome {
            status: MatchStatus::Ambiguous,
            confidence: top_score,
            chosen_id: None,
            suggestions,
            source,
        }
    };
    Some(outcome)
}

#[cfg(test)]
#[path = "tests/decision_tests.rs"]
mod tests;
