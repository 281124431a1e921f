//! Nearest-neighbour search over catalog hashes by Hamming distance.

use serde::{Deserialize, Serialize};

use super::dhash::{is_hex16, PerceptualHash, MAX_DISTANCE};
use crate::database::models::CardRef;
use crate::types::errors::MatchResult;

pub const DEFAULT_TOP_K: usize = 5;
pub const MAX_TOP_K: usize = 10;

/// A validated visual search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualQuery {
    pub hash: PerceptualHash,
    /// Clamped to `1..=10`.
    pub top_k: usize,
    /// Clamped to `0..=64` when present.
    pub max_distance: Option<u32>,
}

impl VisualQuery {
    /// Validate the hash and clamp the numeric parameters.
    pub fn new(hash: &str, top_k: Option<i64>, max_distance: Option<i64>) -> MatchResult<Self> {
        Ok(Self::from_hash(
            PerceptualHash::parse(hash)?,
            top_k,
            max_distance,
        ))
    }

    /// Clamp the numeric parameters around an already parsed hash.
    pub fn from_hash(hash: PerceptualHash, top_k: Option<i64>, max_distance: Option<i64>) -> Self {
        let top_k = top_k
            .map(|k| k.clamp(1, MAX_TOP_K as i64) as usize)
            .unwrap_or(DEFAULT_TOP_K);
        let max_distance = max_distance.map(|d| d.clamp(0, i64::from(MAX_DISTANCE)) as u32);
        Self {
            hash,
            top_k,
            max_distance,
        }
    }
}

/// One visual match. `score = 64 - distance`, higher is closer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualCandidate {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub distance: u32,
    pub score: u32,
}

/// Rank `cards` by distance to the query hash.
///
/// Cards without a hash, or with a malformed one, are skipped. Ties keep
/// the order in which `cards` were supplied. An empty result is not an error.
pub fn search_by_hash(query: &VisualQuery, cards: &[CardRef]) -> Vec<VisualCandidate> {
    let mut scored: Vec<VisualCandidate> = cards
        .iter()
        .filter_map(|card| {
            let stored = card.image_dhash.as_deref()?;
            if !is_hex16(stored) {
                return None;
            }
            let distance = query.hash.distance(&PerceptualHash::parse(stored).ok()?);
            Some(VisualCandidate {
                id: card.id,
                name: card.name.clone(),
                card_type: card.card_type.clone(),
                distance,
                score: MAX_DISTANCE - distance,
            })
        })
        .filter(|candidate| {
            query
                .max_distance
                .map_or(true, |max| candidate.distance <= max)
        })
        .collect();

    // Stable: equal distances keep retrieval order.
    scored.sort_by_key(|candidate| candidate.distance);
    scored.truncate(query.top_k);
    scored
}

#[cfg(test)]
#[path = "tests/visual_search_tests.rs"]
mod tests;
