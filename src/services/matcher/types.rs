//! Domain types of the identification pipeline.

use serde::{Deserialize, Serialize};

use crate::database::models::CardRef;

/// Terminal decision of one match attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Unique exact hit (name or passcode).
    Exact,
    /// Approximate hit accepted automatically.
    Fuzzy,
    /// Candidates exist but none is safe to auto-accept.
    Ambiguous,
    /// No stage produced a candidate.
    NotFound,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Exact => write!(f, "exact"),
            MatchStatus::Fuzzy => write!(f, "fuzzy"),
            MatchStatus::Ambiguous => write!(f, "ambiguous"),
            MatchStatus::NotFound => write!(f, "not_found"),
        }
    }
}

/// Which stage of the cascade produced the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Passcode,
    ExactName,
    FuzzyName,
    TranslatedName,
    Visual,
    None,
}

/// A ranked candidate offered to the caller. `score` is in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub card_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub race: Option<String>,
    pub score: f64,
}

impl Suggestion {
    pub fn from_card(card: &CardRef, score: f64) -> Self {
        Self {
            card_id: card.id,
            name: card.name.clone(),
            card_type: card.card_type.clone(),
            race: card.race.clone(),
            score,
        }
    }
}

/// Structured result of `identify_by_name` / `identify_scan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub status: MatchStatus,
    /// In [0, 1]; 0 for `not_found`.
    pub confidence: f64,
    /// Set only for `exact` and `fuzzy`.
    pub chosen_id: Option<i64>,
    pub suggestions: Vec<Suggestion>,
    pub source: MatchSource,
}

impl MatchOutcome {
    pub fn not_found() -> Self {
        Self {
            status: MatchStatus::NotFound,
            confidence: 0.0,
            chosen_id: None,
            suggestions: Vec::new(),
            source: MatchSource::None,
        }
    }

    pub fn exact(card: &CardRef, source: MatchSource) -> Self {
        Self {
            status: MatchStatus::Exact,
            confidence: 1.0,
            chosen_id: Some(card.id),
            suggestions: vec![Suggestion::from_card(card, 1.0)],
            source,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, MatchStatus::Exact | MatchStatus::Fuzzy)
    }
}

/// Name lookup request (spreadsheet row or free text).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NameQuery {
    pub name: Option<String>,
    pub type_hint: Option<String>,
    pub race_hint: Option<String>,
}

impl NameQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Observations from one live scan. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanQuery {
    /// OCR'd card name.
    pub text: Option<String>,
    /// OCR'd passcode zone; digits are extracted from the noise.
    pub passcode_text: Option<String>,
    /// Perceptual hash of the card artwork.
    pub image_hash: Option<String>,
}
