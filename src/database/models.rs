use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tournament legality of a card (TCG banlist).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BanStatus {
    #[default]
    Legal,
    Limited,
    SemiLimited,
    Banned,
}

impl BanStatus {
    /// Parse the free-form `ban_tcg` value of the upstream dump.
    /// Anything unrecognized (including absence) is legal.
    pub fn from_ban_tcg(value: Option<&str>) -> Self {
        let value = value.unwrap_or_default().trim().to_lowercase();
        match value.as_str() {
            "forbidden" | "banned" => BanStatus::Banned,
            "limited" => BanStatus::Limited,
            "semilimited" | "semi-limited" | "semi_limited" => BanStatus::SemiLimited,
            _ => BanStatus::Legal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BanStatus::Legal => "LEGAL",
            BanStatus::Limited => "LIMITED",
            BanStatus::SemiLimited => "SEMI_LIMITED",
            BanStatus::Banned => "BANNED",
        }
    }
}

impl fmt::Display for BanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LEGAL" => Ok(BanStatus::Legal),
            "LIMITED" => Ok(BanStatus::Limited),
            "SEMI_LIMITED" => Ok(BanStatus::SemiLimited),
            "BANNED" => Ok(BanStatus::Banned),
            _ => Err(format!("Unknown ban status: {s}")),
        }
    }
}

/// Coarse card category used by type hints and browse filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardCategory {
    Monster,
    Spell,
    Trap,
}

impl CardCategory {
    /// Interpret a spreadsheet/UI hint. Accepts the English and French labels.
    /// Unrecognized hints yield `None` (no filtering).
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = crate::services::text::normalizer::normalize(hint);
        match hint.as_str() {
            "monster" | "monstre" | "monster card" => Some(CardCategory::Monster),
            "spell" | "magie" | "spell card" => Some(CardCategory::Spell),
            "trap" | "piege" | "trap card" => Some(CardCategory::Trap),
            _ => None,
        }
    }
}

/// Monster subclass relevant to numeric attributes: Xyz monsters carry a
/// rank, Link monsters a link rating, everything else a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardClass {
    Xyz,
    Link,
    Other,
}

impl CardClass {
    pub fn detect(frame_type: Option<&str>, card_type: Option<&str>) -> Self {
        let frame = frame_type.unwrap_or_default().to_lowercase();
        let kind = card_type.unwrap_or_default().to_lowercase();
        if frame.contains("link") || kind.contains("link") {
            CardClass::Link
        } else if frame.contains("xyz") || kind.contains("xyz") {
            CardClass::Xyz
        } else {
            CardClass::Other
        }
    }
}

/// Full catalog row stored in the `cards` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub frame_type: Option<String>,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub race: Option<String>,
    pub archetype: Option<String>,
    pub atk: Option<i64>,
    pub def: Option<i64>,
    pub level: Option<i64>,
    pub rank: Option<i64>,
    pub link: Option<i64>,
    pub attribute: Option<String>,
    pub image_url: Option<String>,
    pub image_small_url: Option<String>,
    pub ban_status: BanStatus,
    pub image_dhash: Option<String>,
    pub content_hash: Option<String>,
}

impl CardRecord {
    pub fn class(&self) -> CardClass {
        CardClass::detect(self.frame_type.as_deref(), self.card_type.as_deref())
    }
}

/// The slice of a card the matching core reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CardRef {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub race: Option<String>,
    pub image_dhash: Option<String>,
}

impl From<&CardRecord> for CardRef {
    fn from(record: &CardRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            card_type: record.card_type.clone(),
            race: record.race.clone(),
            image_dhash: record.image_dhash.clone(),
        }
    }
}

/// Sync bookkeeping for one stored card.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredCardState {
    pub id: i64,
    pub content_hash: Option<String>,
    pub image_dhash: Option<String>,
    pub image_url: Option<String>,
}

/// Compact row returned by the paged browse search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub race: Option<String>,
    pub attribute: Option<String>,
    pub level: Option<i64>,
    pub rank: Option<i64>,
    pub link: Option<i64>,
    pub image_small_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardPage {
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub data: Vec<CardSummary>,
}

#[cfg(test)]
#[path = "tests/models_tests.rs"]
mod tests;
