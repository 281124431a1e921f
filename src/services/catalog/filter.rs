//! Structured catalog filters.
//!
//! A filter request is mapped by a pure function to a `Predicate` tree; store
//! adapters translate the tree into their own query language (`sql.rs`) or
//! evaluate it directly (`Predicate::matches`).

use serde::{Deserialize, Serialize};

use crate::database::models::{CardCategory, CardRecord};
use crate::services::text::normalizer::normalize;

pub const DEFAULT_PAGE_SIZE: u32 = 60;
pub const MAX_PAGE_SIZE: u32 = 60;

/// Filterable catalog attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    NameSearch,
    CardType,
    FrameType,
    Race,
    RaceSearch,
    Attribute,
    Level,
    Rank,
    Link,
    Atk,
    Def,
    BanStatus,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::NameSearch => "name_search",
            Field::CardType => "card_type",
            Field::FrameType => "frame_type",
            Field::Race => "race",
            Field::RaceSearch => "race_search",
            Field::Attribute => "attribute",
            Field::Level => "level",
            Field::Rank => "rank",
            Field::Link => "link",
            Field::Atk => "atk",
            Field::Def => "def",
            Field::BanStatus => "ban_status",
        }
    }

    fn text_value(&self, card: &CardRecord) -> Option<String> {
        match self {
            Field::Name => Some(card.name.clone()),
            Field::NameSearch => Some(normalize(&card.name)),
            Field::CardType => card.card_type.clone(),
            Field::FrameType => card.frame_type.clone(),
            Field::Race => card.race.clone(),
            Field::RaceSearch => card.race.as_deref().map(normalize),
            Field::Attribute => card.attribute.clone(),
            Field::BanStatus => Some(card.ban_status.as_str().to_string()),
            Field::Level | Field::Rank | Field::Link | Field::Atk | Field::Def => None,
        }
    }

    fn int_value(&self, card: &CardRecord) -> Option<i64> {
        match self {
            Field::Level => card.level,
            Field::Rank => card.rank,
            Field::Link => card.link,
            Field::Atk => card.atk,
            Field::Def => card.def,
            _ => None,
        }
    }
}

/// Language-agnostic filter tree.
///
/// Text comparisons treat a missing value as the empty string; a range never
/// matches a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    True,
    Equals {
        field: Field,
        value: String,
        ignore_case: bool,
    },
    /// Case-insensitive substring test.
    Contains { field: Field, needle: String },
    Range {
        field: Field,
        min: Option<i64>,
        max: Option<i64>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn equals(field: Field, value: impl Into<String>) -> Self {
        Predicate::Equals {
            field,
            value: value.into(),
            ignore_case: false,
        }
    }

    pub fn equals_ignore_case(field: Field, value: impl Into<String>) -> Self {
        Predicate::Equals {
            field,
            value: value.into(),
            ignore_case: true,
        }
    }

    pub fn contains(field: Field, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            field,
            needle: needle.into(),
        }
    }

    /// `None` when both bounds are absent.
    pub fn range(field: Field, min: Option<i64>, max: Option<i64>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Predicate::Range { field, min, max })
    }

    /// Conjunction with `True` parts dropped and nested `And`s flattened.
    pub fn all(parts: Vec<Predicate>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Predicate::True => {}
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::True,
            1 => flat.remove(0),
            _ => Predicate::And(flat),
        }
    }

    pub fn any(parts: Vec<Predicate>) -> Self {
        if parts.len() == 1 {
            let mut parts = parts;
            return parts.remove(0);
        }
        Predicate::Or(parts)
    }

    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Evaluate against an in-memory record.
    pub fn matches(&self, card: &CardRecord) -> bool {
        match self {
            Predicate::True => true,
            Predicate::Equals {
                field,
                value,
                ignore_case,
            } => {
                let actual = field.text_value(card).unwrap_or_default();
                if *ignore_case {
                    actual.to_lowercase() == value.to_lowercase()
                } else {
                    actual == *value
                }
            }
            Predicate::Contains { field, needle } => field
                .text_value(card)
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Predicate::Range { field, min, max } => match field.int_value(card) {
                Some(value) => {
                    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
                }
                None => false,
            },
            Predicate::And(parts) => parts.iter().all(|p| p.matches(card)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(card)),
            Predicate::Not(inner) => !inner.matches(card),
        }
    }
}

/// Optional constraints of the fuzzy name query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuzzyFilter {
    pub category: Option<CardCategory>,
    /// Already normalized race.
    pub race: Option<String>,
}

impl FuzzyFilter {
    /// Build from raw spreadsheet/UI hints. Blank or unrecognized hints
    /// impose no constraint.
    pub fn from_hints(type_hint: Option<&str>, race_hint: Option<&str>) -> Self {
        let race = race_hint.map(normalize).filter(|race| !race.is_empty());
        Self {
            category: type_hint.and_then(CardCategory::from_hint),
            race,
        }
    }

    pub fn to_predicate(&self) -> Predicate {
        let mut parts = Vec::new();
        if let Some(category) = self.category {
            parts.push(category_predicate(category));
        }
        if let Some(race) = &self.race {
            parts.push(Predicate::equals(Field::RaceSearch, race.clone()));
        }
        Predicate::all(parts)
    }
}

fn category_predicate(category: CardCategory) -> Predicate {
    match category {
        CardCategory::Monster => Predicate::contains(Field::CardType, "monster"),
        CardCategory::Spell => Predicate::equals_ignore_case(Field::CardType, "Spell Card"),
        CardCategory::Trap => Predicate::equals_ignore_case(Field::CardType, "Trap Card"),
    }
}

/// Browse filters of the catalog search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardSearchFilters {
    pub q: Option<String>,
    /// `ALL`, `MONSTER`, `SPELL` or `TRAP`.
    pub card_type: Option<String>,
    pub monster_class: Option<String>,
    pub race: Option<String>,
    pub attribute: Option<String>,
    pub spell_subtype: Option<String>,
    pub trap_subtype: Option<String>,
    pub level_min: Option<i64>,
    pub level_max: Option<i64>,
    pub atk_min: Option<i64>,
    pub atk_max: Option<i64>,
    pub def_min: Option<i64>,
    pub def_max: Option<i64>,
    /// `any`, `legal`, `limited`, `semi_limited` or `banned`.
    pub ban: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CardSearchFilters {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1) * self.page_size()
    }

    fn category(&self) -> Option<CardCategory> {
        match self.card_type.as_deref().map(str::to_uppercase).as_deref() {
            Some("MONSTER") => Some(CardCategory::Monster),
            Some("SPELL") => Some(CardCategory::Spell),
            Some("TRAP") => Some(CardCategory::Trap),
            _ => None,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Map browse filters to a predicate tree.
///
/// Monster-only filters (class, attribute, level/ATK/DEF ranges) apply only
/// when the card type is `MONSTER`. Level-like ranges follow the subclass:
/// Link monsters use `link`, Xyz monsters use `rank`, others use `level`.
pub fn build_predicate(filters: &CardSearchFilters) -> Predicate {
    let mut parts = Vec::new();

    if let Some(q) = non_blank(&filters.q) {
        let needle = normalize(q);
        if !needle.is_empty() {
            parts.push(Predicate::contains(Field::NameSearch, needle));
        }
    }

    if let Some(ban) = ban_predicate(filters.ban.as_deref()) {
        parts.push(ban);
    }

    let category = filters.category();
    if let Some(category) = category {
        parts.push(category_predicate(category));
    }

    let class = non_blank(&filters.monster_class).map(str::to_lowercase);
    let is_monster = category == Some(CardCategory::Monster);

    if is_monster {
        if let Some(class) = &class {
            parts.push(Predicate::contains(Field::CardType, class.clone()));
        }
    }

    if let Some(race) = non_blank(&filters.race) {
        let variants = [
            race.to_string(),
            race.replace('-', " "),
            race.split_whitespace().collect::<Vec<_>>().join("-"),
        ];
        let mut unique: Vec<String> = Vec::new();
        for variant in variants {
            if !unique.contains(&variant) {
                unique.push(variant);
            }
        }
        parts.push(Predicate::any(
            unique
                .into_iter()
                .map(|v| Predicate::equals_ignore_case(Field::Race, v))
                .collect(),
        ));
    }

    if is_monster {
        if let Some(attribute) = non_blank(&filters.attribute) {
            parts.push(Predicate::equals_ignore_case(Field::Attribute, attribute));
        }
    }

    match category {
        Some(CardCategory::Spell) => {
            if let Some(subtype) = non_blank(&filters.spell_subtype) {
                parts.push(Predicate::equals_ignore_case(Field::Race, subtype));
            }
        }
        Some(CardCategory::Trap) => {
            if let Some(subtype) = non_blank(&filters.trap_subtype) {
                parts.push(Predicate::equals_ignore_case(Field::Race, subtype));
            }
        }
        _ => {}
    }

    if is_monster {
        if let Some(levels) = level_predicate(class.as_deref(), filters.level_min, filters.level_max)
        {
            parts.push(levels);
        }
        parts.extend(Predicate::range(Field::Atk, filters.atk_min, filters.atk_max));
        parts.extend(Predicate::range(Field::Def, filters.def_min, filters.def_max));
    }

    Predicate::all(parts)
}

fn ban_predicate(ban: Option<&str>) -> Option<Predicate> {
    let status = match ban?.trim().to_lowercase().as_str() {
        "legal" => "LEGAL",
        "limited" => "LIMITED",
        "semi_limited" => "SEMI_LIMITED",
        "banned" => "BANNED",
        _ => return None,
    };
    Some(Predicate::equals(Field::BanStatus, status))
}

fn level_predicate(class: Option<&str>, min: Option<i64>, max: Option<i64>) -> Option<Predicate> {
    match class {
        Some("link") => Predicate::range(Field::Link, min, max),
        Some("xyz") => Predicate::range(Field::Rank, min, max),
        Some(_) => Predicate::range(Field::Level, min, max),
        None => {
            let link = Predicate::range(Field::Link, min, max)?;
            let rank = Predicate::range(Field::Rank, min, max)?;
            let level = Predicate::range(Field::Level, min, max)?;
            Some(Predicate::Or(vec![
                Predicate::all(vec![Predicate::contains(Field::FrameType, "link"), link]),
                Predicate::all(vec![Predicate::contains(Field::FrameType, "xyz"), rank]),
                Predicate::all(vec![
                    Predicate::negate(Predicate::contains(Field::FrameType, "link")),
                    Predicate::negate(Predicate::contains(Field::FrameType, "xyz")),
                    level,
                ]),
            ]))
        }
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
