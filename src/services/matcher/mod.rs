//! Card identification pipeline.
//!
//! Two flows share the same stages:
//! - name lookup (spreadsheet rows): exact name, then fuzzy name; the first
//!   stage with a result decides.
//! - live scan: passcode, exact name, fuzzy name, translated name, then
//!   visual hash search; only an accepted result stops the cascade early and
//!   the first reviewable result is kept as the fallback.

pub mod decision;
pub mod stages;
pub mod types;

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::LazyLock;

use regex::Regex;

pub use stages::{is_cancelled, new_cancel_flag, CancelFlag, Stage, StageResult, StopRule};
pub use types::{MatchOutcome, MatchSource, MatchStatus, NameQuery, ScanQuery, Suggestion};

use crate::database::models::CardRef;
use crate::services::catalog::{CatalogStore, FuzzyFilter};
use crate::services::config::{AppSettings, MatcherThresholds, VisualConfig};
use crate::services::phash::dhash::{PerceptualHash, MAX_DISTANCE};
use crate::services::phash::{search_by_hash, VisualCandidate, VisualQuery};
use crate::services::text::normalizer::normalize;
use crate::services::translate::{NoTranslation, Translator};
use crate::types::errors::MatchResult;

use stages::run_cascade;

/// 8 to 10 consecutive digits in OCR noise.
static RE_PASSCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{8,10}").expect("Invalid regex"));

const NAME_STAGES: [Stage; 2] = [Stage::ExactName, Stage::FuzzyName];

const SCAN_STAGES: [Stage; 5] = [
    Stage::Passcode,
    Stage::ExactName,
    Stage::FuzzyName,
    Stage::TranslatedName,
    Stage::Visual,
];

/// First 8–10 digit run of `text`, as a passcode.
pub fn extract_passcode(text: &str) -> Option<i64> {
    RE_PASSCODE
        .find(text)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

/// Matching facade over an injected catalog store and translator.
pub struct CardMatcher<S, T = NoTranslation> {
    store: S,
    translator: T,
    thresholds: MatcherThresholds,
    visual: VisualConfig,
    target_lang: String,
}

impl<S: CatalogStore> CardMatcher<S, NoTranslation> {
    /// Matcher without translation, default thresholds.
    pub fn with_store(store: S) -> Self {
        Self::new(store, NoTranslation, &AppSettings::default())
    }
}

impl<S: CatalogStore, T: Translator> CardMatcher<S, T> {
    pub fn new(store: S, translator: T, settings: &AppSettings) -> Self {
        Self {
            store,
            translator,
            thresholds: settings.matcher.clone().sanitized(),
            visual: settings.visual.clone().sanitized(),
            target_lang: settings.translate.target_lang.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn thresholds(&self) -> &MatcherThresholds {
        &self.thresholds
    }

    /// Nearest catalog hashes to `hash`, closest first.
    pub async fn identify_by_hash(
        &self,
        hash: &str,
        top_k: Option<i64>,
        max_distance: Option<i64>,
    ) -> MatchResult<Vec<VisualCandidate>> {
        let top_k = top_k.or(Some(self.visual.default_top_k as i64));
        let query = VisualQuery::new(hash, top_k, max_distance)?;
        let cards = self.store.hashed_cards().await?;
        Ok(search_by_hash(&query, &cards))
    }

    /// Resolve a free-text name with optional type/race hints.
    pub async fn identify_by_name(&self, query: &NameQuery) -> MatchResult<MatchOutcome> {
        self.identify_by_name_cancellable(query, &AtomicBool::new(false))
            .await
    }

    pub async fn identify_by_name_cancellable(
        &self,
        query: &NameQuery,
        cancel_flag: &AtomicBool,
    ) -> MatchResult<MatchOutcome> {
        let name = normalize(query.name.as_deref().unwrap_or_default());
        if name.is_empty() {
            return Ok(MatchOutcome::not_found());
        }
        let race_hint = query
            .race_hint
            .as_deref()
            .map(normalize)
            .filter(|race| !race.is_empty());
        let filter = FuzzyFilter::from_hints(query.type_hint.as_deref(), query.race_hint.as_deref());

        run_cascade(&NAME_STAGES, StopRule::FirstResult, cancel_flag, |stage| {
            let name = &name;
            let race_hint = race_hint.as_deref();
            let filter = &filter;
            async move {
                match stage {
                    Stage::ExactName => self.exact_stage(name, race_hint, stage.source()).await,
                    Stage::FuzzyName => self.fuzzy_stage(name, filter, stage.source()).await,
                    _ => Ok(StageResult::Skip),
                }
            }
        })
        .await
    }

    /// Resolve a live scan from whatever observations are present.
    ///
    /// A malformed image hash rejects the whole request before any stage
    /// runs.
    pub async fn identify_scan(
        &self,
        query: &ScanQuery,
        cancel_flag: &AtomicBool,
    ) -> MatchResult<MatchOutcome> {
        let text = query.text.as_deref().map(str::trim).unwrap_or_default();
        let name = normalize(text);
        let passcode = query.passcode_text.as_deref().and_then(extract_passcode);
        let hash = query
            .image_hash
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(PerceptualHash::parse)
            .transpose()?;

        if name.is_empty() && passcode.is_none() && hash.is_none() {
            return Ok(MatchOutcome::not_found());
        }

        let no_filter = FuzzyFilter::default();
        run_cascade(&SCAN_STAGES, StopRule::FirstAccepted, cancel_flag, |stage| {
            let name = &name;
            let no_filter = &no_filter;
            async move {
                match stage {
                    Stage::Passcode => match passcode {
                        Some(id) => self.passcode_stage(id).await,
                        None => Ok(StageResult::Skip),
                    },
                    Stage::ExactName => self.exact_stage(name, None, stage.source()).await,
                    Stage::FuzzyName => self.fuzzy_stage(name, no_filter, stage.source()).await,
                    Stage::TranslatedName => self.translated_stage(text, name).await,
                    Stage::Visual => match hash {
                        Some(hash) => self.visual_stage(hash).await,
                        None => Ok(StageResult::Skip),
                    },
                }
            }
        })
        .await
    }

    // ── Stages ──────────────────────────────────────────

    async fn passcode_stage(&self, id: i64) -> MatchResult<StageResult> {
        let cards = self.store.cards_by_ids(&[id]).await?;
        Ok(match cards.first() {
            Some(card) => StageResult::Accepted(MatchOutcome::exact(card, MatchSource::Passcode)),
            None => StageResult::Skip,
        })
    }

    async fn exact_stage(
        &self,
        name: &str,
        race_hint: Option<&str>,
        source: MatchSource,
    ) -> MatchResult<StageResult> {
        if name.is_empty() {
            return Ok(StageResult::Skip);
        }
        let Some(card) = self.store.exact_by_name(name).await? else {
            return Ok(StageResult::Skip);
        };
        if let Some(race_hint) = race_hint {
            if normalize(card.race.as_deref().unwrap_or_default()) != race_hint {
                return Ok(StageResult::Skip);
            }
        }
        Ok(StageResult::Accepted(MatchOutcome::exact(&card, source)))
    }

    async fn fuzzy_stage(
        &self,
        name: &str,
        filter: &FuzzyFilter,
        source: MatchSource,
    ) -> MatchResult<StageResult> {
        if name.is_empty() {
            return Ok(StageResult::Skip);
        }
        let mut hits = self
            .store
            .fuzzy_by_name(name, filter, self.thresholds.fuzzy_limit)
            .await?;
        hits.retain(|hit| hit.similarity >= self.thresholds.min_similarity);
        let suggestions = decision::score_hits(&hits);
        Ok(StageResult::from_outcome(decision::decide_fuzzy(
            suggestions,
            &self.thresholds,
            source,
        )))
    }

    /// Translate the raw text once and retry exact then fuzzy lookup.
    /// Skipped when the translation is unavailable or normalizes to the
    /// already-tried name.
    async fn translated_stage(&self, text: &str, name: &str) -> MatchResult<StageResult> {
        if text.is_empty() {
            return Ok(StageResult::Skip);
        }
        let Some(translated) = self.translator.translate(text, &self.target_lang).await else {
            return Ok(StageResult::Skip);
        };
        let translated = normalize(&translated);
        if translated.is_empty() || translated == name {
            return Ok(StageResult::Skip);
        }

        let source = MatchSource::TranslatedName;
        match self.exact_stage(&translated, None, source).await? {
            StageResult::Skip => {
                self.fuzzy_stage(&translated, &FuzzyFilter::default(), source)
                    .await
            }
            accepted => Ok(accepted),
        }
    }

    /// Visual search under the configured distance ceiling; the closest
    /// candidate is accepted only within the auto-accept distance.
    async fn visual_stage(&self, hash: PerceptualHash) -> MatchResult<StageResult> {
        let query = VisualQuery::from_hash(
            hash,
            Some(self.visual.default_top_k as i64),
            Some(i64::from(self.visual.max_distance)),
        );
        let cards = self.store.hashed_cards().await?;
        let candidates = search_by_hash(&query, &cards);
        let Some(top) = candidates.first() else {
            return Ok(StageResult::Skip);
        };

        let by_id: HashMap<i64, &CardRef> = cards.iter().map(|card| (card.id, card)).collect();
        let suggestions: Vec<Suggestion> = candidates
            .iter()
            .map(|candidate| Suggestion {
                card_id: candidate.id,
                name: candidate.name.clone(),
                card_type: candidate.card_type.clone(),
                race: by_id.get(&candidate.id).and_then(|card| card.race.clone()),
                score: visual_score(candidate),
            })
            .collect();

        let confidence = visual_score(top);
        let outcome = if top.distance <= self.visual.auto_accept_distance {
            MatchOutcome {
                status: MatchStatus::Fuzzy,
                confidence,
                chosen_id: Some(top.id),
                suggestions,
                source: MatchSource::Visual,
            }
        } else {
            MatchOutcome {
                status: MatchStatus::Ambiguous,
                confidence,
                chosen_id: None,
                suggestions,
                source: MatchSource::Visual,
            }
        };
        Ok(StageResult::from_outcome(Some(outcome)))
    }
}

fn visual_score(candidate: &VisualCandidate) -> f64 {
    f64::from(candidate.score) / f64::from(MAX_DISTANCE)
}

#[cfg(test)]
#[path = "tests/matcher_tests.rs"]
mod tests;
