use std::sync::{Arc, RwLock};

use super::filter::FuzzyFilter;
use super::fuzzy_rank::rank_by_trigram;
use super::{CatalogStore, FuzzyHit};
use crate::database::models::{CardRecord, CardRef};
use crate::services::text::normalizer::normalize;
use crate::types::errors::{MatchError, MatchResult};

/// In-memory `CatalogStore` with the same observable semantics as the
/// SQLite adapter. Cheap to clone; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    cards: Arc<RwLock<Vec<CardRecord>>>,
}

impl MemoryCatalog {
    pub fn new(cards: Vec<CardRecord>) -> Self {
        let catalog = Self::default();
        for card in cards {
            catalog.upsert(card);
        }
        catalog
    }

    /// Insert or replace by id.
    pub fn upsert(&self, card: CardRecord) {
        let mut cards = self
            .cards
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match cards.iter_mut().find(|existing| existing.id == card.id) {
            Some(existing) => *existing = card,
            None => cards.push(card),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.read().map(|cards| cards.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> MatchResult<Vec<CardRecord>> {
        let cards = self
            .cards
            .read()
            .map_err(|_| MatchError::StoreUnavailable("memory catalog lock poisoned".into()))?;
        let mut sorted = cards.clone();
        sorted.sort_by_key(|card| card.id);
        Ok(sorted)
    }
}

impl CatalogStore for MemoryCatalog {
    async fn cards_by_ids(&self, ids: &[i64]) -> MatchResult<Vec<CardRef>> {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|card| ids.contains(&card.id))
            .map(CardRef::from)
            .collect())
    }

    async fn exact_by_name(&self, normalized_name: &str) -> MatchResult<Option<CardRef>> {
        if normalized_name.is_empty() {
            return Ok(None);
        }
        Ok(self
            .snapshot()?
            .iter()
            .find(|card| normalize(&card.name) == normalized_name)
            .map(CardRef::from))
    }

    async fn fuzzy_by_name(
        &self,
        normalized_name: &str,
        filter: &FuzzyFilter,
        limit: usize,
    ) -> MatchResult<Vec<FuzzyHit>> {
        let predicate = filter.to_predicate();
        let rows: Vec<(CardRef, String)> = self
            .snapshot()?
            .iter()
            .filter(|card| predicate.matches(card))
            .map(|card| (CardRef::from(card), normalize(&card.name)))
            .collect();
        Ok(rank_by_trigram(normalized_name, rows, limit))
    }

    async fn hashed_cards(&self) -> MatchResult<Vec<CardRef>> {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|card| card.image_dhash.is_some())
            .map(CardRef::from)
            .collect())
    }
}

#[cfg(test)]
#[path = "tests/memory_store_tests.rs"]
mod tests;
