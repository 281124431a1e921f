//! Catalog collaborators consumed by the matching core.
//!
//! `CatalogStore` is the read interface the matcher depends on; the SQLite
//! adapter is the production implementation and `MemoryCatalog` backs tests
//! and offline use.

pub mod filter;
pub mod fuzzy_rank;
pub mod memory_store;
pub mod sql;
pub mod sqlite_store;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::database::models::CardRef;
use crate::types::errors::MatchResult;

pub use filter::{build_predicate, CardSearchFilters, Field, FuzzyFilter, Predicate};
pub use fuzzy_rank::rank_by_trigram;
pub use memory_store::MemoryCatalog;
pub use sqlite_store::SqliteCatalog;

/// A fuzzy name hit as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyHit {
    pub card: CardRef,
    /// Trigram distance, 0 = identical.
    pub distance: f64,
    /// Trigram similarity in [0, 1].
    pub similarity: f64,
}

/// Read access to the card catalog.
///
/// Store failures are reported as `MatchError::StoreUnavailable`; "no rows"
/// is always an empty value, never an error.
pub trait CatalogStore: Send + Sync {
    /// Records for the given ids, in ascending id order.
    fn cards_by_ids(&self, ids: &[i64]) -> impl Future<Output = MatchResult<Vec<CardRef>>> + Send;

    /// At most one record whose normalized name equals `normalized_name`.
    fn exact_by_name(
        &self,
        normalized_name: &str,
    ) -> impl Future<Output = MatchResult<Option<CardRef>>> + Send;

    /// Up to `limit` records ranked by trigram distance then similarity.
    fn fuzzy_by_name(
        &self,
        normalized_name: &str,
        filter: &FuzzyFilter,
        limit: usize,
    ) -> impl Future<Output = MatchResult<Vec<FuzzyHit>>> + Send;

    /// Every record carrying a perceptual hash, in a deterministic order.
    fn hashed_cards(&self) -> impl Future<Output = MatchResult<Vec<CardRef>>> + Send;
}
