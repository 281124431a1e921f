use sqlx::SqlitePool;

use super::filter::FuzzyFilter;
use super::fuzzy_rank::rank_by_trigram;
use super::{CatalogStore, FuzzyHit};
use crate::database::card_repo;
use crate::database::models::CardRef;
use crate::types::errors::MatchResult;

/// `CatalogStore` over the SQLite `cards` table.
///
/// Fuzzy queries filter in SQL and rank the surviving rows in-process with
/// trigram similarity.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CatalogStore for SqliteCatalog {
    async fn cards_by_ids(&self, ids: &[i64]) -> MatchResult<Vec<CardRef>> {
        Ok(card_repo::get_refs_by_ids(&self.pool, ids).await?)
    }

    async fn exact_by_name(&self, normalized_name: &str) -> MatchResult<Option<CardRef>> {
        if normalized_name.is_empty() {
            return Ok(None);
        }
        Ok(card_repo::find_by_normalized_name(&self.pool, normalized_name).await?)
    }

    async fn fuzzy_by_name(
        &self,
        normalized_name: &str,
        filter: &FuzzyFilter,
        limit: usize,
    ) -> MatchResult<Vec<FuzzyHit>> {
        if normalized_name.is_empty() {
            return Ok(Vec::new());
        }
        let rows = card_repo::get_name_candidates(&self.pool, &filter.to_predicate()).await?;
        Ok(rank_by_trigram(normalized_name, rows, limit))
    }

    async fn hashed_cards(&self) -> MatchResult<Vec<CardRef>> {
        Ok(card_repo::get_hashed_refs(&self.pool).await?)
    }
}
