//! Bulk catalog sync from a YGOPRODeck dump.
//!
//! Batches run one after the other; inside a batch the stored states are
//! read with one query, image hashes are computed with bounded concurrency,
//! digests are computed in parallel and every changed card is upserted
//! concurrently. A batch is fully written before the next one starts.

pub mod digest;
pub mod ygoprodeck;

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use sqlx::SqlitePool;

pub use digest::compute_record_digest;
pub use ygoprodeck::{load_dump, parse_dump, CardDump, DumpCard};

use crate::database::card_repo;
use crate::database::models::{CardRecord, StoredCardState};
use crate::services::config::SyncConfig;
use crate::services::fetch::ImageFetcher;
use crate::services::matcher::is_cancelled;
use crate::services::phash::compute_image_hash;
use crate::types::errors::MatchError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub total: usize,
    pub upserted: usize,
    pub unchanged: usize,
    pub hashed: usize,
    pub hash_failures: usize,
}

pub struct CatalogSync {
    pool: SqlitePool,
    config: SyncConfig,
    fetcher: Option<ImageFetcher>,
}

impl CatalogSync {
    pub fn new(pool: SqlitePool, config: SyncConfig) -> anyhow::Result<Self> {
        let config = SyncConfig {
            batch_size: config.batch_size.max(1),
            image_concurrency: config.image_concurrency.max(1),
            ..config
        };
        let fetcher = if config.hash_images {
            Some(ImageFetcher::new(Duration::from_secs(
                config.image_timeout_secs,
            ))?)
        } else {
            None
        };
        Ok(Self {
            pool,
            config,
            fetcher,
        })
    }

    /// Sync every card of `dump`. Cancellation is checked between batches;
    /// batches already written stay written.
    pub async fn sync_dump(
        &self,
        dump: CardDump,
        cancel_flag: &AtomicBool,
    ) -> anyhow::Result<SyncReport> {
        let records: Vec<CardRecord> = dump.data.into_iter().map(DumpCard::into_record).collect();
        self.sync_records(records, cancel_flag).await
    }

    pub async fn sync_records(
        &self,
        records: Vec<CardRecord>,
        cancel_flag: &AtomicBool,
    ) -> anyhow::Result<SyncReport> {
        let mut report = SyncReport {
            total: records.len(),
            ..Default::default()
        };
        info!(
            "Sync: {} cards in batches of {}",
            report.total, self.config.batch_size
        );

        let mut remaining = records.into_iter().peekable();
        let mut offset = 0;
        while remaining.peek().is_some() {
            if is_cancelled(cancel_flag) {
                warn!("Sync cancelled after {offset} cards");
                return Err(MatchError::Cancelled.into());
            }
            let batch: Vec<CardRecord> = remaining.by_ref().take(self.config.batch_size).collect();
            let len = batch.len();
            self.sync_batch(batch, &mut report).await?;
            debug!("Sync: batch {}-{} done", offset, offset + len - 1);
            offset += len;
        }

        info!(
            "Sync complete: {} upserted, {} unchanged, {} hashed, {} hash failures",
            report.upserted, report.unchanged, report.hashed, report.hash_failures
        );
        Ok(report)
    }

    async fn sync_batch(
        &self,
        mut batch: Vec<CardRecord>,
        report: &mut SyncReport,
    ) -> anyhow::Result<()> {
        let ids: Vec<i64> = batch.iter().map(|card| card.id).collect();
        let stored: HashMap<i64, StoredCardState> = card_repo::get_content_states(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|state| (state.id, state))
            .collect();

        let to_hash = carry_forward_hashes(&mut batch, &stored);
        if let Some(fetcher) = &self.fetcher {
            let jobs: Vec<(usize, String)> = to_hash
                .into_iter()
                .filter_map(|index| batch[index].image_url.clone().map(|url| (index, url)))
                .collect();
            let results = self.hash_images(fetcher, jobs).await;
            for (index, dhash) in results {
                match dhash {
                    Some(dhash) => {
                        batch[index].image_dhash = Some(dhash);
                        report.hashed += 1;
                    }
                    None => report.hash_failures += 1,
                }
            }
        }

        batch.par_iter_mut().for_each(|card| {
            card.content_hash = Some(compute_record_digest(card));
        });

        let changed: Vec<&CardRecord> = batch
            .iter()
            .filter(|card| {
                let previous = stored
                    .get(&card.id)
                    .and_then(|state| state.content_hash.as_deref());
                digest::has_changed(card.content_hash.as_deref().unwrap_or_default(), previous)
            })
            .collect();
        report.unchanged += batch.len() - changed.len();

        let writes = changed
            .iter()
            .map(|card| card_repo::upsert_card(&self.pool, card));
        for result in join_all(writes).await {
            result?;
            report.upserted += 1;
        }
        Ok(())
    }

    /// Download and hash each `(index, url)` job, at most
    /// `image_concurrency` at a time. Decoding runs on the blocking pool.
    async fn hash_images(
        &self,
        fetcher: &ImageFetcher,
        jobs: Vec<(usize, String)>,
    ) -> Vec<(usize, Option<String>)> {
        stream::iter(jobs)
            .map(|(index, url)| async move {
                let Some(bytes) = fetcher.fetch(&url).await else {
                    return (index, None);
                };
                let dhash = tokio::task::spawn_blocking(move || compute_image_hash(&bytes))
                    .await
                    .unwrap_or_else(|error| {
                        warn!("Image hash worker failed: {error}");
                        None
                    });
                (index, dhash)
            })
            .buffer_unordered(self.config.image_concurrency)
            .collect()
            .await
    }
}

/// Reuse stored hashes whose image reference did not change. Returns the
/// indices of cards that still need hashing.
fn carry_forward_hashes(
    batch: &mut [CardRecord],
    stored: &HashMap<i64, StoredCardState>,
) -> Vec<usize> {
    let mut to_hash = Vec::new();
    for (index, card) in batch.iter_mut().enumerate() {
        let previous = stored.get(&card.id);
        let same_image = previous.is_some_and(|state| state.image_url == card.image_url);
        match previous.and_then(|state| state.image_dhash.clone()) {
            Some(dhash) if same_image => card.image_dhash = Some(dhash),
            _ if card.image_url.is_some() => to_hash.push(index),
            _ => {}
        }
    }
    to_hash
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
