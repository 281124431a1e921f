use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::database::models::{CardPage, CardRecord, CardRef, StoredCardState};
use crate::services::catalog::filter::{build_predicate, CardSearchFilters, Predicate};
use crate::services::catalog::sql::push_predicate;
use crate::services::text::normalizer::normalize;

/// Stay well under SQLite's bound-parameter limit for `IN (...)` lists.
const ID_CHUNK: usize = 500;

const REF_COLUMNS: &str = "id, name, card_type, race, image_dhash";

const RECORD_COLUMNS: &str = "id, name, card_type, frame_type, description, race, archetype, \
     atk, def, level, rank, link, attribute, image_url, image_small_url, ban_status, \
     image_dhash, content_hash";

#[derive(sqlx::FromRow)]
struct NamedRefRow {
    id: i64,
    name: String,
    card_type: Option<String>,
    race: Option<String>,
    image_dhash: Option<String>,
    name_search: String,
}

impl NamedRefRow {
    fn split(self) -> (CardRef, String) {
        (
            CardRef {
                id: self.id,
                name: self.name,
                card_type: self.card_type,
                race: self.race,
                image_dhash: self.image_dhash,
            },
            self.name_search,
        )
    }
}

// ── Lookups ─────────────────────────────────────────────────

/// Fetch cards by passcode, ascending id. Unknown ids are skipped.
pub async fn get_refs_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<CardRef>, sqlx::Error> {
    let mut refs = Vec::new();
    for chunk in ids.chunks(ID_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {REF_COLUMNS} FROM cards WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");
        refs.extend(builder.build_query_as::<CardRef>().fetch_all(pool).await?);
    }
    refs.sort_by_key(|card| card.id);
    refs.dedup_by_key(|card| card.id);
    Ok(refs)
}

/// Full record of a single card.
pub async fn get_card(pool: &SqlitePool, id: i64) -> Result<Option<CardRecord>, sqlx::Error> {
    sqlx::query_as::<_, CardRecord>(&format!("SELECT {RECORD_COLUMNS} FROM cards WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lowest-id card whose normalized name equals `normalized_name`.
pub async fn find_by_normalized_name(
    pool: &SqlitePool,
    normalized_name: &str,
) -> Result<Option<CardRef>, sqlx::Error> {
    sqlx::query_as::<_, CardRef>(&format!(
        "SELECT {REF_COLUMNS} FROM cards WHERE name_search = ? ORDER BY id LIMIT 1"
    ))
    .bind(normalized_name)
    .fetch_optional(pool)
    .await
}

/// Cards satisfying `predicate`, paired with their normalized name.
/// Candidate pool for in-process trigram ranking.
pub async fn get_name_candidates(
    pool: &SqlitePool,
    predicate: &Predicate,
) -> Result<Vec<(CardRef, String)>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {REF_COLUMNS}, name_search FROM cards WHERE "
    ));
    push_predicate(&mut builder, predicate);
    builder.push(" ORDER BY id");
    let rows = builder.build_query_as::<NamedRefRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(NamedRefRow::split).collect())
}

/// Every card carrying a perceptual hash, ascending id.
pub async fn get_hashed_refs(pool: &SqlitePool) -> Result<Vec<CardRef>, sqlx::Error> {
    sqlx::query_as::<_, CardRef>(&format!(
        "SELECT {REF_COLUMNS} FROM cards WHERE image_dhash IS NOT NULL ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

/// Sync bookkeeping columns for the given ids.
pub async fn get_content_states(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<Vec<StoredCardState>, sqlx::Error> {
    let mut states = Vec::new();
    for chunk in ids.chunks(ID_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, content_hash, image_dhash, image_url FROM cards WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        states.extend(
            builder
                .build_query_as::<StoredCardState>()
                .fetch_all(pool)
                .await?,
        );
    }
    Ok(states)
}

pub async fn count_cards(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

// ── Browse ──────────────────────────────────────────────────

/// Paged browse search ordered by name then id.
pub async fn search_cards(
    pool: &SqlitePool,
    filters: &CardSearchFilters,
) -> Result<CardPage, sqlx::Error> {
    let predicate = build_predicate(filters);

    let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM cards WHERE ");
    push_predicate(&mut count, &predicate);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut page: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, name, card_type, race, attribute, level, rank, link, image_small_url \
         FROM cards WHERE ",
    );
    push_predicate(&mut page, &predicate);
    page.push(" ORDER BY name COLLATE NOCASE, id LIMIT ");
    page.push_bind(i64::from(filters.page_size()));
    page.push(" OFFSET ");
    page.push_bind(i64::from(filters.offset()));
    let data = page.build_query_as().fetch_all(pool).await?;

    Ok(CardPage {
        total,
        page: filters.page(),
        page_size: filters.page_size(),
        data,
    })
}

// ── Writes ──────────────────────────────────────────────────

/// Insert or update a card by id. Normalized search columns are derived
/// here so they can never drift from `name` / `race`.
pub async fn upsert_card<'e, E>(executor: E, card: &CardRecord) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO cards (id, name, name_search, card_type, frame_type, description, race,
                            race_search, archetype, atk, def, level, rank, link, attribute,
                            image_url, image_small_url, ban_status, image_dhash, content_hash,
                            last_synced_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            name_search = excluded.name_search,
            card_type = excluded.card_type,
            frame_type = excluded.frame_type,
            description = excluded.description,
            race = excluded.race,
            race_search = excluded.race_search,
            archetype = excluded.archetype,
            atk = excluded.atk,
            def = excluded.def,
            level = excluded.level,
            rank = excluded.rank,
            link = excluded.link,
            attribute = excluded.attribute,
            image_url = excluded.image_url,
            image_small_url = excluded.image_small_url,
            ban_status = excluded.ban_status,
            image_dhash = excluded.image_dhash,
            content_hash = excluded.content_hash,
            last_synced_at = excluded.last_synced_at",
    )
    .bind(card.id)
    .bind(&card.name)
    .bind(normalize(&card.name))
    .bind(&card.card_type)
    .bind(&card.frame_type)
    .bind(&card.description)
    .bind(&card.race)
    .bind(card.race.as_deref().map(normalize))
    .bind(&card.archetype)
    .bind(card.atk)
    .bind(card.def)
    .bind(card.level)
    .bind(card.rank)
    .bind(card.link)
    .bind(&card.attribute)
    .bind(&card.image_url)
    .bind(&card.image_small_url)
    .bind(card.ban_status)
    .bind(&card.image_dhash)
    .bind(&card.content_hash)
    .execute(executor)
    .await?;
    Ok(())
}

/// Store (or clear) the perceptual hash of one card.
pub async fn set_image_dhash(
    pool: &SqlitePool,
    id: i64,
    dhash: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE cards SET image_dhash = ? WHERE id = ?")
        .bind(dhash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
#[path = "tests/card_repo_tests.rs"]
mod tests;
