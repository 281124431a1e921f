#![allow(dead_code)]

use cardmatch_lib::services::config::SyncConfig;
use cardmatch_lib::services::matcher::new_cancel_flag;
use cardmatch_lib::services::sync::{parse_dump, CatalogSync, SyncReport};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::sync::Once;

static INIT: Once = Once::new();

pub struct TestContext {
    pub pool: Pool<Sqlite>,
}

pub async fn init_test_db() -> TestContext {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    TestContext { pool }
}

/// Small slice of the upstream card dump.
pub const SAMPLE_DUMP: &str = r#"{
  "data": [
    {"id": 46986414, "name": "Dark Magician", "type": "Normal Monster", "frameType": "normal",
     "race": "Spellcaster", "attribute": "DARK", "atk": 2500, "def": 2100, "level": 7,
     "card_images": [{"image_url": "https://images.example/46986414.jpg"}]},
    {"id": 38033121, "name": "Dark Magician Girl", "type": "Effect Monster", "frameType": "effect",
     "race": "Spellcaster", "attribute": "DARK", "atk": 2000, "def": 1700, "level": 6},
    {"id": 89631139, "name": "Blue-Eyes White Dragon", "type": "Normal Monster", "frameType": "normal",
     "race": "Dragon", "attribute": "LIGHT", "atk": 3000, "def": 2500, "level": 8},
    {"id": 84013237, "name": "Number 39: Utopia", "type": "XYZ Monster", "frameType": "xyz",
     "race": "Warrior", "attribute": "LIGHT", "atk": 2500, "def": 2000, "level": 4},
    {"id": 1861629, "name": "Decode Talker", "type": "Link Monster", "frameType": "link",
     "race": "Cyberse", "attribute": "DARK", "atk": 2300, "linkval": 3},
    {"id": 55144522, "name": "Pot of Greed", "type": "Spell Card", "frameType": "spell",
     "race": "Normal", "banlist_info": {"ban_tcg": "Forbidden"}},
    {"id": 5318639, "name": "Mystical Space Typhoon", "type": "Spell Card", "frameType": "spell",
     "race": "Quick-Play", "banlist_info": {"ban_tcg": "Semi-Limited"}},
    {"id": 44095762, "name": "Mirror Force", "type": "Trap Card", "frameType": "trap",
     "race": "Normal"}
  ]
}"#;

/// Sync `SAMPLE_DUMP` into `pool`.
pub async fn seed_catalog(pool: &SqlitePool) -> SyncReport {
    let sync = CatalogSync::new(pool.clone(), SyncConfig::default()).expect("sync service");
    sync.sync_dump(parse_dump(SAMPLE_DUMP).expect("sample dump"), &new_cancel_flag())
        .await
        .expect("sample sync")
}
