use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod database;
pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;

/// Default database file when neither `--db` nor `CARDMATCH_DB` is given.
pub const DEFAULT_DB_PATH: &str = "cardmatch.db";

/// Open (creating if missing) the catalog database and run the embedded
/// migrations.
pub async fn connect_pool(db_path: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
