use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use cardmatch_lib::database::card_repo;
use cardmatch_lib::services::catalog::{CardSearchFilters, SqliteCatalog};
use cardmatch_lib::services::config::{AppSettings, ConfigService, ENV_DB_PATH};
use cardmatch_lib::services::import::preview_workbook;
use cardmatch_lib::services::matcher::{
    new_cancel_flag, CancelFlag, CardMatcher, NameQuery, ScanQuery,
};
use cardmatch_lib::services::phash::compute_image_hash;
use cardmatch_lib::services::sync::{load_dump, CatalogSync};
use cardmatch_lib::services::translate::ProviderChain;
use cardmatch_lib::{connect_pool, DEFAULT_DB_PATH};

#[derive(Parser)]
#[command(name = "cardmatch")]
#[command(about = "Identify trading cards by name, passcode or artwork", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite catalog (default: $CARDMATCH_DB or ./cardmatch.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import or refresh the catalog from a YGOPRODeck dump
    Sync {
        /// Dump file or URL (default: configured dump URL)
        #[arg(long)]
        dump: Option<String>,

        /// Download artwork and compute perceptual hashes
        #[arg(long)]
        hash_images: bool,

        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Nearest cards to a 16-hex-digit perceptual hash
    IdentifyHash {
        hash: String,

        #[arg(long)]
        top_k: Option<i64>,

        #[arg(long)]
        max_dist: Option<i64>,
    },

    /// Resolve a card name with optional hints
    IdentifyName {
        name: String,

        /// Monster / Spell / Trap (English or French)
        #[arg(long)]
        card_type: Option<String>,

        #[arg(long)]
        race: Option<String>,
    },

    /// Resolve a live scan from OCR text, passcode and/or artwork
    Scan {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        passcode: Option<String>,

        /// Artwork image file
        #[arg(long)]
        image: Option<PathBuf>,

        /// Precomputed perceptual hash (ignored when --image is given)
        #[arg(long)]
        hash: Option<String>,
    },

    /// Print the perceptual hash of an image file
    HashImage { path: PathBuf },

    /// Propose a card for every row of a spreadsheet
    ImportPreview { workbook: PathBuf },

    /// Paged catalog browse
    Search {
        #[arg(long)]
        q: Option<String>,

        /// ALL / MONSTER / SPELL / TRAP
        #[arg(long)]
        card_type: Option<String>,

        #[arg(long)]
        race: Option<String>,

        #[arg(long)]
        attribute: Option<String>,

        /// any / legal / limited / semi_limited / banned
        #[arg(long)]
        ban: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show or replace the stored settings
    Config {
        #[arg(long)]
        show: bool,

        /// JSON settings file to store
        #[arg(long)]
        file: Option<PathBuf>,

        /// Forget stored settings
        #[arg(long, conflicts_with = "file")]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let db_path = cli
        .db
        .or_else(|| std::env::var(ENV_DB_PATH).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

    let pool = connect_pool(&db_path).await?;
    let config = ConfigService::load(pool.clone()).await;
    let settings = config.get_settings();
    let cancel_flag = cancel_on_ctrl_c();

    let result = async {
        match cli.command {
            Commands::Sync {
                dump,
                hash_images,
                batch_size,
            } => {
                let mut sync_config = settings.sync.clone();
                sync_config.hash_images |= hash_images;
                if let Some(batch_size) = batch_size {
                    sync_config.batch_size = batch_size;
                }
                let source = dump.unwrap_or_else(|| sync_config.dump_url.clone());
                let dump = load_dump(&source).await?;
                let sync = CatalogSync::new(pool.clone(), sync_config)?;
                let report = sync.sync_dump(dump, &cancel_flag).await?;
                print_json(&report)?;
            }

            Commands::IdentifyHash {
                hash,
                top_k,
                max_dist,
            } => {
                let matcher = build_matcher(&pool, &settings)?;
                let candidates = matcher.identify_by_hash(&hash, top_k, max_dist).await?;
                print_json(&candidates)?;
            }

            Commands::IdentifyName {
                name,
                card_type,
                race,
            } => {
                let matcher = build_matcher(&pool, &settings)?;
                let query = NameQuery {
                    name: Some(name),
                    type_hint: card_type,
                    race_hint: race,
                };
                let outcome = matcher
                    .identify_by_name_cancellable(&query, &cancel_flag)
                    .await?;
                print_json(&outcome)?;
            }

            Commands::Scan {
                name,
                passcode,
                image,
                hash,
            } => {
                let image_hash = match image {
                    Some(path) => hash_file(&path).await?,
                    None => hash,
                };
                let matcher = build_matcher(&pool, &settings)?;
                let query = ScanQuery {
                    text: name,
                    passcode_text: passcode,
                    image_hash,
                };
                let outcome = matcher.identify_scan(&query, &cancel_flag).await?;
                print_json(&outcome)?;
            }

            Commands::HashImage { path } => {
                let hash = hash_file(&path).await?;
                print_json(&serde_json::json!({ "hash": hash }))?;
            }

            Commands::ImportPreview { workbook } => {
                let matcher = build_matcher(&pool, &settings)?;
                let rows = preview_workbook(&matcher, &workbook, &cancel_flag).await?;
                print_json(&rows)?;
            }

            Commands::Search {
                q,
                card_type,
                race,
                attribute,
                ban,
                page,
                page_size,
            } => {
                let filters = CardSearchFilters {
                    q,
                    card_type,
                    race,
                    attribute,
                    ban,
                    page,
                    page_size,
                    ..Default::default()
                };
                let page = card_repo::search_cards(&pool, &filters).await?;
                print_json(&page)?;
            }

            Commands::Config { show, file, reset } => {
                if reset {
                    config.reset_settings().await.map_err(anyhow::Error::msg)?;
                    info!("Settings reset to defaults");
                }
                if let Some(file) = &file {
                    let raw = tokio::fs::read_to_string(file)
                        .await
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    let new_settings: AppSettings = serde_json::from_str(&raw)?;
                    config
                        .save_settings(new_settings)
                        .await
                        .map_err(anyhow::Error::msg)?;
                    info!("Settings saved to {}", db_path.display());
                }
                if show || file.is_none() {
                    print_json(&config.get_settings())?;
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    pool.close().await;
    result
}

fn build_matcher(
    pool: &sqlx::SqlitePool,
    settings: &AppSettings,
) -> anyhow::Result<CardMatcher<SqliteCatalog, ProviderChain>> {
    let translator = ProviderChain::from_config(&settings.translate)?;
    Ok(CardMatcher::new(
        SqliteCatalog::new(pool.clone()),
        translator,
        settings,
    ))
}

/// Ctrl-C abandons the running match or sync.
fn cancel_on_ctrl_c() -> CancelFlag {
    let flag = new_cancel_flag();
    let handle = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.store(true, Ordering::Relaxed);
        }
    });
    flag
}

async fn hash_file(path: &Path) -> anyhow::Result<Option<String>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(tokio::task::spawn_blocking(move || compute_image_hash(&bytes)).await?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
