pub mod models;

pub use models::*;

use crate::database::settings_repo;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use std::sync::Mutex;

const KEY_MATCHER: &str = "matcher";
const KEY_VISUAL: &str = "visual";
const KEY_TRANSLATE: &str = "translate";
const KEY_SYNC: &str = "sync";

pub const ENV_DEEPL_API_KEY: &str = "DEEPL_API_KEY";
pub const ENV_LIBRETRANSLATE_URL: &str = "LIBRETRANSLATE_URL";
pub const ENV_DB_PATH: &str = "CARDMATCH_DB";

/// Settings persisted as one JSON document per section in `app_settings`,
/// with environment overrides layered on top at load time.
pub struct ConfigService {
    pool: SqlitePool,
    settings: Mutex<AppSettings>,
    env: EnvLookup,
}

/// Environment variable lookup used for overrides.
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

impl ConfigService {
    /// Load from the database and apply process environment overrides.
    pub async fn load(pool: SqlitePool) -> Self {
        Self::load_with_env(pool, |key| std::env::var(key).ok()).await
    }

    /// Same as `load` with an explicit environment lookup.
    /// The lookup is kept and consulted again by `reset_settings`.
    pub async fn load_with_env<F>(pool: SqlitePool, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let mut settings = Self::load_from_db(&pool).await;
        apply_env_overrides(&mut settings, &env);
        Self {
            pool,
            settings: Mutex::new(settings.sanitized()),
            env: Box::new(env),
        }
    }

    async fn load_from_db(pool: &SqlitePool) -> AppSettings {
        let kv = match settings_repo::get_all_settings(pool).await {
            Ok(m) => m,
            Err(e) => {
                log::error!("Failed to load settings from DB: {e}");
                return AppSettings::default();
            }
        };

        AppSettings {
            matcher: section(kv.get(KEY_MATCHER), KEY_MATCHER),
            visual: section(kv.get(KEY_VISUAL), KEY_VISUAL),
            translate: section(kv.get(KEY_TRANSLATE), KEY_TRANSLATE),
            sync: section(kv.get(KEY_SYNC), KEY_SYNC),
        }
    }

    /// Write every section to the database.
    pub(crate) async fn write_settings_to_db(
        pool: &SqlitePool,
        settings: &AppSettings,
    ) -> Result<(), String> {
        let sections = [
            (KEY_MATCHER, serde_json::to_string(&settings.matcher)),
            (KEY_VISUAL, serde_json::to_string(&settings.visual)),
            (KEY_TRANSLATE, serde_json::to_string(&settings.translate)),
            (KEY_SYNC, serde_json::to_string(&settings.sync)),
        ];
        for (key, json) in sections {
            let json = json.map_err(|e| e.to_string())?;
            settings_repo::set_setting(pool, key, &json)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn get_settings(&self) -> AppSettings {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub async fn save_settings(&self, new_settings: AppSettings) -> Result<(), String> {
        let new_settings = new_settings.sanitized();
        Self::write_settings_to_db(&self.pool, &new_settings).await?;

        *self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = new_settings;
        Ok(())
    }

    /// Drop every stored section and fall back to the defaults. Environment
    /// overrides are applied again.
    pub async fn reset_settings(&self) -> Result<(), String> {
        settings_repo::clear_settings(&self.pool)
            .await
            .map_err(|e| e.to_string())?;
        let mut settings = AppSettings::default();
        apply_env_overrides(&mut settings, &self.env);

        *self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ── Helpers ──────────────────────────────────────────

fn section<T: DeserializeOwned + Default>(raw: Option<&String>, key: &str) -> T {
    let Some(raw) = raw else {
        return T::default();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed '{key}' settings: {e}");
        T::default()
    })
}

/// Secrets and endpoints from the environment win over stored values.
pub fn apply_env_overrides<F>(settings: &mut AppSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if let Some(key) = non_empty(ENV_DEEPL_API_KEY) {
        settings.translate.deepl_api_key = Some(key);
    }
    if let Some(url) = non_empty(ENV_LIBRETRANSLATE_URL) {
        settings.translate.libretranslate_url = Some(url);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
