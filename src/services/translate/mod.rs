//! Translation collaborator used to retry OCR'd names in the reference language.
//!
//! Providers are tried in order (DeepL, then LibreTranslate). Every failure
//! mode degrades to `None`; the matcher never sees a translation error.

pub mod provider;

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, warn};
use lru::LruCache;
use reqwest::Client;

pub use provider::TranslationProvider;

use crate::services::config::TranslateConfig;
use crate::types::errors::NoSignal;

/// Text translation. Absence of any provider is a valid "unavailable".
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> impl Future<Output = Option<String>> + Send;
}

/// Translator that never produces a result.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translator for NoTranslation {
    async fn translate(&self, _text: &str, _target_lang: &str) -> Option<String> {
        None
    }
}

type CacheKey = (String, String);

/// Ordered providers sharing one HTTP client and an LRU of past answers.
pub struct ProviderChain {
    client: Client,
    providers: Vec<TranslationProvider>,
    cache: Mutex<LruCache<CacheKey, String>>,
}

impl ProviderChain {
    pub fn new(
        providers: Vec<TranslationProvider>,
        timeout: Duration,
        cache_capacity: usize,
    ) -> Result<Self, NoSignal> {
        let client = Client::builder().timeout(timeout).build()?;
        let capacity = NonZeroUsize::new(cache_capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            client,
            providers,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Providers enabled by the configuration, DeepL first.
    pub fn from_config(config: &TranslateConfig) -> Result<Self, NoSignal> {
        let mut providers = Vec::new();
        if let Some(api_key) = config.deepl_api_key.as_deref().filter(|k| !k.is_empty()) {
            providers.push(TranslationProvider::DeepL {
                api_key: api_key.to_string(),
                url: config.deepl_url.clone(),
            });
        }
        if let Some(base_url) = config
            .libretranslate_url
            .as_deref()
            .filter(|u| !u.is_empty())
        {
            providers.push(TranslationProvider::LibreTranslate {
                base_url: base_url.to_string(),
            });
        }
        Self::new(
            providers,
            Duration::from_secs(config.timeout_secs.max(1)),
            config.cache_capacity,
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    fn cached(&self, key: &CacheKey) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn remember(&self, key: CacheKey, value: String) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .put(key, value);
    }

    /// First successful provider answer, or the reason the last one failed.
    pub async fn try_translate(&self, text: &str, target_lang: &str) -> Result<String, NoSignal> {
        let mut last = NoSignal::Unconfigured;
        for provider in &self.providers {
            match provider.translate(&self.client, text, target_lang).await {
                Ok(translated) => return Ok(translated),
                Err(reason) => {
                    debug!("{} translation failed: {reason}", provider.name());
                    last = reason;
                }
            }
        }
        Err(last)
    }
}

impl Translator for ProviderChain {
    async fn translate(&self, text: &str, target_lang: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || !self.is_configured() {
            return None;
        }

        let key = (text.to_string(), target_lang.to_lowercase());
        if let Some(hit) = self.cached(&key) {
            return Some(hit);
        }

        match self.try_translate(text, target_lang).await {
            Ok(translated) => {
                self.remember(key, translated.clone());
                Some(translated)
            }
            Err(reason) => {
                warn!("Translation unavailable: {reason}");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/translate_tests.rs"]
mod tests;
