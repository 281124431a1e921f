use serde::{Deserialize, Serialize};

/// Fuzzy auto-accept policy. A top candidate is accepted when it is alone,
/// when its score reaches `auto_accept`, or when it reaches `strong_score`
/// and leads the runner-up by at least `min_gap`. Fuzzy hits below
/// `min_similarity` (trigram similarity) are not candidates at all.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MatcherThresholds {
    pub auto_accept: f64,
    pub strong_score: f64,
    pub min_gap: f64,
    pub min_similarity: f64,
    pub fuzzy_limit: usize,
}

impl Default for MatcherThresholds {
    fn default() -> Self {
        Self {
            auto_accept: 0.92,
            strong_score: 0.85,
            min_gap: 0.08,
            min_similarity: 0.3,
            fuzzy_limit: 5,
        }
    }
}

impl MatcherThresholds {
    /// Clamp scores into [0, 1] and keep at least one fuzzy candidate.
    pub fn sanitized(mut self) -> Self {
        self.auto_accept = self.auto_accept.clamp(0.0, 1.0);
        self.strong_score = self.strong_score.clamp(0.0, 1.0);
        self.min_gap = self.min_gap.clamp(0.0, 1.0);
        self.min_similarity = self.min_similarity.clamp(0.0, 1.0);
        self.fuzzy_limit = self.fuzzy_limit.clamp(1, 50);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualConfig {
    pub default_top_k: usize,
    /// Candidates farther than this are never offered.
    pub max_distance: u32,
    /// At or below this distance the closest candidate is accepted.
    pub auto_accept_distance: u32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_distance: 14,
            auto_accept_distance: 6,
        }
    }
}

impl VisualConfig {
    pub fn sanitized(mut self) -> Self {
        self.default_top_k = self.default_top_k.clamp(1, 10);
        self.max_distance = self.max_distance.min(64);
        self.auto_accept_distance = self.auto_accept_distance.min(self.max_distance);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslateConfig {
    pub target_lang: String,
    pub timeout_secs: u64,
    pub deepl_api_key: Option<String>,
    pub deepl_url: String,
    pub libretranslate_url: Option<String>,
    pub cache_capacity: usize,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            target_lang: "en".into(),
            timeout_secs: 8,
            deepl_api_key: None,
            deepl_url: "https://api-free.deepl.com/v2/translate".into(),
            libretranslate_url: None,
            cache_capacity: 256,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    pub batch_size: usize,
    pub hash_images: bool,
    pub image_timeout_secs: u64,
    pub image_concurrency: usize,
    pub dump_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 300,
            hash_images: false,
            image_timeout_secs: 10,
            image_concurrency: 8,
            dump_url: "https://db.ygoprodeck.com/api/v7/cardinfo.php".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub matcher: MatcherThresholds,
    pub visual: VisualConfig,
    pub translate: TranslateConfig,
    pub sync: SyncConfig,
}

impl AppSettings {
    pub fn sanitized(self) -> Self {
        Self {
            matcher: self.matcher.sanitized(),
            visual: self.visual.sanitized(),
            translate: self.translate,
            sync: SyncConfig {
                batch_size: self.sync.batch_size.max(1),
                image_concurrency: self.sync.image_concurrency.max(1),
                ..self.sync
            },
        }
    }
}
