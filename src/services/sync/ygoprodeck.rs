//! YGOPRODeck `cardinfo` dump format.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use log::info;
use reqwest::Client;
use serde::Deserialize;

use crate::database::models::{BanStatus, CardClass, CardRecord};

/// The full dump is tens of megabytes.
const DUMP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize, Default)]
pub struct CardDump {
    #[serde(default)]
    pub data: Vec<DumpCard>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DumpCard {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    #[serde(rename = "frameType")]
    pub frame_type: Option<String>,
    pub desc: Option<String>,
    pub race: Option<String>,
    pub archetype: Option<String>,
    pub atk: Option<i64>,
    pub def: Option<i64>,
    /// Level, or rank for Xyz monsters.
    pub level: Option<i64>,
    pub attribute: Option<String>,
    pub linkval: Option<i64>,
    #[serde(default)]
    pub card_images: Vec<DumpImage>,
    pub banlist_info: Option<BanlistInfo>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DumpImage {
    pub image_url: Option<String>,
    pub image_url_small: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BanlistInfo {
    pub ban_tcg: Option<String>,
}

impl DumpCard {
    /// Catalog row for this card. `rank` mirrors the level of Xyz monsters,
    /// `link` carries the link rating of Link monsters only.
    pub fn into_record(self) -> CardRecord {
        let class = CardClass::detect(self.frame_type.as_deref(), self.card_type.as_deref());
        let ban_status = BanStatus::from_ban_tcg(
            self.banlist_info
                .as_ref()
                .and_then(|info| info.ban_tcg.as_deref()),
        );
        let primary = self.card_images.into_iter().next().unwrap_or_default();

        CardRecord {
            id: self.id,
            name: self.name,
            card_type: self.card_type,
            frame_type: self.frame_type,
            description: self.desc,
            race: self.race,
            archetype: self.archetype,
            atk: self.atk,
            def: self.def,
            level: self.level,
            rank: (class == CardClass::Xyz).then_some(self.level).flatten(),
            link: (class == CardClass::Link).then_some(self.linkval).flatten(),
            attribute: self.attribute,
            image_url: primary.image_url,
            image_small_url: primary.image_url_small,
            ban_status,
            image_dhash: None,
            content_hash: None,
        }
    }
}

pub fn parse_dump(json: &str) -> anyhow::Result<CardDump> {
    serde_json::from_str(json).context("Malformed card dump")
}

/// Load a dump from an `http(s)://` URL or a local file.
pub async fn load_dump(source: &str) -> anyhow::Result<CardDump> {
    if source.starts_with("http://") || source.starts_with("https://") {
        info!("Downloading card dump from {source}");
        let client = Client::builder().timeout(DUMP_TIMEOUT).build()?;
        let response = client.get(source).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Card dump fetch failed: HTTP {}", response.status());
        }
        let body = response.text().await?;
        return parse_dump(&body);
    }

    let path = Path::new(source);
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read card dump {}", path.display()))?;
    parse_dump(&body)
}

#[cfg(test)]
#[path = "tests/ygoprodeck_tests.rs"]
mod tests;
