use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::types::errors::NoSignal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationProvider {
    DeepL { api_key: String, url: String },
    LibreTranslate { base_url: String },
}

#[derive(Serialize)]
struct DeepLRequest<'a> {
    text: [&'a str; 1],
    target_lang: String,
}

#[derive(Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
}

#[derive(Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'static str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

impl TranslationProvider {
    pub fn name(&self) -> &'static str {
        match self {
            TranslationProvider::DeepL { .. } => "DeepL",
            TranslationProvider::LibreTranslate { .. } => "LibreTranslate",
        }
    }

    /// Translate `text` (source language auto-detected). An empty answer is
    /// a `Decode` failure.
    pub async fn translate(
        &self,
        client: &Client,
        text: &str,
        target_lang: &str,
    ) -> Result<String, NoSignal> {
        let translated = match self {
            TranslationProvider::DeepL { api_key, url } => {
                let response = client
                    .post(url)
                    .header("Authorization", format!("DeepL-Auth-Key {api_key}"))
                    .json(&DeepLRequest {
                        text: [text],
                        target_lang: target_lang.to_uppercase(),
                    })
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(NoSignal::Http(status.as_u16()));
                }
                let body: DeepLResponse = response
                    .json()
                    .await
                    .map_err(|e| NoSignal::Decode(e.to_string()))?;
                body.translations.into_iter().next().map(|t| t.text)
            }
            TranslationProvider::LibreTranslate { base_url } => {
                let url = format!("{}/translate", base_url.trim_end_matches('/'));
                let response = client
                    .post(url)
                    .json(&LibreRequest {
                        q: text,
                        source: "auto",
                        target: target_lang,
                        format: "text",
                    })
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(NoSignal::Http(status.as_u16()));
                }
                let body: LibreResponse = response
                    .json()
                    .await
                    .map_err(|e| NoSignal::Decode(e.to_string()))?;
                body.translated_text
            }
        };

        translated
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NoSignal::Decode("empty translation".into()))
    }
}
