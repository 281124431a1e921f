//! Spreadsheet import preview: one match proposal per sheet row.
//! Applying the chosen quantities belongs to the collection layer.

pub mod sheet;

use std::path::Path;
use std::sync::atomic::AtomicBool;

use log::info;
use serde::Serialize;

pub use sheet::{read_first_sheet, read_rows, HeaderMap, SheetRow};

use crate::services::catalog::CatalogStore;
use crate::services::matcher::{CardMatcher, MatchOutcome, MatchStatus, NameQuery, Suggestion};
use crate::services::text::normalizer::normalize_opt;
use crate::services::translate::Translator;
use crate::types::errors::MatchResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    pub row_index: usize,
    pub fr_name: Option<String>,
    pub en_name: Option<String>,
    pub card_type: Option<String>,
    pub monster_race: Option<String>,
    pub qty: i64,
    pub status: MatchStatus,
    pub confidence: f64,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_card_id: Option<i64>,
}

impl PreviewRow {
    fn new(row: SheetRow, outcome: MatchOutcome) -> Self {
        Self {
            row_index: row.row_index,
            fr_name: row.fr_name,
            en_name: row.en_name,
            card_type: row.card_type,
            monster_race: row.monster_race,
            qty: row.qty,
            status: outcome.status,
            confidence: outcome.confidence,
            suggestions: outcome.suggestions,
            chosen_card_id: outcome.chosen_id,
        }
    }
}

/// Match every row by its English name with the card-type and race hints.
/// Rows with neither an English name nor a race are `not_found` without
/// touching the store.
pub async fn preview_rows<S, T>(
    matcher: &CardMatcher<S, T>,
    rows: Vec<SheetRow>,
    cancel_flag: &AtomicBool,
) -> MatchResult<Vec<PreviewRow>>
where
    S: CatalogStore,
    T: Translator,
{
    let mut preview = Vec::with_capacity(rows.len());
    for row in rows {
        let has_name = !normalize_opt(row.en_name.as_deref()).is_empty();
        let has_race = !normalize_opt(row.monster_race.as_deref()).is_empty();
        let outcome = if has_name || has_race {
            let query = NameQuery {
                name: row.en_name.clone(),
                type_hint: row.card_type.clone(),
                race_hint: row.monster_race.clone(),
            };
            matcher
                .identify_by_name_cancellable(&query, cancel_flag)
                .await?
        } else {
            MatchOutcome::not_found()
        };
        preview.push(PreviewRow::new(row, outcome));
    }
    Ok(preview)
}

/// Read the first sheet of `path` and preview it.
pub async fn preview_workbook<S, T>(
    matcher: &CardMatcher<S, T>,
    path: &Path,
    cancel_flag: &AtomicBool,
) -> anyhow::Result<Vec<PreviewRow>>
where
    S: CatalogStore,
    T: Translator,
{
    let range = read_first_sheet(path)?;
    let rows = read_rows(&range);
    info!("Import preview: {} rows from {}", rows.len(), path.display());
    Ok(preview_rows(matcher, rows, cancel_flag).await?)
}

#[cfg(test)]
#[path = "tests/import_tests.rs"]
mod tests;
