//! Workbook reading and loose header detection.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Range, Reader};
use regex::Regex;

use crate::services::text::normalizer::normalize;

static RE_FR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"nom.*fr").expect("Invalid regex"));
static RE_EN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"nom.*en|english|angl").expect("Invalid regex"));
static RE_CARD_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"type.*carte|carte.*type|card.*type").expect("Invalid regex"));
static RE_RACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"type.*monstre|race|monster.*(type|race)").expect("Invalid regex")
});
static RE_QTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"qte|quantite|qty|quantity|nombre").expect("Invalid regex"));

/// Column index of each known field, if its header was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub fr_name: Option<usize>,
    pub en_name: Option<usize>,
    pub card_type: Option<usize>,
    pub race: Option<usize>,
    pub qty: Option<usize>,
}

impl HeaderMap {
    /// First column whose normalized header matches each pattern.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize(h.as_ref())).collect();
        let find = |re: &Regex| normalized.iter().position(|h| re.is_match(h));
        Self {
            fr_name: find(&RE_FR_NAME),
            en_name: find(&RE_EN_NAME),
            card_type: find(&RE_CARD_TYPE),
            race: find(&RE_RACE),
            qty: find(&RE_QTY),
        }
    }
}

/// One data row of the sheet, before matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    /// 1-based among data rows.
    pub row_index: usize,
    pub fr_name: Option<String>,
    pub en_name: Option<String>,
    pub card_type: Option<String>,
    pub monster_race: Option<String>,
    pub qty: i64,
}

/// First worksheet of an XLSX/XLS/ODS workbook.
pub fn read_first_sheet(path: &Path) -> anyhow::Result<Range<Data>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;
    workbook
        .worksheet_range_at(0)
        .context("Workbook has no sheet")?
        .context("Failed to read first sheet")
}

/// Header row plus data rows. Blank rows are skipped.
pub fn read_rows(range: &Range<Data>) -> Vec<SheetRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(|cell| cell_text(cell).unwrap_or_default()).collect();
    let columns = HeaderMap::detect(&headers);
    let cell = |row: &[Data], col: Option<usize>| col.and_then(|c| row.get(c)).and_then(cell_text);

    rows.filter(|row| row.iter().any(|c| cell_text(c).is_some()))
        .enumerate()
        .map(|(i, row)| SheetRow {
            row_index: i + 1,
            fr_name: cell(row, columns.fr_name),
            en_name: cell(row, columns.en_name),
            card_type: cell(row, columns.card_type),
            monster_race: cell(row, columns.race),
            qty: columns
                .qty
                .and_then(|c| row.get(c))
                .map(cell_quantity)
                .unwrap_or(0),
        })
        .collect()
}

/// Display text of a cell; blank cells and errors are `None`.
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.as_f64().to_string(),
        Data::Error(_) | Data::Empty => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Non-negative whole quantity; anything unreadable is 0.
pub fn cell_quantity(cell: &Data) -> i64 {
    let value = match cell {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::Bool(b) => f64::from(u8::from(*b)),
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.replace(',', ".").parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };
    if value.is_finite() && value > 0.0 {
        value.trunc() as i64
    } else {
        0
    }
}

#[cfg(test)]
#[path = "tests/sheet_tests.rs"]
mod tests;
