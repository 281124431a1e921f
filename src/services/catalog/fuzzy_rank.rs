use std::cmp::Ordering;

use super::FuzzyHit;
use crate::database::models::CardRef;
use crate::services::text::trigram::TrigramSet;

/// Rank candidate rows by trigram distance to `query`.
///
/// `rows` pairs each card with its stored normalized name. Rows sharing no
/// trigram with the query are dropped. Order: distance ascending, similarity
/// descending, id ascending.
pub fn rank_by_trigram<I>(query: &str, rows: I, limit: usize) -> Vec<FuzzyHit>
where
    I: IntoIterator<Item = (CardRef, String)>,
{
    let query_set = TrigramSet::new(query);
    if query_set.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut hits: Vec<FuzzyHit> = rows
        .into_iter()
        .filter_map(|(card, name_search)| {
            let similarity = query_set.similarity(&TrigramSet::new(&name_search));
            (similarity > 0.0).then(|| FuzzyHit {
                card,
                distance: 1.0 - similarity,
                similarity,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.card.id.cmp(&b.card.id))
    });
    hits.truncate(limit);
    hits
}

#[cfg(test)]
#[path = "tests/fuzzy_rank_tests.rs"]
mod tests;
