use super::*;

fn row(id: i64, name: &str) -> (CardRef, String) {
    (
        CardRef {
            id,
            name: name.to_string(),
            card_type: None,
            race: None,
            image_dhash: None,
        },
        crate::services::text::normalize(name),
    )
}

#[test]
fn test_rank_orders_by_distance() {
    let rows = vec![
        row(1, "Dark Magician Girl"),
        row(2, "Dark Magician"),
        row(3, "Blue-Eyes White Dragon"),
    ];
    let hits = rank_by_trigram("dark magician", rows, 5);

    assert_eq!(hits[0].card.id, 2);
    assert!((hits[0].similarity - 1.0).abs() < 1e-9);
    assert!(hits[0].distance.abs() < 1e-9);
    assert_eq!(hits[1].card.id, 1);
    assert!(hits[1].similarity < 1.0);
    // Shares only the leading-word gram: kept, ranked last.
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[2].card.id, 3);
    assert!(hits[2].similarity < 0.1);
}

#[test]
fn test_rank_drops_unrelated_rows() {
    let rows = vec![row(1, "Dark Magician"), row(2, "Pot of Greed")];
    assert!(rank_by_trigram("zzqqxx", rows, 5).is_empty());
}

#[test]
fn test_rank_truncates_and_breaks_ties_by_id() {
    let rows = vec![row(9, "Kuriboh"), row(4, "Kuriboh"), row(7, "Kuriboh")];
    let hits = rank_by_trigram("kuriboh", rows, 2);
    let ids: Vec<i64> = hits.iter().map(|h| h.card.id).collect();
    assert_eq!(ids, vec![4, 7]);
}

#[test]
fn test_rank_empty_query_or_limit() {
    assert!(rank_by_trigram("", vec![row(1, "Kuriboh")], 5).is_empty());
    assert!(rank_by_trigram("kuriboh", vec![row(1, "Kuriboh")], 0).is_empty());
}
