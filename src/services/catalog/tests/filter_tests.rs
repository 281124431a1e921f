use super::*;
use crate::database::models::BanStatus;

fn monster(id: i64, name: &str, card_type: &str, frame: &str) -> CardRecord {
    CardRecord {
        id,
        name: name.to_string(),
        card_type: Some(card_type.to_string()),
        frame_type: Some(frame.to_string()),
        race: Some("Spellcaster".to_string()),
        attribute: Some("DARK".to_string()),
        ..Default::default()
    }
}

fn spell(id: i64, name: &str, subtype: &str) -> CardRecord {
    CardRecord {
        id,
        name: name.to_string(),
        card_type: Some("Spell Card".to_string()),
        frame_type: Some("spell".to_string()),
        race: Some(subtype.to_string()),
        ..Default::default()
    }
}

fn catalog() -> Vec<CardRecord> {
    let mut dark_magician = monster(46986414, "Dark Magician", "Normal Monster", "normal");
    dark_magician.level = Some(7);
    dark_magician.atk = Some(2500);
    dark_magician.def = Some(2100);

    let mut utopia = monster(84013237, "Number 39: Utopia", "XYZ Monster", "xyz");
    utopia.rank = Some(4);
    utopia.race = Some("Warrior".to_string());
    utopia.attribute = Some("LIGHT".to_string());
    utopia.atk = Some(2500);
    utopia.def = Some(2000);

    let mut decode = monster(1861629, "Decode Talker", "Link Monster", "link");
    decode.link = Some(3);
    decode.race = Some("Cyberse".to_string());
    decode.atk = Some(2300);

    let mut beast = monster(2, "Winged Beast Thing", "Effect Monster", "effect");
    beast.race = Some("Winged Beast".to_string());
    beast.level = Some(4);

    let mut pot = spell(55144522, "Pot of Greed", "Normal");
    pot.ban_status = BanStatus::Banned;

    vec![
        dark_magician,
        utopia,
        decode,
        beast,
        pot,
        spell(83764718, "Monster Reborn", "Normal"),
        spell(5318639, "Mystical Space Typhoon", "Quick-Play"),
    ]
}

fn matching_ids(filters: &CardSearchFilters) -> Vec<i64> {
    let predicate = build_predicate(filters);
    let mut ids: Vec<i64> = catalog()
        .iter()
        .filter(|card| predicate.matches(card))
        .map(|card| card.id)
        .collect();
    ids.sort();
    ids
}

fn monsters() -> CardSearchFilters {
    CardSearchFilters {
        card_type: Some("MONSTER".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_empty_filters_match_everything() {
    assert_eq!(build_predicate(&CardSearchFilters::default()), Predicate::True);
    assert_eq!(matching_ids(&CardSearchFilters::default()).len(), 7);
}

#[test]
fn test_name_query_is_accent_and_case_insensitive() {
    let filters = CardSearchFilters {
        q: Some("MAGÍCIAN".to_string()),
        ..Default::default()
    };
    assert_eq!(matching_ids(&filters), vec![46986414]);
}

#[test]
fn test_card_type_filters() {
    assert_eq!(matching_ids(&monsters()), vec![2, 1861629, 46986414, 84013237]);

    let spells = CardSearchFilters {
        card_type: Some("spell".to_string()),
        ..Default::default()
    };
    assert_eq!(matching_ids(&spells), vec![5318639, 55144522, 83764718]);

    let all = CardSearchFilters {
        card_type: Some("ALL".to_string()),
        ..Default::default()
    };
    assert_eq!(matching_ids(&all).len(), 7);
}

#[test]
fn test_ban_filter() {
    let banned = CardSearchFilters {
        ban: Some("banned".to_string()),
        ..Default::default()
    };
    assert_eq!(matching_ids(&banned), vec![55144522]);

    let any = CardSearchFilters {
        ban: Some("any".to_string()),
        ..Default::default()
    };
    assert_eq!(matching_ids(&any).len(), 7);
}

#[test]
fn test_race_filter_accepts_hyphen_and_space_variants() {
    let filters = CardSearchFilters {
        race: Some("winged-beast".to_string()),
        ..monsters()
    };
    assert_eq!(matching_ids(&filters), vec![2]);

    let filters = CardSearchFilters {
        race: Some("winged beast".to_string()),
        ..monsters()
    };
    assert_eq!(matching_ids(&filters), vec![2]);
}

#[test]
fn test_monster_only_filters_ignored_for_other_types() {
    let filters = CardSearchFilters {
        card_type: Some("SPELL".to_string()),
        attribute: Some("DARK".to_string()),
        atk_min: Some(3000),
        ..Default::default()
    };
    assert_eq!(matching_ids(&filters).len(), 3);
}

#[test]
fn test_spell_subtype_matches_race() {
    let filters = CardSearchFilters {
        card_type: Some("SPELL".to_string()),
        spell_subtype: Some("quick-play".to_string()),
        ..Default::default()
    };
    assert_eq!(matching_ids(&filters), vec![5318639]);
}

#[test]
fn test_level_range_follows_monster_class() {
    let xyz = CardSearchFilters {
        monster_class: Some("xyz".to_string()),
        level_min: Some(4),
        level_max: Some(4),
        ..monsters()
    };
    assert_eq!(matching_ids(&xyz), vec![84013237]);

    let link = CardSearchFilters {
        monster_class: Some("Link".to_string()),
        level_min: Some(3),
        ..monsters()
    };
    assert_eq!(matching_ids(&link), vec![1861629]);

    let normal = CardSearchFilters {
        monster_class: Some("normal".to_string()),
        level_min: Some(7),
        ..monsters()
    };
    assert_eq!(matching_ids(&normal), vec![46986414]);
}

#[test]
fn test_level_range_without_class_spans_all_subclasses() {
    // Level 4 beast and rank 4 Utopia; the link-3 monster is excluded.
    let filters = CardSearchFilters {
        level_min: Some(4),
        level_max: Some(4),
        ..monsters()
    };
    assert_eq!(matching_ids(&filters), vec![2, 84013237]);

    let filters = CardSearchFilters {
        level_max: Some(3),
        ..monsters()
    };
    assert_eq!(matching_ids(&filters), vec![1861629]);
}

#[test]
fn test_atk_def_ranges_and_attribute() {
    let filters = CardSearchFilters {
        atk_min: Some(2400),
        def_max: Some(2050),
        ..monsters()
    };
    assert_eq!(matching_ids(&filters), vec![84013237]);

    let filters = CardSearchFilters {
        attribute: Some("dark".to_string()),
        ..monsters()
    };
    assert_eq!(matching_ids(&filters), vec![2, 1861629, 46986414]);
}

#[test]
fn test_pagination_is_clamped() {
    let filters = CardSearchFilters {
        page: Some(0),
        page_size: Some(500),
        ..Default::default()
    };
    assert_eq!(filters.page(), 1);
    assert_eq!(filters.page_size(), MAX_PAGE_SIZE);
    assert_eq!(filters.offset(), 0);

    let filters = CardSearchFilters {
        page: Some(3),
        page_size: Some(0),
        ..Default::default()
    };
    assert_eq!(filters.page_size(), 1);
    assert_eq!(filters.offset(), 2);
}

#[test]
fn test_fuzzy_filter_from_hints() {
    let filter = FuzzyFilter::from_hints(Some("Magie"), Some(" Quick-Play "));
    assert_eq!(filter.category, Some(CardCategory::Spell));
    assert_eq!(filter.race.as_deref(), Some("quick play"));

    let filter = FuzzyFilter::from_hints(Some("unknown"), Some("  "));
    assert_eq!(filter, FuzzyFilter::default());
    assert_eq!(filter.to_predicate(), Predicate::True);
}

#[test]
fn test_fuzzy_filter_predicate() {
    let cards = catalog();
    let monsters_only = FuzzyFilter::from_hints(Some("Monstre"), Some("spellcaster")).to_predicate();
    let ids: Vec<i64> = cards
        .iter()
        .filter(|c| monsters_only.matches(c))
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![46986414]);
}

#[test]
fn test_filters_deserialize_from_camel_case() {
    let filters: CardSearchFilters =
        serde_json::from_str(r#"{"cardType":"MONSTER","levelMin":4,"pageSize":20}"#).unwrap();
    assert_eq!(filters.card_type.as_deref(), Some("MONSTER"));
    assert_eq!(filters.level_min, Some(4));
    assert_eq!(filters.page_size(), 20);
}
