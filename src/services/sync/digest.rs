//! Change detection for bulk sync.

use serde_json::{json, Value};

use crate::database::models::{CardClass, CardRecord};

/// Stable 256-bit digest (hex) of the synced fields of `card`.
///
/// The link rating only takes part for Link monsters and the image hash
/// only once one has been computed, so adding either to a card that never
/// had it does not churn every other row.
pub fn compute_record_digest(card: &CardRecord) -> String {
    let mut fields = json!({
        "id": card.id,
        "name": card.name,
        "type": card.card_type,
        "frameType": card.frame_type,
        "desc": card.description,
        "race": card.race,
        "archetype": card.archetype,
        "atk": card.atk,
        "def": card.def,
        "level": card.level,
        "attribute": card.attribute,
        "img": card.image_url,
        "ban": card.ban_status.as_str(),
    });

    if let Value::Object(map) = &mut fields {
        if card.class() == CardClass::Link {
            if let Some(link) = card.link {
                map.insert("linkval".into(), json!(link));
            }
        }
        if let Some(dhash) = card.image_dhash.as_deref() {
            map.insert("dhash".into(), json!(dhash));
        }
    }

    // serde_json maps are key-ordered, so the text form is canonical.
    blake3::hash(fields.to_string().as_bytes())
        .to_hex()
        .to_string()
}

/// True when a fresh digest differs from the stored one (or none is stored).
pub fn has_changed(card_digest: &str, stored: Option<&str>) -> bool {
    stored != Some(card_digest)
}

#[cfg(test)]
#[path = "tests/digest_tests.rs"]
mod tests;
