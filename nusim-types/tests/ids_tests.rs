use nusim_types::{EntityId, Error};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ── Issuing ──────────────────────────────────────────────────────

#[test]
fn fresh_ids_never_repeat() {
    let ids: Vec<EntityId> = (0..256).map(|_| EntityId::new()).collect();
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
}

#[test]
fn ordered_map_iterates_in_issue_order() {
    let mut table = BTreeMap::new();
    let issued: Vec<EntityId> = (0..64)
        .map(|i| {
            let id = EntityId::new();
            table.insert(id, i);
            id
        })
        .collect();
    let iterated: Vec<EntityId> = table.keys().copied().collect();
    assert_eq!(iterated, issued);
    assert_eq!(table.values().copied().collect::<Vec<_>>(), (0..64).collect::<Vec<_>>());
}

#[test]
fn ids_are_version_7() {
    assert_eq!(EntityId::new().as_uuid().get_version_num(), 7);
}

// ── Wire format ──────────────────────────────────────────────────

#[test]
fn display_is_lowercase_hyphenated() {
    let id = EntityId::new();
    let text = id.to_string();
    assert_eq!(text.len(), 36);
    assert_eq!(text, text.to_lowercase());
    assert_eq!(text.matches('-').count(), 4);
}

#[test]
fn parse_accepts_path_segment_forms() {
    let id = EntityId::new();
    let text = id.to_string();
    assert_eq!(EntityId::parse(&text).unwrap(), id);
    assert_eq!(EntityId::parse(&text.to_uppercase()).unwrap(), id);
    assert_eq!(EntityId::parse(&format!(" {text}\n")).unwrap(), id);
    assert_eq!(text.parse::<EntityId>().unwrap(), id);
}

#[test]
fn parse_rejects_garbage() {
    for input in ["", "nope", "12345", "csproot"] {
        assert!(matches!(EntityId::parse(input), Err(Error::InvalidUuid(_))), "{input}");
    }
}

#[test]
fn serializes_as_json_string() {
    let id = EntityId::new();
    assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(id.to_string()));
    let back: EntityId = serde_json::from_value(serde_json::json!(id.to_string())).unwrap();
    assert_eq!(back, id);
}

proptest! {
    #[test]
    fn any_uuid_survives_display_parse(bytes in any::<[u8; 16]>()) {
        let id = EntityId::from_uuid(uuid::Uuid::from_bytes(bytes));
        prop_assert_eq!(EntityId::parse(&id.to_string()).unwrap(), id);
    }
}
