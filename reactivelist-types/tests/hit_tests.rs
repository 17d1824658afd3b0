use pretty_assertions::assert_eq;
use reactivelist_types::{Error, Hit, HitId, Record, parse_hits};
use serde_json::json;

// ── Hit parsing ──────────────────────────────────────────────────

#[test]
fn hit_deserializes_engine_shape() {
    let hit: Hit = serde_json::from_value(json!({
        "_id": "b1",
        "_index": "books",
        "_score": 1.5,
        "_source": { "title": "Dune", "year": 1965 }
    }))
    .unwrap();

    assert_eq!(hit.id, HitId::new("b1"));
    assert_eq!(hit.index.as_deref(), Some("books"));
    assert_eq!(hit.score, Some(1.5));
    assert_eq!(hit.source["title"], json!("Dune"));
    assert!(hit.highlight.is_none());
}

#[test]
fn hit_without_source_has_empty_document() {
    let hit: Hit = serde_json::from_value(json!({ "_id": "x" })).unwrap();
    assert!(hit.source.is_empty());
}

#[test]
fn record_flattens_source_fields() {
    let hit = Hit::new("b2").with_field("title", "Emma");
    let record = Record::from_hit(&hit);

    assert_eq!(record.id, Some(HitId::new("b2")));
    assert_eq!(record.field("title"), Some(&json!("Emma")));

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value, json!({ "_id": "b2", "title": "Emma" }));
}

#[test]
fn record_keeps_highlight_separate() {
    let mut hit = Hit::new("b3").with_field("title", "Ubik");
    hit.highlight = Some(serde_json::from_value(json!({ "title": ["<em>Ubik</em>"] })).unwrap());

    let record = Record::from(&hit);
    assert_eq!(record.highlight["title"], json!(["<em>Ubik</em>"]));
    assert!(record.field("highlight").is_none());
}

#[test]
fn parse_hits_preserves_order() {
    let hits = vec![Hit::new("a"), Hit::new("b"), Hit::new("c")];
    let ids: Vec<_> = parse_hits(&hits)
        .into_iter()
        .map(|r| r.id.unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

// ── Promoted records ─────────────────────────────────────────────

#[test]
fn promoted_record_without_id_parses() {
    let record: Record = serde_json::from_value(json!({ "title": "Sponsored" })).unwrap();
    assert!(record.id.is_none());
    assert!(record.dedup_key().is_none());
    assert_eq!(record.field("title"), Some(&json!("Sponsored")));
}

#[test]
fn empty_id_is_not_a_dedup_key() {
    let record: Record = serde_json::from_value(json!({ "_id": "" })).unwrap();
    assert!(record.dedup_key().is_none());
}

#[test]
fn non_object_record_is_rejected() {
    let err: Error = serde_json::from_value::<Record>(json!([1, 2, 3]))
        .unwrap_err()
        .into();
    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn click_id_serializes_with_underscore() {
    let mut record = Record::new("z");
    record.click_id = Some(7);
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["_click_id"], json!(7));
}
