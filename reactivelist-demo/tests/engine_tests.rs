use pretty_assertions::assert_eq;
use reactivelist_demo::engine::{matches, project};
use reactivelist_demo::{Dataset, QueryError};
use reactivelist_types::{Hit, QueryOptions, SourceFilter};
use serde_json::{Value, json};

fn library() -> Dataset {
    Dataset::new(vec![
        Hit::new("a")
            .with_field("title", "Kindred")
            .with_field("year", 1979)
            .with_field("tags", json!(["time travel", "slavery"])),
        Hit::new("b")
            .with_field("title", "Dawn")
            .with_field("year", 1987)
            .with_field("tags", json!(["aliens"])),
        Hit::new("c").with_field("title", "Wild Seed").with_field("year", 1980),
        Hit::new("d").with_field("title", "Fledgling"),
    ])
}

fn ids(hits: &[Hit]) -> Vec<&str> {
    hits.iter().map(|hit| hit.id.as_str()).collect()
}

#[test]
fn pages_through_matches() {
    let page = library().search(&[], &QueryOptions::new(2, 1)).unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(ids(&page.hits), vec!["b", "c"]);
}

#[test]
fn filters_narrow_the_total() {
    let filters = [json!({ "match": { "title": "DAWN" } })];
    let page = library().search(&filters, &QueryOptions::new(10, 0)).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(ids(&page.hits), vec!["b"]);
}

#[test]
fn term_matches_array_members() {
    let hit = Hit::new("a").with_field("tags", json!(["time travel", "slavery"]));
    assert!(matches(&hit, &json!({ "term": { "tags.keyword": "slavery" } })));
    assert!(!matches(&hit, &json!({ "term": { "tags": "aliens" } })));
}

#[test]
fn bool_clauses_combine() {
    let hit = Hit::new("c").with_field("title", "Wild Seed").with_field("year", 1980);
    let clause = |body: Value| json!({ "bool": body });

    assert!(matches(
        &hit,
        &clause(json!({
            "must": { "match": { "title": "seed" } },
            "must_not": [{ "term": { "year": 1979 } }],
        }))
    ));
    assert!(!matches(
        &hit,
        &clause(json!({ "should": [{ "term": { "year": 1979 } }, { "match": { "title": "dawn" } }] }))
    ));
    assert!(matches(&hit, &json!({ "match_all": {} })));
}

#[test]
fn sorts_numbers_and_puts_missing_last() {
    let mut options = QueryOptions::new(10, 0);
    options.sort = Some(vec![json!({ "year": { "order": "desc" } })]);
    let page = library().search(&[], &options).unwrap();
    assert_eq!(ids(&page.hits), vec!["b", "c", "a", "d"]);

    options.sort = Some(vec![json!({ "title.keyword": { "order": "asc" } })]);
    let page = library().search(&[], &options).unwrap();
    assert_eq!(ids(&page.hits), vec!["b", "d", "a", "c"]);
}

#[test]
fn projection_keeps_included_fields() {
    let hit = Hit::new("a").with_field("title", "Kindred").with_field("year", 1979);
    let source = SourceFilter {
        includes: vec!["title".into()],
        excludes: Vec::new(),
    };
    let projected = project(&hit, &source);
    assert_eq!(projected.source.keys().collect::<Vec<_>>(), vec!["title"]);

    let source = SourceFilter {
        excludes: vec!["title".into()],
        ..SourceFilter::default()
    };
    let projected = project(&hit, &source);
    assert_eq!(projected.source.keys().collect::<Vec<_>>(), vec!["year"]);
}

#[test]
fn composite_buckets_follow_the_cursor() {
    let dataset = Dataset::new(vec![
        Hit::new("1").with_field("author", "Le Guin"),
        Hit::new("2").with_field("author", "Butler"),
        Hit::new("3").with_field("author", "Le Guin"),
        Hit::new("4").with_field("author", "Banks"),
    ]);
    let aggs = |after: Option<Value>| {
        let mut composite = json!({
            "sources": [{ "author.keyword": { "terms": { "field": "author.keyword" } } }],
            "size": 2,
        });
        if let Some(after) = after {
            composite["after"] = after;
        }
        json!({ "author.keyword": {
            "composite": composite,
            "aggs": { "author.keyword": { "top_hits": { "size": 1 } } },
        } })
    };

    let mut options = QueryOptions::new(2, 0);
    options.aggs = Some(aggs(None));
    let first = dataset.search(&[], &options).unwrap();
    assert_eq!(first.total, 4);
    assert_eq!(first.buckets.len(), 2);
    assert_eq!(first.buckets[0]["key"], json!({ "author.keyword": "Banks" }));
    assert_eq!(first.after_key, Some(json!({ "author.keyword": "Butler" })));

    options.aggs = Some(aggs(first.after_key));
    let second = dataset.search(&[], &options).unwrap();
    assert_eq!(second.buckets.len(), 1);
    assert_eq!(second.buckets[0]["doc_count"], json!(2));
    assert_eq!(
        second.buckets[0]["author.keyword"]["hits"]["hits"][0]["_id"],
        json!("1")
    );

    options.aggs = Some(aggs(second.after_key));
    let third = dataset.search(&[], &options).unwrap();
    assert!(third.buckets.is_empty());
    assert_eq!(third.after_key, None);
}

#[test]
fn other_aggregations_are_rejected() {
    let mut options = QueryOptions::new(10, 0);
    options.aggs = Some(json!({ "genres": { "terms": { "field": "genre" } } }));
    let err = library().search(&[], &options).unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedAggregation(_)));
}

#[test]
fn parses_hits_from_json() {
    let dataset = Dataset::from_json(r#"[{ "_id": "x", "_source": { "title": "Kindred" } }]"#).unwrap();
    assert_eq!(dataset.len(), 1);
    assert!(Dataset::from_json("{}").is_err());
}
