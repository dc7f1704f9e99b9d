#[path = "common/mod.rs"]
mod common;

use common::*;
use std::time::Duration;
use threadfeat::{EngineError, ThreadEngine, FEATURE_COLUMNS};

/// Single post, two threads: a1 <- {a2, a3}, a3 <- a4, plus a lone root a5.
/// Roots see each other as siblings; times are relative to a1's timestamp.
#[test]
fn single_post_two_threads() {
    let t = table(vec![
        row("A", POST_A, "a1", "", "2024-01-01 10:05:00"),
        row("A", POST_A, "a2", "a1", "2024-01-01 10:15:00"),
        row("A", POST_A, "a3", "a1", "2024-01-01 10:20:00"),
        row("A", POST_A, "a4", "a3", "2024-01-01 10:25:00"),
        row("A", POST_A, "a5", "", "2024-01-01 11:00:00"),
    ]);
    let set = ThreadEngine::new().compute(&t).unwrap();
    let f = by_id(&set);

    let expect = [
        ("a1", "a1", 0, 1, 0),
        ("a2", "a1", 1, 1, 600),
        ("a3", "a1", 1, 1, 900),
        ("a4", "a1", 2, 0, 1200),
        ("a5", "a5", 0, 1, 0),
    ];
    for (id, root, depth, sibs, tsr) in expect {
        let r = &f[id];
        assert_eq!(r.root_id, root, "root_id of {id}");
        assert_eq!(r.depth, depth, "depth of {id}");
        assert_eq!(r.sibling_count, sibs, "sibling_count of {id}");
        assert_eq!(secs(r), Some(tsr), "time_since_root of {id}");
    }
    assert_eq!(set.summary.groups, 1);
    assert_eq!(set.summary.max_depth, 2);
    assert_eq!(set.summary.anomalies(), 0);
}

/// a6 replies to a99, which is not in the post: it becomes a third root of "A".
/// b3 does the same in "B". Sibling counts never cross posts.
#[test]
fn dangling_parents_become_roots_per_post() {
    let set = ThreadEngine::new().compute(&two_post_fixture()).unwrap();
    let f = by_id(&set);

    assert_eq!(f["a6"].depth, 0);
    assert_eq!(f["a6"].root_id, "a6");
    assert_eq!(secs(&f["a6"]), Some(0));
    for root in ["a1", "a5", "a6"] {
        assert_eq!(f[root].sibling_count, 2, "{root} has two peer roots in A");
    }

    assert_eq!(f["b1"].sibling_count, 1);
    assert_eq!(f["b3"].sibling_count, 1);
    assert_eq!(f["b3"].root_id, "b3");
    assert_eq!(f["b2"].root_id, "b1");
    assert_eq!(f["b2"].depth, 1);
    assert_eq!(f["b2"].sibling_count, 0);
    assert_eq!(secs(&f["b2"]), Some(600));

    assert_eq!(set.summary.groups, 2);
    assert_eq!(set.summary.dangling_parents, 2);
    assert_eq!(set.summary.rows_out, 9);
}

/// An unparseable date on a reply only affects that reply; on a root it makes the
/// whole thread's time unknown. Structure is computed either way.
#[test]
fn invalid_dates_propagate_as_unknown() {
    let t = table(vec![
        row("A", POST_A, "a1", "", "not a date"),
        row("A", POST_A, "a2", "a1", "2024-01-01 10:15:00"),
        row("A", POST_A, "a3", "a2", "2024-01-01 10:20:00"),
        row("A", POST_A, "x1", "", "2024-01-01 10:00:00"),
        row("A", POST_A, "x2", "x1", "garbage"),
        row("A", POST_A, "x3", "x1", "2024-01-01 10:30:00"),
    ]);
    let set = ThreadEngine::new().compute(&t).unwrap();
    let f = by_id(&set);

    for id in ["a1", "a2", "a3"] {
        assert_eq!(f[id].time_since_root, None, "{id} hangs off a root with no valid date");
        assert_eq!(f[id].root_id, "a1");
    }
    assert_eq!(f["a3"].depth, 2);
    assert_eq!(f["a1"].sibling_count, 1);

    assert_eq!(f["x2"].time_since_root, None);
    assert_eq!(f["x2"].sibling_count, 1);
    assert_eq!(f["x3"].time_since_root, Some(Duration::from_secs(1800)));
    assert_eq!(set.summary.invalid_comment_dates, 2);
}

/// Replies stamped before their root (clock skew) are clamped to zero, and
/// sub-second remainders are floored.
#[test]
fn negative_and_fractional_deltas() {
    let t = table(vec![
        row("A", POST_A, "r", "", "2024-01-01T10:00:00.750Z"),
        row("A", POST_A, "early", "r", "2024-01-01 09:59:00"),
        row("A", POST_A, "later", "r", "2024-01-01 10:00:02.500"),
    ]);
    let set = ThreadEngine::new().compute(&t).unwrap();
    let f = by_id(&set);
    assert_eq!(secs(&f["early"]), Some(0));
    assert_eq!(secs(&f["later"]), Some(1));
}

#[test]
fn empty_table_yields_empty_feature_table() {
    let t = table(vec![]);
    let set = ThreadEngine::new().compute(&t).unwrap();
    assert!(set.is_empty());

    let out = set.to_table(Default::default());
    assert_eq!(out.columns, FEATURE_COLUMNS);
    assert!(out.is_empty());
}

#[test]
fn missing_parent_column_is_fatal() {
    let mut t = two_post_fixture();
    t.columns.retain(|c| c != "parent_id");
    for r in &mut t.rows {
        r.remove("parent_id");
    }
    let err = ThreadEngine::new().compute(&t).unwrap_err();
    let engine_err = err.downcast_ref::<EngineError>().expect("typed engine error");
    assert_eq!(engine_err, &EngineError::MissingColumns(vec!["parent_id".to_string()]));
    assert!(err.to_string().contains("parent_id"));
}

#[test]
fn missing_group_key_columns_are_all_named() {
    let mut t = table(vec![]);
    t.columns.retain(|c| c != "company_name" && c != "post_date");
    let err = ThreadEngine::new().validate_schema(&t).unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingColumns(vec!["company_name".to_string(), "post_date".to_string()])
    );
}

/// Rows whose post date cannot be parsed have no group: they are dropped
/// and counted, and their replies see a dangling parent.
#[test]
fn bad_post_date_rows_are_excluded_and_counted() {
    let t = table(vec![
        row("A", POST_A, "a1", "", "2024-01-01 10:05:00"),
        row("A", "yesterday-ish", "a2", "a1", "2024-01-01 10:15:00"),
        row("A", POST_A, "a3", "a2", "2024-01-01 10:20:00"),
    ]);
    let set = ThreadEngine::new().compute(&t).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.summary.rows_in, 3);
    assert_eq!(set.summary.excluded_bad_group_key, 1);
    assert!(set.get("a2").is_none());
    assert_eq!(set.get("a3").unwrap().root_id, "a3");
}

/// Parent sentinels: empty, NaN (any case), None, null, JSON null.
#[test]
fn parent_sentinels_mean_top_level() {
    let mut rows = Vec::new();
    for (i, p) in ["", "nan", "NaN", "None", " null "].iter().enumerate() {
        rows.push(row("A", POST_A, &format!("s{i}"), p, "2024-01-01 10:05:00"));
    }
    let mut json_null = row("A", POST_A, "s5", "", "2024-01-01 10:05:00");
    json_null.insert("parent_id".into(), serde_json::Value::Null);
    rows.push(json_null);

    let set = ThreadEngine::new().compute(&table(rows)).unwrap();
    assert!(set.rows.iter().all(|r| r.depth == 0 && r.sibling_count == 5));
    assert_eq!(set.summary.dangling_parents, 0);
}

/// Same ids in two posts are counted as collisions (or rejected with strict ids);
/// each post is still computed on its own.
#[test]
fn id_collisions_across_posts() {
    let t = table(vec![
        row("A", POST_A, "c1", "", "2024-01-01 10:05:00"),
        row("A", POST_A, "c2", "c1", "2024-01-01 10:06:00"),
        row("B", POST_B, "c1", "", "2024-02-15 12:10:00"),
    ]);
    let set = ThreadEngine::new().compute(&t).unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.summary.id_collisions, 1);
    assert_eq!(set.rows[2].sibling_count, 0, "B's c1 is alone in its post");
    assert_eq!(set.rows[0].sibling_count, 0);

    let err = ThreadEngine::new().strict_ids(true).compute(&t).unwrap_err();
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::IdCollision { id, .. }) => assert_eq!(id, "c1"),
        other => panic!("expected IdCollision, got {other:?}"),
    }
}

/// Numeric ids from a float-typed parent column still match integer ids.
#[test]
fn numeric_ids_line_up_across_dtypes() {
    let mut parent = row("A", POST_A, "", "", "2024-01-01 10:05:00");
    parent.insert("id".into(), serde_json::json!(17));
    let mut child = row("A", POST_A, "", "", "2024-01-01 10:06:00");
    child.insert("id".into(), serde_json::json!(18));
    child.insert("parent_id".into(), serde_json::json!(17.0));
    let mut grandchild = row("A", POST_A, "19", "18.0", "2024-01-01 10:07:00");
    grandchild.insert("id".into(), serde_json::json!("19"));

    let set = ThreadEngine::new().compute(&table(vec![parent, child, grandchild])).unwrap();
    let f = by_id(&set);
    assert_eq!(f["18"].root_id, "17");
    assert_eq!(f["19"].depth, 2);
}
