#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashMap;
use threadfeat::{FeatureRow, FeatureSet, Row, Table};

pub const POST_A: &str = "2024-01-01 10:00:00";
pub const POST_B: &str = "2024-02-15 12:00:00";

/// One comment row. `parent == ""` is the "no parent" sentinel;
/// `date` is written verbatim, so pass garbage to get an invalid timestamp.
pub fn row(company: &str, post: &str, id: &str, parent: &str, date: &str) -> Row {
    let mut r = Row::new();
    r.insert("company_name".into(), json!(company));
    r.insert("post_date".into(), json!(post));
    r.insert("id".into(), json!(id));
    r.insert("parent_id".into(), json!(parent));
    r.insert("comment_date".into(), json!(date));
    r.insert("comment_text".into(), json!(format!("text of {id}")));
    r
}

pub fn table(rows: Vec<Row>) -> Table {
    let mut t = Table::new(["company_name", "post_date", "id", "parent_id", "comment_date", "comment_text"]);
    for r in rows {
        t.push_row(r);
    }
    t
}

/// Two posts:
/// - "A": a1 (root) <- a2, a3; a3 <- a4; a5 (root); a6 replies to absent a99
/// - "B": b1 (root) <- b2; b3 replies to absent b4
pub fn two_post_fixture() -> Table {
    table(vec![
        row("A", POST_A, "a1", "", "2024-01-01 10:05:00"),
        row("A", POST_A, "a2", "a1", "2024-01-01 10:15:00"),
        row("A", POST_A, "a3", "a1", "2024-01-01 10:20:00"),
        row("A", POST_A, "a4", "a3", "2024-01-01 10:25:00"),
        row("A", POST_A, "a5", "", "2024-01-01 11:00:00"),
        row("B", POST_B, "b1", "", "2024-02-15 12:10:00"),
        row("B", POST_B, "b2", "b1", "2024-02-15 12:20:00"),
        row("B", POST_B, "b3", "b4", "2024-02-15 12:30:00"),
        row("A", POST_A, "a6", "a99", "2024-01-01 11:30:00"),
    ])
}

pub fn by_id(set: &FeatureSet) -> HashMap<String, FeatureRow> {
    set.rows.iter().map(|r| (r.id.clone(), r.clone())).collect()
}

pub fn secs(r: &FeatureRow) -> Option<u64> {
    r.time_since_root.map(|d| d.as_secs())
}

/// Deterministic pseudo-random comment table over several posts. Ids are unique
/// across the whole table and parents always point at earlier rows, so there are
/// no cycles. Mixes sentinel spellings, dangling and self parents, invalid
/// comment dates, out-of-order timestamps and a few rows with a bad post date.
pub fn generated_table(seed: u64, posts: usize) -> Table {
    let mut state = seed;
    let mut next = move |m: u64| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) % m
    };

    let mut rows = Vec::new();
    for p in 0..posts {
        let company = if p % 2 == 0 { "acme" } else { "globex" };
        let post = format!("2024-03-{:02} 09:{:02}:00", 1 + p % 28, p % 60);
        let n = 1 + next(40) as usize;
        for i in 0..n {
            let id = format!("p{p}-c{i}");
            let parent: Value = match next(10) {
                0 => json!(""),
                1 => json!("NaN"),
                2 => Value::Null,
                3 => json!(format!("p{p}-ghost{i}")),
                4 => json!(id.clone()),
                _ if i == 0 => json!(""),
                _ => json!(format!("p{p}-c{}", next(i as u64))),
            };
            let date = if next(13) == 0 {
                json!("not a date")
            } else {
                json!(format!("2024-03-{:02} {:02}:{:02}:{:02}", 1 + p % 28, 9 + next(10), next(60), next(60)))
            };
            let mut r = Row::new();
            r.insert("company_name".into(), json!(company));
            r.insert("post_date".into(), json!(if next(50) == 0 { "someday".to_string() } else { post.clone() }));
            r.insert("id".into(), json!(id));
            r.insert("parent_id".into(), parent);
            r.insert("comment_date".into(), date);
            rows.push(r);
        }
    }
    Table::from_rows(rows)
}
