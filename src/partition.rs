use crate::key_extractor::GroupKeyExtractor;
use crate::record::{comment_from_row, Comment};
use crate::summary::RunSummary;
use crate::table::Table;
use ahash::AHashMap;

/// One originating post and its comments, in input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostGroup {
    pub key: String,
    pub comments: Vec<Comment>,
}

/// Result of partitioning: groups in first-seen key order plus row-level counters
/// (`rows_in`, `groups`, `excluded_bad_group_key`, `missing_ids`).
pub struct Partitioned {
    pub groups: Vec<PostGroup>,
    pub summary: RunSummary,
}

/// Split the comment table into independent post groups.
/// Rows whose key cannot be derived are counted and skipped; nothing here is fatal.
pub fn partition_posts(table: &Table, key: &GroupKeyExtractor, sentinels: &[String]) -> Partitioned {
    let mut summary = RunSummary { rows_in: table.len() as u64, ..Default::default() };
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut groups: Vec<PostGroup> = Vec::new();

    for (row, fields) in table.rows.iter().enumerate() {
        let Some(k) = key.key(fields) else {
            summary.excluded_bad_group_key += 1;
            continue;
        };
        let parsed = comment_from_row(row, fields, sentinels);
        if parsed.missing_id {
            summary.missing_ids += 1;
        }
        let slot = match index.get(&k) {
            Some(&i) => i,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(PostGroup { key: k, comments: Vec::new() });
                groups.len() - 1
            }
        };
        groups[slot].comments.push(parsed.comment);
    }

    if summary.excluded_bad_group_key > 0 {
        tracing::warn!(
            "{} row(s) have no usable group key (unparseable post date) and were excluded",
            summary.excluded_bad_group_key
        );
    }
    summary.groups = groups.len() as u64;
    Partitioned { groups, summary }
}
