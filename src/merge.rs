//! Fan-in: concatenate per-group feature rows into one feature set, and join
//! that set back onto the original comment table.

use crate::config::DurationFormat;
use crate::date::format_duration_human;
use crate::error::EngineError;
use crate::record::{id_from_value, FeatureRow, COL_ID, FEATURE_COLUMNS};
use crate::summary::RunSummary;
use crate::table::{Row, Table};
use ahash::AHashMap;
use serde_json::{json, Value};
use std::time::Duration;

/// Feature rows for one post group.
pub struct GroupFeatures {
    pub key: String,
    pub rows: Vec<FeatureRow>,
    pub summary: RunSummary,
}

/// All feature rows of a run, ordered by source row, plus the run summary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSet {
    pub rows: Vec<FeatureRow>,
    pub summary: RunSummary,
}

/// Concatenate group results. An id that shows up in two different groups is
/// counted as a collision; with `strict` the first one aborts the merge.
/// Duplicates inside a single group were already counted by the tree builder.
pub fn merge_groups(parts: Vec<GroupFeatures>, strict: bool) -> Result<FeatureSet, EngineError> {
    let total: usize = parts.iter().map(|p| p.rows.len()).sum();
    let mut owner: AHashMap<String, usize> = AHashMap::with_capacity(total);
    let mut summary = RunSummary::default();
    let mut rows = Vec::with_capacity(total);

    for (g, part) in parts.iter().enumerate() {
        for r in &part.rows {
            match owner.get(&r.id) {
                Some(&first) if first != g => {
                    if strict {
                        return Err(EngineError::IdCollision {
                            id: r.id.clone(),
                            first: parts[first].key.clone(),
                            second: part.key.clone(),
                        });
                    }
                    summary.id_collisions += 1;
                    tracing::warn!("comment id {:?} appears in posts {} and {}", r.id, parts[first].key, part.key);
                }
                Some(_) => {}
                None => {
                    owner.insert(r.id.clone(), g);
                }
            }
        }
    }

    for part in parts {
        summary.merge(&part.summary);
        rows.extend(part.rows);
    }
    rows.sort_by_key(|r| r.row);
    summary.rows_out = rows.len() as u64;
    Ok(FeatureSet { rows, summary })
}

pub fn duration_value(d: Option<Duration>, fmt: DurationFormat) -> Value {
    match (d, fmt) {
        (None, _) => Value::Null,
        (Some(d), DurationFormat::Seconds) => json!(d.as_secs()),
        (Some(d), DurationFormat::Human) => Value::String(format_duration_human(d)),
    }
}

fn feature_cells(f: &FeatureRow, fmt: DurationFormat) -> [(&'static str, Value); 4] {
    [
        ("root_id", Value::String(f.root_id.clone())),
        ("depth", json!(f.depth)),
        ("sibling_count", json!(f.sibling_count)),
        ("time_since_root", duration_value(f.time_since_root, fmt)),
    ]
}

impl FeatureSet {
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn get(&self, id: &str) -> Option<&FeatureRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// The five feature columns, one row per feature row. Empty input still
    /// yields the full column list.
    pub fn to_table(&self, fmt: DurationFormat) -> Table {
        let mut t = Table::new(FEATURE_COLUMNS);
        for f in &self.rows {
            let mut row = Row::new();
            row.insert(COL_ID.to_string(), Value::String(f.id.clone()));
            for (k, v) in feature_cells(f, fmt) {
                row.insert(k.to_string(), v);
            }
            t.rows.push(row);
        }
        t
    }

    /// Left join onto `original` (the table these features were computed from).
    /// Original columns are kept, existing feature columns are replaced, and
    /// rows without features (excluded for a bad group key) get nulls.
    ///
    /// Rows are matched by source position when the ids agree, otherwise by
    /// `id` among ids that are unique in this feature set.
    pub fn join_onto(&self, original: &Table, fmt: DurationFormat) -> Table {
        let feature_cols = &FEATURE_COLUMNS[1..];
        let mut by_pos: Vec<Option<&FeatureRow>> = vec![None; original.len()];
        for f in &self.rows {
            if let Some(slot) = by_pos.get_mut(f.row) {
                *slot = Some(f);
            }
        }
        let mut by_id: AHashMap<&str, Option<&FeatureRow>> = AHashMap::with_capacity(self.rows.len());
        for f in &self.rows {
            by_id
                .entry(f.id.as_str())
                .and_modify(|e| *e = None)
                .or_insert(Some(f));
        }

        let mut columns: Vec<String> = original
            .columns
            .iter()
            .filter(|c| !feature_cols.contains(&c.as_str()))
            .cloned()
            .collect();
        columns.extend(feature_cols.iter().map(|c| c.to_string()));

        let mut out = Table { columns, rows: Vec::with_capacity(original.len()) };
        for (pos, src) in original.rows.iter().enumerate() {
            let id = src.get(COL_ID).and_then(id_from_value).unwrap_or_default();
            let hit = by_pos[pos]
                .filter(|f| f.id == id)
                .or_else(|| by_id.get(id.as_str()).copied().flatten());

            let mut row = src.clone();
            for c in feature_cols {
                row.remove(*c);
            }
            match hit {
                Some(f) => {
                    for (k, v) in feature_cells(f, fmt) {
                        row.insert(k.to_string(), v);
                    }
                }
                None => {
                    for c in feature_cols {
                        row.insert(c.to_string(), Value::Null);
                    }
                }
            }
            out.rows.push(row);
        }
        out
    }
}
