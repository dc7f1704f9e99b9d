//! Data-quality counters for a run. Per-group counters are produced
//! independently and merged, the same way partial aggregates are.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub rows_in: u64,
    pub rows_out: u64,
    pub groups: u64,
    /// Rows dropped because no group key could be derived (bad post date).
    pub excluded_bad_group_key: u64,
    pub invalid_comment_dates: u64,
    pub missing_ids: u64,
    pub dangling_parents: u64,
    pub self_parents: u64,
    pub duplicate_ids: u64,
    pub cycle_breaks: u64,
    pub id_collisions: u64,
    pub max_depth: u32,
}

impl RunSummary {
    pub fn merge(&mut self, other: &RunSummary) {
        self.rows_in += other.rows_in;
        self.rows_out += other.rows_out;
        self.groups += other.groups;
        self.excluded_bad_group_key += other.excluded_bad_group_key;
        self.invalid_comment_dates += other.invalid_comment_dates;
        self.missing_ids += other.missing_ids;
        self.dangling_parents += other.dangling_parents;
        self.self_parents += other.self_parents;
        self.duplicate_ids += other.duplicate_ids;
        self.cycle_breaks += other.cycle_breaks;
        self.id_collisions += other.id_collisions;
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    /// Total of all recoverable anomalies.
    pub fn anomalies(&self) -> u64 {
        self.excluded_bad_group_key
            + self.invalid_comment_dates
            + self.missing_ids
            + self.dangling_parents
            + self.self_parents
            + self.duplicate_ids
            + self.cycle_breaks
            + self.id_collisions
    }

    pub fn log(&self) {
        tracing::info!(
            rows_in = self.rows_in,
            rows_out = self.rows_out,
            groups = self.groups,
            max_depth = self.max_depth,
            "thread features computed"
        );
        if self.anomalies() == 0 {
            return;
        }
        tracing::warn!(
            excluded_bad_group_key = self.excluded_bad_group_key,
            invalid_comment_dates = self.invalid_comment_dates,
            missing_ids = self.missing_ids,
            dangling_parents = self.dangling_parents,
            self_parents = self.self_parents,
            duplicate_ids = self.duplicate_ids,
            cycle_breaks = self.cycle_breaks,
            id_collisions = self.id_collisions,
            "data-quality anomalies"
        );
    }
}
