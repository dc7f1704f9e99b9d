use crate::config::EngineOptions;
use crate::error::EngineError;
use crate::key_extractor::GroupKeyExtractor;
use crate::merge::{merge_groups, FeatureSet, GroupFeatures};
use crate::partition::{partition_posts, PostGroup};
use crate::progress::ProgressScope;
use crate::propagate::propagate;
use crate::record::{FeatureRow, COL_COMMENT_DATE, COL_ID, COL_PARENT_ID};
use crate::siblings::count_siblings;
use crate::table::Table;
use crate::tree::ConversationTree;
use crate::util::init_tracing_once;
use anyhow::Result;

/// Thread feature engine: partition → (tree → propagate → siblings) per post → merge.
#[derive(Clone, Debug, Default)]
pub struct ThreadEngine {
    pub(crate) opts: EngineOptions,
}

impl ThreadEngine {
    pub fn new() -> Self {
        Self { opts: EngineOptions::default() }
    }

    pub fn with_options(opts: EngineOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn group_key(mut self, key: GroupKeyExtractor) -> Self { self.opts = self.opts.with_group_key(key); self }
    pub fn parent_sentinels<I, S>(mut self, values: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_parent_sentinels(values); self }
    pub fn strict_ids(mut self, yes: bool) -> Self { self.opts = self.opts.with_strict_ids(yes); self }

    /// Every column the run reads: the core three plus the group-key sources.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut cols = vec![COL_ID, COL_PARENT_ID, COL_COMMENT_DATE];
        cols.extend(self.opts.group_key.required_columns());
        cols
    }

    /// Fail fast when required columns are absent; nothing is computed.
    pub fn validate_schema(&self, table: &Table) -> Result<(), EngineError> {
        let missing = table.missing_columns(self.required_columns());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::MissingColumns(missing))
        }
    }

    /// Compute one feature row per comment that has a group key.
    pub fn compute(&self, table: &Table) -> Result<FeatureSet> {
        init_tracing_once();
        self.validate_schema(table)?;

        let parts = partition_posts(table, &self.opts.group_key, &self.opts.parent_sentinels);
        tracing::info!("Partitioned {} rows into {} post group(s).", table.len(), parts.groups.len());

        let mut set = self.run_groups(&parts.groups)?;
        set.summary.merge(&parts.summary);
        set.summary.log();
        Ok(set)
    }

    /// Core computation over already partitioned groups. Groups are independent
    /// and run in parallel; results do not depend on processing order.
    pub fn compute_comments(&self, groups: &[PostGroup]) -> Result<FeatureSet> {
        init_tracing_once();
        let mut set = self.run_groups(groups)?;
        set.summary.rows_in = groups.iter().map(|g| g.comments.len() as u64).sum();
        set.summary.groups = groups.len() as u64;
        set.summary.log();
        Ok(set)
    }

    fn run_groups(&self, groups: &[PostGroup]) -> Result<FeatureSet> {
        let label = self.opts.progress_label.as_deref().unwrap_or("Thread features");
        let progress = ProgressScope::count(self.opts.progress, label, groups.len() as u64);

        let parts = crate::concurrency::map_limited(groups, self.opts.parallelism, |g| {
            let out = group_features(g);
            progress.inc_items(1);
            out
        })?;
        progress.finish("done");

        Ok(merge_groups(parts, self.opts.strict_ids)?)
    }
}

/// Build, propagate and count siblings for one post group.
pub fn group_features(group: &PostGroup) -> GroupFeatures {
    tracing::debug!("Processing post {} with {} comments", group.key, group.comments.len());

    let mut tree = ConversationTree::build(&group.key, &group.comments);
    let placements = propagate(&mut tree, &group.key);
    let siblings = count_siblings(&tree);

    let mut summary = tree.stats.clone();
    summary.invalid_comment_dates = group.comments.iter().filter(|c| c.comment_date.is_none()).count() as u64;
    let rows: Vec<FeatureRow> = placements
        .iter()
        .zip(siblings)
        .enumerate()
        .map(|(node, (p, sibling_count))| {
            summary.max_depth = summary.max_depth.max(p.depth);
            let c = tree.comment(node);
            FeatureRow {
                row: c.row,
                id: c.id.clone(),
                root_id: tree.id(p.root).to_string(),
                depth: p.depth,
                sibling_count,
                time_since_root: p.time_since_root,
            }
        })
        .collect();

    GroupFeatures { key: group.key.clone(), rows, summary }
}
