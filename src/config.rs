use crate::key_extractor::GroupKeyExtractor;
use crate::record::default_parent_sentinels;

/// How `time_since_root` is rendered when features go back into a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DurationFormat {
    /// Whole seconds as an integer.
    #[default]
    Seconds,
    /// `"0 days 00:10:00"`.
    Human,
}

/// Engine options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub parallelism: Option<usize>,     // Some(N) runs groups on a dedicated N-thread pool
    pub progress: bool,
    pub progress_label: Option<String>,
    pub group_key: GroupKeyExtractor,
    pub parent_sentinels: Vec<String>,  // compared case-insensitively, trimmed
    pub strict_ids: bool,               // cross-group id collisions are fatal
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallelism: None,
            progress: false,
            progress_label: None,
            group_key: GroupKeyExtractor::default(),
            parent_sentinels: default_parent_sentinels(),
            strict_ids: false,
        }
    }
}

impl EngineOptions {
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads.max(1));
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_group_key(mut self, key: GroupKeyExtractor) -> Self {
        self.group_key = key;
        self
    }
    pub fn with_parent_sentinels<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut v: Vec<String> = values.into_iter().map(|s| s.into().trim().to_lowercase()).collect();
        v.sort();
        v.dedup();
        self.parent_sentinels = v;
        self
    }
    pub fn with_strict_ids(mut self, yes: bool) -> Self {
        self.strict_ids = yes;
        self
    }
}
