mod config;
mod date;
mod error;
mod record;
mod table;
mod key_extractor;

mod partition;
mod tree;
mod propagate;
mod siblings;
mod merge;
mod summary;
mod pipeline;

mod concurrency;
mod progress;
mod util;
mod ndjson;
mod table_io;

pub use crate::config::{DurationFormat, EngineOptions};
pub use crate::error::EngineError;
pub use crate::pipeline::{group_features, ThreadEngine};
pub use crate::summary::RunSummary;

pub use crate::record::{Comment, FeatureRow, FEATURE_COLUMNS};
pub use crate::table::{Row, Table};
pub use crate::key_extractor::GroupKeyExtractor;

// Stage-level access: partition, tree, propagation, siblings, merge.
pub use crate::partition::{partition_posts, Partitioned, PostGroup};
pub use crate::tree::{classify_parent, ConversationTree, ParentLink};
pub use crate::propagate::{propagate, Placement};
pub use crate::siblings::count_siblings;
pub use crate::merge::{merge_groups, FeatureSet, GroupFeatures};

// Timestamp helpers shared with callers that build `Comment`s directly.
pub use crate::date::{elapsed_floor, format_duration_human, format_second, parse_timestamp};

// File collaborators.
pub use crate::table_io::{read_table, read_table_file, write_table, FileSpec, TableFormat};
pub use crate::ndjson::{NdjsonReader, NdjsonWriter};

pub use crate::util::init_tracing_once;
