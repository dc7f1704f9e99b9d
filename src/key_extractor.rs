use crate::date::{format_second, timestamp_from_value};
use crate::record::{id_from_value, COL_COMPANY, COL_POST_DATE};
use crate::table::Row;
use std::fmt;
use std::sync::Arc;

/// Derives the post-group key for a row. Rows without a key cannot be
/// placed in any post group and are excluded from feature computation.
///
/// Variants:
///  - `CompanyPost`: `"{company_name}__{post_date to the second}"` (default)
///  - `Column(name)`: the raw text of one column, e.g. a canonical post id
///  - `ByRow(f)`: caller-supplied closure
#[derive(Clone)]
pub enum GroupKeyExtractor {
    CompanyPost,
    Column(String),
    ByRow(Arc<dyn Fn(&Row) -> Option<String> + Send + Sync>),
}

impl Default for GroupKeyExtractor {
    fn default() -> Self { Self::CompanyPost }
}

impl fmt::Debug for GroupKeyExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompanyPost => f.write_str("CompanyPost"),
            Self::Column(c) => f.debug_tuple("Column").field(c).finish(),
            Self::ByRow(_) => f.write_str("ByRow(..)"),
        }
    }
}

impl GroupKeyExtractor {
    pub fn company_post() -> Self { Self::CompanyPost }
    pub fn column(name: impl Into<String>) -> Self { Self::Column(name.into()) }
    pub fn by_row(f: impl Fn(&Row) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::ByRow(Arc::new(f))
    }

    /// Columns this extractor reads; validated up front with the core columns.
    /// A custom closure declares nothing.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            Self::CompanyPost => vec![COL_COMPANY, COL_POST_DATE],
            Self::Column(c) => vec![c.as_str()],
            Self::ByRow(_) => Vec::new(),
        }
    }

    pub fn key(&self, row: &Row) -> Option<String> {
        match self {
            Self::CompanyPost => {
                let post = row.get(COL_POST_DATE).and_then(timestamp_from_value)?;
                let company = row.get(COL_COMPANY).and_then(id_from_value).unwrap_or_default();
                Some(format!("{}__{}", company, format_second(post)))
            }
            Self::Column(c) => row
                .get(c)
                .and_then(id_from_value)
                .filter(|s| !s.trim().is_empty()),
            Self::ByRow(f) => f(row),
        }
    }
}
