//! Typed comment and feature records, plus the cell-level conversions that turn
//! loosely typed table values into them.

use crate::date::timestamp_from_value;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use time::OffsetDateTime;

pub const COL_ID: &str = "id";
pub const COL_PARENT_ID: &str = "parent_id";
pub const COL_COMMENT_DATE: &str = "comment_date";
pub const COL_COMPANY: &str = "company_name";
pub const COL_POST_DATE: &str = "post_date";

/// Output columns, in output order.
pub const FEATURE_COLUMNS: [&str; 5] = ["id", "root_id", "depth", "sibling_count", "time_since_root"];

/// One input comment, reduced to what the tree computation needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    /// Position of the source row in the input table.
    pub row: usize,
    pub id: String,
    pub parent_id: Option<String>,
    pub comment_date: Option<OffsetDateTime>,
}

impl Comment {
    pub fn new(row: usize, id: impl Into<String>, parent_id: Option<&str>, comment_date: Option<OffsetDateTime>) -> Self {
        Self { row, id: id.into(), parent_id: parent_id.map(str::to_string), comment_date }
    }
}

/// Per-comment structural features.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeatureRow {
    #[serde(skip)]
    pub row: usize,
    pub id: String,
    pub root_id: String,
    pub depth: u32,
    pub sibling_count: u32,
    /// `None` when either this comment's or its root's timestamp is invalid.
    #[serde(serialize_with = "ser_secs")]
    pub time_since_root: Option<Duration>,
}

fn ser_secs<S: serde::Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_u64(d.as_secs()),
        None => s.serialize_none(),
    }
}

/// Parent sentinel values, compared case-insensitively after trimming.
pub fn default_parent_sentinels() -> Vec<String> {
    ["", "nan", "none", "null"].iter().map(|s| s.to_string()).collect()
}

/// Canonical text for an identifier cell. Integral numbers (and strings such as
/// `"12.0"` that a float-typed column produces) render without the fraction so
/// `id` and `parent_id` columns of different dtypes still line up.
pub fn id_from_value(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(strip_integral_fraction(s).unwrap_or_else(|| s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
                    Some((f as i64).to_string())
                } else {
                    Some(n.to_string())
                }
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn strip_integral_fraction(s: &str) -> Option<String> {
    let (int, frac) = s.split_once('.')?;
    let digits = int.strip_prefix('-').unwrap_or(int);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac.is_empty() || !frac.bytes().all(|b| b == b'0') {
        return None;
    }
    Some(int.to_string())
}

/// Read `parent_id`, mapping every sentinel to `None`.
pub fn parent_from_value(v: Option<&Value>, sentinels: &[String]) -> Option<String> {
    let id = id_from_value(v?)?;
    let t = id.trim();
    if sentinels.iter().any(|s| s.eq_ignore_ascii_case(t)) {
        return None;
    }
    Some(id)
}

/// Outcome of reading one row into a [`Comment`]; flags feed the run summary.
pub struct ParsedComment {
    pub comment: Comment,
    pub missing_id: bool,
}

pub fn comment_from_row(row: usize, fields: &Map<String, Value>, sentinels: &[String]) -> ParsedComment {
    let id = fields.get(COL_ID).and_then(id_from_value);
    let missing_id = id.is_none();
    ParsedComment {
        comment: Comment {
            row,
            id: id.unwrap_or_default(),
            parent_id: parent_from_value(fields.get(COL_PARENT_ID), sentinels),
            comment_date: fields.get(COL_COMMENT_DATE).and_then(timestamp_from_value),
        },
        missing_id,
    }
}
