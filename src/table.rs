//! In-memory tabular exchange format: named columns, rows of JSON values.

use serde_json::{Map, Value};

pub type Row = Map<String, Value>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    /// Columns are taken in first-seen order across all rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut t = Self::default();
        for r in &rows {
            t.register_columns(r);
        }
        t.rows = rows;
        t
    }

    fn register_columns(&mut self, row: &Row) {
        for k in row.keys() {
            if !self.has_column(k) {
                self.columns.push(k.clone());
            }
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.register_columns(&row);
        self.rows.push(row);
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Required columns absent from this table, in the order given.
    pub fn missing_columns<'a, I>(&self, required: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        for c in required {
            if !self.has_column(c) && !missing.iter().any(|m| m == c) {
                missing.push(c.to_string());
            }
        }
        missing
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append `other` below `self`; columns become the union, `self`'s first.
    pub fn concat(&mut self, other: Table) {
        for c in other.columns {
            if !self.has_column(&c) {
                self.columns.push(c);
            }
        }
        self.rows.extend(other.rows);
    }
}
