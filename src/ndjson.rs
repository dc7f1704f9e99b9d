use crate::table::Row;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::{self, BufRead, Write};

/// Minimal NDJSON reader with empty-line skipping.
pub struct NdjsonReader<R: BufRead> {
    rdr: R,
}

impl<R: BufRead> NdjsonReader<R> {
    pub fn new(rdr: R) -> Self {
        Self { rdr }
    }

    /// Read the next line into `buf`. Returns the number of bytes read (0 on EOF).
    /// Strips trailing `\r?\n`.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n == 0 { return Ok(0); }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') { buf.pop(); }
        }
        Ok(n)
    }

    /// Parse every non-blank line as a JSON object.
    pub fn read_rows(mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut line = String::new();
        let mut lineno = 0usize;
        while self.read_line(&mut line)? > 0 {
            lineno += 1;
            if line.trim().is_empty() { continue; }
            match serde_json::from_str::<Value>(&line).with_context(|| format!("line {lineno}"))? {
                Value::Object(m) => rows.push(m),
                other => bail!("line {lineno}: expected a JSON object, found {}", kind(&other)),
            }
        }
        Ok(rows)
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Writes one JSON object per line, keys in the given column order.
pub struct NdjsonWriter<W: Write> {
    w: W,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn write_row(&mut self, columns: &[String], row: &Row) -> Result<()> {
        write_object(&mut self.w, columns, row)?;
        self.w.write_all(b"\n")?;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.w.flush()?;
        Ok(self.w)
    }
}

/// Serialize `row` as a JSON object with keys in `columns` order; absent cells are null.
pub fn write_object<W: Write + ?Sized>(w: &mut W, columns: &[String], row: &Row) -> Result<()> {
    w.write_all(b"{")?;
    for (i, c) in columns.iter().enumerate() {
        if i > 0 { w.write_all(b",")?; }
        serde_json::to_writer(&mut *w, c)?;
        w.write_all(b":")?;
        serde_json::to_writer(&mut *w, row.get(c).unwrap_or(&Value::Null))?;
    }
    w.write_all(b"}")?;
    Ok(())
}
