//! File collaborators around the engine: load a comment table from CSV/JSON/NDJSON
//! (optionally `.zst`), or from a directory of such exports, and write tables back.

use crate::ndjson::{write_object, NdjsonReader, NdjsonWriter};
use crate::table::{Row, Table};
use crate::util::{create_with_backoff, open_with_backoff, replace_file_atomic_backoff, staging_path};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const READ_BUF: usize = 256 * 1024;
const WRITE_BUF: usize = 256 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
    Ndjson,
}

/// Format plus whether the file is zstd-compressed, from the file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileSpec {
    pub format: TableFormat,
    pub zst: bool,
}

impl FileSpec {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let (stem, zst) = match name.strip_suffix(".zst") {
            Some(s) => (s.to_string(), true),
            None => (name, false),
        };
        let format = match stem.rsplit_once('.')?.1 {
            "csv" => TableFormat::Csv,
            "json" => TableFormat::Json,
            "jsonl" | "ndjson" => TableFormat::Ndjson,
            _ => return None,
        };
        Some(Self { format, zst })
    }
}

fn spec_or_err(path: &Path) -> Result<FileSpec> {
    FileSpec::from_path(path).ok_or_else(|| {
        anyhow!("{}: unsupported file type (expected .csv, .json, .jsonl or .ndjson, optionally .zst; .parquet is not supported)", path.display())
    })
}

/// Load a table from a file, or from every supported file beneath a directory
/// (sorted by path, concatenated with the union of their columns).
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.is_dir() {
        return read_table_file(path);
    }
    let files = discover_tables(path);
    if files.is_empty() {
        tracing::warn!("No supported comment exports found under {}", path.display());
    } else {
        tracing::info!("Reading {} export(s) under {}", files.len(), path.display());
    }
    let mut table = Table::default();
    for f in files {
        table.concat(read_table_file(&f)?);
    }
    Ok(table)
}

fn discover_tables(dir: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.into_path())
        .filter(|p| FileSpec::from_path(p).is_some())
        .collect();
    out.sort();
    out
}

pub fn read_table_file(path: &Path) -> Result<Table> {
    let spec = spec_or_err(path)?;
    let f = open_with_backoff(path).with_context(|| format!("open {}", path.display()))?;
    let rdr: Box<dyn BufRead> = if spec.zst {
        let dec = zstd::stream::read::Decoder::new(f).with_context(|| format!("zstd {}", path.display()))?;
        Box::new(BufReader::with_capacity(READ_BUF, dec))
    } else {
        Box::new(BufReader::with_capacity(READ_BUF, f))
    };
    let table = match spec.format {
        TableFormat::Csv => read_csv(rdr),
        TableFormat::Json => read_json(rdr),
        TableFormat::Ndjson => NdjsonReader::new(rdr).read_rows().map(Table::from_rows),
    }
    .with_context(|| format!("read {}", path.display()))?;
    tracing::debug!("{}: {} rows, {} columns", path.display(), table.len(), table.columns.len());
    Ok(table)
}

/// CSV with a header row. Empty cells read as null.
pub fn read_csv<R: Read>(rdr: R) -> Result<Table> {
    let mut csv_rdr = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers: Vec<String> = csv_rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut table = Table::new(headers.iter().cloned());
    for rec in csv_rdr.records() {
        let rec = rec?;
        let mut row = Row::new();
        for (h, cell) in headers.iter().zip(rec.iter()) {
            let v = if cell.is_empty() { Value::Null } else { Value::String(cell.to_string()) };
            row.insert(h.clone(), v);
        }
        table.rows.push(row);
    }
    Ok(table)
}

/// A JSON array of objects; falls back to one object per line.
pub fn read_json<R: Read>(mut rdr: R) -> Result<Table> {
    let mut content = String::new();
    rdr.read_to_string(&mut content)?;
    if content.trim().is_empty() {
        return Ok(Table::default());
    }
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(items)) => {
            let mut rows = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(m) => rows.push(m),
                    _ => bail!("element {i} is not a JSON object"),
                }
            }
            Ok(Table::from_rows(rows))
        }
        Ok(Value::Object(m)) => Ok(Table::from_rows(vec![m])),
        Ok(_) => bail!("expected a JSON array of objects"),
        Err(e) => NdjsonReader::new(content.as_bytes())
            .read_rows()
            .map(Table::from_rows)
            .map_err(|_| anyhow!(e).context("not a JSON array and not one object per line")),
    }
}

/// Write `table` to `path` (format from the extension). The file is written to a
/// staging sibling and promoted once complete.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let spec = spec_or_err(path)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = staging_path(path);
    {
        let f = create_with_backoff(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        let mut w = BufWriter::with_capacity(WRITE_BUF, f);
        if spec.zst {
            let mut enc = zstd::stream::write::Encoder::new(&mut w, 3)?;
            write_body(table, spec.format, &mut enc)?;
            enc.finish()?;
        } else {
            write_body(table, spec.format, &mut w)?;
        }
        w.flush().with_context(|| format!("flush {}", tmp.display()))?;
    }
    replace_file_atomic_backoff(&tmp, path)?;
    tracing::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn write_body<W: Write>(table: &Table, format: TableFormat, w: &mut W) -> Result<()> {
    match format {
        TableFormat::Csv => {
            let mut cw = csv::Writer::from_writer(w);
            cw.write_record(&table.columns)?;
            for row in &table.rows {
                cw.write_record(table.columns.iter().map(|c| cell_text(row.get(c))))?;
            }
            cw.flush()?;
        }
        TableFormat::Json => {
            w.write_all(b"[")?;
            for (i, row) in table.rows.iter().enumerate() {
                w.write_all(if i == 0 { b"\n" } else { b",\n" })?;
                write_object(w, &table.columns, row)?;
            }
            w.write_all(b"\n]\n")?;
        }
        TableFormat::Ndjson => {
            let mut nw = NdjsonWriter::new(w);
            for row in &table.rows {
                nw.write_row(&table.columns, row)?;
            }
            nw.finish()?;
        }
    }
    Ok(())
}

fn cell_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
