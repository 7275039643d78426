//! Sign-in sheet loading.
//!
//! Sheets arrive as CSV exports or JSON row dumps. Each row becomes an
//! [`AttendanceRow`]: the `聚會名稱` column names the gathering, the
//! `來源檔案` column (or the file stem when absent) labels the source, and
//! every other column is a role cell.

use crate::analyzers::types::AttendanceRow;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Column holding the gathering's display name.
pub const GATHERING_COLUMN: &str = "聚會名稱";

/// Column holding the source label the month is inferred from.
pub const SOURCE_COLUMN: &str = "來源檔案";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{source_label}: row {row}, column '{column}': cannot read {kind} as text")]
    Uncoercible {
        source_label: String,
        row: usize,
        column: String,
        kind: &'static str,
    },
}

/// Parses CSV rows. `default_source` labels rows without a `來源檔案` value.
pub fn parse_csv<R: Read>(reader: R, default_source: &str) -> Result<Vec<AttendanceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("Failed to read CSV record")?;
        let mut row = AttendanceRow::new("", default_source);

        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).filter(|v| !v.is_empty());
            match header.as_str() {
                GATHERING_COLUMN => row.gathering_name = value.unwrap_or_default().to_string(),
                SOURCE_COLUMN => {
                    if let Some(source) = value {
                        row.source_label = source.to_string();
                    }
                }
                _ => row.role_cells.push((header.clone(), value.map(str::to_string))),
            }
        }

        rows.push(row);
    }

    Ok(rows)
}

/// Parses a JSON array of row objects.
///
/// `null` is an empty cell, numbers and booleans are read as their text, and
/// arrays or objects fail with [`InputError::Uncoercible`].
pub fn parse_json(content: &str, default_source: &str) -> Result<Vec<AttendanceRow>> {
    let value: Value = serde_json::from_str(content).context("Invalid JSON")?;
    let Value::Array(items) = value else {
        bail!("expected a JSON array of row objects");
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::Object(fields) = item else {
            bail!("row {}: expected a JSON object", index + 1);
        };

        let mut row = AttendanceRow::new("", default_source);
        for (column, cell) in fields {
            let value = cell_text(cell).map_err(|kind| InputError::Uncoercible {
                source_label: default_source.to_string(),
                row: index + 1,
                column: column.clone(),
                kind,
            })?;

            match column.as_str() {
                GATHERING_COLUMN => row.gathering_name = value.unwrap_or_default(),
                SOURCE_COLUMN => {
                    if let Some(source) = value {
                        row.source_label = source;
                    }
                }
                _ => row.role_cells.push((column.clone(), value)),
            }
        }

        rows.push(row);
    }

    Ok(rows)
}

fn cell_text(cell: &Value) -> std::result::Result<Option<String>, &'static str> {
    match cell {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) => Err("array"),
        Value::Object(_) => Err("object"),
    }
}

/// Loads one sheet, picking the format from the file extension.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_rows(path: &Path) -> Result<Vec<AttendanceRow>> {
    let source = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let rows = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_json(&content, source)
        }
        Some("csv") => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            parse_csv(file, source)
        }
        other => bail!(
            "unsupported sheet format {:?} for {}",
            other.unwrap_or(""),
            path.display()
        ),
    }
    .with_context(|| format!("Failed to load {}", path.display()))?;

    debug!(rows = rows.len(), "Sheet loaded");
    Ok(rows)
}

/// Loads and concatenates several sheets in the order given.
pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<AttendanceRow>> {
    let mut rows = Vec::new();
    for path in paths {
        rows.extend(load_rows(path.as_ref())?);
    }
    info!(files = paths.len(), rows = rows.len(), "Sign-in sheets loaded");
    Ok(rows)
}
