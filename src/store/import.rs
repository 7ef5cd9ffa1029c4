//! CSV import into the dataset tables.
//!
//! Rows are read positionally (the dataset headers use CamelCase names that
//! do not match the columns) and deserialized into per-table row structs.
//! Every field is optional: an empty string becomes NULL, including in
//! numeric columns, while a non-empty field that fails to parse is a
//! [`OidError::CsvField`] error.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::schema::{
    insert_sql, BBOXES_COLUMNS, CLASSES_COLUMNS, IMAGES_COLUMNS, LABELS_COLUMNS,
};
use crate::config::Table;
use crate::error::OidError;

// ============================================================================
// Row types (internal to this module)
// ============================================================================

trait CsvRow: DeserializeOwned {
    fn into_values(self) -> Vec<Value>;
}

#[derive(Debug, Deserialize)]
struct ClassRow {
    label_name: Option<String>,
    class_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BboxRow {
    image_id: Option<String>,
    source: Option<String>,
    label_name: Option<String>,
    confidence: Option<f64>,
    x_min: Option<f64>,
    x_max: Option<f64>,
    y_min: Option<f64>,
    y_max: Option<f64>,
    is_occluded: Option<i64>,
    is_truncated: Option<i64>,
    is_group_of: Option<i64>,
    is_depiction: Option<i64>,
    is_inside: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LabelRow {
    image_id: Option<String>,
    source: Option<String>,
    label_name: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ImageRow {
    image_id: Option<String>,
    subset: Option<String>,
    original_url: Option<String>,
    original_landing_url: Option<String>,
    license: Option<String>,
    author_profile_url: Option<String>,
    author: Option<String>,
    title: Option<String>,
    original_size: Option<i64>,
    original_md5: Option<String>,
    thumbnail_300k_url: Option<String>,
    rotation: Option<f64>,
}

fn text(v: Option<String>) -> Value {
    v.map(Value::Text).unwrap_or(Value::Null)
}

fn real(v: Option<f64>) -> Value {
    v.map(Value::Real).unwrap_or(Value::Null)
}

fn int(v: Option<i64>) -> Value {
    v.map(Value::Integer).unwrap_or(Value::Null)
}

impl CsvRow for ClassRow {
    fn into_values(self) -> Vec<Value> {
        vec![text(self.label_name), text(self.class_name)]
    }
}

impl CsvRow for BboxRow {
    fn into_values(self) -> Vec<Value> {
        vec![
            text(self.image_id),
            text(self.source),
            text(self.label_name),
            real(self.confidence),
            real(self.x_min),
            real(self.x_max),
            real(self.y_min),
            real(self.y_max),
            int(self.is_occluded),
            int(self.is_truncated),
            int(self.is_group_of),
            int(self.is_depiction),
            int(self.is_inside),
        ]
    }
}

impl CsvRow for LabelRow {
    fn into_values(self) -> Vec<Value> {
        vec![
            text(self.image_id),
            text(self.source),
            text(self.label_name),
            real(self.confidence),
        ]
    }
}

impl CsvRow for ImageRow {
    fn into_values(self) -> Vec<Value> {
        vec![
            text(self.image_id),
            text(self.subset),
            text(self.original_url),
            text(self.original_landing_url),
            text(self.license),
            text(self.author_profile_url),
            text(self.author),
            text(self.title),
            int(self.original_size),
            text(self.original_md5),
            text(self.thumbnail_300k_url),
            real(self.rotation),
        ]
    }
}

// ============================================================================
// Import
// ============================================================================

/// Imports the CSV at `path` into `table`. Returns the number of rows
/// inserted.
pub(super) fn import_csv_file(
    conn: &mut Connection,
    table: Table,
    path: &Path,
) -> Result<usize, OidError> {
    let file = File::open(path).map_err(OidError::Io)?;
    import_csv_reader(conn, table, BufReader::new(file), path)
}

/// Imports CSV data from `reader` into `table`. `source` is only used in
/// error messages.
///
/// The classes CSV has no header row; every other table's CSV does, and
/// its first record is skipped.
pub(super) fn import_csv_reader<R: Read>(
    conn: &mut Connection,
    table: Table,
    reader: R,
    source: &Path,
) -> Result<usize, OidError> {
    match table {
        Table::Classes => insert_rows::<ClassRow, R>(conn, table, reader, source, false, &CLASSES_COLUMNS),
        Table::Bboxes(_) => insert_rows::<BboxRow, R>(conn, table, reader, source, true, &BBOXES_COLUMNS),
        Table::Labels(_) => insert_rows::<LabelRow, R>(conn, table, reader, source, true, &LABELS_COLUMNS),
        Table::Images(_) => insert_rows::<ImageRow, R>(conn, table, reader, source, true, &IMAGES_COLUMNS),
    }
}

fn insert_rows<T: CsvRow, R: Read>(
    conn: &mut Connection,
    table: Table,
    reader: R,
    source: &Path,
    skip_header: bool,
    columns: &[&'static str],
) -> Result<usize, OidError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);

    let tx = conn.transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(&insert_sql(table))?;
        for (idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            if skip_header && idx == 0 {
                continue;
            }
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 1);
            let row: T = record
                .deserialize(None)
                .map_err(|err| field_error(source, line, columns, err))?;
            stmt.execute(params_from_iter(row.into_values()))?;
            count += 1;
        }
    }
    tx.commit()?;

    Ok(count)
}

fn field_error(source: &Path, line: u64, columns: &[&'static str], err: csv::Error) -> OidError {
    match err.kind() {
        csv::ErrorKind::Deserialize { err: de, .. } => OidError::CsvField {
            path: source.to_path_buf(),
            line,
            column: de
                .field()
                .and_then(|i| columns.get(i as usize))
                .copied()
                .unwrap_or("?"),
            message: de.kind().to_string(),
        },
        _ => OidError::Csv(err),
    }
}
