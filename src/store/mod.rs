//! SQLite store for the imported dataset.
//!
//! One [`Store`] owns one connection for the lifetime of a job. All queries
//! run sequentially on it.

mod import;
pub mod query;
mod schema;

pub use query::{build_image_list_query, build_label_query, BuiltQuery, ImageListOptions};
pub use schema::{create_table_sql, insert_sql};

use std::io::Read;
use std::path::Path;

use rusqlite::{params_from_iter, Connection};

use crate::config::Table;
use crate::error::OidError;
use crate::geom::NormalizedAnnotation;

/// One row of the distinct image list.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRecord {
    pub image_id: String,
    pub original_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub rotation: Option<f64>,
}

/// A connection to the dataset database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, OidError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Deletes any existing database at `path` and opens a fresh one.
    pub fn recreate(path: &Path) -> Result<Self, OidError> {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(OidError::Io(err)),
        }
        Self::open(path)
    }

    /// Opens an empty in-memory database.
    pub fn open_in_memory() -> Result<Self, OidError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Creates `table` and its indexes if they do not exist.
    pub fn create_table(&self, table: Table) -> Result<(), OidError> {
        self.conn.execute_batch(&create_table_sql(table))?;
        Ok(())
    }

    /// Imports the CSV file at `path` into `table` in one transaction.
    /// Returns the number of rows inserted.
    pub fn import_csv(&mut self, table: Table, path: &Path) -> Result<usize, OidError> {
        import::import_csv_file(&mut self.conn, table, path)
    }

    /// Imports CSV data from a reader. `source` is only used in error
    /// messages.
    pub fn import_csv_reader<R: Read>(
        &mut self,
        table: Table,
        reader: R,
        source: &Path,
    ) -> Result<usize, OidError> {
        import::import_csv_reader(&mut self.conn, table, reader, source)
    }

    /// All class names, in taxonomy (insertion) order.
    pub fn class_names(&self) -> Result<Vec<String>, OidError> {
        let mut stmt = self
            .conn
            .prepare("select class_name from classes order by rowid")?;
        let names = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names.into_iter().map(Option::unwrap_or_default).collect())
    }

    /// Runs a query built by [`build_label_query`].
    ///
    /// Rows with a NULL coordinate cannot be placed and are dropped.
    pub fn select_labels(&self, query: &BuiltQuery) -> Result<Vec<NormalizedAnnotation>, OidError> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(name, x, y, w, h)| {
                Some(NormalizedAnnotation::new(
                    name.unwrap_or_default(),
                    x?,
                    y?,
                    w?,
                    h?,
                ))
            })
            .collect())
    }

    /// Runs a query built by [`build_image_list_query`].
    pub fn select_images(&self, query: &BuiltQuery) -> Result<Vec<ImageRecord>, OidError> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                Ok(ImageRecord {
                    image_id: row.get(0)?,
                    original_url: row.get(1)?,
                    thumbnail_url: row.get(2)?,
                    rotation: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
