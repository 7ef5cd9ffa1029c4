//! DDL for the dataset tables.
//!
//! Table names are interpolated, but only ever from [`Table::name`], which
//! is a closed set.

use crate::config::Table;

/// Column lists in CSV order. The import code binds values in this order.
pub(crate) const CLASSES_COLUMNS: [&str; 2] = ["label_name", "class_name"];

pub(crate) const BBOXES_COLUMNS: [&str; 13] = [
    "image_id",
    "source",
    "label_name",
    "confidence",
    "x_min",
    "x_max",
    "y_min",
    "y_max",
    "is_occluded",
    "is_truncated",
    "is_group_of",
    "is_depiction",
    "is_inside",
];

pub(crate) const LABELS_COLUMNS: [&str; 4] = ["image_id", "source", "label_name", "confidence"];

pub(crate) const IMAGES_COLUMNS: [&str; 12] = [
    "image_id",
    "subset",
    "original_url",
    "original_landing_url",
    "license",
    "author_profile_url",
    "author",
    "title",
    "original_size",
    "original_md5",
    "thumbnail_300k_url",
    "rotation",
];

/// Returns the `CREATE TABLE` and `CREATE INDEX` script for `table`.
pub fn create_table_sql(table: Table) -> String {
    let t = table.name();
    match table {
        Table::Classes => format!(
            "create table if not exists {t} (
  label_name text,
  class_name text
);
"
        ),
        Table::Bboxes(_) => format!(
            "create table if not exists {t} (
  image_id text,
  source text,
  label_name text,
  confidence float,
  x_min float,
  x_max float,
  y_min float,
  y_max float,
  is_occluded int,
  is_truncated int,
  is_group_of int,
  is_depiction int,
  is_inside int
);
create index if not exists {t}_image_id on {t}(image_id);
create index if not exists {t}_label_name on {t}(label_name);
create index if not exists {t}_image_id_and_label_name on {t}(image_id, label_name);
"
        ),
        Table::Labels(_) => format!(
            "create table if not exists {t} (
  image_id text,
  source text,
  label_name text,
  confidence float
);
create index if not exists {t}_image_id on {t}(image_id);
create index if not exists {t}_source on {t}(source);
create index if not exists {t}_label_name on {t}(label_name);
create index if not exists {t}_confidence on {t}(confidence);
create index if not exists {t}_image_id_and_label_name on {t}(image_id, label_name);
"
        ),
        Table::Images(_) => format!(
            "create table if not exists {t} (
  image_id text,
  subset text,
  original_url text,
  original_landing_url text,
  license text,
  author_profile_url text,
  author text,
  title text,
  original_size int,
  original_md5 text,
  thumbnail_300k_url text,
  rotation float
);
create index if not exists {t}_image_id on {t}(image_id);
"
        ),
    }
}

/// Returns the parameterized `INSERT` statement for `table`.
pub fn insert_sql(table: Table) -> String {
    let columns: &[&str] = match table {
        Table::Classes => &CLASSES_COLUMNS,
        Table::Bboxes(_) => &BBOXES_COLUMNS,
        Table::Labels(_) => &LABELS_COLUMNS,
        Table::Images(_) => &IMAGES_COLUMNS,
    };
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "insert into {} ({}) values ({})",
        table.name(),
        columns.join(", "),
        placeholders
    )
}
