//! Annotation query builder.
//!
//! Builds the join across boxes, labels, classes (and images) for one
//! partition. Every value is a bound parameter; table identifiers come from
//! [`Table`] and are checked against the role they are used in.

use rusqlite::types::Value;

use crate::config::{ArtifactKind, Table};
use crate::error::OidError;

/// SQL text plus its positional parameters, in bind order.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Options for [`build_image_list_query`].
#[derive(Clone, Debug, Default)]
pub struct ImageListOptions {
    /// Restrict to one image.
    pub image_id: Option<String>,
    /// Restrict to boxes whose class name is in this list. Empty means no
    /// restriction.
    pub class_names: Vec<String>,
    /// Cap on distinct images returned. `None` means no cap.
    pub limit: Option<u64>,
    /// Distinct images to skip. Only applied together with `limit`.
    pub offset: u64,
}

/// Builds the per-box label query for one image.
///
/// Each result row is `(class_name, x, y, width, height)` with the center
/// and size computed from the stored min/max columns. A box is returned
/// only if it is not a group-of box, a label row for the same image and
/// label code has `confidence >= min_confidence`, and a class row exists
/// for the label code (restricted to `class_names` when non-empty).
///
/// Row order is unspecified.
pub fn build_label_query(
    boxes: Table,
    labels: Table,
    image_id: &str,
    class_names: &[String],
    min_confidence: f64,
) -> Result<BuiltQuery, OidError> {
    let boxes = boxes.expect_kind(ArtifactKind::Bboxes)?;
    let labels = labels.expect_kind(ArtifactKind::Labels)?;
    check_same_partition(&[boxes, labels])?;

    let mut params = vec![Value::Text(image_id.to_string())];
    let class_cond = class_name_condition(class_names, &mut params);
    params.push(Value::Real(min_confidence));

    let sql = format!(
        "select
  classes.class_name,
  bboxes.x_min + (bboxes.x_max - bboxes.x_min) / 2 as x,
  bboxes.y_min + (bboxes.y_max - bboxes.y_min) / 2 as y,
  (bboxes.x_max - bboxes.x_min) as width,
  (bboxes.y_max - bboxes.y_min) as height
from
  {boxes} as bboxes
  join {labels} as labels
    on bboxes.image_id = labels.image_id and bboxes.label_name = labels.label_name
  join {classes}
    on labels.label_name = classes.label_name
where
  bboxes.image_id = ?
  {class_cond}
  and labels.confidence >= ?
  and bboxes.is_group_of = 0",
        classes = Table::Classes,
    );

    Ok(BuiltQuery { sql, params })
}

/// Builds the distinct image list query that drives batch downloads.
///
/// Each result row is `(image_id, original_url, thumbnail_300k_url,
/// rotation)`. The join and filters match [`build_label_query`] with the
/// confidence fixed at exactly 1. `limit`/`offset` page over the distinct
/// images, not over the underlying box rows.
pub fn build_image_list_query(
    boxes: Table,
    labels: Table,
    images: Table,
    opts: &ImageListOptions,
) -> Result<BuiltQuery, OidError> {
    let boxes = boxes.expect_kind(ArtifactKind::Bboxes)?;
    let labels = labels.expect_kind(ArtifactKind::Labels)?;
    let images = images.expect_kind(ArtifactKind::Images)?;
    check_same_partition(&[boxes, labels, images])?;

    let mut params = Vec::new();
    let mut where_clause = String::from("where bboxes.is_group_of = 0 and labels.confidence = 1");
    if let Some(image_id) = &opts.image_id {
        where_clause.push_str(" and bboxes.image_id = ?");
        params.push(Value::Text(image_id.clone()));
    }
    let class_cond = class_name_condition(&opts.class_names, &mut params);
    if !class_cond.is_empty() {
        where_clause.push(' ');
        where_clause.push_str(&class_cond);
    }

    let limit_clause = match opts.limit {
        Some(limit) => {
            params.push(Value::Integer(to_sql_int(limit)?));
            params.push(Value::Integer(to_sql_int(opts.offset)?));
            "limit ? offset ?"
        }
        None => "",
    };

    let sql = format!(
        "select
  distinct bboxes.image_id,
  images.original_url,
  images.thumbnail_300k_url,
  images.rotation
from
  {boxes} as bboxes
  join {labels} as labels
    on bboxes.image_id = labels.image_id and bboxes.label_name = labels.label_name
  join {images} as images
    on bboxes.image_id = images.image_id
  join {classes}
    on labels.label_name = classes.label_name
{where_clause}
{limit_clause}",
        classes = Table::Classes,
    );

    Ok(BuiltQuery { sql, params })
}

/// Pushes one bound value per class name and returns the `and ... in (...)`
/// fragment, or an empty string when there is no restriction.
fn class_name_condition(class_names: &[String], params: &mut Vec<Value>) -> String {
    if class_names.is_empty() {
        return String::new();
    }
    params.extend(class_names.iter().cloned().map(Value::Text));
    format!(
        "and classes.class_name in ({})",
        vec!["?"; class_names.len()].join(",")
    )
}

fn check_same_partition(tables: &[Table]) -> Result<(), OidError> {
    let first = tables.first().and_then(|t| t.partition());
    if tables.iter().all(|t| t.partition() == first) {
        Ok(())
    } else {
        let names: Vec<String> = tables.iter().map(|t| t.name()).collect();
        Err(OidError::InvalidTable(format!(
            "tables span several partitions: {}",
            names.join(", ")
        )))
    }
}

fn to_sql_int(value: u64) -> Result<i64, OidError> {
    i64::try_from(value)
        .map_err(|_| OidError::InvalidTable(format!("limit/offset {value} out of range")))
}
