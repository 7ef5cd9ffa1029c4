//! YOLO-style label files: one `<class> <cx> <cy> <w> <h>` line per box.
//!
//! The writer is not atomic. A failure mid-write can leave a truncated
//! file behind; callers that need replace semantics must write elsewhere
//! and rename.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::OidError;
use crate::geom::NormalizedAnnotation;

/// Ordered mapping from class name to the integer written in label files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassIndex {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl ClassIndex {
    /// Builds an index where each name maps to its position. A repeated
    /// name keeps its first position.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut lookup = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            lookup.entry(name.clone()).or_insert(idx);
        }
        Self { names, lookup }
    }

    /// Uses the caller's class filter when one was given, otherwise the
    /// full taxonomy.
    pub fn from_filter_or_taxonomy(filter: &[String], taxonomy: Vec<String>) -> Self {
        if filter.is_empty() {
            Self::new(taxonomy)
        } else {
            Self::new(filter.iter().cloned())
        }
    }

    pub fn index_of(&self, class_name: &str) -> Option<usize> {
        self.lookup.get(class_name).copied()
    }
}

/// Renders annotations as label lines, in input order.
pub fn format_label_lines(
    annotations: &[NormalizedAnnotation],
    classes: &ClassIndex,
) -> Result<String, OidError> {
    let mut out = String::new();
    for ann in annotations {
        let idx = classes
            .index_of(&ann.class_name)
            .ok_or_else(|| OidError::UnknownClass(ann.class_name.clone()))?;
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            idx, ann.x, ann.y, ann.width, ann.height
        );
    }
    Ok(out)
}

/// Creates or overwrites `path` with one line per annotation.
pub fn write_label_file(
    path: &Path,
    annotations: &[NormalizedAnnotation],
    classes: &ClassIndex,
) -> Result<(), OidError> {
    let content = format_label_lines(annotations, classes)?;
    let mut file = fs::File::create(path).map_err(OidError::Io)?;
    file.write_all(content.as_bytes()).map_err(OidError::Io)?;
    Ok(())
}

/// One parsed line of an existing label file.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLine {
    pub class_id: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Parses one label line. Blank lines yield `Ok(None)`.
///
/// A line must have exactly five tokens.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelLine>, OidError> {
    parse_tokens(line, file_path, line_num, false)
}

/// Like [`parse_label_line`], but tokens after the fifth (a confidence
/// column, polygon points) are ignored.
pub fn parse_label_line_prefix(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelLine>, OidError> {
    parse_tokens(line, file_path, line_num, true)
}

fn parse_tokens(
    line: &str,
    file_path: &Path,
    line_num: usize,
    allow_trailing: bool,
) -> Result<Option<LabelLine>, OidError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();
    let count_ok = if allow_trailing {
        tokens.len() >= 5
    } else {
        tokens.len() == 5
    };
    if !count_ok {
        let expected = if allow_trailing { "at least 5" } else { "5" };
        return Err(OidError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected {expected} tokens, found {}", tokens.len()),
        });
    }

    let class_id = tokens[0]
        .parse::<usize>()
        .map_err(|_| OidError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class_id '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    Ok(Some(LabelLine { class_id, cx, cy, w, h }))
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, OidError> {
    raw.parse::<f64>().map_err(|_| OidError::LabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
    })
}
