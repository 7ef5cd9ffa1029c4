//! Subset an existing YOLO image/label set by class index.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OidError;
use crate::export::parse_label_line_prefix;
use crate::logging::LogSink;

/// Options for [`extract_classes`].
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Text file with one image path per line.
    pub images_list: PathBuf,
    /// Receives `images/` and `labels/` subdirectories.
    pub output_dir: PathBuf,
    /// Class indices to keep. A kept row is re-indexed to its position in
    /// this list.
    pub class_nos: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub images_scanned: usize,
    pub images_copied: usize,
    pub labels_kept: usize,
    pub missing_labels: usize,
}

/// The label file that belongs to `image_path`: the `/images/` path
/// segment becomes `/labels/` and the extension becomes `.txt`.
pub fn label_path_for_image(image_path: &Path) -> PathBuf {
    let swapped = PathBuf::from(
        image_path
            .to_string_lossy()
            .replace("/images/", "/labels/"),
    );
    swapped.with_extension("txt")
}

/// Copies every listed image that has at least one label of a selected
/// class, together with its filtered, re-indexed label file.
pub fn extract_classes(opts: &ExtractOptions, log: &LogSink) -> Result<ExtractSummary, OidError> {
    let images_dir = opts.output_dir.join("images");
    let labels_dir = opts.output_dir.join("labels");
    fs::create_dir_all(&images_dir).map_err(OidError::Io)?;
    fs::create_dir_all(&labels_dir).map_err(OidError::Io)?;

    log.info(format_args!(
        "Extract classes {:?} from {}",
        opts.class_nos,
        opts.images_list.display()
    ));

    let list = fs::read_to_string(&opts.images_list).map_err(OidError::Io)?;
    let mut summary = ExtractSummary::default();

    for raw in list.lines() {
        let entry = raw.trim_end_matches('\r');
        if entry.trim().is_empty() {
            continue;
        }
        summary.images_scanned += 1;

        let image_path = Path::new(entry);
        let label_path = label_path_for_image(image_path);
        let content = match fs::read_to_string(&label_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let skip = OidError::MissingData(format!(
                    "no label file {} for {}",
                    label_path.display(),
                    image_path.display()
                ));
                log.warn(format_args!("{skip}"));
                summary.missing_labels += 1;
                continue;
            }
            Err(err) => return Err(OidError::Io(err)),
        };

        let mut kept = String::new();
        let mut kept_count = 0;
        for (idx, line) in content.lines().enumerate() {
            let Some(row) = parse_label_line_prefix(line, &label_path, idx + 1)? else {
                continue;
            };
            if let Some(new_id) = opts.class_nos.iter().position(|&c| c == row.class_id) {
                kept.push_str(&format!(
                    "{} {} {} {} {}\n",
                    new_id, row.cx, row.cy, row.w, row.h
                ));
                kept_count += 1;
            }
        }

        if kept_count == 0 {
            continue;
        }

        let Some(image_name) = image_path.file_name() else {
            continue;
        };
        let Some(label_name) = label_path.file_name() else {
            continue;
        };
        log.info(format_args!("Found labels on {}", image_name.to_string_lossy()));

        let image_dst = images_dir.join(image_name);
        let label_dst = labels_dir.join(label_name);

        log.info(format_args!(
            "Copy image {} -> {}",
            image_path.display(),
            image_dst.display()
        ));
        fs::copy(image_path, &image_dst).map_err(OidError::Io)?;

        log.info(format_args!("Write labels -> {}", label_dst.display()));
        fs::write(&label_dst, kept).map_err(OidError::Io)?;

        summary.images_copied += 1;
        summary.labels_kept += kept_count;
    }

    Ok(summary)
}
