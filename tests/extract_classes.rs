//! Subsetting an existing YOLO set by class index.

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::write_bmp;
use oidlabel::jobs::{extract_classes, ExtractOptions};
use oidlabel::logging::LogSink;
use oidlabel::OidError;
use tempfile::TempDir;

/// Writes `set/images/<name>.bmp` and, when given, `set/labels/<name>.txt`.
fn add_image(root: &Path, name: &str, labels: Option<&str>) -> PathBuf {
    let image = root.join("set").join("images").join(format!("{name}.bmp"));
    write_bmp(&image, 4, 4);
    if let Some(content) = labels {
        let label = root.join("set").join("labels").join(format!("{name}.txt"));
        fs::create_dir_all(label.parent().unwrap()).unwrap();
        fs::write(label, content).unwrap();
    }
    image
}

fn write_list(root: &Path, images: &[PathBuf]) -> PathBuf {
    let list = root.join("list.txt");
    let body: Vec<String> = images.iter().map(|p| p.display().to_string()).collect();
    fs::write(&list, body.join("\n") + "\n\n").unwrap();
    list
}

#[test]
fn keeps_selected_classes_and_reindexes() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let both = add_image(root, "both", Some("0 0.5 0.5 0.2 0.2\n5 0.1 0.2 0.3 0.4\n2 0.6 0.6 0.1 0.1\n"));
    let none = add_image(root, "none", Some("1 0.5 0.5 0.2 0.2\n"));
    let unlabeled = add_image(root, "unlabeled", None);
    let list = write_list(root, &[both, none, unlabeled]);
    let out = root.join("out");

    let summary = extract_classes(
        &ExtractOptions {
            images_list: list,
            output_dir: out.clone(),
            class_nos: vec![5, 0],
        },
        &LogSink::silent(),
    )
    .expect("extract classes");

    assert_eq!(summary.images_scanned, 3);
    assert_eq!(summary.images_copied, 1);
    assert_eq!(summary.labels_kept, 2);
    assert_eq!(summary.missing_labels, 1);

    assert!(out.join("images").join("both.bmp").is_file());
    assert!(!out.join("images").join("none.bmp").exists());
    assert_eq!(
        fs::read_to_string(out.join("labels").join("both.txt")).unwrap(),
        "1 0.5 0.5 0.2 0.2\n0 0.1 0.2 0.3 0.4\n"
    );
}

#[test]
fn malformed_label_line_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let bad = add_image(root, "bad", Some("0 0.5 0.5\n"));
    let list = write_list(root, &[bad]);

    let err = extract_classes(
        &ExtractOptions {
            images_list: list,
            output_dir: root.join("out"),
            class_nos: vec![0],
        },
        &LogSink::silent(),
    )
    .unwrap_err();

    assert!(matches!(err, OidError::LabelParse { line: 1, .. }));
}

#[test]
fn trailing_columns_are_dropped() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let scored = add_image(root, "scored", Some("0 0.5 0.5 0.2 0.2 0.9\n"));
    let list = write_list(root, &[scored]);
    let out = root.join("out");

    let summary = extract_classes(
        &ExtractOptions {
            images_list: list,
            output_dir: out.clone(),
            class_nos: vec![0],
        },
        &LogSink::silent(),
    )
    .expect("extract classes");

    assert_eq!(summary.images_copied, 1);
    assert_eq!(
        fs::read_to_string(out.join("labels").join("scored.txt")).unwrap(),
        "0 0.5 0.5 0.2 0.2\n"
    );
}
