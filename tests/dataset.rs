//! Dataset CSV download and import against a local fake remote.

mod common;

use std::fs;

use common::{bbox_row, image_row, label_row, LocalRemote, BBOX_HEADER, CLASSES_CSV, IMAGE_HEADER, LABEL_HEADER};
use oidlabel::config::{DatasetLayout, Partition, Table};
use oidlabel::jobs::{download_dataset, import_dataset};
use oidlabel::logging::LogSink;
use oidlabel::store::{build_label_query, Store};
use oidlabel::OidError;
use tempfile::TempDir;

/// Publishes one CSV per artifact under `remote/` and maps its URL.
fn remote_for(tmp: &TempDir, layout: &DatasetLayout) -> LocalRemote {
    let remote_dir = tmp.path().join("remote");
    fs::create_dir_all(&remote_dir).unwrap();

    let mut remote = LocalRemote::default();
    for (i, artifact) in layout.artifacts().into_iter().enumerate() {
        let body = match artifact.table {
            Table::Classes => CLASSES_CSV.to_string(),
            Table::Bboxes(p) => format!(
                "{BBOX_HEADER}{}",
                bbox_row(&format!("{p}1"), "/m/dog", (0.2, 0.4, 0.2, 0.4), 0)
            ),
            Table::Labels(p) => format!("{LABEL_HEADER}{}", label_row(&format!("{p}1"), "/m/dog", 1.0)),
            Table::Images(p) => format!(
                "{IMAGE_HEADER}{}",
                image_row(&format!("{p}1"), "http://local/o.jpg", "", "")
            ),
        };
        let path = remote_dir.join(format!("{i}.csv"));
        fs::write(&path, body).unwrap();
        remote = remote.with(&artifact.remote_url, &path);
    }
    remote
}

#[test]
fn download_then_import_loads_every_table() {
    let tmp = TempDir::new().unwrap();
    let layout = DatasetLayout::new(tmp.path().join("work"));
    let remote = remote_for(&tmp, &layout);
    let log = LogSink::silent();

    let fetched = download_dataset(&layout, &remote, &log).expect("download dataset");
    assert_eq!(fetched, 10);
    for artifact in layout.artifacts() {
        assert!(artifact.local_path.is_file(), "{} missing", artifact.tag());
    }

    let counts = import_dataset(&layout, &log).expect("import dataset");
    assert_eq!(counts.len(), 10);
    assert_eq!(counts[0], (Table::Classes, 3));
    assert!(counts[1..].iter().all(|(_, rows)| *rows == 1));

    let store = Store::open(&layout.database_path()).unwrap();
    assert_eq!(store.class_names().unwrap(), vec!["Dog", "Cat", "Car"]);
    let p = Partition::Validation;
    let query =
        build_label_query(Table::Bboxes(p), Table::Labels(p), "validation1", &[], 1.0).unwrap();
    let rows = store.select_labels(&query).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].class_name, "Dog");
}

#[test]
fn reimport_replaces_existing_database() {
    let tmp = TempDir::new().unwrap();
    let layout = DatasetLayout::new(tmp.path().join("work"));
    let remote = remote_for(&tmp, &layout);
    let log = LogSink::silent();
    download_dataset(&layout, &remote, &log).unwrap();

    import_dataset(&layout, &log).unwrap();
    let counts = import_dataset(&layout, &log).expect("second import");
    assert_eq!(counts[0], (Table::Classes, 3));
}

#[test]
fn import_without_csvs_fails() {
    let tmp = TempDir::new().unwrap();
    let layout = DatasetLayout::new(tmp.path());

    let err = import_dataset(&layout, &LogSink::silent()).unwrap_err();
    assert!(matches!(err, OidError::Io(_) | OidError::Csv(_)));
}
