//! Fetching the dataset CSVs and loading them into SQLite.

use std::fs;

use crate::config::{ArtifactKind, DatasetLayout, Partition, Table};
use crate::error::OidError;
use crate::fetch::Remote;
use crate::logging::LogSink;
use crate::store::Store;

/// Downloads every dataset CSV into `dataset/`. Returns the number of
/// files fetched.
pub fn download_dataset(
    layout: &DatasetLayout,
    remote: &dyn Remote,
    log: &LogSink,
) -> Result<usize, OidError> {
    fs::create_dir_all(layout.dataset_dir()).map_err(OidError::Io)?;

    let artifacts = layout.artifacts();
    for artifact in &artifacts {
        log.scoped(artifact.tag()).info(format_args!(
            "Downloading {} -> {}",
            artifact.remote_url,
            artifact.local_path.display()
        ));
        remote.download_to(&artifact.remote_url, &artifact.local_path)?;
    }
    Ok(artifacts.len())
}

/// Rebuilds the database from the downloaded CSVs.
///
/// Any existing database file is deleted first. Tables are loaded in the
/// order classes, bboxes, labels, images. Returns the row count per table.
pub fn import_dataset(
    layout: &DatasetLayout,
    log: &LogSink,
) -> Result<Vec<(Table, usize)>, OidError> {
    let mut store = Store::recreate(&layout.database_path())?;

    let mut tables = vec![Table::Classes];
    for kind in [ArtifactKind::Bboxes, ArtifactKind::Labels, ArtifactKind::Images] {
        for partition in Partition::ALL {
            tables.push(Table::for_artifact(kind, partition));
        }
    }

    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let artifact = layout.artifact(table);

        log.info(format_args!("Creating table {table}"));
        store.create_table(table)?;

        log.info(format_args!(
            "Importing from {} to {table}",
            artifact.local_path.display()
        ));
        let rows = store.import_csv(table, &artifact.local_path)?;
        log.debug(format_args!("Imported {rows} row(s) into {table}"));
        counts.push((table, rows));
    }

    Ok(counts)
}
