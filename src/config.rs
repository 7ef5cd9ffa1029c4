//! Typed dataset configuration.
//!
//! Every table name, remote URL and local path the jobs touch is derived
//! from [`DatasetLayout`]. [`Table`] is a closed enum, so it doubles as the
//! allow-list of SQL identifiers the query builders may interpolate.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::OidError;

const REMOTE_BASE: &str = "https://storage.googleapis.com/openimages/2018_04";

/// A train/validation/test split of the dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Partition {
    Train,
    Validation,
    Test,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Train, Partition::Validation, Partition::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Validation => "validation",
            Partition::Test => "test",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Partition {
    type Err = OidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Partition::Train),
            "validation" => Ok(Partition::Validation),
            "test" => Ok(Partition::Test),
            other => Err(OidError::UnsupportedPartition(other.to_string())),
        }
    }
}

/// The kinds of CSV artifact the dataset ships.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Classes,
    Bboxes,
    Labels,
    Images,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Classes => "classes",
            ArtifactKind::Bboxes => "bboxes",
            ArtifactKind::Labels => "labels",
            ArtifactKind::Images => "images",
        }
    }
}

/// A table in the relational store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Classes,
    Bboxes(Partition),
    Labels(Partition),
    Images(Partition),
}

impl Table {
    pub fn for_artifact(kind: ArtifactKind, partition: Partition) -> Self {
        match kind {
            ArtifactKind::Classes => Table::Classes,
            ArtifactKind::Bboxes => Table::Bboxes(partition),
            ArtifactKind::Labels => Table::Labels(partition),
            ArtifactKind::Images => Table::Images(partition),
        }
    }

    pub fn kind(self) -> ArtifactKind {
        match self {
            Table::Classes => ArtifactKind::Classes,
            Table::Bboxes(_) => ArtifactKind::Bboxes,
            Table::Labels(_) => ArtifactKind::Labels,
            Table::Images(_) => ArtifactKind::Images,
        }
    }

    pub fn partition(self) -> Option<Partition> {
        match self {
            Table::Classes => None,
            Table::Bboxes(p) | Table::Labels(p) | Table::Images(p) => Some(p),
        }
    }

    /// The SQL identifier for this table.
    pub fn name(self) -> String {
        match self.partition() {
            None => self.kind().as_str().to_string(),
            Some(p) => format!("{}_{}", self.kind().as_str(), p),
        }
    }

    /// Fails unless this table holds artifacts of `expected` kind.
    pub fn expect_kind(self, expected: ArtifactKind) -> Result<Self, OidError> {
        if self.kind() == expected {
            Ok(self)
        } else {
            Err(OidError::InvalidTable(format!(
                "{} used where a {} table was expected",
                self.name(),
                expected.as_str()
            )))
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One downloadable CSV and the table it is imported into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub table: Table,
    pub remote_url: String,
    pub local_path: PathBuf,
}

impl Artifact {
    /// `<group>:<subgroup>` tag used in log lines, e.g. `bboxes:train`.
    pub fn tag(&self) -> String {
        match self.table.partition() {
            None => "metadata:classes".to_string(),
            Some(p) => format!("{}:{}", self.table.kind().as_str(), p),
        }
    }
}

/// Directory layout of a working copy of the dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetLayout {
    base_dir: PathBuf,
}

impl DatasetLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn dataset_dir(&self) -> PathBuf {
        self.base_dir.join("dataset")
    }

    pub fn images_dir(&self, partition: Partition) -> PathBuf {
        self.base_dir.join("images").join(partition.as_str())
    }

    pub fn labels_dir(&self, partition: Partition) -> PathBuf {
        self.base_dir.join("labels").join(partition.as_str())
    }

    pub fn previews_dir(&self, partition: Partition) -> PathBuf {
        self.base_dir.join("previews").join(partition.as_str())
    }

    pub fn database_path(&self) -> PathBuf {
        self.base_dir.join("dataset.sqlite")
    }

    /// The artifact backing `table`.
    pub fn artifact(&self, table: Table) -> Artifact {
        let (remote, file_name) = match table {
            Table::Classes => (
                format!("{REMOTE_BASE}/class-descriptions-boxable.csv"),
                "class-descriptions-boxable.csv".to_string(),
            ),
            Table::Bboxes(p) => {
                let file = format!("{p}-annotations-bbox.csv");
                (format!("{REMOTE_BASE}/{p}/{file}"), file)
            }
            Table::Labels(p) => {
                let file = format!("{p}-annotations-human-imagelabels-boxable.csv");
                (format!("{REMOTE_BASE}/{p}/{file}"), file)
            }
            Table::Images(p) => {
                // Only the train split carries the "boxable" qualifier.
                let file = match p {
                    Partition::Train => "train-images-boxable-with-rotation.csv".to_string(),
                    other => format!("{other}-images-with-rotation.csv"),
                };
                (format!("{REMOTE_BASE}/{p}/{file}"), file)
            }
        };

        Artifact {
            table,
            remote_url: remote,
            local_path: self.dataset_dir().join(file_name),
        }
    }

    /// All artifacts: the class taxonomy first, then bboxes, labels and
    /// images for each partition.
    pub fn artifacts(&self) -> Vec<Artifact> {
        let mut out = vec![self.artifact(Table::Classes)];
        for kind in [ArtifactKind::Bboxes, ArtifactKind::Labels, ArtifactKind::Images] {
            for partition in Partition::ALL {
                out.push(self.artifact(Table::for_artifact(kind, partition)));
            }
        }
        out
    }
}
