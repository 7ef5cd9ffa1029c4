#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use oidlabel::config::{Partition, Table};
use oidlabel::fetch::{Availability, Remote};
use oidlabel::store::Store;
use oidlabel::OidError;

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

pub const CLASSES_CSV: &str = "/m/dog,Dog\n/m/cat,Cat\n/m/car,Car\n";

pub const BBOX_HEADER: &str = "ImageID,Source,LabelName,Confidence,XMin,XMax,YMin,YMax,IsOccluded,IsTruncated,IsGroupOf,IsDepiction,IsInside\n";
pub const LABEL_HEADER: &str = "ImageID,Source,LabelName,Confidence\n";
pub const IMAGE_HEADER: &str = "ImageID,Subset,OriginalURL,OriginalLandingURL,License,AuthorProfileURL,Author,Title,OriginalSize,OriginalMD5,Thumbnail300KURL,Rotation\n";

/// An in-memory store for the train partition with all four tables.
pub fn store_with(bboxes: &str, labels: &str, images: &str) -> Store {
    let mut store = Store::open_in_memory().expect("open store");
    let p = Partition::Train;
    let src = Path::new("<test>");
    for (table, body, header) in [
        (Table::Classes, CLASSES_CSV.to_string(), ""),
        (Table::Bboxes(p), bboxes.to_string(), BBOX_HEADER),
        (Table::Labels(p), labels.to_string(), LABEL_HEADER),
        (Table::Images(p), images.to_string(), IMAGE_HEADER),
    ] {
        store.create_table(table).expect("create table");
        let csv = format!("{header}{body}");
        store
            .import_csv_reader(table, csv.as_bytes(), src)
            .expect("import csv");
    }
    store
}

/// A box row with all flags zero except `is_group_of`.
pub fn bbox_row(image_id: &str, label: &str, coords: (f64, f64, f64, f64), group_of: u8) -> String {
    let (x_min, x_max, y_min, y_max) = coords;
    format!("{image_id},xclick,{label},1,{x_min},{x_max},{y_min},{y_max},0,0,{group_of},0,0\n")
}

pub fn label_row(image_id: &str, label: &str, confidence: f64) -> String {
    format!("{image_id},verification,{label},{confidence}\n")
}

pub fn image_row(image_id: &str, original: &str, thumb: &str, rotation: &str) -> String {
    format!("{image_id},train,{original},,,,,,100,md5,{thumb},{rotation}\n")
}

/// A [`Remote`] backed by local files, keyed by URL.
#[derive(Default)]
pub struct LocalRemote {
    files: BTreeMap<String, PathBuf>,
}

impl LocalRemote {
    pub fn with(mut self, url: &str, path: &Path) -> Self {
        self.files.insert(url.to_string(), path.to_path_buf());
        self
    }
}

impl Remote for LocalRemote {
    fn probe(&self, url: &str) -> Availability {
        if self.files.contains_key(url) {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }

    fn download_to(&self, url: &str, path: &Path) -> Result<u64, OidError> {
        let src = self.files.get(url).ok_or_else(|| OidError::Http {
            url: url.to_string(),
            message: "404".to_string(),
        })?;
        Ok(fs::copy(src, path)?)
    }
}
