//! Fuzz target for bbox CSV import into an in-memory store.
//!
//! Arbitrary bytes go through the positional CSV reader and the insert
//! path, checking for panics, crashes, or hangs.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use oidlabel::config::{Partition, Table};
use oidlabel::store::Store;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let table = Table::Bboxes(Partition::Train);
    let Ok(mut store) = Store::open_in_memory() else {
        return;
    };
    if store.create_table(table).is_err() {
        return;
    }
    let _ = store.import_csv_reader(table, data, Path::new("fuzz.csv"));
});
