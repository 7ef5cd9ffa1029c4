//! Fuzz target for single-line label parsing.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use oidlabel::export::parse_label_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_label_line(line, Path::new("fuzz.txt"), 1);
});
