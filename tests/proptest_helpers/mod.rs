#![allow(dead_code)]

use oidlabel::geom::{NormalizedAnnotation, Rotation};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const EPS: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_rotation() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        Just(Rotation::R0),
        Just(Rotation::R90),
        Just(Rotation::R180),
        Just(Rotation::R270),
    ]
}

/// A box whose extent stays inside the unit square.
pub fn arb_unit_box() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_map(|(a, b, c, d)| {
        let (x_min, x_max) = if a <= b { (a, b) } else { (b, a) };
        let (y_min, y_max) = if c <= d { (c, d) } else { (d, c) };
        (x_min, x_max, y_min, y_max)
    })
}

pub fn arb_class_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Dog".to_string()),
        Just("Cat".to_string()),
        Just("Human eye".to_string()),
    ]
}

pub fn arb_annotations() -> impl Strategy<Value = Vec<NormalizedAnnotation>> {
    prop::collection::vec((arb_class_name(), arb_unit_box()), 0..8).prop_map(|items| {
        items
            .into_iter()
            .map(|(name, (x_min, x_max, y_min, y_max))| {
                NormalizedAnnotation::new(
                    name,
                    x_min + (x_max - x_min) / 2.0,
                    y_min + (y_max - y_min) / 2.0,
                    x_max - x_min,
                    y_max - y_min,
                )
            })
            .collect()
    })
}

pub fn close4(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> bool {
    (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS && (a.2 - b.2).abs() < EPS && (a.3 - b.3).abs() < EPS
}
