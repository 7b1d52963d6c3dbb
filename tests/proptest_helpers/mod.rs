#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

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

/// A single path segment a dataset directory could plausibly have.
pub fn arb_segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_.=-]{0,15}"
}

/// Identifiers of one to three segments joined by `/`.
pub fn arb_identifier() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_segment(), 1..=3).prop_map(|segments| segments.join("/"))
}

/// Identifiers mixing ordinary segments with `..` and `.`.
pub fn arb_hostile_identifier() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        3 => arb_segment(),
        2 => Just("..".to_string()),
        1 => Just(".".to_string()),
    ];
    prop::collection::vec(segment, 1..=5).prop_map(|segments| segments.join("/"))
}
