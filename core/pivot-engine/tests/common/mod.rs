//! FILENAME: tests/common/mod.rs
//! Shared fixtures for market analysis integration tests.

use std::sync::OnceLock;

use dataset::{generate, FactRecord};
use pivot_engine::FacetOptions;

/// The full demo table, generated once per test binary.
pub fn table() -> &'static [FactRecord] {
    static TABLE: OnceLock<Vec<FactRecord>> = OnceLock::new();
    TABLE.get_or_init(generate)
}

pub fn options() -> &'static FacetOptions {
    static OPTIONS: OnceLock<FacetOptions> = OnceLock::new();
    OPTIONS.get_or_init(|| FacetOptions::from_table(table()))
}

/// Absolute tolerance for comparing sums computed in different orders.
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-6 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} to be close to {}",
        actual,
        expected
    );
}
