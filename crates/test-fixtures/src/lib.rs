//! Test fixtures for the contrastive active learning workspace.
//!
//! Golden JSON files under the workspace `test-fixtures/` folder, a synthetic
//! Gaussian-blob dataset, and in-memory collaborators (embedding provider,
//! classifier oracle, reporters) including ones that fail on demand.

pub mod collaborators;
pub mod golden;
pub mod synthetic;

pub use collaborators::{
    FailingEmbeddingProvider, FailingReporter, NearestCentroidOracle, ScriptedOracle,
    TableEmbeddingProvider,
};
pub use golden::{load_fixture, GoldenCalCase, GoldenPoint, GoldenScore};
pub use synthetic::SyntheticDataset;

use std::path::PathBuf;

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);
    while !path.join("test-fixtures").join("golden").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}
