// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Before/after comparison of markdown renderer benchmark results.
//!
//! The renderer benchmark runner writes one JSON document per run. This crate
//! loads two of them, aligns fixtures by name and classifies each fixture's
//! change in warm-run latency as a regression, an improvement or neither.
//!
//! # Quick Start
//!
//! ```no_run
//! use mdpreview_bench::{compare_paths, report, CompareOptions};
//!
//! let comparison = compare_paths(
//!     "benchmark/results/js-bench-2025-03-08_10-00-00.json",
//!     "benchmark/results/js-bench-2025-03-09_10-00-00.json",
//!     CompareOptions::default(),
//! )?;
//!
//! report::write_text(&mut std::io::stdout(), &comparison, &report::TextStyle::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`result`] - The result document model
//! - [`io`] - Loading documents and discovering recent runs
//! - [`compare`] - The fixture-by-fixture comparator
//! - [`report`] - Terminal and JSON rendering
//! - [`markdown`] - Markdown report generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod compare;
pub mod error;
pub mod io;
pub mod markdown;
pub mod report;
pub mod result;

pub use compare::{CompareOptions, Comparison, ResultComparator, Row, Status};
pub use error::{CompareError, Result, UsageError};
pub use io::{discover_latest_pair, load_document, DiscoveryConfig, LoadedDocument};
pub use result::{ResultDocument, Statistic, WarmShape, WarmStats};

use std::path::Path;

/// Load two result files and compare them.
///
/// Both files are fully loaded before any comparison happens, so a malformed
/// second file never yields a partial result.
///
/// # Errors
///
/// Returns [`CompareError::Io`] if a file cannot be read and
/// [`CompareError::MalformedInput`] if it is not a valid result document.
pub fn compare_paths(
    before: impl AsRef<Path>,
    after: impl AsRef<Path>,
    options: CompareOptions,
) -> Result<Comparison> {
    let before = load_document(before)?;
    let after = load_document(after)?;
    Ok(ResultComparator::new(options).compare(&before, &after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compare_paths_end_to_end() {
        let dir = TempDir::new().unwrap();
        let before = dir.path().join("js-bench-before.json");
        let after = dir.path().join("js-bench-after.json");
        fs::write(
            &before,
            r#"{"meta": {"layer": "js", "timestamp": "2024-01-01T00:00:00"},
                "results": [{"fixture": "roundtrip", "warm": {"t2_roundtrip": {"median": 100.0}}}]}"#,
        )
        .unwrap();
        fs::write(
            &after,
            r#"{"meta": {"layer": "js", "timestamp": "2024-01-02T00:00:00"},
                "results": [{"fixture": "roundtrip", "warm": {"median": 120.0}}]}"#,
        )
        .unwrap();

        let comparison = compare_paths(&before, &after, CompareOptions::default()).unwrap();
        assert_eq!(comparison.before.source.as_deref(), Some("js-bench-before.json"));
        assert_eq!(comparison.after.date, "2024-01-02");
        assert_eq!(comparison.regressions, 1);
    }

    #[test]
    fn test_compare_paths_malformed_second_file() {
        let dir = TempDir::new().unwrap();
        let before = dir.path().join("before.json");
        let after = dir.path().join("after.json");
        fs::write(
            &before,
            r#"{"meta": {"layer": "js", "timestamp": "t"}, "results": []}"#,
        )
        .unwrap();
        fs::write(&after, r#"{"meta": {"layer": "js", "timestamp": "t"}}"#).unwrap();

        let err = compare_paths(&before, &after, CompareOptions::default()).unwrap_err();
        assert!(matches!(err, CompareError::MalformedInput { ref path, .. } if path == &after));
    }
}
