// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for loading and comparing result documents.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving, loading or comparing results.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The invocation cannot be satisfied; the caller should show usage.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// A document is not valid JSON or lacks a required key.
    #[error("Malformed result document {}: {source}", path.display())]
    MalformedInput {
        /// Offending file.
        path: PathBuf,
        /// Parser error, including the missing field when there is one.
        source: serde_json::Error,
    },

    /// A document or the results directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Ways an invocation can be unusable.
#[derive(Debug, Error)]
pub enum UsageError {
    /// Neither zero nor two result files were given.
    #[error("expected 0 or 2 result files, got {0}")]
    ArgumentCount(usize),

    /// Auto-discovery found fewer than two candidate files.
    #[error("Need at least 2 result files to compare (found {found} in {}).", dir.display())]
    TooFewResults {
        /// Number of qualifying files found.
        found: usize,
        /// Directory that was scanned.
        dir: PathBuf,
    },
}

/// Result type for comparison operations.
pub type Result<T> = std::result::Result<T, CompareError>;
