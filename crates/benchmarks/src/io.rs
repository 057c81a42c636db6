// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! I/O operations for benchmark results.
//!
//! This module reads result documents from disk and locates the most recent
//! runs in a results directory.

use crate::error::{CompareError, Result, UsageError};
use crate::result::ResultDocument;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Results directory, relative to the workspace root.
pub const RESULTS_DIR: &str = "benchmark/results";

/// File name prefix of renderer benchmark results.
pub const RESULT_PREFIX: &str = "js-bench-";

/// File name suffix of renderer benchmark results.
pub const RESULT_SUFFIX: &str = ".json";

/// Marker of the runner's rolling copy of the newest result, which would
/// otherwise duplicate a timestamped file.
pub const LATEST_MARKER: &str = "latest";

/// Default results directory, resolved against the workspace this tool was
/// built from rather than the working directory.
pub fn default_results_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(RESULTS_DIR)
}

/// A parsed result document together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Path the document was read from.
    pub source: PathBuf,
    /// Parsed contents.
    pub document: ResultDocument,
}

impl LoadedDocument {
    /// File name of the source, or the full path if it has none.
    pub fn display_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Parse a result document from a JSON string.
pub fn parse_document(content: &str) -> serde_json::Result<ResultDocument> {
    serde_json::from_str(content)
}

/// Read and parse a result document.
pub fn load_document(path: impl AsRef<Path>) -> Result<LoadedDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| CompareError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&content).map_err(|source| CompareError::MalformedInput {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        path = %path.display(),
        layer = %document.meta.layer,
        fixtures = document.results.len(),
        "loaded result document"
    );

    Ok(LoadedDocument {
        source: path.to_path_buf(),
        document,
    })
}

/// Where and how to look for result files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Directory scanned for results.
    pub results_dir: PathBuf,
    /// Required file name prefix.
    pub prefix: String,
    /// Required file name suffix.
    pub suffix: String,
    /// File names containing this are skipped.
    pub exclude: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            prefix: RESULT_PREFIX.to_string(),
            suffix: RESULT_SUFFIX.to_string(),
            exclude: LATEST_MARKER.to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Default naming rules applied to another directory.
    pub fn with_results_dir(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            ..Self::default()
        }
    }

    /// Whether a file name qualifies as a result file.
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.len() >= self.prefix.len() + self.suffix.len()
            && file_name.starts_with(&self.prefix)
            && file_name.ends_with(&self.suffix)
            && (self.exclude.is_empty() || !file_name.contains(&self.exclude))
    }
}

/// List qualifying result files, oldest first by modification time.
///
/// Files with equal modification times are ordered by name. A missing
/// results directory yields an empty list.
pub fn discover_result_files(config: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let dir = &config.results_dir;
    let io_error = |source: io::Error| CompareError::Io {
        path: dir.clone(),
        source,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "results directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_error(e)),
    };

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !config.matches(name) || !path.is_file() {
            continue;
        }
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|source| CompareError::Io {
                path: path.clone(),
                source,
            })?;
        found.push((modified, path));
    }

    found.sort();
    debug!(dir = %dir.display(), count = found.len(), "discovered result files");
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Pick the two most recent result files as `(before, after)`.
pub fn discover_latest_pair(config: &DiscoveryConfig) -> Result<(PathBuf, PathBuf)> {
    let files = discover_result_files(config)?;
    match files.as_slice() {
        [.., before, after] => Ok((before.clone(), after.clone())),
        _ => Err(UsageError::TooFewResults {
            found: files.len(),
            dir: config.results_dir.clone(),
        }
        .into()),
    }
}
