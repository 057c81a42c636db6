// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Before/after comparison of two result documents.
//!
//! [`ResultComparator::compare`] aligns fixtures by name, extracts one scalar
//! per fixture and classifies the relative change. The outcome is a plain
//! [`Comparison`] value; rendering lives in [`crate::report`].

use crate::io::LoadedDocument;
use crate::result::{FixtureResult, ResultDocument, Statistic, DEFAULT_METRIC};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Relative change (in percent) beyond which a fixture counts as changed.
pub const DEFAULT_THRESHOLD_PCT: f64 = 5.0;

/// What to compare and how strict to be.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Metric name inside nested warm stats.
    pub metric: String,
    /// Statistic of that metric to compare.
    pub statistic: Statistic,
    /// Exclusive threshold, in percent.
    pub threshold_pct: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            metric: DEFAULT_METRIC.to_string(),
            statistic: Statistic::Median,
            threshold_pct: DEFAULT_THRESHOLD_PCT,
        }
    }
}

/// Classification of a fixture's change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Slower by more than the threshold.
    Regression,
    /// Faster by more than the threshold.
    Improvement,
    /// Within the threshold either way.
    Unchanged,
}

impl Status {
    /// Classify a percentage change. Both bounds are exclusive.
    pub fn classify(pct: f64, threshold_pct: f64) -> Self {
        if pct > threshold_pct {
            Self::Regression
        } else if pct < -threshold_pct {
            Self::Improvement
        } else {
            Self::Unchanged
        }
    }

    /// Short report label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Regression => "REGR",
            Self::Improvement => "IMPR",
            Self::Unchanged => "SAME",
        }
    }
}

/// Which document a fixture was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The baseline document.
    Before,
    /// The candidate document.
    After,
}

/// Change of one fixture present in both documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureDelta {
    /// Fixture name.
    pub fixture: String,
    /// Baseline value in milliseconds.
    pub before_ms: f64,
    /// Candidate value in milliseconds.
    pub after_ms: f64,
    /// `after_ms - before_ms`.
    pub delta_ms: f64,
    /// Relative change in percent; `None` when the baseline is zero.
    pub pct: Option<f64>,
    /// Classification against the threshold.
    pub status: Status,
}

impl FixtureDelta {
    /// Compute the delta between two values.
    pub fn new(fixture: impl Into<String>, before_ms: f64, after_ms: f64, threshold_pct: f64) -> Self {
        let delta_ms = after_ms - before_ms;
        let pct = (before_ms != 0.0).then(|| delta_ms / before_ms * 100.0);
        Self {
            fixture: fixture.into(),
            before_ms,
            after_ms,
            delta_ms,
            pct,
            status: Status::classify(pct.unwrap_or(0.0), threshold_pct),
        }
    }
}

/// One line of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    /// Fixture present in only one of the documents.
    Missing {
        /// Fixture name.
        fixture: String,
        /// The document that lacks it.
        missing_from: Side,
    },
    /// Fixture present in both documents.
    Compared(FixtureDelta),
}

impl Row {
    /// Fixture name of this row.
    pub fn fixture(&self) -> &str {
        match self {
            Self::Missing { fixture, .. } => fixture,
            Self::Compared(delta) => &delta.fixture,
        }
    }

    /// Classification, for compared rows.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Missing { .. } => None,
            Self::Compared(delta) => Some(delta.status),
        }
    }
}

/// Identifying details of one side of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    /// File name the document was read from, if any.
    pub source: Option<String>,
    /// Benchmarked layer.
    pub layer: String,
    /// Run date (`YYYY-MM-DD`).
    pub date: String,
    /// `platform/arch`, when recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Node.js version, when recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_version: Option<String>,
}

impl RunInfo {
    fn from_document(document: &ResultDocument, source: Option<String>) -> Self {
        Self {
            source,
            layer: document.meta.layer.clone(),
            date: document.meta.run_date(),
            host: document.meta.host(),
            node_version: document.meta.node_version.clone(),
        }
    }
}

/// Full outcome of comparing two documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Baseline run.
    pub before: RunInfo,
    /// Candidate run.
    pub after: RunInfo,
    /// Compared metric.
    pub metric: String,
    /// Compared statistic.
    pub statistic: Statistic,
    /// Threshold used for classification.
    pub threshold_pct: f64,
    /// One row per fixture, sorted by name.
    pub rows: Vec<Row>,
    /// Number of regressed fixtures.
    pub regressions: usize,
    /// Number of improved fixtures.
    pub improvements: usize,
}

impl Comparison {
    /// Whether both documents benchmarked the same layer.
    pub fn layers_match(&self) -> bool {
        self.before.layer == self.after.layer
    }

    /// Whether any fixture regressed.
    pub fn has_regressions(&self) -> bool {
        self.regressions > 0
    }

    /// Number of fixtures present in only one document.
    pub fn missing(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, Row::Missing { .. }))
            .count()
    }
}

/// Compares result documents fixture by fixture.
#[derive(Debug, Clone, Default)]
pub struct ResultComparator {
    options: CompareOptions,
}

impl ResultComparator {
    /// Create a comparator with the given options.
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two loaded documents, recording their file names.
    pub fn compare(&self, before: &LoadedDocument, after: &LoadedDocument) -> Comparison {
        self.compare_with_sources(
            &before.document,
            Some(before.display_name()),
            &after.document,
            Some(after.display_name()),
        )
    }

    /// Compare two in-memory documents.
    pub fn compare_documents(&self, before: &ResultDocument, after: &ResultDocument) -> Comparison {
        self.compare_with_sources(before, None, after, None)
    }

    fn compare_with_sources(
        &self,
        before: &ResultDocument,
        before_source: Option<String>,
        after: &ResultDocument,
        after_source: Option<String>,
    ) -> Comparison {
        if before.meta.layer != after.meta.layer {
            warn!(
                before = %before.meta.layer,
                after = %after.meta.layer,
                "comparing results from different layers"
            );
        }

        let before_by_name = index_by_fixture(before);
        let after_by_name = index_by_fixture(after);

        let names: BTreeSet<&str> = before_by_name
            .keys()
            .chain(after_by_name.keys())
            .copied()
            .collect();

        let mut rows = Vec::with_capacity(names.len());
        let mut regressions = 0;
        let mut improvements = 0;

        for name in names {
            let (b, a) = match (before_by_name.get(name), after_by_name.get(name)) {
                (Some(b), Some(a)) => (b, a),
                (Some(_), None) => {
                    rows.push(Row::Missing {
                        fixture: name.to_string(),
                        missing_from: Side::After,
                    });
                    continue;
                }
                _ => {
                    rows.push(Row::Missing {
                        fixture: name.to_string(),
                        missing_from: Side::Before,
                    });
                    continue;
                }
            };

            let delta = FixtureDelta::new(
                name,
                self.extract(b),
                self.extract(a),
                self.options.threshold_pct,
            );
            match delta.status {
                Status::Regression => regressions += 1,
                Status::Improvement => improvements += 1,
                Status::Unchanged => {}
            }
            debug!(fixture = name, before = delta.before_ms, after = delta.after_ms, status = ?delta.status, "compared fixture");
            rows.push(Row::Compared(delta));
        }

        Comparison {
            before: RunInfo::from_document(before, before_source),
            after: RunInfo::from_document(after, after_source),
            metric: self.options.metric.clone(),
            statistic: self.options.statistic,
            threshold_pct: self.options.threshold_pct,
            rows,
            regressions,
            improvements,
        }
    }

    fn extract(&self, result: &FixtureResult) -> f64 {
        result
            .warm
            .statistic(&self.options.metric, self.options.statistic)
    }
}

// Later entries overwrite earlier ones with the same name.
fn index_by_fixture(document: &ResultDocument) -> HashMap<&str, &FixtureResult> {
    document
        .results
        .iter()
        .map(|result| (result.fixture.as_str(), result))
        .collect()
}
