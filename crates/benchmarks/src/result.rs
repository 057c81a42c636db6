// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark result document types.
//!
//! This module models the JSON documents written by the renderer benchmark
//! runner (`js-bench-<timestamp>.json`). The comparison only needs a small
//! part of each document, so everything beyond the required keys is optional
//! and unknown keys are ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Metric compared when none is requested explicitly.
pub const DEFAULT_METRIC: &str = "t2_roundtrip";

/// A full result document: run metadata plus one entry per fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDocument {
    /// Run metadata.
    pub meta: RunMeta,
    /// Per-fixture results, in the order the runner wrote them.
    pub results: Vec<FixtureResult>,
}

/// Metadata describing a single benchmark run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMeta {
    /// Which renderer layer was benchmarked (e.g. `js`).
    pub layer: String,
    /// ISO-8601 timestamp of the run.
    pub timestamp: String,
    /// Number of discarded warmup iterations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup_runs: Option<u64>,
    /// Number of measured iterations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bench_runs: Option<u64>,
    /// Node.js version used by the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_version: Option<String>,
    /// Host platform (e.g. `darwin`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Host architecture (e.g. `arm64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl RunMeta {
    /// Calendar date of the run, as `YYYY-MM-DD`.
    ///
    /// Accepts RFC 3339 timestamps as well as naive `YYYY-MM-DDTHH:MM:SS`
    /// ones. Anything else is cut to its first ten characters.
    pub fn run_date(&self) -> String {
        let raw = self.timestamp.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return ts.date_naive().to_string();
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return ts.date().to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.to_string();
        }
        raw.chars().take(10).collect()
    }

    /// Short `platform/arch` description, when the runner recorded one.
    pub fn host(&self) -> Option<String> {
        match (&self.platform, &self.arch) {
            (Some(platform), Some(arch)) => Some(format!("{platform}/{arch}")),
            (Some(platform), None) => Some(platform.clone()),
            (None, Some(arch)) => Some(arch.clone()),
            (None, None) => None,
        }
    }
}

/// Results for one benchmark fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureResult {
    /// Fixture name; the join key between two documents.
    pub fixture: String,
    /// Warm-run statistics.
    #[serde(default)]
    pub warm: WarmStats,
}

/// Named summary statistic of a sample set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// 50th percentile.
    #[default]
    Median,
    /// Arithmetic mean.
    Mean,
    /// 95th percentile.
    P95,
    /// 99th percentile.
    P99,
    /// Fastest sample.
    Min,
    /// Slowest sample.
    Max,
}

impl Statistic {
    /// Key used for this statistic in result documents.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Mean => "mean",
            Self::P95 => "p95",
            Self::P99 => "p99",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Short column label (`p50` for the median).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Median => "p50",
            other => other.key(),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a statistic name is not recognised.
#[derive(Debug, Clone, Error)]
#[error("unknown statistic '{0}' (expected: median|p50|mean|p95|p99|min|max)")]
pub struct ParseStatisticError(String);

impl FromStr for Statistic {
    type Err = ParseStatisticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "median" | "p50" => Ok(Self::Median),
            "mean" | "avg" => Ok(Self::Mean),
            "p95" => Ok(Self::P95),
            "p99" => Ok(Self::P99),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            _ => Err(ParseStatisticError(s.to_string())),
        }
    }
}

/// Summary statistics for one metric, in milliseconds.
///
/// Fields that are absent or not numbers are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricStats {
    /// Sample count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    /// Arithmetic mean.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    /// 50th percentile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// 95th percentile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
    /// 99th percentile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99: Option<f64>,
    /// Fastest sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Slowest sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Sample standard deviation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
    /// Coefficient of variation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<f64>,
}

impl MetricStats {
    fn from_object(object: &Map<String, Value>) -> Self {
        let number = |key: &str| object.get(key).and_then(Value::as_f64);
        Self {
            n: number("n"),
            mean: number("mean"),
            median: number("median"),
            p95: number("p95"),
            p99: number("p99"),
            min: number("min"),
            max: number("max"),
            stddev: number("stddev"),
            cv: number("cv"),
        }
    }

    /// Value of the given statistic, if recorded.
    pub fn value(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Median => self.median,
            Statistic::Mean => self.mean,
            Statistic::P95 => self.p95,
            Statistic::P99 => self.p99,
            Statistic::Min => self.min,
            Statistic::Max => self.max,
        }
    }
}

/// Warm-run statistics as written by the runner.
///
/// Runners emit either `{ "t2_roundtrip": { "median": .. }, .. }` or a flat
/// `{ "median": .., "p95": .. }` block, and may mix the two. Object-valued
/// entries are kept per metric name; numeric entries form the top-level block.
/// Which of the two applies is decided per metric by [`WarmStats::shape`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WarmStats {
    /// Stats keyed by metric name.
    #[serde(flatten)]
    pub by_metric: BTreeMap<String, MetricStats>,
    /// Top-level stats.
    #[serde(flatten)]
    pub top_level: MetricStats,
}

/// The stats block a metric resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WarmShape<'a> {
    /// The metric has its own stats block.
    NestedByMetric(&'a MetricStats),
    /// The metric is absent; the top-level stats apply.
    Flat(&'a MetricStats),
}

impl<'a> WarmShape<'a> {
    /// The resolved stats block.
    pub fn stats(self) -> &'a MetricStats {
        match self {
            Self::NestedByMetric(stats) | Self::Flat(stats) => stats,
        }
    }
}

impl WarmStats {
    /// Split a raw `warm` value into per-metric and top-level stats.
    ///
    /// Anything other than an object yields empty stats.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let by_metric = object
            .iter()
            .filter_map(|(name, stats)| {
                stats
                    .as_object()
                    .map(|stats| (name.clone(), MetricStats::from_object(stats)))
            })
            .collect();

        Self {
            by_metric,
            top_level: MetricStats::from_object(object),
        }
    }

    /// Resolve which stats block applies to `metric`.
    pub fn shape(&self, metric: &str) -> WarmShape<'_> {
        match self.by_metric.get(metric) {
            Some(stats) => WarmShape::NestedByMetric(stats),
            None => WarmShape::Flat(&self.top_level),
        }
    }

    /// Extract `statistic` for `metric`, or `0.0` when unavailable.
    pub fn statistic(&self, metric: &str, statistic: Statistic) -> f64 {
        self.shape(metric)
            .stats()
            .value(statistic)
            .unwrap_or(0.0)
    }

    /// Median of `metric`, or `0.0` when unavailable.
    pub fn median(&self, metric: &str) -> f64 {
        self.statistic(metric, Statistic::Median)
    }
}

impl<'de> Deserialize<'de> for WarmStats {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
