// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown output generation for comparisons.
//!
//! Produces a report suitable for pasting into a pull request or a CI job
//! summary.

use crate::compare::{Comparison, RunInfo, Row, Side};
use crate::report::{format_delta, summary_line, Glyphs};
use std::io::{self, Write};

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn run_row<W: Write>(out: &mut W, label: &str, run: &RunInfo) -> io::Result<()> {
    writeln!(
        out,
        "| {} | {} | {} | {} | {} |",
        label,
        cell(run.source.as_deref().unwrap_or("-")),
        run.date,
        cell(run.host.as_deref().unwrap_or("-")),
        cell(run.node_version.as_deref().unwrap_or("-")),
    )
}

/// Write the comparison as a markdown document.
pub fn write_markdown<W: Write>(out: &mut W, comparison: &Comparison, glyphs: Glyphs) -> io::Result<()> {
    writeln!(out, "# Benchmark Comparison")?;
    writeln!(out)?;
    writeln!(out, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(out)?;

    if !comparison.layers_match() {
        writeln!(
            out,
            "> **Warning:** comparing different layers (`{}` vs `{}`)",
            comparison.before.layer, comparison.after.layer
        )?;
        writeln!(out)?;
    }

    writeln!(out, "| Run | File | Date | Host | Node |")?;
    writeln!(out, "|-----|------|------|------|------|")?;
    run_row(out, "Before", &comparison.before)?;
    run_row(out, "After", &comparison.after)?;
    writeln!(out)?;

    let label = comparison.statistic.label();
    writeln!(
        out,
        "## Results (`{}` {}, threshold {:.1}%)",
        comparison.metric, label, comparison.threshold_pct
    )?;
    writeln!(out)?;
    writeln!(out, "| Fixture | Before {label} | After {label} | Delta | Status |")?;
    writeln!(out, "|---------|-----------:|----------:|------:|--------|")?;

    for row in &comparison.rows {
        match row {
            Row::Missing {
                fixture,
                missing_from,
            } => {
                let side = match missing_from {
                    Side::Before => "before",
                    Side::After => "after",
                };
                writeln!(
                    out,
                    "| {} | (missing) | | | not in {} |",
                    cell(fixture),
                    side
                )?;
            }
            Row::Compared(delta) => {
                writeln!(
                    out,
                    "| {} | {:.1}ms | {:.1}ms | {} | {} |",
                    cell(&delta.fixture),
                    delta.before_ms,
                    delta.after_ms,
                    format_delta(delta, glyphs),
                    delta.status.label()
                )?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out, "{}", summary_line(comparison))?;
    Ok(())
}
