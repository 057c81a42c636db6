// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal and JSON rendering of a [`Comparison`].

use crate::compare::{Comparison, FixtureDelta, RunInfo, Row, Status};
use colored::Colorize;
use std::io::{self, Write};

/// Symbol set used for arrows and rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Glyphs {
    /// `▲ ▼ ─`
    #[default]
    Unicode,
    /// `^ v -`
    Ascii,
}

impl Glyphs {
    fn up(self) -> &'static str {
        match self {
            Self::Unicode => "▲",
            Self::Ascii => "^",
        }
    }

    fn down(self) -> &'static str {
        match self {
            Self::Unicode => "▼",
            Self::Ascii => "v",
        }
    }

    fn rule(self) -> &'static str {
        match self {
            Self::Unicode => "─",
            Self::Ascii => "-",
        }
    }
}

/// How the text report should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    /// Arrow and rule symbols.
    pub glyphs: Glyphs,
    /// Colour status labels with ANSI escapes.
    pub color: bool,
}

const RULE_WIDTH: usize = 76;

/// Describe a fixture's change, e.g. `▲20.0% (+20.0ms)`.
///
/// A zero baseline has no meaningful percentage and renders as `N/A`;
/// identical values render with `=`.
pub fn format_delta(delta: &FixtureDelta, glyphs: Glyphs) -> String {
    let Some(pct) = delta.pct else {
        return "N/A".to_string();
    };
    // -0.0 would otherwise print as "-0.0ms" next to "=".
    let delta_ms = if delta.delta_ms == 0.0 { 0.0 } else { delta.delta_ms };
    let arrow = if delta_ms > 0.0 {
        glyphs.up()
    } else if delta_ms < 0.0 {
        glyphs.down()
    } else {
        "="
    };
    format!("{arrow}{:.1}% ({delta_ms:+.1}ms)", pct.abs())
}

/// Summary line, e.g. `Regressions: 1  Improvements: 0`.
pub fn summary_line(comparison: &Comparison) -> String {
    format!(
        "Regressions: {}  Improvements: {}",
        comparison.regressions, comparison.improvements
    )
}

fn source_name(run: &RunInfo) -> &str {
    run.source.as_deref().unwrap_or("(input)")
}

fn paint_status(status: Status, color: bool) -> String {
    let padded = format!("{:>8}", status.label());
    if !color {
        return padded;
    }
    match status {
        Status::Regression => padded.red().bold().to_string(),
        Status::Improvement => padded.green().bold().to_string(),
        Status::Unchanged => padded.dimmed().to_string(),
    }
}

/// Write the human-readable report table.
pub fn write_text<W: Write>(out: &mut W, comparison: &Comparison, style: &TextStyle) -> io::Result<()> {
    let before = &comparison.before;
    let after = &comparison.after;

    if !comparison.layers_match() {
        let warning = format!(
            "Warning: comparing different layers ({} vs {})",
            before.layer, after.layer
        );
        if style.color {
            writeln!(out, "{}", warning.yellow())?;
        } else {
            writeln!(out, "{warning}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Layer: {}", before.layer)?;
    writeln!(out, "Before: {}  ({})", source_name(before), before.date)?;
    writeln!(out, "After:  {}  ({})", source_name(after), after.date)?;
    writeln!(
        out,
        "Metric: {} {} (threshold {:.1}%)",
        comparison.metric,
        comparison.statistic.label(),
        comparison.threshold_pct
    )?;
    writeln!(out)?;

    let label = comparison.statistic.label();
    writeln!(
        out,
        "  {:<24} {:>10} {:>10} {:>20} {:>8}",
        "Fixture",
        format!("Before {label}"),
        format!("After {label}"),
        "Delta",
        "Status"
    )?;
    writeln!(out, "  {}", style.glyphs.rule().repeat(RULE_WIDTH))?;

    for row in &comparison.rows {
        match row {
            Row::Missing { fixture, .. } => {
                writeln!(out, "  {:<24} {:>10}", fixture, "(missing)")?;
            }
            Row::Compared(delta) => {
                writeln!(
                    out,
                    "  {:<24} {:>9.1}ms {:>9.1}ms {:>20} {}",
                    delta.fixture,
                    delta.before_ms,
                    delta.after_ms,
                    format_delta(delta, style.glyphs),
                    paint_status(delta.status, style.color)
                )?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "  {}", summary_line(comparison))?;
    Ok(())
}

/// Write the comparison as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, comparison: &Comparison) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, comparison).map_err(io::Error::from)?;
    writeln!(out)
}
