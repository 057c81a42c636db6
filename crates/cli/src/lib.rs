// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for comparing markdown renderer benchmark results.
//!
//! `bench-compare` takes either two result files or none. With none it picks
//! the two most recent runs from the results directory.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use mdpreview_bench::compare::DEFAULT_THRESHOLD_PCT;
use mdpreview_bench::io::default_results_dir;
use mdpreview_bench::markdown::write_markdown;
use mdpreview_bench::report::{self, Glyphs, TextStyle};
use mdpreview_bench::result::DEFAULT_METRIC;
use mdpreview_bench::{
    discover_latest_pair, load_document, CompareError, CompareOptions, DiscoveryConfig,
    ResultComparator, Statistic, UsageError,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Name of the installed binary.
pub const BIN_NAME: &str = "bench-compare";

/// One-line usage text.
pub fn usage_line() -> String {
    format!("Usage: {BIN_NAME} [<before.json> <after.json>]")
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned terminal table.
    Text,
    /// Markdown document.
    Markdown,
    /// Pretty-printed JSON.
    Json,
}

/// When to colour status labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Only when stdout is a terminal.
    Auto,
    /// Always.
    Always,
    /// Never.
    Never,
}

/// Compare two renderer benchmark result files.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// `<before.json> <after.json>`, or nothing to compare the two most recent results.
    #[arg(value_name = "RESULT")]
    pub files: Vec<PathBuf>,

    /// Directory searched when no files are given.
    #[arg(long, value_name = "DIR", default_value_os_t = default_results_dir())]
    pub results_dir: PathBuf,

    /// Metric to compare within nested warm stats.
    #[arg(long, default_value = DEFAULT_METRIC)]
    pub metric: String,

    /// Statistic of the metric to compare (median, mean, p95, p99, min, max).
    #[arg(long = "stat", value_name = "STAT", default_value = "median")]
    pub statistic: Statistic,

    /// Percentage change that must be exceeded to count as a regression or improvement.
    #[arg(long, value_name = "PCT", default_value_t = DEFAULT_THRESHOLD_PCT, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Use plain ASCII arrows and rules.
    #[arg(long)]
    pub ascii: bool,

    /// Colour status labels.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Log more to stderr (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging entirely.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|e| format!("invalid threshold '{s}': {e}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("threshold must be a non-negative number, got '{s}'"));
    }
    Ok(value)
}

impl Cli {
    /// Discovery settings for auto mode.
    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig::with_results_dir(&self.results_dir)
    }

    /// Comparator settings.
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            metric: self.metric.clone(),
            statistic: self.statistic,
            threshold_pct: self.threshold,
        }
    }

    fn glyphs(&self) -> Glyphs {
        if self.ascii {
            Glyphs::Ascii
        } else {
            Glyphs::Unicode
        }
    }
}

/// How the two inputs were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Named on the command line.
    Explicit,
    /// Discovered in the results directory.
    Auto,
}

/// The pair of files to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    /// Baseline result file.
    pub before: PathBuf,
    /// Candidate result file.
    pub after: PathBuf,
    /// How they were chosen.
    pub selection: Selection,
}

/// Decide which two files to compare from the positional arguments.
///
/// # Errors
///
/// Any count other than zero or two is a usage error, as is auto mode finding
/// fewer than two result files.
pub fn resolve_inputs(
    files: &[PathBuf],
    discovery: &DiscoveryConfig,
) -> mdpreview_bench::Result<Inputs> {
    match files {
        [] => {
            let (before, after) = discover_latest_pair(discovery)?;
            Ok(Inputs {
                before,
                after,
                selection: Selection::Auto,
            })
        }
        [before, after] => Ok(Inputs {
            before: before.clone(),
            after: after.clone(),
            selection: Selection::Explicit,
        }),
        other => Err(UsageError::ArgumentCount(other.len()).into()),
    }
}

/// Run a parsed command line, writing the report to `out`.
pub fn execute<W: Write>(cli: &Cli, out: &mut W, color: bool) -> Result<()> {
    let inputs = resolve_inputs(&cli.files, &cli.discovery())?;
    debug!(before = %inputs.before.display(), after = %inputs.after.display(), selection = ?inputs.selection, "resolved inputs");

    // Both documents are loaded before anything is written.
    let before = load_document(&inputs.before)?;
    let after = load_document(&inputs.after)?;
    let comparison = ResultComparator::new(cli.compare_options()).compare(&before, &after);

    if inputs.selection == Selection::Auto {
        info!(
            before = %before.display_name(),
            after = %after.display_name(),
            "auto-selected last two results"
        );
    }

    match cli.format {
        OutputFormat::Text => {
            if inputs.selection == Selection::Auto {
                writeln!(out, "Auto-selected: comparing last two results")?;
            }
            let style = TextStyle {
                glyphs: cli.glyphs(),
                color,
            };
            report::write_text(out, &comparison, &style)?;
        }
        OutputFormat::Markdown => write_markdown(out, &comparison, cli.glyphs())?,
        OutputFormat::Json => report::write_json(out, &comparison)?,
    }

    out.flush()?;
    Ok(())
}

/// Install the stderr log subscriber.
///
/// The filter comes from the flags alone; stdout is reserved for the report.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "off"
    } else {
        match verbose {
            0 => "error",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::new(format!(
        "mdpreview_bench={level},mdpreview_bench_cli={level}"
    ));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
    {
        // An embedding program or test harness already owns the global subscriber.
        debug!("keeping existing log subscriber: {err}");
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` once the report is written, or when the reader of stdout
/// went away early.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let stdout = io::stdout();
    let color = match cli.color {
        ColorChoice::Auto => stdout.is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    colored::control::set_override(color);

    let mut handle = stdout.lock();
    match execute(&cli, &mut handle, color) {
        Err(err) if is_broken_pipe(&err) => Ok(()),
        other => other,
    }
}

/// Print `err` for the user and return the process exit code.
///
/// Usage problems go to stdout together with the usage line; everything else
/// goes to stderr.
pub fn report_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CompareError>() {
        Some(CompareError::Usage(usage)) => {
            if let UsageError::TooFewResults { .. } = usage {
                println!("{usage}");
            }
            println!("{}", usage_line());
        }
        _ => eprintln!("Error: {err}"),
    }
    1
}
