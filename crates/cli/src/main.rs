// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! bench-compare entry point.

fn main() {
    if let Err(e) = mdpreview_bench_cli::run() {
        std::process::exit(mdpreview_bench_cli::report_error(&e));
    }
}
