#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use tmpl_cli::args::CliArgs;
use tmpl_cli::config::{find_config, resolve_settings};
use tmpl_cli::driver::{compile, discover_inputs};
use tmpl_cli::reporter::Reporter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_TRANSLATION_FAILED: i32 = 1;

fn main() -> Result<()> {
    // TMPL_LOG / TMPL_LOG_FORMAT, see tracing_config.rs
    tmpl_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let config = find_config(&args, &cwd)?;
    let settings = resolve_settings(&args, config, &cwd);
    let inputs = discover_inputs(&args.inputs)?;

    if args.list_files {
        for input in &inputs {
            println!("{}", input.display());
        }
        return Ok(());
    }

    let result = compile(&settings, &inputs)?;
    let color = args
        .pretty
        .unwrap_or_else(|| std::io::stderr().is_terminal());
    let reporter = Reporter::new(color);
    if !result.diagnostics.is_empty() {
        eprintln!("{}", reporter.render(&result.diagnostics));
        eprintln!();
        eprintln!("{}", reporter.format_summary(&result.diagnostics));
    }
    tracing::debug!(
        read = result.files_read.len(),
        written = result.written.len(),
        "done"
    );

    let code = if result.diagnostics.has_errors() {
        EXIT_TRANSLATION_FAILED
    } else {
        EXIT_SUCCESS
    };
    std::process::exit(code);
}
