//! qdoc CLI.
//!
//! Generates Markdown API documentation from `@`-tagged Lua comments.

mod error;
mod output;
mod process;
mod targets;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use qdoc_config::{CliSettings, Config};
use qdoc_core::RenderOptions;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::output::Output;
use crate::process::Summary;
use crate::targets::OutputNaming;

/// Markdown documentation from Lua comments.
#[derive(Parser)]
#[command(name = "qdoc")]
#[command(about = "Generate Markdown documentation from Lua comments")]
#[command(version)]
struct Cli {
    /// Glob patterns selecting input files [default: *.lua]
    #[arg(value_name = "GLOB")]
    patterns: Vec<String>,

    /// Write all output files into this directory
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output file name (without extension) placed next to each input
    #[arg(long, value_name = "NAME")]
    base: Option<String>,

    /// Output file extension
    #[arg(long, value_name = "EXT")]
    ext: Option<String>,

    /// Do not emit a table of contents
    #[arg(long = "no-toc", visible_alias = "notoc")]
    no_toc: bool,

    /// Path to configuration file (default: auto-discover qdoc.toml)
    #[arg(short, long, env = "QDOC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> CliSettings {
        CliSettings {
            patterns: self.patterns.clone(),
            output_dir: self.output_dir.clone(),
            base: self.base.clone(),
            ext: self.ext.clone(),
            toc: self.no_toc.then_some(false),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new();
    let config = match Config::load(cli.config.as_deref(), Some(&cli.settings())) {
        Ok(config) => config,
        Err(e) => {
            output.failure(&CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    let summary = process_all(&config, &output);
    output.summary(&summary);
    if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Process every selected file, reporting per-file failures without stopping.
fn process_all(config: &Config, output: &Output) -> Summary {
    let output_config = &config.output_resolved;
    if output_config.dir.is_some() && output_config.base.is_some() {
        tracing::warn!("Output directory is set; ignoring base name");
        output.warning("--base is ignored when an output directory is set");
    }

    let naming = OutputNaming::new(output_config);
    let options = RenderOptions {
        toc: config.render.toc,
    };
    let mut summary = Summary::default();

    let expansion = targets::expand_patterns(&config.input.patterns);
    for err in &expansion.errors {
        output.failure(err);
        summary.record_failure();
    }

    for input in &expansion.files {
        let target = naming.output_path(input);
        match process::process_file(input, &target, &options) {
            Ok(outcome) => {
                output.outcome(input, &outcome);
                summary.record(&outcome);
            }
            Err(e) => {
                output.failure(&e);
                summary.record_failure();
            }
        }
    }

    summary
}
