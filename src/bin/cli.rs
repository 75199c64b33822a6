// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Objslim Contributors

//! objslim CLI

use anyhow::{ensure, Result};
use clap::Parser;
use objslim::cli::{summary, Reporter, RunStats};
use objslim::config::{default_workers, Config};
use objslim::io::write_sink;
use objslim::process::{Pipeline, StageTiming};
use objslim::utils::file_basename;
use objslim::{parse_file, write_file, ParseOptions, APP_NAME, APP_VERSION};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "objslim")]
#[command(version)]
#[command(about = "Removes duplicate geometry from Wavefront OBJ files and merges meshes by material", long_about = None)]
struct Cli {
    /// Input OBJ file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file. Defaults to <input>.simplified.<ext>
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Epsilon for float comparisons
    #[arg(long, default_value_t = 1e-6)]
    epsilon: f64,

    /// Number of scan workers
    #[arg(long, default_value_t = default_workers())]
    workers: usize,

    /// Error out on malformed payloads instead of truncating them
    #[arg(long)]
    strict: bool,

    /// Write the document to stdout, directing all logging to stderr
    #[arg(long)]
    stdout: bool,

    /// Silence all logging
    #[arg(short, long)]
    quiet: bool,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Skip the duplicate removal pass
    #[arg(long)]
    no_duplicates: bool,

    /// Skip the material merge pass
    #[arg(long)]
    no_merge: bool,

    /// Gzip compression level for the output, 1 (best speed) to 9 (best compression)
    #[arg(long, value_name = "LEVEL")]
    gzip: Option<u32>,
}

/// Run parameters echoed at startup.
#[derive(Serialize)]
struct Banner<'a> {
    input: &'a Path,
    output: Option<&'a Path>,
    #[serde(flatten)]
    config: &'a Config,
}

fn main() -> Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config {
        epsilon: cli.epsilon,
        strict: cli.strict,
        workers: cli.workers,
        dedup: !cli.no_duplicates,
        merge: !cli.no_merge,
        gzip: cli.gzip,
        quiet: cli.quiet,
        no_progress: cli.no_progress,
    };
    config.validate()?;
    let reporter = Reporter::new(config.quiet, cli.stdout);

    ensure!(
        cli.input.exists(),
        "Input file {:?} does not exist",
        cli.input
    );
    let output = if cli.stdout {
        None
    } else {
        Some(match cli.output.clone() {
            Some(path) => path,
            None => derive_output_path(&cli.input),
        })
    };
    if let Some(output) = &output {
        ensure!(
            !same_file(&cli.input, output),
            "Overwriting the input file is not allowed, both input and output point to {:?}",
            cli.input
        );
    }

    let banner = serde_json::to_string_pretty(&Banner {
        input: &cli.input,
        output: output.as_deref(),
        config: &config,
    })?;
    reporter.info(&format!("\n{} v{} {}", APP_NAME, APP_VERSION, banner));

    let total_started = Instant::now();
    let mut timings = Vec::new();

    let step_started = Instant::now();
    let options = ParseOptions {
        strict: config.strict,
        default_object: Some(file_basename(&cli.input)),
    };
    let parsed = parse_file(&cli.input, &options)?;
    let mut document = parsed.document;
    timings.push(StageTiming {
        step: "Parse".to_string(),
        duration: step_started.elapsed(),
    });

    // the summary reports declared counts, not the synthetic splits
    let mut pre = document.stats();
    pre.objects = parsed.objects;
    pre.groups = parsed.groups;

    timings.extend(Pipeline::standard().run(&mut document, &config, &reporter)?);

    let step_started = Instant::now();
    let lines_written = match &output {
        Some(path) => write_file(&document, path, config.gzip)?,
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            let lines = write_sink(&document, &mut lock, config.gzip)?;
            lock.flush()?;
            lines
        }
    };
    timings.push(StageTiming {
        step: "Write".to_string(),
        duration: step_started.elapsed(),
    });

    let stats = RunStats {
        timings,
        total: total_started.elapsed(),
        pre,
        post: document.stats(),
        lines_parsed: parsed.lines,
        lines_written,
        input: cli.input,
        output,
    };
    summary::report(&reporter, &stats);

    if let Some(level) = config.gzip {
        reporter.blank();
        reporter.info(&format!("Gzip compression enabled with level {}.", level));
        reporter.info(
            "Remember to set 'Content-Encoding: gzip' header if you are hosting this file over HTTP.",
        );
    }
    reporter.blank();
    Ok(())
}

/// `scene.obj` becomes `scene.simplified.obj`, an extensionless name just
/// gains the `.simplified` suffix.
fn derive_output_path(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) => input.with_extension(format!("simplified.{}", ext.to_string_lossy())),
        None => {
            let mut path = input.as_os_str().to_owned();
            path.push(".simplified");
            PathBuf::from(path)
        }
    }
}

fn same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (std::path::absolute(input), std::path::absolute(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
