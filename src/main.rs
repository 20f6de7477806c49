//! # pmxtract
//!
//! A command-line tool for extracting filtered counter records from 3GPP
//! PM measurement files.
//!
//! ## Usage
//!
//! ```bash
//! # One file to Excel
//! pmxtract -f A20230301.1400+0200.xml -o excel
//!
//! # A directory to SQLite, keeping one measurement group
//! pmxtract -d ./pm_files -i UtranCell -o sqlite --output-file cells.db
//!
//! # Two object instances, eight workers, CSV
//! pmxtract -d ./pm_files --obj-ldn cell1 --obj-ldn cell2 -w 8 -o csv
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use pmxtract::config::{
    FileConfig, InputSelection, PipelineConfig, DEFAULT_FILE_PATTERN,
};
use pmxtract::dispatch::{DispatchOptions, Dispatcher, RunOutcome};
use pmxtract::filter::RecordFilter;
use pmxtract::sink::OutputKind;

/// pmxtract - 3GPP PM Measurement Extractor
#[derive(Parser)]
#[command(name = "pmxtract")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Single PM file to process
    #[arg(short = 'f', long, value_name = "FILE", conflicts_with = "dir")]
    file: Option<PathBuf>,

    /// Directory containing PM files
    #[arg(short = 'd', long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Filename pattern for directory input
    #[arg(long, value_name = "REGEX")]
    pattern: Option<String>,

    /// Measurement info ID to keep
    #[arg(short = 'i', long, value_name = "ID")]
    meas_info_id: Option<String>,

    /// P value to keep
    #[arg(short = 'p', long, value_name = "N")]
    p_value: Option<u32>,

    /// Object LDN to keep (repeatable)
    #[arg(long = "obj-ldn", value_name = "LDN")]
    obj_ldn: Vec<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputKind>,

    /// Output file path (defaults to pm_data.<ext>)
    #[arg(long, value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Number of worker threads (default: available parallelism)
    #[arg(short = 'w', long, value_name = "N")]
    workers: Option<usize>,

    /// Overall run deadline in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Abandon the run after this many file failures
    #[arg(long, value_name = "N")]
    fail_fast_after: Option<usize>,

    /// TOML file with default settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json_summary: bool,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let defaults = match cli.config {
        Some(ref path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let input = match (cli.file, cli.dir) {
        (Some(file), None) => InputSelection::File(file),
        (None, Some(dir)) => InputSelection::Directory(dir),
        (None, None) => anyhow::bail!("no input file or directory specified"),
        (Some(_), Some(_)) => unreachable!("clap rejects conflicting inputs"),
    };

    let config = PipelineConfig {
        input,
        pattern: cli
            .pattern
            .or(defaults.extract.pattern)
            .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string()),
        filter: RecordFilter {
            meas_info_id: cli.meas_info_id,
            p_value: cli.p_value,
            obj_ldns: cli.obj_ldn.into_iter().collect::<HashSet<_>>(),
        },
        workers: cli.workers.or(defaults.extract.workers),
        timeout_secs: cli.timeout_secs.or(defaults.extract.timeout_secs),
        fail_fast_after: cli.fail_fast_after.or(defaults.extract.fail_fast_after),
    };
    config.validate().context("invalid configuration")?;

    let files = config.collect_files().context("input enumeration failed")?;
    info!("Processing {} files", files.len());

    let output_kind = cli
        .output
        .or(defaults.extract.output)
        .unwrap_or(OutputKind::Excel);
    let output_path = cli
        .output_file
        .unwrap_or_else(|| PathBuf::from(format!("pm_data.{}", output_kind.extension())));

    let mut sink = pmxtract::sink::create(output_kind, &output_path)
        .with_context(|| format!("failed to open sink {}", output_path.display()))?;

    let dispatcher = Dispatcher::new(DispatchOptions {
        workers: config.workers,
        timeout: config.timeout_secs.map(std::time::Duration::from_secs),
        fail_fast_after: config.fail_fast_after,
        ..Default::default()
    });

    let summary = dispatcher
        .run(&files, &config.filter, sink.as_mut())
        .context("extraction run failed")?;

    if cli.json_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} of {} files succeeded, {} failed, {} records written to {}",
            summary.succeeded,
            summary.files_attempted,
            summary.failed,
            summary.records_written,
            output_path.display()
        );
        for (path, status) in &summary.statuses {
            if let pmxtract::dispatch::FileStatus::Failed { error } = status {
                eprintln!("  {path}: {error}");
            }
        }
    }

    if summary.outcome == RunOutcome::Failed {
        anyhow::bail!("every input file failed; no records written");
    }

    Ok(())
}
