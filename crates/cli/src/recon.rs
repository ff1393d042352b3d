//! `etlcheck run` / `etlcheck validate` — source vs destination reconciliation.

use std::path::{Path, PathBuf};

use etlcheck_recon::load::load_record_set;
use etlcheck_recon::output::write_buckets;
use etlcheck_recon::{ReconConfig, ReconError, ReconResult};
use tracing::info;

use crate::exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_MISMATCH, EXIT_OUTPUT};
use crate::CliError;

pub struct RunOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub out: PathBuf,
    pub config: Option<PathBuf>,
    pub key: Option<String>,
    pub json: bool,
    pub summary: Option<PathBuf>,
    pub strict: bool,
    pub quiet: bool,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError::new(code, msg)
}

/// Read and validate a config file; built-in defaults when no path is given.
fn resolve_config(path: Option<&Path>, key: Option<String>) -> Result<ReconConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            let config_str = std::fs::read_to_string(path).map_err(|e| {
                recon_err(
                    EXIT_INVALID_CONFIG,
                    format!("cannot read config {}: {e}", path.display()),
                )
            })?;
            ReconConfig::from_toml(&config_str)?
        }
        None => ReconConfig::default(),
    };

    if let Some(key) = key {
        config.key = key;
        config.validate()?;
    }

    Ok(config)
}

fn load_input(path: &Path, label: &str) -> Result<etlcheck_recon::RecordSet, CliError> {
    load_record_set(path, label).map_err(|e| {
        let missing_header = matches!(e, ReconError::MissingHeader { .. });
        let err = CliError::from(e);
        if missing_header {
            err.with_hint(format!("{label} must start with a header row"))
        } else {
            err
        }
    })
}

pub fn cmd_run(opts: RunOptions) -> Result<(), CliError> {
    let config = resolve_config(opts.config.as_deref(), opts.key)?;

    let source = load_input(&opts.source, "source")?;
    let destination = load_input(&opts.destination, "destination")?;
    info!(
        source = source.len(),
        destination = destination.len(),
        key = %config.key,
        "inputs loaded"
    );

    let result = etlcheck_recon::run(&config, &source, &destination);

    let written = write_buckets(
        &opts.out,
        &result.buckets,
        &config.output,
        &source.headers,
        &destination.headers,
    )
    .map_err(|e| recon_err(EXIT_OUTPUT, e.to_string()))?;

    if opts.json || opts.summary.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = opts.summary {
            std::fs::write(path, &json_str).map_err(|e| {
                recon_err(EXIT_OUTPUT, format!("cannot write {}: {e}", path.display()))
            })?;
            if !opts.quiet {
                eprintln!("wrote {}", path.display());
            }
        }

        if opts.json {
            println!("{json_str}");
        }
    }

    if !opts.quiet {
        print_summary(&result, written.len(), &opts.out);
    }

    if opts.strict && !result.summary.is_clean() {
        return Err(recon_err(
            EXIT_MISMATCH,
            format!(
                "{} unmatched, {} with mismatches",
                result.summary.unmatched, result.summary.records_with_mismatch
            ),
        ));
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &ReconResult, files: usize, out: &Path) {
    let s = &result.summary;
    eprintln!(
        "reconciled {} source against {} destination records on '{}': {} fully matched, {} with mismatches, {} unmatched",
        s.source_records,
        s.destination_records,
        result.meta.key_field,
        s.fully_matched,
        s.records_with_mismatch,
        s.unmatched,
    );

    let width = s.buckets.iter().map(|b| b.bucket.len()).max().unwrap_or(0);
    for b in &s.buckets {
        eprintln!("  {:<width$}  {}", b.bucket, b.records);
    }

    if s.skipped_rows > 0 {
        eprintln!("skipped {} malformed row(s)", s.skipped_rows);
    }
    if s.duplicate_destination_keys > 0 {
        eprintln!(
            "{} duplicate destination key(s); later rows were used",
            s.duplicate_destination_keys
        );
    }

    eprintln!("wrote {} file(s) to {}", files, out.display());
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = resolve_config(Some(&config_path), None)?;
    let columns: Vec<&str> = config.compare.iter().map(|c| c.column.as_str()).collect();
    eprintln!(
        "valid: '{}' keyed on '{}', comparing {}",
        config.name,
        config.key,
        columns.join(", "),
    );
    Ok(())
}
