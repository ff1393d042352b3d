// etlcheck CLI - verify an ETL run by reconciling source and destination CSVs

mod exit_codes;
mod logging;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{recon_exit_code, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "etlcheck")]
#[command(about = "Reconcile a source record set against a destination record set")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile SOURCE against DESTINATION and write one CSV per bucket
    #[command(after_help = "\
Examples:
  etlcheck run legacy_users.csv new_users.csv
  etlcheck run legacy_users.csv new_users.csv --out reports/ --json
  etlcheck run legacy.csv new.csv --config users.recon.toml --strict
  ETLCHECK_OUT_DIR=/tmp/recon etlcheck run legacy.csv new.csv")]
    Run {
        /// Source CSV (the records that should have been migrated)
        source: PathBuf,

        /// Destination CSV (the records actually present after migration)
        destination: PathBuf,

        /// Directory for bucket files
        #[arg(long, short = 'o', env = "ETLCHECK_OUT_DIR", default_value = "reconciliation")]
        out: PathBuf,

        /// Reconciliation config (.recon.toml); built-in defaults otherwise
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Override the key column
        #[arg(long)]
        key: Option<String>,

        /// Print the JSON summary to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON summary to a file
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Exit non-zero when any record is unmatched or mismatched
        #[arg(long)]
        strict: bool,

        /// Suppress the human summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a reconciliation config without running
    #[command(after_help = "\
Examples:
  etlcheck validate users.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            source,
            destination,
            out,
            config,
            key,
            json,
            summary,
            strict,
            quiet,
        } => recon::cmd_run(recon::RunOptions {
            source,
            destination,
            out,
            config,
            key,
            json,
            summary,
            strict,
            quiet,
        }),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<etlcheck_recon::ReconError> for CliError {
    fn from(err: etlcheck_recon::ReconError) -> Self {
        Self::new(recon_exit_code(&err), err.to_string())
    }
}
