//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (mismatches alone do not fail a run)         |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args; emitted by clap)          |
//! | 3    | Input file missing or unreadable                     |
//! | 4    | Input file empty (no header row) or undecodable      |
//! | 5    | Invalid config                                       |
//! | 6    | Output could not be written                          |
//! | 7    | `--strict` and unmatched/mismatched records found    |

use etlcheck_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments. Clap exits with this code on its own.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

/// Source or destination path does not resolve to a readable file.
pub const EXIT_INPUT_NOT_FOUND: u8 = 3;

/// Input has no header row, or its bytes are not valid CSV/UTF-8.
pub const EXIT_INPUT_INVALID: u8 = 4;

/// Config file unreadable, unparseable, or failing validation.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Output directory or bucket file could not be written.
pub const EXIT_OUTPUT: u8 = 6;

/// Reconciliation found unmatched or mismatched records (only with `--strict`).
pub const EXIT_MISMATCH: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::InputNotFound { .. } => EXIT_INPUT_NOT_FOUND,
        ReconError::MissingHeader { .. } | ReconError::Csv { .. } => EXIT_INPUT_INVALID,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Io(_) => EXIT_OUTPUT,
    }
}
