use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::ReconError;
use crate::model::{RecordSet, SkippedRow};

/// Read a CSV file (header row required) into a RecordSet.
///
/// The SHA-256 of the raw bytes is kept as the set's fingerprint.
pub fn load_record_set(path: &Path, label: &str) -> Result<RecordSet, ReconError> {
    if path.is_dir() {
        return Err(ReconError::InputNotFound {
            path: path.display().to_string(),
            reason: "is a directory".into(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| ReconError::InputNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let fingerprint = format!("{:x}", Sha256::digest(&bytes));
    let mut set = parse_record_set(label, bytes.as_slice())?;
    set.fingerprint = Some(fingerprint);
    debug!(
        path = %path.display(),
        records = set.len(),
        skipped = set.skipped.len(),
        "loaded {label}"
    );
    Ok(set)
}

/// Parse CSV data into a RecordSet.
///
/// Field names are kept verbatim (a leading UTF-8 BOM is dropped). Rows whose
/// width differs from the header are skipped, logged, and listed in
/// `RecordSet::skipped`.
pub fn parse_record_set<R: Read>(label: &str, reader: R) -> Result<RecordSet, ReconError> {
    let csv_err = |e: csv::Error| ReconError::Csv {
        label: label.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ReconError::MissingHeader {
            label: label.to_string(),
        });
    }

    let width = headers.len();
    let mut set = RecordSet::new(label, headers);

    for (i, result) in reader.records().enumerate() {
        let row = result.map_err(csv_err)?;
        if row.len() != width {
            // Header is line 1; fall back to the ordinal if the reader lost track.
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(i as u64 + 2);
            warn!(
                line,
                expected = width,
                found = row.len(),
                "{label}: skipping malformed row"
            );
            set.skipped.push(SkippedRow {
                line,
                expected: width,
                found: row.len(),
            });
            continue;
        }
        set.push_row(row.iter().map(str::to_string).collect());
    }

    Ok(set)
}
