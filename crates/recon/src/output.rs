use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::OutputConfig;
use crate::error::ReconError;
use crate::model::{Buckets, Origin};

/// Write every bucket to `<dir>/<bucket>.csv`, creating `dir` if needed.
///
/// The header row is the first record's field names. An empty bucket gets the
/// header of the input it would draw from, so every file is present and
/// parseable. Returns written paths in bucket order.
pub fn write_buckets(
    dir: &Path,
    buckets: &Buckets,
    output: &OutputConfig,
    source_headers: &[String],
    destination_headers: &[String],
) -> Result<Vec<PathBuf>, ReconError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ReconError::Io(format!("cannot create {}: {e}", dir.display())))?;

    let mut written = Vec::new();
    for bucket in buckets.named(output) {
        let path = dir.join(format!("{}.csv", bucket.name));
        let write_err = |e: csv::Error| {
            ReconError::Io(format!("cannot write {}: {e}", path.display()))
        };

        let header = match bucket.records.first() {
            Some(first) => first.fields(),
            None => match bucket.origin {
                Origin::Source => source_headers,
                Origin::Destination => destination_headers,
            },
        };

        let mut writer = csv::Writer::from_path(&path).map_err(write_err)?;
        writer.write_record(header).map_err(write_err)?;
        for record in bucket.records {
            writer.write_record(record.values()).map_err(write_err)?;
        }
        writer
            .flush()
            .map_err(|e| ReconError::Io(format!("cannot write {}: {e}", path.display())))?;

        info!(records = bucket.records.len(), "wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}
