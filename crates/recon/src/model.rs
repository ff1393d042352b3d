use std::sync::Arc;

use serde::Serialize;

use crate::config::{ComparedField, OutputConfig};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of tabular data: an ordered field-name → value mapping.
///
/// Field names are shared with every other row loaded from the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// `values` must line up with `fields`. The loader guarantees this by
    /// skipping rows of the wrong width.
    pub(crate) fn new(fields: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(fields.len(), values.len());
        Self { fields, values }
    }

    /// Build a standalone record from `(field, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (fields, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            fields: fields.into(),
            values,
        }
    }

    /// Value of `field`, or `None` if this record has no such column.
    /// With repeated header names the first column wins.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .position(|f| f == field)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A data row dropped at load time because its width didn't match the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub expected: usize,
    pub found: usize,
}

/// Ordered records from one input, plus what the loader learned about it.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub label: String,
    pub headers: Arc<[String]>,
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRow>,
    /// SHA-256 of the raw input bytes, when loaded from disk.
    pub fingerprint: Option<String>,
}

impl RecordSet {
    pub fn new(label: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            label: label.into(),
            headers: headers.into(),
            records: Vec::new(),
            skipped: Vec::new(),
            fingerprint: None,
        }
    }

    /// Wrap already-built records. Headers are taken from the first record.
    pub fn from_records(label: impl Into<String>, records: Vec<Record>) -> Self {
        let headers: Arc<[String]> = records
            .first()
            .map(|r| r.fields.clone())
            .unwrap_or_else(|| Vec::new().into());
        Self {
            label: label.into(),
            headers,
            records,
            skipped: Vec::new(),
            fingerprint: None,
        }
    }

    /// Append a row sharing this set's header. Width must match.
    pub(crate) fn push_row(&mut self, values: Vec<String>) {
        self.records.push(Record::new(self.headers.clone(), values));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Destination records whose `column` disagreed with the source.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMismatch {
    pub column: String,
    pub bucket: String,
    pub records: Vec<Record>,
}

/// Output of one reconciliation pass.
///
/// `unmatched` holds source records; every other bucket holds the matched
/// destination record. A record may sit in several mismatch buckets at once,
/// but never in a mismatch bucket and `fully_matched` together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub unmatched: Vec<Record>,
    pub mismatches: Vec<FieldMismatch>,
    pub fully_matched: Vec<Record>,
}

/// Which input a bucket's records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Source,
    Destination,
}

/// A bucket paired with its output name, in output order.
#[derive(Debug, Clone, Copy)]
pub struct NamedBucket<'a> {
    pub name: &'a str,
    pub origin: Origin,
    pub records: &'a [Record],
}

impl Buckets {
    /// Empty buckets with one mismatch slot per compared field, in order.
    pub fn for_fields(compared: &[ComparedField]) -> Self {
        Self {
            unmatched: Vec::new(),
            mismatches: compared
                .iter()
                .map(|c| FieldMismatch {
                    column: c.column.clone(),
                    bucket: c.bucket.clone(),
                    records: Vec::new(),
                })
                .collect(),
            fully_matched: Vec::new(),
        }
    }

    /// Mismatch bucket for `column`; empty if the column wasn't compared.
    pub fn mismatched(&self, column: &str) -> &[Record] {
        self.mismatches
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.records.as_slice())
            .unwrap_or(&[])
    }

    /// All buckets in output order: unmatched, per-field mismatches, fully matched.
    pub fn named<'a>(&'a self, output: &'a OutputConfig) -> Vec<NamedBucket<'a>> {
        let mut named = Vec::with_capacity(self.mismatches.len() + 2);
        named.push(NamedBucket {
            name: &output.unmatched,
            origin: Origin::Source,
            records: &self.unmatched,
        });
        for m in &self.mismatches {
            named.push(NamedBucket {
                name: &m.bucket,
                origin: Origin::Destination,
                records: &m.records,
            });
        }
        named.push(NamedBucket {
            name: &output.fully_matched,
            origin: Origin::Destination,
            records: &self.fully_matched,
        });
        named
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: String,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub source_records: usize,
    pub destination_records: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub fully_matched: usize,
    pub records_with_mismatch: usize,
    pub duplicate_destination_keys: usize,
    pub destination_missing_key: usize,
    pub skipped_rows: usize,
    pub buckets: Vec<BucketCount>,
}

impl ReconSummary {
    /// True when every source record was found and agreed on every field.
    pub fn is_clean(&self) -> bool {
        self.unmatched == 0 && self.records_with_mismatch == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMeta {
    pub label: String,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub key_field: String,
    pub compared_fields: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
    pub source: InputMeta,
    pub destination: InputMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    #[serde(skip)]
    pub buckets: Buckets,
}
