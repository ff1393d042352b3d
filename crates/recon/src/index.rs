use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use crate::model::{Record, RecordSet};

/// How keys are read and values compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPolicy {
    pub key_field: String,
    pub case_insensitive_key: bool,
    pub trim_values: bool,
}

impl MatchPolicy {
    /// Byte-for-byte keys and values.
    pub fn exact(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            case_insensitive_key: false,
            trim_values: false,
        }
    }

    /// Normalized key of `record`, or `None` when it has no key column.
    /// An empty value is an ordinary key.
    pub fn key_of<'r>(&self, record: &'r Record) -> Option<Cow<'r, str>> {
        let raw = record.get(&self.key_field)?;
        let raw = if self.trim_values { raw.trim() } else { raw };
        if self.case_insensitive_key {
            Some(Cow::Owned(raw.to_lowercase()))
        } else {
            Some(Cow::Borrowed(raw))
        }
    }

    /// Field equality. Absent on either side counts as a mismatch.
    pub fn values_agree(&self, left: Option<&str>, right: Option<&str>) -> bool {
        match (left, right) {
            (Some(l), Some(r)) if self.trim_values => l.trim() == r.trim(),
            (Some(l), Some(r)) => l == r,
            _ => false,
        }
    }
}

/// Destination records keyed for O(1) lookup.
///
/// Duplicate keys resolve last-write-wins: the record appearing later in the
/// destination set replaces the earlier one. This is defined behavior; the
/// affected keys are kept in `duplicate_keys` so callers can report them.
#[derive(Debug)]
pub struct DestinationIndex<'a> {
    policy: MatchPolicy,
    entries: HashMap<String, &'a Record>,
    duplicate_keys: Vec<String>,
    missing_key: usize,
}

impl<'a> DestinationIndex<'a> {
    /// Index `destination` by `key_field` with exact key matching.
    pub fn build(destination: &'a RecordSet, key_field: &str) -> Self {
        Self::build_with(destination, MatchPolicy::exact(key_field))
    }

    pub fn build_with(destination: &'a RecordSet, policy: MatchPolicy) -> Self {
        let mut entries: HashMap<String, &'a Record> =
            HashMap::with_capacity(destination.records.len());
        let mut seen_twice: HashSet<String> = HashSet::new();
        let mut duplicate_keys = Vec::new();
        let mut missing_key = 0;

        for record in &destination.records {
            let Some(key) = policy.key_of(record) else {
                missing_key += 1;
                continue;
            };
            let key = key.into_owned();
            if entries.insert(key.clone(), record).is_some() && seen_twice.insert(key.clone()) {
                duplicate_keys.push(key);
            }
        }

        Self {
            policy,
            entries,
            duplicate_keys,
            missing_key,
        }
    }

    /// Destination record sharing `source`'s key, if any.
    pub fn lookup(&self, source: &Record) -> Option<&'a Record> {
        let key = self.policy.key_of(source)?;
        self.entries.get(&*key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&'a Record> {
        self.entries.get(key).copied()
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys seen more than once, in first-duplicate order.
    pub fn duplicate_keys(&self) -> &[String] {
        &self.duplicate_keys
    }

    /// Destination records skipped for lacking the key column.
    pub fn missing_key(&self) -> usize {
        self.missing_key
    }
}
