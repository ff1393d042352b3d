use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ReconError;
use crate::index::MatchPolicy;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Column correlating source and destination records.
    #[serde(default = "default_key")]
    pub key: String,
    /// Lowercase keys on both sides before indexing and lookup.
    #[serde(default)]
    pub case_insensitive_key: bool,
    /// Strip surrounding whitespace from keys and compared values.
    #[serde(default)]
    pub trim_values: bool,
    #[serde(default = "default_compare")]
    pub compare: Vec<ComparedField>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Compared fields + output names
// ---------------------------------------------------------------------------

/// A column compared between matched records, and the bucket its mismatches go to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparedField {
    pub column: String,
    /// Output bucket (and file stem). Defaults to `<column>_mismatch`.
    #[serde(default)]
    pub bucket: String,
}

impl ComparedField {
    pub fn new(column: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            bucket: bucket.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_unmatched")]
    pub unmatched: String,
    #[serde(default = "default_fully_matched")]
    pub fully_matched: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            unmatched: default_unmatched(),
            fully_matched: default_fully_matched(),
        }
    }
}

fn default_name() -> String {
    "etl verification".into()
}

fn default_key() -> String {
    "email".into()
}

fn default_unmatched() -> String {
    "unmatched".into()
}

fn default_fully_matched() -> String {
    "fully_matched".into()
}

fn default_compare() -> Vec<ComparedField> {
    vec![
        ComparedField::new("first_name", "first_name_mismatch"),
        ComparedField::new("last_name", "last_name_mismatch"),
        ComparedField::new("encrypted_password", "password_mismatch"),
    ]
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            key: default_key(),
            case_insensitive_key: false,
            trim_values: false,
            compare: default_compare(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        for field in &mut config.compare {
            if field.bucket.is_empty() {
                field.bucket = format!("{}_mismatch", field.column);
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.key.is_empty() {
            return Err(ReconError::ConfigValidation("key column must not be empty".into()));
        }

        if self.compare.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one compared column is required".into(),
            ));
        }

        let mut columns = HashSet::new();
        for field in &self.compare {
            if field.column.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "compared column name must not be empty".into(),
                ));
            }
            if field.column == self.key {
                return Err(ReconError::ConfigValidation(format!(
                    "key column '{}' cannot also be a compared column",
                    self.key
                )));
            }
            if !columns.insert(field.column.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "column '{}' is compared more than once",
                    field.column
                )));
            }
        }

        // Bucket names double as file stems, so they must be unique and path-safe.
        let mut names = HashSet::new();
        let all_names = std::iter::once(self.output.unmatched.as_str())
            .chain(self.compare.iter().map(|c| c.bucket.as_str()))
            .chain(std::iter::once(self.output.fully_matched.as_str()));
        for name in all_names {
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ReconError::ConfigValidation(format!(
                    "invalid bucket name '{name}'"
                )));
            }
            if !names.insert(name) {
                return Err(ReconError::ConfigValidation(format!(
                    "bucket name '{name}' is used more than once"
                )));
            }
        }

        Ok(())
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            key_field: self.key.clone(),
            case_insensitive_key: self.case_insensitive_key,
            trim_values: self.trim_values,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "Legacy users → new auth"
key = "email"
case_insensitive_key = true
trim_values = true

[[compare]]
column = "first_name"
bucket = "first_name_mismatch"

[[compare]]
column = "last_name"

[[compare]]
column = "encrypted_password"
bucket = "password_mismatch"

[output]
unmatched = "missing_in_destination"
"#;

    #[test]
    fn parse_full_config() {
        let config = ReconConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name, "Legacy users → new auth");
        assert_eq!(config.key, "email");
        assert!(config.case_insensitive_key);
        assert!(config.trim_values);
        assert_eq!(config.compare.len(), 3);
        assert_eq!(config.compare[1].bucket, "last_name_mismatch");
        assert_eq!(config.compare[2].bucket, "password_mismatch");
        assert_eq!(config.output.unmatched, "missing_in_destination");
        assert_eq!(config.output.fully_matched, "fully_matched");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        let defaults = ReconConfig::default();
        assert_eq!(config.key, defaults.key);
        assert_eq!(config.compare, defaults.compare);
        assert_eq!(config.output, defaults.output);
        assert!(!config.case_insensitive_key);
    }

    #[test]
    fn default_config_is_valid() {
        ReconConfig::default().validate().unwrap();
        let buckets: Vec<_> = ReconConfig::default()
            .compare
            .into_iter()
            .map(|c| c.bucket)
            .collect();
        assert_eq!(
            buckets,
            ["first_name_mismatch", "last_name_mismatch", "password_mismatch"]
        );
    }

    #[test]
    fn reject_unknown_field() {
        let err = ReconConfig::from_toml("keyy = \"email\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_key_in_compare_list() {
        let input = r#"
key = "email"
[[compare]]
column = "email"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("cannot also be a compared column"));
    }

    #[test]
    fn reject_empty_compare_list() {
        let err = ReconConfig::from_toml("compare = []").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_duplicate_bucket_names() {
        let input = r#"
[[compare]]
column = "first_name"
bucket = "unmatched"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("used more than once"));
    }

    #[test]
    fn reject_path_in_bucket_name() {
        let input = r#"
[output]
fully_matched = "../escape"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("invalid bucket name"));
    }

    #[test]
    fn reject_column_compared_twice() {
        let input = r#"
[[compare]]
column = "first_name"
[[compare]]
column = "first_name"
bucket = "other"
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("compared more than once"));
    }
}
