use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Input path does not resolve to a readable file.
    InputNotFound { path: String, reason: String },
    /// Input has no header row (empty file).
    MissingHeader { label: String },
    /// CSV data could not be decoded (invalid UTF-8, broken quoting, etc.).
    Csv { label: String, message: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty compare list, clashing bucket names, etc.).
    ConfigValidation(String),
    /// IO error (output directory, file write, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputNotFound { path, reason } => {
                write!(f, "cannot read input '{path}': {reason}")
            }
            Self::MissingHeader { label } => {
                write!(f, "{label}: input is empty (no header row)")
            }
            Self::Csv { label, message } => write!(f, "{label}: CSV error: {message}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
