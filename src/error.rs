use std::path::PathBuf;
use thiserror::Error;

/// Every fallible operation in the crate returns this error.
///
/// All variants are value-level and recoverable; the engine never panics or
/// aborts. Each variant carries the offending key or identifier so callers
/// can surface a precise message, and the caller decides whether a failure
/// is fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing property '{key}'")]
    MissingProperty { key: String },

    #[error("Property '{key}' is {got}, expected {want}")]
    TypeMismatch {
        key: String,
        got: String,
        want: &'static str,
    },

    #[error("Unknown parameter type '{tag}'")]
    UnknownParameterType { tag: String },

    #[error("Value {value} for '{id}' is outside [{min}, {max}]")]
    ValueOutOfRange {
        id: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Value '{value}' for '{id}' is not one of the options: {}", .options.join(", "))]
    InvalidChoice {
        id: String,
        value: String,
        options: Vec<String>,
    },

    #[error("Value for '{id}' is {len} characters long, max is {max}")]
    StringTooLong { id: String, len: usize, max: usize },

    #[error("Value '{value}' for '{id}' does not match pattern '{pattern}'")]
    RegexMismatch {
        id: String,
        value: String,
        pattern: String,
    },

    #[error("No parameter or section with identifier '{id}'")]
    UnknownIdentifier { id: String },

    #[error("Settings are corrupt: {reason}")]
    CorruptSettings { reason: String },

    #[error("Malformed schema: {reason}")]
    MalformedSchema { reason: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
