//! Error types surfaced to callers of the configuration API

use thiserror::Error;

/// Errors produced by option definition and programmatic set calls.
///
/// Load-time problems (missing files, unparseable documents, foreign value
/// types) are deliberately *not* represented here: the engine recovers from
/// those internally with a log message, keeping defaults where it must.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A `set` attempted a value outside the option's inclusive range.
    #[error("value {value} for option '{key}' is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        key: String,
        value: String,
        min: String,
        max: String,
    },

    /// Two direct children of one category share a key.
    #[error("duplicate key '{key}' in category '{category}'")]
    DuplicateKey { key: String, category: String },

    /// A nested category was declared without a name.
    #[error("nested category under '{category}' has an empty key")]
    EmptyKey { category: String },

    /// An option's declared default does not satisfy its own range.
    #[error("default value for option '{key}' is outside its declared range")]
    DefaultOutOfRange { key: String },
}
