use thiserror::Error;

/// Errors surfaced by the claims pipeline.
///
/// Only batch-level problems end up here. Unparseable cells degrade to
/// zero/absent values during normalization and never produce an error.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("File is empty or could not be parsed.")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unknown number locale '{0}'")]
    UnknownLocale(String),

    #[error("No pivot table for dimension '{0}'")]
    UnknownDimension(String),
}

pub type Result<T> = std::result::Result<T, ClaimsError>;
