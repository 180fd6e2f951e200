//! Error types for sensegrid-core

use thiserror::Error;

/// Core errors
///
/// Only schema *loading* can fail. Malformed schema entries during
/// generation degrade to null field values instead of erroring.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, SchemaError>;
