mod converter;
mod path;
mod profile;

use std::io;

pub use converter::{FromJsonConversion, FromJsonInput, JsonSource, convert_from_json, convert_to_json};
pub use path::PathContext;
pub use profile::{Formatting, JsonProfileSerializer};

/// Error type for compatibility profile JSON conversions
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Unsupported type for {parameter} parameter (got {found}). Should be a string, file or reader.")]
    UnsupportedSourceType {
        parameter: &'static str,
        found: &'static str,
    },

    #[error("Parameter set cannot be resolved: {0}")]
    ParameterSet(String),

    #[error("Invalid value for {parameter} parameter: {message}")]
    InvalidArgument {
        parameter: &'static str,
        message: String,
    },

    #[error("Failed to serialize item: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSON in {origin}: {source}")]
    Deserialization {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot resolve path '{path}': {source}")]
    PathResolution {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
}
