use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ConvertError;

/// Whitespace policy for serialized output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Formatting {
    /// No insignificant whitespace.
    #[default]
    Compact,
    /// Two-space indentation, one member per line.
    Indented,
}

impl Formatting {
    pub fn from_compact(compact: bool) -> Self {
        if compact {
            Formatting::Compact
        } else {
            Formatting::Indented
        }
    }
}

/// JSON encoder/decoder for compatibility profile objects.
///
/// The formatting mode is fixed when the serializer is created and applies to
/// every `serialize` call. Decoding accepts either layout.
#[derive(Debug, Clone, Default)]
pub struct JsonProfileSerializer {
    formatting: Formatting,
}

impl JsonProfileSerializer {
    pub fn create(formatting: Formatting) -> Self {
        debug!(?formatting, "created profile serializer");
        Self { formatting }
    }

    pub fn formatting(&self) -> Formatting {
        self.formatting
    }

    pub fn serialize<T: Serialize + ?Sized>(&self, item: &T) -> Result<String, ConvertError> {
        let encoded = match self.formatting {
            Formatting::Compact => serde_json::to_string(item),
            Formatting::Indented => serde_json::to_string_pretty(item),
        };

        encoded.map_err(|source| ConvertError::Serialization { source })
    }

    pub fn deserialize<T: DeserializeOwned>(&self, json: &str) -> Result<T, ConvertError> {
        serde_json::from_str(json).map_err(|source| ConvertError::Deserialization {
            origin: "string".to_string(),
            source,
        })
    }

    /// Decodes the remaining contents of an open file. The handle stays owned
    /// by the caller.
    pub fn deserialize_file<T: DeserializeOwned>(&self, file: &File) -> Result<T, ConvertError> {
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConvertError::Deserialization {
            origin: "file".to_string(),
            source,
        })
    }

    pub fn deserialize_reader<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<T, ConvertError> {
        serde_json::from_reader(BufReader::new(reader)).map_err(|source| ConvertError::Deserialization {
            origin: "reader".to_string(),
            source,
        })
    }

    /// Opens `path` and decodes the whole file. `path` is used as given, so
    /// callers normalize it first.
    pub fn deserialize_from_file<T: DeserializeOwned>(&self, path: &Path) -> Result<T, ConvertError> {
        let file = File::open(path).map_err(|source| ConvertError::PathResolution {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConvertError::Deserialization {
            origin: path.display().to_string(),
            source,
        })
    }
}
