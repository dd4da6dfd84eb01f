use std::fmt;
use std::fs::File;
use std::io::Read;
use std::vec;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::ConvertError;
use crate::path::PathContext;
use crate::profile::{Formatting, JsonProfileSerializer};

const JSON_SOURCE_PARAMETER: &str = "json_source";
const PATH_PARAMETER: &str = "path";

/// Serializes each item to JSON text, lazily and in input order.
///
/// The serializer is created before the first item is pulled and lives as long
/// as the returned iterator. Callers stop at the first `Err`.
pub fn convert_to_json<I>(items: I, formatting: Formatting) -> impl Iterator<Item = Result<String, ConvertError>>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    let serializer = JsonProfileSerializer::create(formatting);

    items.into_iter().enumerate().map(move |(index, item)| {
        debug!(index, "serializing item");
        serializer.serialize(&item)
    })
}

/// A value carrying JSON text.
///
/// Files and readers are borrowed, so the caller keeps ownership and decides
/// when to close them.
pub enum JsonSource<'a> {
    Text(String),
    File(&'a File),
    Reader(&'a mut dyn Read),
}

impl JsonSource<'_> {
    fn kind(&self) -> &'static str {
        match self {
            JsonSource::Text(_) => "string",
            JsonSource::File(_) => "file",
            JsonSource::Reader(_) => "reader",
        }
    }
}

impl fmt::Debug for JsonSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonSource::Text(text) => f.debug_tuple("Text").field(text).finish(),
            JsonSource::File(file) => f.debug_tuple("File").field(file).finish(),
            JsonSource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<String> for JsonSource<'_> {
    fn from(text: String) -> Self {
        JsonSource::Text(text)
    }
}

impl From<&str> for JsonSource<'_> {
    fn from(text: &str) -> Self {
        JsonSource::Text(text.to_string())
    }
}

impl<'a> From<&'a File> for JsonSource<'a> {
    fn from(file: &'a File) -> Self {
        JsonSource::File(file)
    }
}

/// Untyped pipeline values: only strings carry JSON text.
impl TryFrom<Value> for JsonSource<'_> {
    type Error = ConvertError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(JsonSource::Text(text)),
            other => Err(ConvertError::UnsupportedSourceType {
                parameter: JSON_SOURCE_PARAMETER,
                found: value_kind(&other),
            }),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Input of the deserializer command: exactly one parameter set.
#[derive(Debug)]
pub enum FromJsonInput<'a> {
    ByPath(Vec<String>),
    BySource(Vec<JsonSource<'a>>),
}

impl<'a> FromJsonInput<'a> {
    /// Picks the parameter set from optional `json_source` and `path`
    /// arguments. Exactly one must be supplied and it must not be empty.
    pub fn from_parameters(
        json_source: Option<Vec<JsonSource<'a>>>,
        path: Option<Vec<String>>,
    ) -> Result<Self, ConvertError> {
        match (json_source, path) {
            (Some(_), Some(_)) => Err(ConvertError::ParameterSet(format!(
                "{JSON_SOURCE_PARAMETER} and {PATH_PARAMETER} cannot be used together"
            ))),
            (None, None) => Err(ConvertError::ParameterSet(format!(
                "one of {JSON_SOURCE_PARAMETER} or {PATH_PARAMETER} is required"
            ))),
            (Some(sources), None) => {
                if sources.is_empty() {
                    return Err(ConvertError::InvalidArgument {
                        parameter: JSON_SOURCE_PARAMETER,
                        message: "at least one source is required".to_string(),
                    });
                }
                Ok(FromJsonInput::BySource(sources))
            }
            (None, Some(paths)) => {
                if paths.is_empty() {
                    return Err(ConvertError::InvalidArgument {
                        parameter: PATH_PARAMETER,
                        message: "the argument is null or empty".to_string(),
                    });
                }
                if let Some(index) = paths.iter().position(|p| p.is_empty()) {
                    return Err(ConvertError::InvalidArgument {
                        parameter: PATH_PARAMETER,
                        message: format!("element {index} is empty"),
                    });
                }
                Ok(FromJsonInput::ByPath(paths))
            }
        }
    }
}

/// Deserializes every path or source of `input`, in order.
///
/// All source elements are processed, one object per element. Relative paths
/// resolve against `context`.
pub fn convert_from_json(input: FromJsonInput<'_>, context: PathContext) -> FromJsonConversion<'_> {
    let pending = match input {
        FromJsonInput::ByPath(paths) => Pending::Paths(paths.into_iter()),
        FromJsonInput::BySource(sources) => Pending::Sources(sources.into_iter()),
    };

    FromJsonConversion {
        serializer: JsonProfileSerializer::default(),
        context,
        pending,
    }
}

/// Iterator returned by [`convert_from_json`].
pub struct FromJsonConversion<'a> {
    serializer: JsonProfileSerializer,
    context: PathContext,
    pending: Pending<'a>,
}

enum Pending<'a> {
    Paths(vec::IntoIter<String>),
    Sources(vec::IntoIter<JsonSource<'a>>),
}

impl Iterator for FromJsonConversion<'_> {
    type Item = Result<Value, ConvertError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.pending {
            Pending::Paths(paths) => {
                let path = paths.next()?;
                Some(convert_path(&self.serializer, &self.context, &path))
            }
            Pending::Sources(sources) => {
                let source = sources.next()?;
                Some(convert_source(&self.serializer, source))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.pending {
            Pending::Paths(paths) => paths.size_hint(),
            Pending::Sources(sources) => sources.size_hint(),
        }
    }
}

fn convert_path(serializer: &JsonProfileSerializer, context: &PathContext, path: &str) -> Result<Value, ConvertError> {
    let absolute = context.normalize(path)?;
    debug!(path = %absolute.display(), "deserializing file");
    serializer.deserialize_from_file(&absolute)
}

fn convert_source(serializer: &JsonProfileSerializer, source: JsonSource<'_>) -> Result<Value, ConvertError> {
    debug!(kind = source.kind(), "deserializing json source");
    match source {
        JsonSource::Text(json) => serializer.deserialize(&json),
        JsonSource::File(file) => serializer.deserialize_file(file),
        JsonSource::Reader(reader) => serializer.deserialize_reader(reader),
    }
}
