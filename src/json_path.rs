// src/json_path.rs
//
// Typed field extraction from RPC response documents using dotted paths
// (e.g. "result.effects.status").

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum JsonPathError {
    #[error("failed to parse JSON document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSON document root is not an object")]
    RootNotObject,
    #[error("empty JSON path")]
    EmptyPath,
    #[error("key {segment} not found")]
    NotFound { segment: String },
    #[error("value at key {segment} is not an object")]
    NotAnObject { segment: String },
    #[error("value at {path} can't be converted to {expected}")]
    TypeMismatch { path: String, expected: &'static str },
}

/// Parses `data` and returns the value at `path`, converted to `T`.
pub fn extract_from_json_path<T: DeserializeOwned>(data: &[u8], path: &str) -> Result<T, JsonPathError> {
    let doc: Value = serde_json::from_slice(data)?;
    extract_from_value(&doc, path)
}

/// Same as [`extract_from_json_path`] for an already-parsed document.
///
/// Every segment but the last must name a non-null object. The last segment
/// must exist (it may hold `null` if `T` accepts it) and deserialize as `T`.
pub fn extract_from_value<T: DeserializeOwned>(doc: &Value, path: &str) -> Result<T, JsonPathError> {
    if path.is_empty() {
        return Err(JsonPathError::EmptyPath);
    }
    let mut obj: &Map<String, Value> = doc.as_object().ok_or(JsonPathError::RootNotObject)?;

    let mut segments: Vec<&str> = path.split('.').collect();
    // split always yields at least one segment
    let leaf = segments.pop().unwrap_or(path);

    for segment in segments {
        obj = match obj.get(segment) {
            None | Some(Value::Null) => {
                return Err(JsonPathError::NotFound {
                    segment: segment.to_string(),
                })
            }
            Some(Value::Object(next)) => next,
            Some(_) => {
                return Err(JsonPathError::NotAnObject {
                    segment: segment.to_string(),
                })
            }
        };
    }

    let value = obj.get(leaf).ok_or_else(|| JsonPathError::NotFound {
        segment: leaf.to_string(),
    })?;

    T::deserialize(value).map_err(|_| JsonPathError::TypeMismatch {
        path: path.to_string(),
        expected: std::any::type_name::<T>(),
    })
}
