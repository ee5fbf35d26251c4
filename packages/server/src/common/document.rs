//! Schemaless JSON documents as stored in the `document` column.
//!
//! Collections keep their payload in a `JSONB` column and their key in a
//! typed UUID column. On the wire the key is spliced back in as `_id`, so a
//! client sees one flat object.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Body of a stored record, without its key.
pub type Document = Map<String, Value>;

/// Field name used for the key on the wire.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Accepts a request payload as a document.
///
/// Any client-supplied `_id` is dropped; the row key is authoritative.
pub fn into_document(value: Value) -> Result<Document, DocumentError> {
    match value {
        Value::Object(mut map) => {
            map.remove(ID_FIELD);
            Ok(map)
        }
        other => Err(DocumentError::NotAnObject(json_kind(&other))),
    }
}

/// A stored record as it is rendered to clients: `{ "_id": ..., ...fields }`.
#[derive(Debug, Clone, Serialize)]
pub struct Keyed<K: Serialize> {
    #[serde(rename = "_id")]
    pub id: K,
    #[serde(flatten)]
    pub fields: Document,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
