//! Acknowledgements returned by write endpoints.
//!
//! The field names follow the document-store driver results existing clients
//! already parse (`insertedId`, `matchedCount`, ...).

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult<K> {
    pub acknowledged: bool,
    pub inserted_id: K,
}

impl<K> InsertOneResult<K> {
    pub fn new(inserted_id: K) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult<K> {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<K>,
}

impl<K> UpdateResult<K> {
    /// Result of an update that matched `matched` rows and changed `modified`.
    pub fn updated(matched: u64, modified: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count: matched,
            modified_count: modified,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    /// Result of an update that created the row instead.
    pub fn upserted(id: K) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}
