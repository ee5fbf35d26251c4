// Common types shared by every collection

pub mod document;
pub mod entity_ids;
pub mod id;
pub mod write_result;

pub use document::{into_document, Document, DocumentError, Keyed, ID_FIELD};
pub use entity_ids::*;
pub use write_result::{DeleteResult, InsertOneResult, UpdateResult};
