//! In-memory membership store for tests.
//!
//! Keeps tour documents in a map, records every call, and can be told to fail
//! reads or writes or to drop a tour right after it has been read.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;

use super::membership::MembershipStore;
use super::models::Tour;
use crate::common::{Document, TourId};

/// A call received by [`MockMembershipStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ReadOne(TourId),
    AddToSet(TourId, String),
    RemoveFromSet(TourId, String),
}

#[derive(Clone, Default)]
pub struct MockMembershipStore {
    tours: Arc<Mutex<HashMap<TourId, Document>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    vanishing: Arc<Mutex<HashSet<TourId>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MockMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tour document under a fresh id
    pub fn insert(&self, document: Value) -> TourId {
        let Value::Object(document) = document else {
            panic!("tour documents must be JSON objects");
        };
        let id = TourId::new();
        self.tours.lock().unwrap().insert(id, document);
        id
    }

    pub fn document(&self, id: TourId) -> Option<Document> {
        self.tours.lock().unwrap().get(&id).cloned()
    }

    /// Current string members of `field`, in stored order
    pub fn members(&self, id: TourId, field: &str) -> Vec<String> {
        self.document(id)
            .and_then(|doc| doc.get(field).and_then(Value::as_array).cloned())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Remove the tour as soon as it has been read once
    pub fn delete_after_read(&self, id: TourId) {
        self.vanishing.lock().unwrap().insert(id);
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutate(&self, id: TourId, field: &str, f: impl FnOnce(&mut Vec<Value>)) -> Result<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated write failure"));
        }

        let mut tours = self.tours.lock().unwrap();
        let Some(document) = tours.get_mut(&id) else {
            return Ok(false);
        };

        let mut members = match document.remove(field) {
            Some(Value::Array(members)) => members,
            _ => Vec::new(),
        };
        f(&mut members);
        document.insert(field.to_string(), Value::Array(members));

        Ok(true)
    }
}

#[async_trait]
impl MembershipStore for MockMembershipStore {
    async fn read_one(&self, id: TourId) -> Result<Option<Tour>> {
        self.record(StoreCall::ReadOne(id));

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated read failure"));
        }

        let document = self.document(id);
        if self.vanishing.lock().unwrap().remove(&id) {
            self.tours.lock().unwrap().remove(&id);
        }

        Ok(document.map(|document| Tour {
            id,
            document: Json(document),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }))
    }

    async fn add_to_set(&self, id: TourId, field: &str, token: &str) -> Result<bool> {
        self.record(StoreCall::AddToSet(id, token.to_string()));
        self.mutate(id, field, |members| {
            if !members.iter().any(|m| m.as_str() == Some(token)) {
                members.push(Value::String(token.to_string()));
            }
        })
    }

    async fn remove_from_set(&self, id: TourId, field: &str, token: &str) -> Result<bool> {
        self.record(StoreCall::RemoveFromSet(id, token.to_string()));
        self.mutate(id, field, |members| {
            members.retain(|m| m.as_str() != Some(token));
        })
    }
}
