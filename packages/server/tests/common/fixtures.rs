//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use serde_json::Value;
use sqlx::PgPool;
use tour_core::common::{into_document, TourId};
use tour_core::domains::tours::Tour;
use uuid::Uuid;

/// Create a tour from a JSON object
pub async fn create_test_tour(pool: &PgPool, document: Value) -> Result<TourId> {
    let tour = Tour::create(into_document(document)?, pool).await?;
    Ok(tour.id)
}

/// An email no other test uses
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}
