use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{BookingId, Document, Keyed, TourId, UpdateResult};

/// Status a booking is moved to once the guide confirms it.
pub const STATUS_COMPLETED: &str = "completed";

/// Booking placed against a tour package - SQL persistence layer
///
/// `package_id` records which tour the booking was placed from; it is not a
/// foreign key, so bookings outlive deleted tours.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Booking {
    pub id: BookingId,
    pub package_id: Option<TourId>,
    pub document: Json<Document>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Find bookings made by a user, oldest first
    pub async fn find_by_user_email(email: &str, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM bookings WHERE document->>'userEmail' = $1 ORDER BY id",
        )
        .bind(email)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: BookingId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(package_id: TourId, document: Document, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO bookings (id, package_id, document)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(BookingId::new())
        .bind(package_id)
        .bind(Json(document))
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark a booking as completed
    ///
    /// Reports a match without modification when it was already completed.
    pub async fn mark_completed(id: BookingId, pool: &PgPool) -> Result<UpdateResult<BookingId>> {
        let (matched, modified) = sqlx::query_as::<_, (bool, bool)>(
            "WITH target AS (
                SELECT id, document->>'status' IS DISTINCT FROM $2 AS changes
                FROM bookings
                WHERE id = $1
                FOR UPDATE
             ),
             updated AS (
                UPDATE bookings b
                SET document = jsonb_set(b.document, '{status}', to_jsonb($2::text), true),
                    updated_at = NOW()
                FROM target
                WHERE b.id = target.id AND target.changes
                RETURNING b.id
             )
             SELECT EXISTS (SELECT 1 FROM target), EXISTS (SELECT 1 FROM updated)",
        )
        .bind(id)
        .bind(STATUS_COMPLETED)
        .fetch_one(pool)
        .await?;

        Ok(UpdateResult::updated(matched as u64, modified as u64))
    }

    pub fn status(&self) -> Option<&str> {
        self.document.get("status").and_then(|v| v.as_str())
    }

    pub fn into_keyed(self) -> Keyed<BookingId> {
        Keyed {
            id: self.id,
            fields: self.document.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_reads_the_document_field() {
        let serde_json::Value::Object(document) = json!({ "status": "pending", "userEmail": "u@x.com" })
        else {
            unreachable!()
        };
        let booking = Booking {
            id: BookingId::new(),
            package_id: Some(TourId::new()),
            document: Json(document),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(booking.status(), Some("pending"));
        let rendered = serde_json::to_value(booking.into_keyed()).unwrap();
        assert_eq!(rendered["userEmail"], "u@x.com");
        assert!(rendered.get("package_id").is_none());
    }
}
