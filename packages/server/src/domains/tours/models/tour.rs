use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{Document, Keyed, TourId, UpdateResult};

/// Field holding the set of users who liked a tour.
pub const LIKED_BY: &str = "likedBy";

/// At most this many tours are returned by the featured listing.
pub const FEATURED_LIMIT: i64 = 6;

/// Tour package - SQL persistence layer
///
/// The package itself is schemaless: everything the client sent lives in
/// `document`. Only the key and timestamps are typed columns.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Tour {
    pub id: TourId,
    pub document: Json<Document>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tour {
    /// Find all tours, oldest first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tours ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Find up to [`FEATURED_LIMIT`] tours whose document contains `filter`
    ///
    /// An empty filter matches every tour.
    pub async fn find_featured(filter: &Document, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM tours
             WHERE document @> $1
             ORDER BY id
             LIMIT $2",
        )
        .bind(Json(filter))
        .bind(FEATURED_LIMIT)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Find tours published by a guide
    pub async fn find_by_guide_email(email: &str, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM tours WHERE document->>'guide_email' = $1 ORDER BY id",
        )
        .bind(email)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: TourId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tours WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a new tour under a fresh id
    pub async fn create(document: Document, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO tours (id, document)
             VALUES ($1, $2)
             RETURNING *",
        )
        .bind(TourId::new())
        .bind(Json(document))
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Shallow-merge `patch` into the tour's top-level fields, creating the
    /// tour under `id` when it does not exist yet.
    ///
    /// Rows whose document would not change are left untouched, which is how
    /// an unchanged match is told apart from a modification.
    pub async fn upsert_fields(
        id: TourId,
        patch: Document,
        pool: &PgPool,
    ) -> Result<UpdateResult<TourId>> {
        let inserted = sqlx::query_scalar::<_, bool>(
            "INSERT INTO tours (id, document)
             VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE
                SET document = tours.document || EXCLUDED.document,
                    updated_at = NOW()
                WHERE tours.document IS DISTINCT FROM tours.document || EXCLUDED.document
             RETURNING (xmax = 0)",
        )
        .bind(id)
        .bind(Json(patch))
        .fetch_optional(pool)
        .await?;

        Ok(match inserted {
            Some(true) => UpdateResult::upserted(id),
            Some(false) => UpdateResult::updated(1, 1),
            None => UpdateResult::updated(1, 0),
        })
    }

    /// Delete a tour, returning the number of rows removed
    pub async fn delete(id: TourId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Atomically add `token` to the array at `field` unless it is already there.
    ///
    /// A missing or non-array field is treated as empty. Returns `false` when
    /// no tour has this id.
    pub async fn add_to_set(id: TourId, field: &str, token: &str, pool: &PgPool) -> Result<bool> {
        let updated = sqlx::query_scalar::<_, TourId>(
            "UPDATE tours
             SET document = jsonb_set(
                    document,
                    ARRAY[$2::text],
                    CASE
                        WHEN (document -> $2::text) IS NULL
                            OR jsonb_typeof(document -> $2::text) <> 'array'
                            THEN jsonb_build_array($3::text)
                        WHEN (document -> $2::text) @> jsonb_build_array($3::text)
                            THEN document -> $2::text
                        ELSE (document -> $2::text) || jsonb_build_array($3::text)
                    END,
                    true),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(field)
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(updated.is_some())
    }

    /// Atomically remove every occurrence of `token` from the array at `field`.
    ///
    /// Returns `false` when no tour has this id.
    pub async fn remove_from_set(
        id: TourId,
        field: &str,
        token: &str,
        pool: &PgPool,
    ) -> Result<bool> {
        let updated = sqlx::query_scalar::<_, TourId>(
            "UPDATE tours
             SET document = jsonb_set(
                    document,
                    ARRAY[$2::text],
                    CASE
                        WHEN jsonb_typeof(document -> $2::text) = 'array' THEN COALESCE(
                            (SELECT jsonb_agg(member)
                             FROM jsonb_array_elements(document -> $2::text) AS member
                             WHERE member <> to_jsonb($3::text)),
                            '[]'::jsonb)
                        ELSE '[]'::jsonb
                    END,
                    true),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(field)
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(updated.is_some())
    }

    /// String members of the array at `field`; absent or malformed fields are empty
    pub fn members<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.document
            .get(field)
            .and_then(|value| value.as_array())
            .into_iter()
            .flatten()
            .filter_map(|value| value.as_str())
    }

    pub fn has_member(&self, field: &str, token: &str) -> bool {
        self.members(field).any(|member| member == token)
    }

    /// Render as the flat `{ "_id": ..., ... }` object clients expect
    pub fn into_keyed(self) -> Keyed<TourId> {
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

    fn tour(document: serde_json::Value) -> Tour {
        let serde_json::Value::Object(document) = document else {
            panic!("test documents are objects");
        };
        Tour {
            id: TourId::new(),
            document: Json(document),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn members_reads_the_liked_by_array() {
        let tour = tour(json!({ "likedBy": ["a@x.com", "b@x.com"] }));
        let members: Vec<&str> = tour.members(LIKED_BY).collect();
        assert_eq!(members, vec!["a@x.com", "b@x.com"]);
        assert!(tour.has_member(LIKED_BY, "b@x.com"));
        assert!(!tour.has_member(LIKED_BY, "B@x.com"));
    }

    #[test]
    fn absent_or_malformed_field_is_an_empty_set() {
        assert_eq!(tour(json!({ "title": "Bandarban" })).members(LIKED_BY).count(), 0);
        assert_eq!(tour(json!({ "likedBy": null })).members(LIKED_BY).count(), 0);
        assert_eq!(tour(json!({ "likedBy": "a@x.com" })).members(LIKED_BY).count(), 0);
    }

    #[test]
    fn into_keyed_exposes_id_as_underscore_id() {
        let tour = tour(json!({ "title": "Srimangal" }));
        let id = tour.id;
        let rendered = serde_json::to_value(tour.into_keyed()).unwrap();
        assert_eq!(rendered["_id"], json!(id.to_string()));
        assert_eq!(rendered["title"], "Srimangal");
    }
}
