//! Membership toggling for set-valued tour fields (likes).
//!
//! A toggle reads the tour once to learn whether the token is present, then
//! issues exactly one atomic set mutation in the opposite direction. The read
//! only decides the direction and the reported outcome. The mutation itself
//! never rewrites the whole document, so concurrent edits to other fields or
//! other tokens survive it.
//!
//! ```text
//! read_one(id) ──► token ∈ members? ──yes──► remove_from_set ──► { removed, isMember: false }
//!                                    └─no──► add_to_set      ──► { added,   isMember: true  }
//! ```

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use super::models::{Tour, LIKED_BY};
use crate::common::TourId;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("Tour not found: {0}")]
    EntityNotFound(TourId),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] anyhow::Error),
}

/// Storage primitives a toggle needs.
///
/// `add_to_set` and `remove_from_set` must each be a single indivisible
/// operation on the stored field. Both return `false` when the tour does not
/// exist.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn read_one(&self, id: TourId) -> Result<Option<Tour>>;

    async fn add_to_set(&self, id: TourId, field: &str, token: &str) -> Result<bool>;

    async fn remove_from_set(&self, id: TourId, field: &str, token: &str) -> Result<bool>;
}

/// Postgres-backed store over the `tours` table.
#[derive(Clone)]
pub struct PgMembershipStore {
    pool: PgPool,
}

impl PgMembershipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for PgMembershipStore {
    async fn read_one(&self, id: TourId) -> Result<Option<Tour>> {
        Tour::find_by_id(id, &self.pool).await
    }

    async fn add_to_set(&self, id: TourId, field: &str, token: &str) -> Result<bool> {
        Tour::add_to_set(id, field, token, &self.pool).await
    }

    async fn remove_from_set(&self, id: TourId, field: &str, token: &str) -> Result<bool> {
        Tour::remove_from_set(id, field, token, &self.pool).await
    }
}

/// Direction a toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub message: ToggleAction,
    /// Membership after the toggle, not before.
    pub is_member: bool,
}

impl ToggleOutcome {
    fn after(was_member: bool) -> Self {
        if was_member {
            Self {
                message: ToggleAction::Removed,
                is_member: false,
            }
        } else {
            Self {
                message: ToggleAction::Added,
                is_member: true,
            }
        }
    }
}

/// Flips a token's presence in one set-valued field of a tour.
#[derive(Clone)]
pub struct MembershipToggle {
    store: Arc<dyn MembershipStore>,
    field: &'static str,
}

impl MembershipToggle {
    pub fn new(store: Arc<dyn MembershipStore>, field: &'static str) -> Self {
        Self { store, field }
    }

    /// Toggle over the `likedBy` field of the `tours` table.
    pub fn likes(pool: PgPool) -> Self {
        Self::new(Arc::new(PgMembershipStore::new(pool)), LIKED_BY)
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub async fn toggle(&self, id: TourId, token: &str) -> Result<ToggleOutcome, MembershipError> {
        let tour = self
            .store
            .read_one(id)
            .await?
            .ok_or(MembershipError::EntityNotFound(id))?;

        let was_member = tour.has_member(self.field, token);
        debug!(tour_id = %id, field = self.field, was_member, "Toggling membership");

        let found = if was_member {
            self.store.remove_from_set(id, self.field, token).await?
        } else {
            self.store.add_to_set(id, self.field, token).await?
        };

        // Deleted between the read and the mutation.
        if !found {
            return Err(MembershipError::EntityNotFound(id));
        }

        let outcome = ToggleOutcome::after(was_member);
        debug!(tour_id = %id, is_member = outcome.is_member, "Membership toggled");

        Ok(outcome)
    }
}
