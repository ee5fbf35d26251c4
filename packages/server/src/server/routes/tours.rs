//! Tour package endpoints.

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::common::{
    into_document, DeleteResult, Document, InsertOneResult, Keyed, TourId, UpdateResult,
};
use crate::domains::tours::Tour;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTourResponse {
    #[serde(flatten)]
    result: InsertOneResult<TourId>,
    message: &'static str,
}

fn keyed(tours: Vec<Tour>) -> Json<Vec<Keyed<TourId>>> {
    Json(tours.into_iter().map(Tour::into_keyed).collect())
}

/// GET /tours
pub async fn list_tours(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<Keyed<TourId>>>> {
    let tours = Tour::find_all(&state.db_pool).await?;
    Ok(keyed(tours))
}

/// GET /featured-tours
///
/// The optional JSON body is an equality filter on top-level fields.
pub async fn featured_tours(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> ApiResult<Json<Vec<Keyed<TourId>>>> {
    let filter = if body.iter().all(u8::is_ascii_whitespace) {
        Document::new()
    } else {
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid filter: {}", e)))?;
        into_document(value)?
    };

    let tours = Tour::find_featured(&filter, &state.db_pool).await?;
    Ok(keyed(tours))
}

/// GET /my-packages/:email
pub async fn guide_packages(
    Extension(state): Extension<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Keyed<TourId>>>> {
    let tours = Tour::find_by_guide_email(&email, &state.db_pool).await?;
    tracing::debug!(guide_email = %email, count = tours.len(), "Loaded guide packages");
    Ok(keyed(tours))
}

/// GET /tours/:id
pub async fn tour_detail(
    Extension(state): Extension<AppState>,
    Path(id): Path<TourId>,
) -> ApiResult<Json<Keyed<TourId>>> {
    let tour = Tour::find_by_id(id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("tour {}", id)))?;

    Ok(Json(tour.into_keyed()))
}

/// POST /add-tour
pub async fn add_tour(
    Extension(state): Extension<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<AddTourResponse>)> {
    let document = into_document(body)?;
    let tour = Tour::create(document, &state.db_pool).await?;
    tracing::info!(tour_id = %tour.id, "Tour added");

    Ok((
        StatusCode::CREATED,
        Json(AddTourResponse {
            result: InsertOneResult::new(tour.id),
            message: "Tour added",
        }),
    ))
}

/// PUT /tours/:id
///
/// Sets the given top-level fields, creating the tour if it does not exist.
pub async fn update_tour(
    Extension(state): Extension<AppState>,
    Path(id): Path<TourId>,
    Json(body): Json<Value>,
) -> ApiResult<Json<UpdateResult<TourId>>> {
    let patch = into_document(body)?;
    let result = Tour::upsert_fields(id, patch, &state.db_pool).await?;
    Ok(Json(result))
}

/// DELETE /tours/:id
pub async fn delete_tour(
    Extension(state): Extension<AppState>,
    Path(id): Path<TourId>,
) -> ApiResult<Json<DeleteResult>> {
    let deleted = Tour::delete(id, &state.db_pool).await?;
    if deleted > 0 {
        tracing::info!(tour_id = %id, "Tour deleted");
    }
    Ok(Json(DeleteResult::new(deleted)))
}
