//! Booking endpoints.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::common::{into_document, BookingId, InsertOneResult, Keyed, TourId, UpdateResult};
use crate::domains::bookings::Booking;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

#[derive(Deserialize)]
pub struct BookingsQuery {
    email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBookingRequest {
    #[serde(default)]
    booking_data: Value,
}

/// GET /bookings?email=
pub async fn user_bookings(
    Extension(state): Extension<AppState>,
    Query(query): Query<BookingsQuery>,
) -> ApiResult<Json<Vec<Keyed<BookingId>>>> {
    let email = query
        .email
        .ok_or_else(|| ApiError::BadRequest("email query parameter is required".to_string()))?;

    let bookings = Booking::find_by_user_email(&email, &state.db_pool).await?;
    Ok(Json(bookings.into_iter().map(Booking::into_keyed).collect()))
}

/// POST /place-booking/:packageId
pub async fn place_booking(
    Extension(state): Extension<AppState>,
    Path(package_id): Path<TourId>,
    Json(request): Json<PlaceBookingRequest>,
) -> ApiResult<(StatusCode, Json<InsertOneResult<BookingId>>)> {
    let document = into_document(request.booking_data)?;
    let booking = Booking::create(package_id, document, &state.db_pool).await?;
    tracing::info!(booking_id = %booking.id, package_id = %package_id, "Booking placed");

    Ok((StatusCode::CREATED, Json(InsertOneResult::new(booking.id))))
}

/// PATCH /bookings/:id
pub async fn complete_booking(
    Extension(state): Extension<AppState>,
    Path(id): Path<BookingId>,
) -> ApiResult<Json<UpdateResult<BookingId>>> {
    let result = Booking::mark_completed(id, &state.db_pool).await?;
    Ok(Json(result))
}
