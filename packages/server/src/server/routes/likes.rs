use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::TourId;
use crate::domains::tours::ToggleAction;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};

#[derive(Deserialize)]
pub struct LikeRequest {
    email: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    message: &'static str,
    liked: bool,
}

/// PATCH /like/:packageId
///
/// Likes the tour for `email`, or unlikes it if they already did.
pub async fn toggle_like(
    Extension(state): Extension<AppState>,
    Path(package_id): Path<TourId>,
    Json(request): Json<LikeRequest>,
) -> ApiResult<Json<LikeResponse>> {
    if request.email.is_empty() {
        return Err(ApiError::BadRequest("email must not be empty".to_string()));
    }

    let outcome = state.likes.toggle(package_id, &request.email).await?;

    let message = match outcome.message {
        ToggleAction::Added => "Like Successful",
        ToggleAction::Removed => "Dislike Successful",
    };

    Ok(Json(LikeResponse {
        message,
        liked: outcome.is_member,
    }))
}
