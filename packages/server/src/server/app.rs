//! Application setup and server configuration.

use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::tours::MembershipToggle;
use crate::server::routes::{
    add_tour, complete_booking, delete_tour, featured_tours, guide_packages, health_handler,
    list_tours, place_booking, root_handler, toggle_like, tour_detail, update_tour, user_bookings,
};

/// Shared application state
///
/// Built once at startup from an explicitly opened pool; handlers receive a
/// clone through the `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub likes: MembershipToggle,
}

impl AppState {
    pub fn new(db_pool: PgPool) -> Self {
        Self {
            likes: MembershipToggle::likes(db_pool.clone()),
            db_pool,
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin: AllowOrigin = if origins.is_empty() {
        Any.into()
    } else {
        origins.into()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

/// Build the Axum application router
///
/// An empty `allowed_origins` allows any origin.
pub fn build_app(pool: PgPool, allowed_origins: &[String]) -> Router {
    let state = AppState::new(pool);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // Tours
        .route("/tours", get(list_tours))
        .route("/featured-tours", get(featured_tours))
        .route("/my-packages/:email", get(guide_packages))
        .route(
            "/tours/:id",
            get(tour_detail).put(update_tour).delete(delete_tour),
        )
        .route("/add-tour", post(add_tour))
        .route("/like/:packageId", patch(toggle_like))
        // Bookings
        .route("/bookings", get(user_bookings))
        .route("/bookings/:id", patch(complete_booking))
        .route("/place-booking/:packageId", post(place_booking))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
