//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                   - Liveness
//! GET    /health/ready                             - Store reachability
//!
//! # Carts
//! GET    /api/carts?status=                        - Carts holding a status (404 when none)
//! POST   /api/carts                                - Create cart with lines
//! GET    /api/carts/user/{user_id}                 - Carts of a registered user
//! GET    /api/carts/{cart_id}                      - Cart with lines
//! DELETE /api/carts/{cart_id}                      - Delete cart
//! PUT    /api/carts/{cart_id}/status               - Change status (JSON string body)
//! PUT    /api/carts/{cart_id}/payment-method       - Record payment method (JSON string body)
//! PUT    /api/carts/{cart_id}/address/{address_id} - Bind saved address
//!
//! # Dashboard
//! GET    /api/dashboard/daily-sales?days=
//! GET    /api/dashboard/payment-methods
//! GET    /api/dashboard/top-products/quantity?days=&top=
//! GET    /api/dashboard/top-products/profit?days=&top=
//! GET    /api/dashboard/top-products/profit-by-date?date=&top=
//! GET    /api/dashboard/dates?top=
//! GET    /api/dashboard/kpis?days=
//!
//! # Wishlist
//! GET    /api/wishlist/user/{user_id}
//! POST   /api/wishlist
//! DELETE /api/wishlist/{entry_id}
//! ```

pub mod carts;
pub mod dashboard;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the full application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let config = state.config();
    let cors = if config.cors_allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };
    let timeout =
        TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/carts", carts::routes())
        .nest("/api/dashboard", dashboard::routes())
        .nest("/api/wishlist", wishlist::routes())
        .fallback(fallback)
        .layer(timeout)
        .layer(cors)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.carts().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

/// Turn an extractor rejection into a JSON 400.
fn bad_request(rejection: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(rejection.to_string())
}
