//! # people-api: Axum API service for enriched person records
//!
//! Stores people (name, surname, optional patronymic) and augments every
//! write with age, gender and nationality looked up by first name through
//! [`people_enrich`]. A failed lookup degrades the record instead of
//! failing the request.
//!
//! ## API Surface
//!
//! | Route                     | Module               |
//! |---------------------------|----------------------|
//! | `/api/people`             | [`routes::people`]   |
//! | `/api/people/:id`         | [`routes::people`]   |
//! | `/health/liveness`        | this module          |
//! | `/health/readiness`       | this module          |
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → Handler
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::people::router())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(middleware::tracing_layer::layer());

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api).with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 "ready" when the store answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.store.ping().await {
        tracing::warn!("Store health check failed: {e}");
        return (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
