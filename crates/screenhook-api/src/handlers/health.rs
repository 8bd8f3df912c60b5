//! Health check handlers for service monitoring.
//!
//! Liveness stays process-local; readiness verifies a database
//! connection can actually be opened, since every request needs one.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use screenhook_core::storage;
use serde_json::json;
use tracing::{debug, error, instrument};

use crate::AppState;

/// Process-level health check. Does not touch the database.
pub async fn health_check() -> Response {
    let response = json!({
        "status": "ok",
        "service": "screenhook-api",
        "version": env!("CARGO_PKG_VERSION"),
    });

    (StatusCode::OK, Json(response)).into_response()
}

/// Liveness probe: the HTTP server is responding, nothing more.
pub async fn liveness_check() -> Response {
    debug!("Performing liveness check");
    health_check().await
}

/// Readiness probe: opens one connection and runs a trivial query, the
/// same lifecycle every ingestion request goes through.
#[instrument(name = "readiness_check", skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    match storage::ping(&state.db).await {
        Ok(()) => {
            debug!("Database readiness check passed");
            (StatusCode::OK, Json(json!({ "status": "ready" }))).into_response()
        },
        Err(e) => {
            error!(error = %e, "Database readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "message": e.to_string() })),
            )
                .into_response()
        },
    }
}
