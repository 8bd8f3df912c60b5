//! Webhook ingestion handler: normalize one event, insert one row.
//!
//! The platform calls this once per event notification. Everything the
//! handler does is synchronous from its point of view: build the
//! canonical record, hand it to the gateway, map the outcome onto the
//! status/body pair the platform expects.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use screenhook_core::{storage, CanonicalEvent, PersistError};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::AppState;

/// Response body when the database cannot be reached.
const BODY_CONNECTION_FAILED: &str = "Unable to establish a connection.";
/// Response body when the insert itself fails.
const BODY_EXECUTION_FAILED: &str = "Error executing the query";
/// Response body when the request carries no event discriminator.
const BODY_MISSING_EVENT: &str = "Event type not passed";

/// Receives one platform event for a publication and persists it.
///
/// The body must carry a top-level `event` string; every other key is
/// event-kind dependent and optional. Unrecognized kinds are logged and
/// persisted with all event-specific columns null.
///
/// # Errors
///
/// Returns the contract's status codes:
/// - 400: body has no `event` key, or carries a non-string one (the
///   platform always sends a string discriminator; anything else is
///   treated the same as a missing key)
/// - 500: connection or insert failure, with the matching plain-text body
#[instrument(name = "receive_event", skip(state, body), fields(publication = %publication))]
pub async fn receive_event(
    Path(publication): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Response {
    let Some(event) = body.get("event").and_then(Value::as_str) else {
        warn!("request body has no event discriminator");
        return (StatusCode::BAD_REQUEST, BODY_MISSING_EVENT).into_response();
    };

    let record = CanonicalEvent::normalize(event, &body, &publication);
    if !record.is_monitored() {
        // Kept as a log-only signal: unmonitored events are stored like
        // any other so future platform event types are never dropped.
        warn!(event, "unmonitored event kind, persisting with null fields");
    }

    let outcome = storage::insert_event(&state.db, &record).await;
    if outcome.is_ok() {
        info!(event, "event persisted");
    }
    persist_response(outcome)
}

/// Maps the gateway outcome onto the platform's status/body contract.
///
/// Success is an empty 200 with a JSON content type; each failure
/// variant keeps its own plain-text 500 body so callers can tell the
/// two apart.
fn persist_response(outcome: screenhook_core::Result<()>) -> Response {
    match outcome {
        Ok(()) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], "").into_response()
        },
        Err(e @ PersistError::ConnectionFailed(_)) => {
            error!(error = %e, "database connection failed");
            (StatusCode::INTERNAL_SERVER_ERROR, BODY_CONNECTION_FAILED).into_response()
        },
        Err(e @ PersistError::ExecutionFailed(_)) => {
            error!(error = %e, "event insert failed");
            (StatusCode::INTERNAL_SERVER_ERROR, BODY_EXECUTION_FAILED).into_response()
        },
    }
}
