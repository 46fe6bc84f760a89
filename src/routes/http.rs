// GET handlers: version, health, api/hosts, api/interfaces

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use super::AppState;
use crate::error::ReportError;
use crate::version::{NAME, VERSION};

/// JSON `{"error": message}` with the status of the error kind.
fn json_error(err: &ReportError, operation: &'static str) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(error = %err, operation, "api request failed");
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /health: 200 with the backend API version, 503 when the metrics source is unreachable.
pub(super) async fn health_handler(State(state): State<AppState>) -> Response {
    match state.pipeline.source().health_check().await {
        Ok(api_version) => Json(serde_json::json!({
            "status": "ok",
            "api_version": api_version,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, operation = "health_check", "metrics source unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unavailable",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /api/hosts: `[{hostid, name}]`.
pub(super) async fn hosts_handler(State(state): State<AppState>) -> Response {
    match state.pipeline.source().list_hosts().await {
        Ok(hosts) => Json(hosts).into_response(),
        Err(e) => json_error(&ReportError::from(e), "list_hosts"),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct InterfacesQuery {
    hostid: Option<String>,
}

/// GET /api/interfaces?hostid=: interface name → `{Download?, Upload?}` items.
pub(super) async fn interfaces_handler(
    State(state): State<AppState>,
    Query(query): Query<InterfacesQuery>,
) -> Response {
    let Some(host_id) = query.hostid.filter(|h| !h.trim().is_empty()) else {
        return json_error(
            &ReportError::Validation("hostid is required".into()),
            "resolve_interfaces",
        );
    };
    match state.pipeline.interfaces(&host_id).await {
        Ok(interfaces) => Json(interfaces).into_response(),
        Err(e) => json_error(&e, "resolve_interfaces"),
    }
}
