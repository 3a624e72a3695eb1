//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness check: the process is up.
pub async fn health() -> &'static str {
    "OK"
}

/// Readiness check: the database answers a trivial query.
pub async fn ready(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(|e| {
            tracing::error!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok("OK")
}
