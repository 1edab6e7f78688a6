use axum::Json;
use serde::Serialize;

/// Liveness document served by `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health`
///
/// Answers as long as the HTTP server is up; it does not touch the ledger
/// lock, so a node busy committing a block or swapping chains still reports
/// itself alive.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
