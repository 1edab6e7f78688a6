use std::time::Instant;

use axum::{Json, extract::State};
use serde::Serialize;

use ledger::Block;

use crate::{error::ApiError, state::SharedState};

/// Response body for `POST /mine`.
#[derive(Debug, Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub block: Block,
}

/// `POST /mine`
///
/// Solves the next proof of work and seals the pending pool, plus this
/// node's reward, into a new block. The search is CPU-bound and runs on
/// the blocking pool.
pub async fn mine(State(state): State<SharedState>) -> Result<Json<MineResponse>, ApiError> {
    let ledger = state.ledger.clone();
    let stop = state.stop.clone();
    let start = Instant::now();

    let block = tokio::task::spawn_blocking(move || ledger.mine_block(&stop))
        .await
        .map_err(|e| ApiError::Internal(format!("mining task failed: {e}")))??;

    state
        .metrics
        .ledger
        .record_mined(start.elapsed().as_secs_f64(), state.ledger.len());

    Ok(Json(MineResponse {
        message: "New Block Forged",
        block,
    }))
}
