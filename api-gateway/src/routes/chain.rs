use axum::{Json, extract::State};

use ledger::ChainSummary;

use crate::state::SharedState;

/// `GET /chain`
///
/// Returns the full local chain and its length. Peers call this during
/// consensus.
pub async fn full_chain(State(state): State<SharedState>) -> Json<ChainSummary> {
    Json(state.ledger.summary())
}
