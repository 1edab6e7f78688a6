//! HTTP routes of the ledger node.

pub mod chain;
pub mod health;
pub mod mining;
pub mod nodes;
pub mod transactions;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::SharedState;

/// Builds the node's HTTP router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/chain", get(chain::full_chain))
        .route("/transactions/new", post(transactions::new_transaction))
        .route("/mine", post(mining::mine))
        .route("/nodes/register", post(nodes::register_nodes))
        .route("/nodes/resolve", get(nodes::resolve))
        .with_state(state)
}
