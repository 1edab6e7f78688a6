use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use ledger::{Block, network_location};

use crate::{error::ApiError, state::SharedState};

/// Request body for `POST /nodes/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterNodesRequest {
    /// Peer addresses, e.g. `"http://192.168.0.5:5000"`.
    pub nodes: Option<Vec<String>>,
}

/// Response body for `POST /nodes/register`.
#[derive(Debug, Serialize)]
pub struct RegisterNodesResponse {
    pub message: &'static str,
    /// Every known peer, in ascending order.
    pub total_nodes: Vec<String>,
}

/// `POST /nodes/register`
///
/// Records the network location of each supplied address. The request is
/// rejected as a whole if any address has no usable location.
pub async fn register_nodes(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterNodesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterNodesResponse>), ApiError> {
    let Json(body) = payload?;

    let nodes = match body.nodes {
        Some(nodes) if !nodes.is_empty() => nodes,
        _ => {
            return Err(ApiError::MalformedInput(
                "please supply a valid list of nodes".to_string(),
            ));
        }
    };

    if let Some(bad) = nodes.iter().find(|n| network_location(n).is_empty()) {
        return Err(ApiError::MalformedInput(format!(
            "address {bad:?} has no network location"
        )));
    }

    state.peers.register_all(&nodes);

    Ok((
        StatusCode::CREATED,
        Json(RegisterNodesResponse {
            message: "New nodes have been added",
            total_nodes: state.peers.peers(),
        }),
    ))
}

/// Response body for `GET /nodes/resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub message: &'static str,
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// `GET /nodes/resolve`
///
/// Runs one round of longest-valid-chain consensus against every known
/// peer and returns the resulting local chain.
pub async fn resolve(State(state): State<SharedState>) -> Json<ResolveResponse> {
    let outcome = state
        .resolver
        .resolve(&state.ledger, &state.peers.peers())
        .await;
    state.metrics.ledger.record_resolution(&outcome);

    let message = if outcome.replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };

    Json(ResolveResponse {
        message,
        replaced: outcome.replaced,
        chain: state.ledger.chain().as_ref().clone(),
    })
}
