use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use ledger::Amount;

use crate::{error::ApiError, state::SharedState};

/// Request body for `POST /transactions/new`.
///
/// Fields are optional at the decoding layer so a missing field is
/// reported as a 400 with a readable message rather than a decoder error.
#[derive(Debug, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<Amount>,
}

/// Response body for `POST /transactions/new`.
#[derive(Debug, Serialize)]
pub struct NewTransactionResponse {
    pub message: String,
    /// Index of the block the transaction will be sealed into.
    pub index: u64,
}

/// `POST /transactions/new`
///
/// Queues a transfer into the pending pool.
pub async fn new_transaction(
    State(state): State<SharedState>,
    payload: Result<Json<NewTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NewTransactionResponse>), ApiError> {
    let Json(body) = payload?;

    let (Some(sender), Some(recipient), Some(amount)) = (body.sender, body.recipient, body.amount)
    else {
        return Err(ApiError::MalformedInput(
            "missing values: sender, recipient and amount are required".to_string(),
        ));
    };

    let index = state.ledger.new_transaction(sender, recipient, amount);
    tracing::debug!(index, "queued transaction");

    Ok((
        StatusCode::CREATED,
        Json(NewTransactionResponse {
            message: format!("Transaction will be added to Block {index}"),
            index,
        }),
    ))
}
