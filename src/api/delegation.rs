// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger mutation endpoints.
//!
//! Each mutation commits a redb write transaction, so the engine call runs
//! on the blocking pool.

use axum::{extract::State, Json};

use crate::{
    api::caller::Caller,
    error::ApiError,
    ledger::{DelegationEngine, LedgerError, RelayedTransfer, TransferEvent},
    models::{
        parse_address, parse_amount, parse_signature, parse_token, DelegateRequest, MintRequest,
        RelayedUndelegateRequest, UndelegateRequest,
    },
    state::AppState,
    storage::StoredTransfer,
};

async fn run_blocking<F>(state: &AppState, op: F) -> Result<Json<StoredTransfer>, ApiError>
where
    F: FnOnce(&DelegationEngine) -> Result<TransferEvent, LedgerError> + Send + 'static,
{
    let engine = state.engine.clone();
    let event = tokio::task::spawn_blocking(move || op(&engine))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Ledger task failed");
            ApiError::internal("ledger task failed")
        })??;
    Ok(Json(StoredTransfer::from(&event)))
}

/// Credit new supply to an owned balance.
///
/// Restricting who may mint is the hosting environment's responsibility.
#[utoipa::path(
    post,
    path = "/v1/mint",
    tag = "Ledger",
    request_body = MintRequest,
    responses(
        (status = 200, description = "Supply minted", body = StoredTransfer),
        (status = 400, description = "Malformed request"),
        (status = 422, description = "Supply overflow")
    )
)]
pub async fn mint(
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> Result<Json<StoredTransfer>, ApiError> {
    let to = parse_address("to", &request.to)?;
    let amount = parse_amount("amount", &request.amount)?;
    run_blocking(&state, move |engine| engine.mint(to, amount)).await
}

/// Move part of the caller's owned balance into a delegate's delegated balance.
#[utoipa::path(
    post,
    path = "/v1/delegate",
    tag = "Ledger",
    request_body = DelegateRequest,
    params(
        ("X-Caller-Address" = String, Header, description = "Authenticated caller address")
    ),
    responses(
        (status = 200, description = "Funds delegated", body = StoredTransfer),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Missing caller identity"),
        (status = 422, description = "Insufficient owned balance")
    )
)]
pub async fn delegate(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<DelegateRequest>,
) -> Result<Json<StoredTransfer>, ApiError> {
    let to = parse_address("to", &request.to)?;
    let amount = parse_amount("amount", &request.amount)?;
    run_blocking(&state, move |engine| engine.delegate(caller, to, amount)).await
}

/// Spend the caller's delegated balance into a recipient's owned balance.
#[utoipa::path(
    post,
    path = "/v1/undelegate",
    tag = "Ledger",
    request_body = UndelegateRequest,
    params(
        ("X-Caller-Address" = String, Header, description = "Authenticated caller address")
    ),
    responses(
        (status = 200, description = "Funds transferred", body = StoredTransfer),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Missing caller identity"),
        (status = 422, description = "Insufficient delegated balance")
    )
)]
pub async fn undelegate(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<UndelegateRequest>,
) -> Result<Json<StoredTransfer>, ApiError> {
    let recipient = parse_address("recipient", &request.recipient)?;
    let amount = parse_amount("amount", &request.amount)?;
    run_blocking(&state, move |engine| {
        engine.undelegate_and_transfer_to(caller, recipient, amount)
    })
    .await
}

/// Relay a delegate's signed authorization.
///
/// The caller is the relayer and receives the funds unless `recipient` is
/// given. Each token authorizes exactly one transfer.
#[utoipa::path(
    post,
    path = "/v1/undelegate/relayed",
    tag = "Ledger",
    request_body = RelayedUndelegateRequest,
    params(
        ("X-Caller-Address" = String, Header, description = "Relayer address")
    ),
    responses(
        (status = 200, description = "Funds transferred", body = StoredTransfer),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid signature or missing caller identity"),
        (status = 409, description = "Token already used"),
        (status = 422, description = "Insufficient delegated balance")
    )
)]
pub async fn undelegate_relayed(
    State(state): State<AppState>,
    Caller(relayer): Caller,
    Json(request): Json<RelayedUndelegateRequest>,
) -> Result<Json<StoredTransfer>, ApiError> {
    let transfer = RelayedTransfer {
        relayer,
        account: parse_address("account", &request.account)?,
        signature: parse_signature(&request.signature)?,
        token: parse_token(&request.token)?,
        amount: parse_amount("amount", &request.amount)?,
        recipient: request
            .recipient
            .as_deref()
            .map(|r| parse_address("recipient", r))
            .transpose()?,
    };

    run_blocking(&state, move |engine| {
        engine.undelegate_and_transfer_from(&transfer)
    })
    .await
}

