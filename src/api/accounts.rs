// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance and supply queries.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{parse_address, AccountResponse, SupplyResponse},
    state::AppState,
};

/// Owned and delegated balance of an address.
///
/// Addresses never touched report zero balances.
#[utoipa::path(
    get,
    path = "/v1/accounts/{address}",
    tag = "Accounts",
    params(
        ("address" = String, Path, description = "0x-prefixed account address")
    ),
    responses(
        (status = 200, description = "Account balances", body = AccountResponse),
        (status = 400, description = "Malformed address")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let address = parse_address("address", &address)?;
    let account = state.engine.account(&address);
    Ok(Json(AccountResponse::new(address, account)))
}

/// Total supply across all owned and delegated balances.
#[utoipa::path(
    get,
    path = "/v1/supply",
    tag = "Accounts",
    responses(
        (status = 200, description = "Total supply", body = SupplyResponse)
    )
)]
pub async fn get_supply(State(state): State<AppState>) -> Json<SupplyResponse> {
    Json(SupplyResponse {
        total_supply: state.engine.total_supply().to_string(),
    })
}
