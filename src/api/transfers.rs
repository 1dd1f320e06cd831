// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer history.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::ApiError, models::TransferListResponse, state::AppState};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

/// Query parameters for the transfer list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransferListQuery {
    /// Sequence of the last transfer already seen (from `next_cursor`)
    pub cursor: Option<u64>,
    /// Maximum number of transfers to return (1-500)
    #[param(default = 50)]
    pub limit: Option<usize>,
}

/// List committed transfers in ledger order.
#[utoipa::path(
    get,
    path = "/v1/transfers",
    tag = "Transfers",
    params(TransferListQuery),
    responses(
        (status = 200, description = "Page of transfers", body = TransferListResponse),
        (status = 400, description = "Invalid limit")
    )
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<TransferListQuery>,
) -> Result<Json<TransferListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let (transfers, next_cursor) = state.db.list_transfers(query.cursor, limit)?;
    Ok(Json(TransferListResponse {
        transfers,
        next_cursor,
    }))
}
