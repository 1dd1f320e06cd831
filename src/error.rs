// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ledger::LedgerError;
use crate::storage::LedgerDbError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let status = match &e {
            LedgerError::InsufficientFunds { .. }
            | LedgerError::InsufficientDelegatedFunds { .. }
            | LedgerError::BalanceOverflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::InvalidSignature => StatusCode::UNAUTHORIZED,
            LedgerError::InvalidNonce | LedgerError::AlreadyConsumed => StatusCode::CONFLICT,
            LedgerError::Journal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.error_code(), e.to_string())
    }
}

impl From<LedgerDbError> for ApiError {
    fn from(e: LedgerDbError) -> Self {
        tracing::error!(error = %e, "Ledger database error");
        Self::internal("storage error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.code, "bad_request");

        let unauth = ApiError::unauthorized("who");
        assert_eq!(unauth.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn ledger_errors_map_to_statuses() {
        let cases = [
            (
                LedgerError::InsufficientFunds {
                    account: Address::ZERO,
                    available: 1,
                    requested: 2,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_funds",
            ),
            (
                LedgerError::InsufficientDelegatedFunds {
                    account: Address::ZERO,
                    available: 1,
                    requested: 2,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_delegated_funds",
            ),
            (LedgerError::InvalidSignature, StatusCode::UNAUTHORIZED, "invalid_signature"),
            (LedgerError::InvalidNonce, StatusCode::CONFLICT, "invalid_nonce"),
            (LedgerError::AlreadyConsumed, StatusCode::CONFLICT, "already_consumed"),
            (
                LedgerError::Journal("io".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "journal_error",
            ),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::from(LedgerError::InvalidNonce).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"invalid nonce","error_code":"invalid_nonce"}"#);
    }
}
