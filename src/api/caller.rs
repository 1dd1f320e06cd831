// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the calling account.
//!
//! The hosting environment authenticates callers and forwards the caller's
//! address in the `X-Caller-Address` header. Handlers that act on behalf of
//! the caller take the `Caller` extractor:
//!
//! ```rust,ignore
//! async fn delegate(Caller(caller): Caller, ...) -> Result<..., ApiError> {
//!     // caller is an alloy Address
//! }
//! ```

use alloy::primitives::Address;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the authenticated caller's address.
pub const CALLER_HEADER: &str = "x-caller-address";

pub struct Caller(pub Address);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing X-Caller-Address header"))?
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid X-Caller-Address header"))?;

        let address = raw
            .trim()
            .parse::<Address>()
            .map_err(|_| ApiError::unauthorized("Invalid X-Caller-Address header"))?;

        Ok(Caller(address))
    }
}
