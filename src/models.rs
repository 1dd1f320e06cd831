// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive
//! `ToSchema` for OpenAPI documentation.
//!
//! Amounts travel as decimal strings so values above 2^53 survive JSON
//! clients. Addresses, tokens and signatures are `0x`-prefixed hex.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::authorization::{AuthorizationToken, RecoverableSignature};
use crate::error::ApiError;
use crate::ledger::Account;
use crate::storage::StoredTransfer;

// =============================================================================
// Accounts
// =============================================================================

/// Balances held by one address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AccountResponse {
    /// Checksummed address
    pub address: String,
    /// Owned balance (decimal string)
    pub balance: String,
    /// Delegated balance (decimal string)
    pub delegated_balance: String,
}

impl AccountResponse {
    pub fn new(address: Address, account: Account) -> Self {
        Self {
            address: address.to_string(),
            balance: account.owned_balance.to_string(),
            delegated_balance: account.delegated_balance.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SupplyResponse {
    /// Sum of all owned and delegated balances (decimal string)
    pub total_supply: String,
}

// =============================================================================
// Mutations
// =============================================================================

/// Mint new supply to an owned balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MintRequest {
    pub to: String,
    pub amount: String,
}

/// Delegate part of the caller's owned balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DelegateRequest {
    /// Delegate receiving the funds
    pub to: String,
    pub amount: String,
}

/// Spend the caller's delegated balance into a recipient's owned balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UndelegateRequest {
    pub recipient: String,
    pub amount: String,
}

/// Relayed undelegation authorized by the delegate's signature.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelayedUndelegateRequest {
    /// Delegate whose delegated balance is spent
    pub account: String,
    /// 65-byte recoverable signature (r || s || v), hex
    pub signature: String,
    /// 32-byte authorization token, hex
    pub token: String,
    pub amount: String,
    /// Receiver of the funds; defaults to the relayer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

// =============================================================================
// Transfer History
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferListResponse {
    pub transfers: Vec<StoredTransfer>,
    /// Pass as `cursor` to fetch the next page; absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<u64>,
}

// =============================================================================
// Field Parsing
// =============================================================================

pub fn parse_address(field: &str, value: &str) -> Result<Address, ApiError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| ApiError::bad_request(format!("Invalid {field}: expected 0x-prefixed 20-byte hex address")))
}

pub fn parse_amount(field: &str, value: &str) -> Result<u128, ApiError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request(format!(
            "Invalid {field}: expected a non-negative decimal integer"
        )));
    }
    value
        .parse::<u128>()
        .map_err(|_| ApiError::bad_request(format!("Invalid {field}: value out of range")))
}

pub fn parse_token(value: &str) -> Result<AuthorizationToken, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|e| ApiError::bad_request(format!("Invalid token: {e}")))
}

pub fn parse_signature(value: &str) -> Result<RecoverableSignature, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|e| ApiError::bad_request(format!("Invalid signature: {e}")))
}
