// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Token Ledger - Delegated balances with relayed transfers
//!
//! Every address holds an owned balance and a delegated balance. Owners
//! delegate funds to a delegate, who can spend them directly or sign a
//! one-time authorization that any relayer may redeem on its behalf.
//!
//! ## Modules
//!
//! - `ledger` - Balances, nonce registry and the delegation engine
//! - `authorization` - Tokens, recoverable signatures, signer recovery
//! - `storage` - Durable ledger state (redb)
//! - `api` - HTTP API handlers (Axum)

pub mod api;
pub mod authorization;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
