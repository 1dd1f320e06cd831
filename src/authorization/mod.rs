// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signature Authorization
//!
//! Lets a relayer move a delegate's delegated funds using an authorization
//! the delegate signed off-line.
//!
//! ## Flow
//!
//! 1. Delegate creates a random [`AuthorizationToken`] with the amount in
//!    its low 4 bytes and signs `keccak256(token)` as a personal message
//! 2. Relayer submits `(account, signature, token, amount)`
//! 3. [`SignatureAuthorizer`] checks the amount against the token, recovers
//!    the signer and checks the token has not been consumed
//! 4. The delegation engine consumes the token and moves the funds in one
//!    step
//!
//! ## Wire Formats
//!
//! - Token: 32 bytes, amount big-endian in bytes 28..32
//! - Signature: 65 bytes `r || s || v`, v normalized to 27/28

pub mod error;
pub mod protocol;
pub mod recovery;
pub mod signature;
pub mod signer;
pub mod token;

pub use error::{AuthError, EncodingError, RecoveryError};
pub use protocol::{Authorization, SignatureAuthorizer};
pub use recovery::{address_from_verifying_key, Secp256k1Recovery, SignerRecovery};
pub use signature::{RecoverableSignature, SIGNATURE_LEN};
pub use signer::{sign_authorization, LocalSigner, SignerError};
pub use token::{AuthorizationToken, TOKEN_LEN};
