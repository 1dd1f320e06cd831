// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signature authorization protocol.
//!
//! ## Verification Steps
//!
//! 1. Extract the amount embedded in the token
//! 2. Reject if the claimed amount differs (`InvalidSignature`)
//! 3. Hash the token (keccak256, personal-message prefixed)
//! 4. Recover the signer from the normalized signature
//! 5. Reject if the signer is not the claimed account (`InvalidSignature`)
//! 6. Reject if the token was already consumed (`InvalidNonce`)
//! 7. Consume the token
//!
//! [`SignatureAuthorizer::authorize`] runs steps 1-6 without side effects so
//! the delegation engine can commit step 7 together with the balance move.

use std::sync::Arc;

use alloy::primitives::Address;

use super::error::AuthError;
use super::recovery::{Secp256k1Recovery, SignerRecovery};
use super::signature::RecoverableSignature;
use super::token::AuthorizationToken;
use crate::ledger::NonceRegistry;

/// A verified, not yet consumed, authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorization {
    pub signer: Address,
    pub token: AuthorizationToken,
    pub amount: u32,
}

/// Verifies relayed authorizations against a signer recovery scheme.
#[derive(Clone)]
pub struct SignatureAuthorizer {
    recovery: Arc<dyn SignerRecovery>,
}

impl Default for SignatureAuthorizer {
    fn default() -> Self {
        Self::new(Arc::new(Secp256k1Recovery))
    }
}

impl SignatureAuthorizer {
    pub fn new(recovery: Arc<dyn SignerRecovery>) -> Self {
        Self { recovery }
    }

    /// Verify an authorization without consuming its token.
    pub fn authorize(
        &self,
        registry: &dyn NonceRegistry,
        claimed_account: &Address,
        signature: &RecoverableSignature,
        token: &AuthorizationToken,
        claimed_amount: u128,
    ) -> Result<Authorization, AuthError> {
        let embedded_amount = token.embedded_amount();
        if claimed_amount != u128::from(embedded_amount) {
            tracing::debug!(
                claimed_amount = %claimed_amount,
                embedded_amount,
                "Claimed amount does not match token"
            );
            return Err(AuthError::InvalidSignature);
        }

        let signer = self
            .recovery
            .recover(&token.signing_hash(), signature)
            .map_err(|e| {
                tracing::debug!(error = %e, "Signer recovery failed");
                AuthError::InvalidSignature
            })?;

        if signer != *claimed_account {
            tracing::debug!(
                claimed = %claimed_account,
                recovered = %signer,
                "Recovered signer does not match claimed account"
            );
            return Err(AuthError::InvalidSignature);
        }

        if registry.is_consumed(token) {
            return Err(AuthError::InvalidNonce);
        }

        Ok(Authorization {
            signer,
            token: *token,
            amount: embedded_amount,
        })
    }

    /// Verify an authorization and consume its token.
    pub fn verify_and_consume(
        &self,
        registry: &mut dyn NonceRegistry,
        claimed_account: &Address,
        signature: &RecoverableSignature,
        token: &AuthorizationToken,
        claimed_amount: u128,
    ) -> Result<(), AuthError> {
        let authorization =
            self.authorize(&*registry, claimed_account, signature, token, claimed_amount)?;
        registry.consume(authorization.token)
    }
}
