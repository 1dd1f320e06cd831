// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client-side signing of relayed authorizations.
//!
//! This is what a delegate runs off-line: create a fresh token for the
//! amount, then sign it as a personal message. The resulting pair is
//! handed to a relayer.

use alloy::primitives::Address;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::rand_core::OsRng;

use super::recovery::address_from_verifying_key;
use super::signature::RecoverableSignature;
use super::token::AuthorizationToken;

/// Errors produced while signing.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// A secp256k1 key held in process memory.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    /// Generate a random key.
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    pub fn from_signing_key(key: SigningKey) -> Self {
        let address = address_from_verifying_key(key.verifying_key());
        Self { key, address }
    }

    /// Load a key from 32 raw bytes, hex encoded (with or without 0x).
    pub fn from_hex(hex_key: &str) -> Result<Self, SignerError> {
        let raw = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = alloy::hex::decode(raw)
            .map_err(|e| SignerError::InvalidPrivateKey(format!("Invalid hex: {}", e)))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_signing_key(key))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign the token's personal-message hash.
    pub fn sign_token(
        &self,
        token: &AuthorizationToken,
    ) -> Result<RecoverableSignature, SignerError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(token.signing_hash().as_slice())
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        Ok(RecoverableSignature::from_parts(&signature, recovery_id))
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Create a fresh token for `amount` and sign it with `signer`.
pub fn sign_authorization(
    signer: &LocalSigner,
    amount: u32,
) -> Result<(AuthorizationToken, RecoverableSignature), SignerError> {
    let token = AuthorizationToken::generate(amount);
    let signature = signer.sign_token(&token)?;
    Ok((token, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::{Secp256k1Recovery, SignerRecovery};

    // Well-known development key (first Hardhat/Anvil account).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn from_hex_derives_known_address() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        assert_eq!(signer.address(), DEV_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            LocalSigner::from_hex("0xnothex"),
            Err(SignerError::InvalidPrivateKey(_))
        ));
        assert!(LocalSigner::from_hex("0x00").is_err());
    }

    #[test]
    fn signatures_use_canonical_recovery_byte() {
        let signer = LocalSigner::random();
        for _ in 0..8 {
            let (_, signature) = sign_authorization(&signer, 1).unwrap();
            assert!(matches!(signature.v(), 27 | 28));
        }
    }

    #[test]
    fn signed_token_recovers_to_signer() {
        let signer = LocalSigner::random();
        let (token, signature) = sign_authorization(&signer, 42).unwrap();

        assert_eq!(token.embedded_amount(), 42);
        let recovered = Secp256k1Recovery
            .recover(&token.signing_hash(), &signature)
            .unwrap();
        assert_eq!(recovered, signer.address());
    }
}
