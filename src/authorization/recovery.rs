// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signer recovery.
//!
//! The authorization protocol only needs "which address produced this
//! signature over this hash". [`SignerRecovery`] captures that so another
//! curve or scheme can be plugged in without touching the engine.

use alloy::primitives::{keccak256, Address, B256};
use k256::ecdsa::{Signature, VerifyingKey};

use super::error::RecoveryError;
use super::signature::RecoverableSignature;

/// Recovers the signing address from a prehash and a signature.
pub trait SignerRecovery: Send + Sync {
    fn recover(
        &self,
        prehash: &B256,
        signature: &RecoverableSignature,
    ) -> Result<Address, RecoveryError>;
}

/// secp256k1 ECDSA recovery with Ethereum-style addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Recovery;

impl SignerRecovery for Secp256k1Recovery {
    fn recover(
        &self,
        prehash: &B256,
        signature: &RecoverableSignature,
    ) -> Result<Address, RecoveryError> {
        let signature = signature.normalized();
        let recovery_id = signature
            .recovery_id()
            .ok_or(RecoveryError::InvalidRecoveryByte(signature.v()))?;

        let ecdsa = Signature::from_slice(signature.rs()).map_err(|_| RecoveryError::Malformed)?;
        // Only low-s signatures are accepted; (r, n - s) would otherwise be a
        // second valid encoding of the same proof.
        if ecdsa.normalize_s().is_some() {
            return Err(RecoveryError::HighS);
        }

        let key = VerifyingKey::recover_from_prehash(prehash.as_slice(), &ecdsa, recovery_id)
            .map_err(|_| RecoveryError::Unrecoverable)?;

        Ok(address_from_verifying_key(&key))
    }
}

/// Derive the Ethereum address of a secp256k1 public key.
///
/// 1. Take the uncompressed point (0x04 || x || y)
/// 2. keccak256 over x || y
/// 3. Keep the last 20 bytes
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use k256::elliptic_curve::rand_core::OsRng;

    fn sign(key: &SigningKey, prehash: &B256) -> RecoverableSignature {
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(prehash.as_slice())
            .unwrap();
        RecoverableSignature::from_parts(&signature, recovery_id)
    }

    #[test]
    fn recovers_signer_address() {
        let key = SigningKey::random(&mut OsRng);
        let expected = address_from_verifying_key(key.verifying_key());
        let prehash = keccak256(b"relational");

        let recovered = Secp256k1Recovery.recover(&prehash, &sign(&key, &prehash)).unwrap();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn accepts_zero_one_recovery_byte() {
        let key = SigningKey::random(&mut OsRng);
        let prehash = keccak256(b"ganache style");
        let mut bytes = *sign(&key, &prehash).as_bytes();
        bytes[64] -= 27;

        let recovered = Secp256k1Recovery
            .recover(&prehash, &RecoverableSignature::from_bytes(bytes))
            .unwrap();
        assert_eq!(recovered, address_from_verifying_key(key.verifying_key()));
    }

    #[test]
    fn rejects_out_of_range_recovery_byte() {
        let key = SigningKey::random(&mut OsRng);
        let prehash = keccak256(b"payload");
        let mut bytes = *sign(&key, &prehash).as_bytes();
        bytes[64] = 29;

        let err = Secp256k1Recovery
            .recover(&prehash, &RecoverableSignature::from_bytes(bytes))
            .unwrap_err();
        assert_eq!(err, RecoveryError::InvalidRecoveryByte(29));
    }

    #[test]
    fn rejects_high_s() {
        let key = SigningKey::random(&mut OsRng);
        let prehash = keccak256(b"payload");
        let canonical = sign(&key, &prehash);

        let ecdsa = Signature::from_slice(canonical.rs()).unwrap();
        let (r, s) = ecdsa.split_scalars();
        let high_s = -k256::Scalar::from(*s);
        let flipped =
            Signature::from_scalars(k256::Scalar::from(*r).to_bytes(), high_s.to_bytes()).unwrap();

        let mut bytes = *canonical.as_bytes();
        bytes[..64].copy_from_slice(&flipped.to_bytes());
        bytes[64] ^= 1;

        let err = Secp256k1Recovery
            .recover(&prehash, &RecoverableSignature::from_bytes(bytes))
            .unwrap_err();
        assert_eq!(err, RecoveryError::HighS);
    }

    #[test]
    fn different_hash_recovers_different_address() {
        let key = SigningKey::random(&mut OsRng);
        let signature = sign(&key, &keccak256(b"one"));

        match Secp256k1Recovery.recover(&keccak256(b"two"), &signature) {
            Ok(address) => assert_ne!(address, address_from_verifying_key(key.verifying_key())),
            Err(err) => assert_eq!(err, RecoveryError::Unrecoverable),
        }
    }

    #[test]
    fn zero_signature_is_malformed() {
        let mut bytes = [0u8; 65];
        bytes[64] = 27;
        let err = Secp256k1Recovery
            .recover(&keccak256(b"x"), &RecoverableSignature::from_bytes(bytes))
            .unwrap_err();
        assert_eq!(err, RecoveryError::Malformed);
    }
}
