//! Core value types for signed metagraph objects.
//!
//! Every type here is an immutable value object. `Signed<T>` owns its proof
//! list; adding a signature produces a new instance.

use serde::{Deserialize, Serialize};

/// Signature algorithm identifier advertised by this implementation.
pub const ALGORITHM: &str = "SECP256K1_RFC8785_V1";

/// Prefix prepended to DataUpdate payloads before hashing.
pub const CONSTELLATION_PREFIX: &str = "\x19Constellation Signed Data:\n";

/// A SHA-256 hash, kept both as lowercase hex and as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    /// 64-character lowercase hex
    pub value: String,
    /// Raw 32-byte digest
    pub bytes: [u8; 32],
}

impl Hash {
    pub(crate) fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            value: hex::encode(bytes),
            bytes,
        }
    }
}

/// A secp256k1 key pair with its derived DAG address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// 32-byte scalar as 64 hex characters
    pub private_key: String,
    /// Uncompressed point (`04 || X || Y`) as 130 hex characters
    pub public_key: String,
    /// DAG address derived from `public_key`
    pub address: String,
}

/// One signer's approval of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureProof {
    /// Public key hex without the `04` prefix (128 characters)
    pub id: String,
    /// DER-encoded ECDSA signature as hex
    pub signature: String,
}

/// A value together with the proofs attesting it.
///
/// Serializes as `{"value": ..., "proofs": [...]}`, the structure submitted
/// to ledger nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<T> {
    pub value: T,
    /// Proofs in the order they were added; duplicates are kept.
    pub proofs: Vec<SignatureProof>,
}

impl<T> Signed<T> {
    /// Wraps a value with an initial set of proofs.
    pub fn new(value: T, proofs: Vec<SignatureProof>) -> Self {
        Self { value, proofs }
    }

    /// Returns a copy with `proof` appended, leaving `self` untouched.
    pub fn with_proof(&self, proof: SignatureProof) -> Self
    where
        T: Clone,
    {
        let mut proofs = self.proofs.clone();
        proofs.push(proof);
        Self {
            value: self.value.clone(),
            proofs,
        }
    }
}

/// Outcome of checking every proof on a signed value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationResult {
    /// True iff at least one proof was checked and none failed.
    pub is_valid: bool,
    pub valid_proofs: Vec<SignatureProof>,
    pub invalid_proofs: Vec<SignatureProof>,
}

impl VerificationResult {
    /// Partitions `proofs` with `check`, preserving proof order.
    pub(crate) fn partition<'a, I, F>(proofs: I, mut check: F) -> Self
    where
        I: IntoIterator<Item = &'a SignatureProof>,
        F: FnMut(&SignatureProof) -> bool,
    {
        let (valid_proofs, invalid_proofs): (Vec<_>, Vec<_>) =
            proofs.into_iter().cloned().partition(|proof| check(proof));

        Self {
            is_valid: invalid_proofs.is_empty() && !valid_proofs.is_empty(),
            valid_proofs,
            invalid_proofs,
        }
    }
}
