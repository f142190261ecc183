// Hashing for the DAG signing protocol
//
// The ECDSA digest is two-stage: SHA-256 over the signable bytes, then
// SHA-512 over the *hex text* of that hash, truncated to 32 bytes.

use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};

use crate::binary::to_bytes;
use crate::error::Result;
use crate::types::Hash;

/// Computes the SHA-256 hash of raw bytes.
pub fn hash_bytes(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Hash::from_bytes(hasher.finalize().into())
}

/// Computes the SHA-256 hash of a value's signable bytes.
pub fn hash_data<T: Serialize + ?Sized>(value: &T, is_data_update: bool) -> Result<Hash> {
    Ok(hash_bytes(&to_bytes(value, is_data_update)?))
}

/// Second digest stage: SHA-512 over the UTF-8 bytes of the hex string,
/// truncated to the first 32 bytes.
///
/// The input is hashed as text. It is never hex-decoded.
pub fn compute_digest_from_hash(sha256_hex: &str) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(sha256_hex.as_bytes());
    let full = hasher.finalize();

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&full[..32]);
    digest
}

/// Computes the 32-byte digest handed to ECDSA for a value.
pub fn compute_digest<T: Serialize + ?Sized>(value: &T, is_data_update: bool) -> Result<[u8; 32]> {
    let hash = hash_data(value, is_data_update)?;
    Ok(compute_digest_from_hash(&hash.value))
}
