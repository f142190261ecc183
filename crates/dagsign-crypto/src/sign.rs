// ECDSA secp256k1 signing for the DAG signing protocol
//
// Signing pipeline for a value:
// canonical JSON -> (optional DataUpdate wrap) -> SHA-256 -> hex text
// -> SHA-512 truncated to 32 bytes -> ECDSA -> DER hex.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::Signature;
use serde::Serialize;

use crate::error::{Result, SdkError};
use crate::hash::{compute_digest_from_hash, hash_data};
use crate::keys::{get_public_key_id, signing_key_from_hex};
use crate::types::SignatureProof;

/// Signs a 32-byte digest and returns the DER-encoded signature as hex.
pub fn sign_digest(digest: &[u8; 32], private_key: &str) -> Result<String> {
    let signing_key = signing_key_from_hex(private_key)?;
    let signature: Signature = signing_key
        .sign_prehash(digest)
        .map_err(|e| SdkError::Crypto(e.to_string()))?;
    Ok(hex::encode(signature.to_der().as_bytes()))
}

/// Signs a precomputed SHA-256 hash given as 64 hex characters.
///
/// The hash text goes through the second digest stage before signing.
pub fn sign_hash(hash_hex: &str, private_key: &str) -> Result<String> {
    sign_digest(&compute_digest_from_hash(hash_hex), private_key)
}

/// Signs a value in regular (non-DataUpdate) mode.
///
/// # Example
/// ```
/// use dagsign_crypto::{generate_key_pair, sign};
/// use serde_json::json;
///
/// let key_pair = generate_key_pair();
/// let proof = sign(&json!({"action": "test"}), &key_pair.private_key).unwrap();
/// assert_eq!(proof.id.len(), 128);
/// ```
pub fn sign<T: Serialize + ?Sized>(value: &T, private_key: &str) -> Result<SignatureProof> {
    sign_value(value, private_key, false)
}

/// Signs a value as a DataUpdate.
pub fn sign_data_update<T: Serialize + ?Sized>(
    value: &T,
    private_key: &str,
) -> Result<SignatureProof> {
    sign_value(value, private_key, true)
}

pub(crate) fn sign_value<T: Serialize + ?Sized>(
    value: &T,
    private_key: &str,
    is_data_update: bool,
) -> Result<SignatureProof> {
    let hash = hash_data(value, is_data_update)?;
    let signature = sign_hash(&hash.value, private_key)?;
    let id = get_public_key_id(private_key)?;
    Ok(SignatureProof { id, signature })
}
