// Key generation and public key handling for secp256k1

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand_core::OsRng;

use crate::address::address_from_public_key_bytes;
use crate::error::{Result, SdkError};
use crate::types::KeyPair;

/// Generates a new key pair from OS randomness.
///
/// The private key is a uniformly random non-zero secp256k1 scalar.
pub fn generate_key_pair() -> KeyPair {
    let signing_key = SigningKey::random(&mut OsRng);
    key_pair_from_signing_key(&signing_key)
}

/// Derives the key pair for an existing private key.
///
/// # Arguments
/// * `private_key` - 64 hex characters (32 bytes)
pub fn key_pair_from_private_key(private_key: &str) -> Result<KeyPair> {
    let signing_key = signing_key_from_hex(private_key)?;
    Ok(key_pair_from_signing_key(&signing_key))
}

/// Returns the public key for a private key as hex.
///
/// Uncompressed keys are 130 characters (`04` prefix), compressed keys 66.
pub fn get_public_key_hex(private_key: &str, compressed: bool) -> Result<String> {
    let signing_key = signing_key_from_hex(private_key)?;
    Ok(public_key_hex(signing_key.verifying_key(), compressed))
}

/// Returns the 128-character public key id used in `SignatureProof::id`.
pub fn get_public_key_id(private_key: &str) -> Result<String> {
    let public_key = get_public_key_hex(private_key, false)?;
    Ok(normalize_public_key_to_id(&public_key))
}

/// Checks that a private key is 64 hex characters.
///
/// Does not check that the scalar lies in the curve order.
pub fn is_valid_private_key(private_key: &str) -> bool {
    private_key.len() == 64 && private_key.chars().all(|c| c.is_ascii_hexdigit())
}

/// Checks that a public key is 128 or 130 hex characters.
///
/// Does not check curve membership.
pub fn is_valid_public_key(public_key: &str) -> bool {
    (public_key.len() == 128 || public_key.len() == 130)
        && public_key.chars().all(|c| c.is_ascii_hexdigit())
}

/// Adds the `04` prefix to a bare 128-character public key.
pub fn normalize_public_key(public_key: &str) -> String {
    if public_key.len() == 128 {
        format!("04{}", public_key)
    } else {
        public_key.to_string()
    }
}

/// Strips the `04` prefix from a 130-character public key.
pub fn normalize_public_key_to_id(public_key: &str) -> String {
    match public_key.strip_prefix("04") {
        Some(id) if public_key.len() == 130 => id.to_string(),
        _ => public_key.to_string(),
    }
}

pub(crate) fn signing_key_from_hex(private_key: &str) -> Result<SigningKey> {
    if !is_valid_private_key(private_key) {
        return Err(SdkError::InvalidKey(
            "private key must be 64 hex characters".to_string(),
        ));
    }
    let bytes = hex::decode(private_key)?;
    SigningKey::from_slice(&bytes)
        .map_err(|_| SdkError::InvalidKey("private key is not a valid secp256k1 scalar".to_string()))
}

/// Parses a public key with or without the `04` prefix.
pub(crate) fn verifying_key_from_hex(public_key: &str) -> Result<VerifyingKey> {
    if !is_valid_public_key(public_key) {
        return Err(SdkError::InvalidKey(
            "public key must be 128 or 130 hex characters".to_string(),
        ));
    }
    let bytes = hex::decode(normalize_public_key(public_key))?;
    VerifyingKey::from_sec1_bytes(&bytes)
        .map_err(|_| SdkError::InvalidKey("public key is not a point on secp256k1".to_string()))
}

pub(crate) fn public_key_hex(verifying_key: &VerifyingKey, compressed: bool) -> String {
    hex::encode(verifying_key.to_encoded_point(compressed).as_bytes())
}

fn key_pair_from_signing_key(signing_key: &SigningKey) -> KeyPair {
    let point = signing_key.verifying_key().to_encoded_point(false);
    KeyPair {
        private_key: hex::encode(signing_key.to_bytes()),
        public_key: hex::encode(point.as_bytes()),
        address: address_from_public_key_bytes(point.as_bytes()),
    }
}
