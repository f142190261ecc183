// DAG address derivation and validation
//
// Address format: "DAG" + parity digit + last 36 base58 characters of
// SHA-256(X.509 SubjectPublicKeyInfo header || uncompressed public key).

use sha2::{Digest, Sha256};

use crate::error::{Result, SdkError};
use crate::keys::normalize_public_key;

/// DER SubjectPublicKeyInfo header for an uncompressed secp256k1 key
/// (SEQUENCE, id-ecPublicKey, secp256k1, BIT STRING of 66 bytes).
const PKCS_PREFIX: [u8; 23] = [
    0x30, 0x56, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x05,
    0x2b, 0x81, 0x04, 0x00, 0x0a, 0x03, 0x42, 0x00,
];

const ADDRESS_PREFIX: &str = "DAG";
const ADDRESS_LENGTH: usize = 40;
const BODY_LENGTH: usize = 36;

/// Bitcoin base58 alphabet (no `0`, `O`, `I`, `l`).
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Derives the DAG address for a hex public key.
///
/// Accepts an uncompressed key with or without the `04` prefix.
///
/// # Example
/// ```
/// use dagsign_crypto::get_address;
///
/// let public_key = "04bb50e2d89a4ed70663d080659fe0ad4b9bc3e06c17a227433966cb59ceee020decddbf6e00192011648d13b1c00af770c0c1bb609d4d3a5c98a43772e0e18ef4";
/// assert_eq!(get_address(public_key).unwrap(), "DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRvR");
/// ```
pub fn get_address(public_key: &str) -> Result<String> {
    let bytes = hex::decode(normalize_public_key(public_key))?;
    if bytes.len() != 65 || bytes[0] != 0x04 {
        return Err(SdkError::InvalidKey(
            "address derivation needs an uncompressed 65-byte public key".to_string(),
        ));
    }
    Ok(address_from_public_key_bytes(&bytes))
}

/// Derives the address from a 65-byte uncompressed SEC1 point.
pub(crate) fn address_from_public_key_bytes(public_key: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(PKCS_PREFIX);
    hasher.update(public_key);
    let hash = hasher.finalize();

    let encoded = bs58::encode(hash).into_string();
    let body = &encoded[encoded.len().saturating_sub(BODY_LENGTH)..];

    format!("{}{}{}", ADDRESS_PREFIX, parity_digit(body), body)
}

/// Sum of the decimal digits in `body`, mod 9.
fn parity_digit(body: &str) -> u32 {
    body.chars().filter_map(|c| c.to_digit(10)).sum::<u32>() % 9
}

/// Checks the shape of a DAG address.
///
/// Requires exactly 40 characters, the `DAG` prefix, a parity digit in
/// `0..=8` and 36 base58 characters. The parity value itself is not
/// recomputed.
pub fn is_valid_dag_address(address: &str) -> bool {
    if address.len() != ADDRESS_LENGTH || !address.starts_with(ADDRESS_PREFIX) {
        return false;
    }

    let bytes = address.as_bytes();
    if !matches!(bytes[3], b'0'..=b'8') {
        return false;
    }

    address[4..].chars().all(|c| BASE58_ALPHABET.contains(c))
}
