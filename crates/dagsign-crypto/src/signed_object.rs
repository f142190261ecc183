// Multi-signature object model
//
// A signed object is a value plus an ordered list of proofs. Every
// operation here returns a fresh `Signed<T>`; nothing is mutated in place.

use serde::Serialize;

use crate::error::{Result, SdkError};
use crate::sign::sign_value;
use crate::types::Signed;

/// Signs `value` with one key and wraps it with that single proof.
///
/// # Arguments
/// * `value` - Any serializable value
/// * `private_key` - 64 hex characters
/// * `is_data_update` - Sign the DataUpdate encoding instead of plain JSON
pub fn create_signed_object<T: Serialize>(
    value: T,
    private_key: &str,
    is_data_update: bool,
) -> Result<Signed<T>> {
    let proof = sign_value(&value, private_key, is_data_update)?;
    Ok(Signed::new(value, vec![proof]))
}

/// Adds one more signature to an already-signed value.
///
/// The value is re-digested with `is_data_update`, so a co-signer must use
/// the same mode as the original signer for the result to verify.
pub fn add_signature<T: Serialize + Clone>(
    signed: &Signed<T>,
    private_key: &str,
    is_data_update: bool,
) -> Result<Signed<T>> {
    let proof = sign_value(&signed.value, private_key, is_data_update)?;
    Ok(signed.with_proof(proof))
}

/// Signs `value` once per key, in key order.
pub fn batch_sign<T: Serialize, K: AsRef<str>>(
    value: T,
    private_keys: &[K],
    is_data_update: bool,
) -> Result<Signed<T>> {
    if private_keys.is_empty() {
        return Err(SdkError::InvalidArgument(
            "at least one private key is required".to_string(),
        ));
    }

    let proofs = private_keys
        .iter()
        .map(|key| sign_value(&value, key.as_ref(), is_data_update))
        .collect::<Result<Vec<_>>>()?;

    Ok(Signed::new(value, proofs))
}
