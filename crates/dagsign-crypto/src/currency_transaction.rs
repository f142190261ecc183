// Currency transaction codec
//
// Transactions are not hashed as canonical JSON. The fields are rendered
// into a length-prefixed string, framed Kryo-style and hashed with
// SHA-256. That hash then goes through the regular second digest stage.

use rand_core::{OsRng, RngCore};

use crate::address::is_valid_dag_address;
use crate::currency_types::{
    CurrencyTransaction, CurrencyTransactionValue, TransactionReference, TransferParams,
    MIN_SALT, TOKEN_DECIMALS,
};
use crate::error::{EncodingError, Result, SdkError};
use crate::hash::hash_bytes;
use crate::keys::{get_public_key_id, key_pair_from_private_key};
use crate::kryo::kryo_serialize;
use crate::sign::sign_hash;
use crate::types::{Hash, SignatureProof, Signed, VerificationResult};
use crate::verify::{verify_hash, verify_proofs_against_hash};

/// v2 transactions always declare two parents.
const PARENT_COUNT: &str = "2";

const SALT_RANDOM_BITS: u32 = 48;

/// Converts a token amount to integer units, rounding down.
///
/// Saturates outside the `i64` range. Transaction builders reject such
/// amounts instead.
///
/// # Example
/// ```
/// use dagsign_crypto::token_to_units;
///
/// assert_eq!(token_to_units(100.5), 10_050_000_000);
/// assert_eq!(token_to_units(0.00000001), 1);
/// ```
pub fn token_to_units(amount: f64) -> i64 {
    (amount * 1e8).floor() as i64
}

/// Converts integer units back to tokens.
///
/// Multiplies by `TOKEN_DECIMALS`, so the result can differ from
/// `units / 1e8` in the last bit.
pub fn units_to_token(units: i64) -> f64 {
    units as f64 * TOKEN_DECIMALS
}

/// Returns `MIN_SALT` plus 48 random bits, as a decimal string.
pub fn generate_salt() -> String {
    let random = OsRng.next_u64() >> (64 - SALT_RANDOM_BITS);
    (MIN_SALT + random).to_string()
}

/// Renders the length-prefixed field string that gets framed and hashed.
pub fn encode_currency_transaction(transaction: &CurrencyTransaction) -> Result<String> {
    encode_value(&transaction.value)
}

/// SHA-256 over the Kryo-framed field encoding.
pub fn hash_currency_transaction(transaction: &CurrencyTransaction) -> Result<Hash> {
    hash_value(&transaction.value)
}

/// Reference to `transaction` for use as the next transaction's parent.
pub fn get_transaction_reference(
    transaction: &CurrencyTransaction,
    ordinal: u64,
) -> Result<TransactionReference> {
    let hash = hash_currency_transaction(transaction)?;
    Ok(TransactionReference::new(hash.value, ordinal))
}

/// Builds and signs a transfer from the key's address.
///
/// # Errors
/// `InvalidArgument` if the destination is malformed or equals the source,
/// the amount is below one unit, the fee is negative, or either does not
/// fit in 64-bit units.
pub fn create_currency_transaction(
    params: &TransferParams,
    private_key: &str,
    last_ref: &TransactionReference,
) -> Result<CurrencyTransaction> {
    create_currency_transaction_with_salt(params, private_key, last_ref, &generate_salt())
}

/// Same as [`create_currency_transaction`] with a caller-chosen salt.
pub fn create_currency_transaction_with_salt(
    params: &TransferParams,
    private_key: &str,
    last_ref: &TransactionReference,
    salt: &str,
) -> Result<CurrencyTransaction> {
    let source = key_pair_from_private_key(private_key)?.address;

    if !is_valid_dag_address(&source) {
        return Err(SdkError::InvalidArgument(format!(
            "invalid source address: {}",
            source
        )));
    }
    if !is_valid_dag_address(&params.destination) {
        return Err(SdkError::InvalidArgument(format!(
            "invalid destination address: {}",
            params.destination
        )));
    }
    if source == params.destination {
        return Err(SdkError::InvalidArgument(
            "source and destination addresses cannot be the same".to_string(),
        ));
    }

    let amount = to_units("amount", params.amount)?;
    let fee = to_units("fee", params.fee)?;
    if amount < 1 {
        return Err(SdkError::InvalidArgument(
            "transfer amount must be at least 1e-8".to_string(),
        ));
    }
    if fee < 0 {
        return Err(SdkError::InvalidArgument(
            "fee must be greater than or equal to zero".to_string(),
        ));
    }

    let value = CurrencyTransactionValue {
        source,
        destination: params.destination.clone(),
        amount: amount as u64,
        fee: fee as u64,
        parent: last_ref.clone(),
        salt: salt.to_string(),
    };

    tracing::debug!(
        destination = %value.destination,
        amount = value.amount,
        fee = value.fee,
        parent_ordinal = value.parent.ordinal,
        "building currency transaction"
    );

    sign_currency_transaction(&Signed::new(value, Vec::new()), private_key)
}

/// Creates one transaction per transfer, each chained to the one before.
///
/// The first transaction's parent is `last_ref`; every later one points at
/// the previous transaction's hash with the ordinal incremented.
pub fn create_currency_transaction_batch(
    transfers: &[TransferParams],
    private_key: &str,
    last_ref: &TransactionReference,
) -> Result<Vec<CurrencyTransaction>> {
    let mut transactions = Vec::with_capacity(transfers.len());
    let mut parent = last_ref.clone();

    for transfer in transfers {
        let transaction = create_currency_transaction(transfer, private_key, &parent)?;
        let ordinal = parent.ordinal.checked_add(1).ok_or_else(|| {
            SdkError::InvalidArgument(format!("parent ordinal {} cannot advance", parent.ordinal))
        })?;
        let next = get_transaction_reference(&transaction, ordinal)?;
        tracing::debug!(hash = %next.hash, ordinal = next.ordinal, "chained batch transaction");

        parent = next;
        transactions.push(transaction);
    }

    Ok(transactions)
}

/// Appends a signature from `private_key`.
///
/// The new proof is checked against the transaction hash before it is
/// added. A proof that fails that check yields `SignVerify`.
pub fn sign_currency_transaction(
    transaction: &CurrencyTransaction,
    private_key: &str,
) -> Result<CurrencyTransaction> {
    let hash = hash_currency_transaction(transaction)?;
    let signature = sign_hash(&hash.value, private_key)?;
    let id = get_public_key_id(private_key)?;

    if !verify_hash(&hash.value, &signature, &id) {
        tracing::error!(signer = %id, hash = %hash.value, "fresh signature failed verification");
        return Err(SdkError::SignVerify(format!(
            "signature by {} does not verify against transaction {}",
            id, hash.value
        )));
    }

    tracing::debug!(signer = %id, hash = %hash.value, "signed currency transaction");
    Ok(transaction.with_proof(SignatureProof { id, signature }))
}

/// Checks every proof against the transaction hash.
pub fn verify_currency_transaction(transaction: &CurrencyTransaction) -> VerificationResult {
    match hash_currency_transaction(transaction) {
        Ok(hash) => verify_proofs_against_hash(&hash.value, &transaction.proofs),
        Err(e) => {
            tracing::debug!(error = %e, "transaction could not be encoded for verification");
            VerificationResult::partition(&transaction.proofs, |_| false)
        }
    }
}

fn encode_value(value: &CurrencyTransactionValue) -> Result<String> {
    let amount = format!("{:x}", value.amount);
    let ordinal = value.parent.ordinal.to_string();
    let fee = value.fee.to_string();
    let salt = salt_hex(&value.salt)?;

    let mut encoded = String::from(PARENT_COUNT);
    for field in [
        value.source.as_str(),
        value.destination.as_str(),
        amount.as_str(),
        value.parent.hash.as_str(),
        ordinal.as_str(),
        fee.as_str(),
        salt.as_str(),
    ] {
        encoded.push_str(&field.chars().count().to_string());
        encoded.push_str(field);
    }
    Ok(encoded)
}

fn hash_value(value: &CurrencyTransactionValue) -> Result<Hash> {
    let encoded = encode_value(value)?;
    Ok(hash_bytes(&kryo_serialize(&encoded, false)))
}

/// Lowercase hex of the salt. Negative salts render as 64-bit two's
/// complement.
fn salt_hex(salt: &str) -> Result<String> {
    let invalid = || SdkError::from(EncodingError::InvalidSalt(salt.to_string()));

    if salt.starts_with('-') {
        let n: i64 = salt.parse().map_err(|_| invalid())?;
        Ok(format!("{:x}", n as u64))
    } else {
        let n: u128 = salt.parse().map_err(|_| invalid())?;
        Ok(format!("{:x}", n))
    }
}

fn to_units(field: &str, tokens: f64) -> Result<i64> {
    if !tokens.is_finite() {
        return Err(SdkError::InvalidArgument(format!(
            "{} must be a finite number",
            field
        )));
    }
    let units = (tokens * 1e8).floor();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if units >= i64::MAX as f64 || units < i64::MIN as f64 {
        return Err(SdkError::InvalidArgument(format!(
            "{} {} is too large to express in units",
            field, tokens
        )));
    }
    Ok(token_to_units(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_key_pair;

    const PRIVATE_KEY: &str = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
    const SOURCE: &str = "DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRvR";
    const DESTINATION: &str = "DAG4o41NzhfX6DyYBTTXu6sJa6awm36abJpv89jB";
    const SALT: &str = "9007199254740992";
    const ENCODED: &str = "240DAG1vTmrhDPkNkUEb5yGbH9i5R9xTDNMFpHQwRvR40DAG4o41NzhfX6DyYBTTXu6sJa6awm36abJpv89jB925706d48064aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa10101420000000000000";
    const HASH: &str = "5b7e930be16d49adaf75ee5e5c63ac27f61a4a47058ab54ff10e9095f3bf6409";

    fn genesis() -> TransactionReference {
        TransactionReference::new("a".repeat(64), 0)
    }

    fn unsigned(amount: u64, fee: u64, salt: &str) -> CurrencyTransaction {
        Signed::new(
            CurrencyTransactionValue {
                source: SOURCE.to_string(),
                destination: DESTINATION.to_string(),
                amount,
                fee,
                parent: genesis(),
                salt: salt.to_string(),
            },
            Vec::new(),
        )
    }

    #[test]
    fn test_token_unit_conversion() {
        assert_eq!(token_to_units(100.5), 10_050_000_000);
        assert_eq!(token_to_units(0.00000001), 1);
        assert_eq!(token_to_units(0.000000009), 0);
        assert_eq!(token_to_units(-0.00000001), -1);
        assert!((units_to_token(10_050_000_000) - 100.5).abs() < 1e-9);
    }

    #[test]
    fn test_generated_salt_range() {
        for _ in 0..32 {
            let salt: u64 = generate_salt().parse().unwrap();
            assert!(salt >= MIN_SALT);
            assert!(salt < MIN_SALT + (1 << 48));
        }
    }

    #[test]
    fn test_encode_and_hash_match_reference() {
        let tx = unsigned(10_050_000_000, 0, SALT);
        assert_eq!(encode_currency_transaction(&tx).unwrap(), ENCODED);
        assert_eq!(hash_currency_transaction(&tx).unwrap().value, HASH);
    }

    #[test]
    fn test_encode_edge_cases() {
        let min = encode_currency_transaction(&unsigned(1, 0, SALT)).unwrap();
        assert!(min.contains("jB11"));

        let max = encode_currency_transaction(&unsigned(i64::MAX as u64, 0, SALT)).unwrap();
        assert!(max.contains("167fffffffffffffff64"));

        let negative = encode_currency_transaction(&unsigned(10_050_000_000, 0, "-1")).unwrap();
        assert!(negative.ends_with("16ffffffffffffffff"));

        let with_fee = encode_currency_transaction(&unsigned(1, 100_000, SALT)).unwrap();
        assert!(with_fee.contains("106100000"));
    }

    #[test]
    fn test_malformed_salt_is_an_encoding_error() {
        let tx = unsigned(1, 0, "12abc");
        assert!(matches!(
            encode_currency_transaction(&tx),
            Err(SdkError::Encoding(EncodingError::InvalidSalt(_)))
        ));
    }

    #[test]
    fn test_create_with_fixed_salt_reproduces_reference() {
        let params = TransferParams::new(DESTINATION, 100.5);
        let tx = create_currency_transaction_with_salt(&params, PRIVATE_KEY, &genesis(), SALT)
            .unwrap();

        assert_eq!(tx.value, unsigned(10_050_000_000, 0, SALT).value);
        assert_eq!(hash_currency_transaction(&tx).unwrap().value, HASH);
        assert_eq!(tx.proofs.len(), 1);
        assert!(verify_currency_transaction(&tx).is_valid);
    }

    #[test]
    fn test_create_rejects_bad_arguments() {
        let cases = [
            TransferParams::new("not-an-address", 1.0),
            TransferParams::new(SOURCE, 1.0),
            TransferParams::new(DESTINATION, 0.000000001),
            TransferParams::new(DESTINATION, 0.0),
            TransferParams::new(DESTINATION, 1.0).with_fee(-0.00000001),
            TransferParams::new(DESTINATION, f64::NAN),
            TransferParams::new(DESTINATION, 1e11),
            TransferParams::new(DESTINATION, 1.0).with_fee(1e12),
        ];

        for params in &cases {
            let result = create_currency_transaction(params, PRIVATE_KEY, &genesis());
            assert!(
                matches!(result, Err(SdkError::InvalidArgument(_))),
                "{:?}",
                params
            );
        }
    }

    #[test]
    fn test_cosign_and_verify() {
        let second = generate_key_pair();
        let tx = create_currency_transaction(
            &TransferParams::new(DESTINATION, 5.0),
            PRIVATE_KEY,
            &genesis(),
        )
        .unwrap();

        let cosigned = sign_currency_transaction(&tx, &second.private_key).unwrap();
        assert_eq!(tx.proofs.len(), 1);
        assert_eq!(cosigned.proofs.len(), 2);

        let result = verify_currency_transaction(&cosigned);
        assert!(result.is_valid);
        assert_eq!(result.valid_proofs.len(), 2);
    }

    #[test]
    fn test_tampered_transaction_fails_verification() {
        let tx = create_currency_transaction(
            &TransferParams::new(DESTINATION, 5.0),
            PRIVATE_KEY,
            &genesis(),
        )
        .unwrap();

        let mut tampered = tx.clone();
        tampered.value.amount += 1;

        let result = verify_currency_transaction(&tampered);
        assert!(!result.is_valid);
        assert_eq!(result.invalid_proofs, tx.proofs);
    }

    #[test]
    fn test_batch_chains_parents() {
        let transfers = vec![
            TransferParams::new(DESTINATION, 1.0),
            TransferParams::new(DESTINATION, 2.0).with_fee(0.1),
            TransferParams::new(DESTINATION, 3.0),
        ];
        let start = TransactionReference::new("b".repeat(64), 7);

        let batch = create_currency_transaction_batch(&transfers, PRIVATE_KEY, &start).unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].value.parent, start);
        for pair in batch.windows(2) {
            let previous_hash = hash_currency_transaction(&pair[0]).unwrap().value;
            assert_eq!(pair[1].value.parent.hash, previous_hash);
            assert_eq!(pair[1].value.parent.ordinal, pair[0].value.parent.ordinal + 1);
        }
        assert!(batch.iter().all(|tx| verify_currency_transaction(tx).is_valid));
    }

    #[test]
    fn test_batch_stops_at_last_ordinal() {
        let start = TransactionReference::new("c".repeat(64), u64::MAX);
        let result = create_currency_transaction_batch(
            &[TransferParams::new(DESTINATION, 1.0)],
            PRIVATE_KEY,
            &start,
        );
        assert!(matches!(result, Err(SdkError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_batch() {
        let batch = create_currency_transaction_batch(&[], PRIVATE_KEY, &genesis()).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_transaction_reference() {
        let tx = unsigned(10_050_000_000, 0, SALT);
        assert_eq!(
            get_transaction_reference(&tx, 1).unwrap(),
            TransactionReference::new(HASH, 1)
        );
    }
}
