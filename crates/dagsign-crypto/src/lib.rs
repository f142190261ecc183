// DAG Sign Crypto - cross-language signing protocol for metagraph data and
// currency transactions

pub mod address;
pub mod binary;
pub mod currency_transaction;
pub mod currency_types;
pub mod error;
pub mod hash;
pub mod jcs;
pub mod keys;
pub mod kryo;
pub mod sign;
pub mod signed_object;
pub mod types;
pub mod verify;

pub use address::{get_address, is_valid_dag_address};
pub use binary::{decode_data_update, encode_data_update, to_bytes};
pub use currency_transaction::{
    create_currency_transaction, create_currency_transaction_batch,
    create_currency_transaction_with_salt, encode_currency_transaction, generate_salt,
    get_transaction_reference, hash_currency_transaction, sign_currency_transaction,
    token_to_units, units_to_token, verify_currency_transaction,
};
pub use currency_types::{
    CurrencyTransaction, CurrencyTransactionValue, TransactionReference, TransferParams,
    MIN_SALT, TOKEN_DECIMALS,
};
pub use error::{EncodingError, Result, SdkError};
pub use hash::{compute_digest, compute_digest_from_hash, hash_bytes, hash_data};
pub use jcs::{canonicalize, canonicalize_bytes};
pub use keys::{
    generate_key_pair, get_public_key_hex, get_public_key_id, is_valid_private_key,
    is_valid_public_key, key_pair_from_private_key, normalize_public_key,
    normalize_public_key_to_id,
};
pub use kryo::kryo_serialize;
pub use sign::{sign, sign_data_update, sign_digest, sign_hash};
pub use signed_object::{add_signature, batch_sign, create_signed_object};
pub use types::{
    Hash, KeyPair, SignatureProof, Signed, VerificationResult, ALGORITHM, CONSTELLATION_PREFIX,
};
pub use verify::{verify, verify_digest, verify_hash, verify_signature};
