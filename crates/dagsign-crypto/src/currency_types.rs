//! Types for v2 metagraph currency transactions.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::Signed;

/// Size of the smallest token unit.
pub const TOKEN_DECIMALS: f64 = 1e-8;

/// Lower bound for generated salts: 2^53 - 2^48.
pub const MIN_SALT: u64 = (1 << 53) - (1 << 48);

/// Points at the transaction a new one chains from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionReference {
    /// 64-character hex transaction hash
    pub hash: String,
    pub ordinal: u64,
}

impl TransactionReference {
    pub fn new(hash: impl Into<String>, ordinal: u64) -> Self {
        Self {
            hash: hash.into(),
            ordinal,
        }
    }
}

/// The signable body of a currency transaction.
///
/// `amount` and `fee` are integer counts of `TOKEN_DECIMALS` units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyTransactionValue {
    pub source: String,
    pub destination: String,
    pub amount: u64,
    pub fee: u64,
    pub parent: TransactionReference,
    /// Decimal integer, kept as text. Accepts a JSON number on input.
    #[serde(deserialize_with = "salt_from_string_or_number")]
    pub salt: String,
}

/// A signed currency transaction.
pub type CurrencyTransaction = Signed<CurrencyTransactionValue>;

/// A requested transfer, in whole-token units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferParams {
    pub destination: String,
    pub amount: f64,
    #[serde(default)]
    pub fee: f64,
}

impl TransferParams {
    /// A transfer with no fee.
    pub fn new(destination: impl Into<String>, amount: f64) -> Self {
        Self {
            destination: destination.into(),
            amount,
            fee: 0.0,
        }
    }

    pub fn with_fee(mut self, fee: f64) -> Self {
        self.fee = fee;
        self
    }
}

fn salt_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Salt {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Salt::deserialize(deserializer)? {
        Salt::Text(s) => s,
        Salt::Unsigned(n) => n.to_string(),
        Salt::Signed(n) => n.to_string(),
    })
}
