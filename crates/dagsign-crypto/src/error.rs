//! Error types for the DAG signing protocol.
//!
//! Verification outcomes are never errors: a bad or mismatched signature
//! shows up as `false` or as an entry in `VerificationResult::invalid_proofs`.

use thiserror::Error;

/// Top-level error type for every fallible library operation.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Data could not be canonicalized, or a DataUpdate wrapper is malformed.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Caller-supplied input violates a protocol guard.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Key material is not valid hex of the right length, or not on the curve.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A freshly produced signature did not verify against its own key.
    #[error("sign-verify check failed: {0}")]
    SignVerify(String),

    /// The ECDSA back end refused to sign.
    #[error("cryptographic error: {0}")]
    Crypto(String),
}

/// Failures while producing or decoding signable bytes.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The value has no RFC 8785 representation.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("invalid DataUpdate encoding: missing Constellation prefix")]
    MissingPrefix,

    #[error("invalid DataUpdate encoding: missing length delimiter")]
    MissingLengthDelimiter,

    #[error("invalid DataUpdate encoding: invalid length '{0}'")]
    InvalidLength(String),

    #[error("invalid DataUpdate encoding: length mismatch (declared {declared}, actual {actual})")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Transaction salt is not a decimal integer.
    #[error("invalid salt '{0}': expected a decimal integer")]
    InvalidSalt(String),
}

impl From<hex::FromHexError> for SdkError {
    fn from(err: hex::FromHexError) -> Self {
        SdkError::InvalidKey(format!("invalid hex: {}", err))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SdkError>;
