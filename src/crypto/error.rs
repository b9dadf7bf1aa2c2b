//! Error types for cryptographic operations

use thiserror::Error;

/// Result type alias for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during key generation and key encoding
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key string lacks the `<scheme>:` prefix or names an unknown scheme
    #[error("Unsupported key scheme: {0}")]
    UnsupportedScheme(String),

    /// Error during key decoding
    #[error("Failed to decode key: {message}")]
    Decoding { message: String },

    /// Invalid key material provided
    #[error("Invalid key material: {message}")]
    InvalidKey { message: String },
}

impl From<ed25519_dalek::SignatureError> for CryptoError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        CryptoError::InvalidKey {
            message: err.to_string(),
        }
    }
}

impl From<bs58::decode::Error> for CryptoError {
    fn from(err: bs58::decode::Error) -> Self {
        CryptoError::Decoding {
            message: err.to_string(),
        }
    }
}
