use crate::config::ConfigError;
use crate::crypto::CryptoError;
use crate::keystore::KeyStoreError;
use std::io;
use thiserror::Error;

/// Unified error type for key management operations.
///
/// The first four variants mirror how the ledger can refuse an operation:
/// the node could not be reached, the signing key was not allowed to do it,
/// something referenced does not exist, or the transaction itself failed.
/// A rotation whose new key is not yet visible is not an error; see
/// [`crate::operations::rotation::RotationOutcome`].
#[derive(Debug, Error)]
pub enum KeysError {
    /// Connectivity or RPC-level failure
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The signing key lacks permission for the requested action
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    /// Account, access key or stored credential does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The ledger executed the transaction and it failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Rejected by local validation before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Conversion from serde_json::Error to KeysError
impl From<serde_json::Error> for KeysError {
    fn from(error: serde_json::Error) -> Self {
        KeysError::Serialization(error.to_string())
    }
}

/// Result type alias for operations that can result in a KeysError
pub type KeysResult<T> = Result<T, KeysError>;
