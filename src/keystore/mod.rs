//! Local key-material storage
//!
//! One credential per `(network, account)` pair. The file-backed store keeps
//! the layout existing tooling already reads, so keys written here can be
//! used elsewhere and vice versa.

pub mod file;
pub mod memory;

pub use file::UnencryptedFileKeyStore;
pub use memory::InMemoryKeyStore;

use crate::crypto::{CryptoError, KeyPair};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by key stores
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("Key store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Key store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored credential could not be turned back into a key pair
    #[error("Invalid credential in {path}: {message}")]
    InvalidCredential { path: PathBuf, message: String },

    /// Network or account id unusable as a path component
    #[error("Invalid key store path component: {0}")]
    InvalidPath(String),
}

pub type KeyStoreResult<T> = Result<T, KeyStoreError>;

/// Persisted form of one credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub account_id: String,
    pub public_key: String,
    #[serde(alias = "secret_key")]
    pub private_key: String,
}

impl StoredCredential {
    pub fn new(account_id: &str, key_pair: &KeyPair) -> Self {
        Self {
            account_id: account_id.to_string(),
            public_key: key_pair.public_key(),
            private_key: key_pair.secret_key().to_string(),
        }
    }

    /// Rebuild the key pair, checking the recorded public key matches
    pub fn to_key_pair(&self) -> Result<KeyPair, CryptoError> {
        let key_pair = KeyPair::from_secret_key_str(&self.private_key)?;
        if key_pair.public_key() != self.public_key {
            return Err(CryptoError::InvalidKey {
                message: format!(
                    "recorded public key {} does not match private key",
                    self.public_key
                ),
            });
        }
        Ok(key_pair)
    }
}

impl Drop for StoredCredential {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.private_key.zeroize();
    }
}

/// Capability to persist key material locally
pub trait AccessKeyStore: Send + Sync {
    /// Store (or replace) the key for `account_id` on `network_id`
    fn set_key(&self, network_id: &str, account_id: &str, key_pair: &KeyPair) -> KeyStoreResult<()>;

    /// Fetch the key for `account_id` on `network_id`, if one is stored
    fn get_key(&self, network_id: &str, account_id: &str) -> KeyStoreResult<Option<KeyPair>>;

    /// Forget the key; removing a missing key is not an error
    fn remove_key(&self, network_id: &str, account_id: &str) -> KeyStoreResult<()>;

    /// Accounts with a stored key on `network_id`, sorted
    fn list_accounts(&self, network_id: &str) -> KeyStoreResult<Vec<String>>;
}
