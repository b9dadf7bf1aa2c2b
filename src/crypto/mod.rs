//! Key material for access keys
//!
//! Key pairs are generated fresh for every operation. Nothing here talks to
//! the network; the account layer hands the encoded public key to the ledger.

pub mod ed25519;
pub mod error;

pub use ed25519::{split_scheme, Ed25519Generator, KeyPair};
pub use error::{CryptoError, CryptoResult};

use std::fmt;
use std::str::FromStr;

/// Signature scheme of an access key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyScheme {
    #[default]
    Ed25519,
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyScheme::Ed25519 => write!(f, "ed25519"),
        }
    }
}

impl FromStr for KeyScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(KeyScheme::Ed25519),
            other => Err(CryptoError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Source of fresh key pairs.
///
/// Implementations must be cryptographically secure; callers rely on every
/// call returning a pair never seen before.
pub trait KeyPairGenerator: Send + Sync {
    fn generate(&self, scheme: KeyScheme) -> CryptoResult<KeyPair>;
}
