//! Ed25519 access-key generation and string encoding

use crate::crypto::error::{CryptoError, CryptoResult};
use crate::crypto::{KeyPairGenerator, KeyScheme};
use ed25519_dalek::{SigningKey, KEYPAIR_LENGTH};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// An access key pair.
///
/// The public half is rendered as `ed25519:<base58 public key>` and the
/// secret half as `ed25519:<base58 secret seed || public key>`, the same
/// strings the ledger echoes back and the credential files hold.
///
/// The signing key is zeroized when the pair is dropped.
#[derive(Clone)]
pub struct KeyPair {
    scheme: KeyScheme,
    signing_key: SigningKey,
}

impl KeyPair {
    /// Create a KeyPair from a SigningKey
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self {
            scheme: KeyScheme::Ed25519,
            signing_key,
        }
    }

    /// Parse the `ed25519:<base58>` secret key form used by credential files.
    ///
    /// The encoded public half must match the one derived from the seed.
    pub fn from_secret_key_str(encoded: &str) -> CryptoResult<Self> {
        let (scheme, data) = split_scheme(encoded)?;
        match scheme {
            KeyScheme::Ed25519 => {
                let bytes = Zeroizing::new(bs58::decode(data).into_vec()?);
                if bytes.len() != KEYPAIR_LENGTH {
                    return Err(CryptoError::InvalidKey {
                        message: format!(
                            "expected {} secret key bytes, got {}",
                            KEYPAIR_LENGTH,
                            bytes.len()
                        ),
                    });
                }
                let mut keypair_bytes = Zeroizing::new([0u8; KEYPAIR_LENGTH]);
                keypair_bytes.copy_from_slice(&bytes);
                let signing_key = SigningKey::from_keypair_bytes(&keypair_bytes)?;
                Ok(Self::from_signing_key(signing_key))
            }
        }
    }

    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    /// Public key in its scheme-prefixed encoding
    pub fn public_key(&self) -> String {
        let bytes = self.signing_key.verifying_key().to_bytes();
        format!("{}:{}", self.scheme, bs58::encode(bytes).into_string())
    }

    /// Secret key in its scheme-prefixed encoding (use with caution)
    pub fn secret_key(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signing_key.to_keypair_bytes());
        Zeroizing::new(format!(
            "{}:{}",
            self.scheme,
            bs58::encode(bytes.as_slice()).into_string()
        ))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("scheme", &self.scheme)
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Split `<scheme>:<data>` into its parts
pub fn split_scheme(encoded: &str) -> CryptoResult<(KeyScheme, &str)> {
    let (prefix, data) = encoded
        .split_once(':')
        .ok_or_else(|| CryptoError::UnsupportedScheme(format!("missing scheme prefix in '{}'", encoded)))?;
    Ok((prefix.parse()?, data))
}

/// Generates key pairs from the operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Generator;

impl KeyPairGenerator for Ed25519Generator {
    fn generate(&self, scheme: KeyScheme) -> CryptoResult<KeyPair> {
        match scheme {
            KeyScheme::Ed25519 => {
                let mut csprng = OsRng;
                Ok(KeyPair::from_signing_key(SigningKey::generate(&mut csprng)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_use_scheme_prefix() {
        let keypair = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();

        assert!(keypair.public_key().starts_with("ed25519:"));
        assert!(keypair.secret_key().starts_with("ed25519:"));

        let public_key = keypair.public_key();
        let (scheme, data) = split_scheme(&public_key).unwrap();
        assert_eq!(scheme, KeyScheme::Ed25519);
        assert_eq!(
            bs58::decode(data).into_vec().unwrap().len(),
            ed25519_dalek::PUBLIC_KEY_LENGTH
        );
    }

    #[test]
    fn test_secret_key_string_restores_same_pair() {
        let original = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();

        let restored = KeyPair::from_secret_key_str(&original.secret_key()).unwrap();

        assert_eq!(original.public_key(), restored.public_key());
        assert_eq!(*original.secret_key(), *restored.secret_key());
    }

    #[test]
    fn test_known_seed_encoding() {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let keypair = KeyPair::from_signing_key(signing_key.clone());

        let expected = format!(
            "ed25519:{}",
            bs58::encode(signing_key.verifying_key().to_bytes()).into_string()
        );
        assert_eq!(keypair.public_key(), expected);
    }

    #[test]
    fn test_mismatched_public_half_rejected() {
        let a = SigningKey::from_bytes(&[1u8; 32]);
        let b = SigningKey::from_bytes(&[2u8; 32]);
        let mut bytes = [0u8; KEYPAIR_LENGTH];
        bytes[..32].copy_from_slice(&a.to_bytes());
        bytes[32..].copy_from_slice(&b.verifying_key().to_bytes());
        let encoded = format!("ed25519:{}", bs58::encode(bytes).into_string());

        assert!(KeyPair::from_secret_key_str(&encoded).is_err());
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let err = KeyPair::from_secret_key_str("secp256k1:abc").unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedScheme(_)));

        let err = split_scheme("no-prefix").unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let keypair = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();
        let rendered = format!("{:?}", keypair);

        assert!(rendered.contains(&keypair.public_key()));
        assert!(!rendered.contains(keypair.secret_key().as_str()));
    }
}
