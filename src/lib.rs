//! Access key management for NEAR accounts
//!
//! Adds full-access and function-call keys, creates testnet accounts and
//! rotates keys without ever leaving an account locked out: a new key is
//! added and confirmed on the ledger before the old key is revoked.
//!
//! Ledger access sits behind [`account::AccountDirectory`] and
//! [`account::AccountKeyAdmin`]. [`account::NearAccountDirectory`] talks to
//! an RPC node; with the `mock` feature, `account::MockLedger` provides an
//! in-memory ledger for tests.

pub mod account;
pub mod cli;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod keystore;
pub mod logging;
pub mod node_status;
pub mod operations;
pub mod output;

pub use account::{AccessKeyPermission, AccessKeyRecord, AccountDirectory, AccountKeyAdmin};
pub use config::{CreateAccountParams, FunctionKeyParams, NetworkConfig, RotateKeyParams};
pub use crypto::{Ed25519Generator, KeyPair, KeyPairGenerator, KeyScheme};
pub use error::{KeysError, KeysResult};
pub use keystore::{AccessKeyStore, InMemoryKeyStore, UnencryptedFileKeyStore};
pub use operations::{KeyManager, KeyRotator, Rotation, RotationOptions, RotationOutcome};
pub use output::{ConsoleSecretSink, SecretSink, WriterSecretSink};
