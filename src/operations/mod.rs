//! Account key operations
//!
//! Each operation builds one account handle, generates a fresh key pair and
//! issues the ledger calls in sequence. Nothing runs concurrently and
//! nothing is retried.

pub mod rotation;

pub use rotation::{KeyRotator, Rotation, RotationOptions, RotationOutcome};

use crate::account::{AccessKeyPermission, AccessKeyRecord, AccountDirectory};
use crate::config::{validate_account_id, CreateAccountParams, FunctionKeyParams};
use crate::constants::{CREATE_ACCOUNT_METHOD, TESTNET_ACCOUNT_FACTORY};
use crate::crypto::{Ed25519Generator, KeyPair, KeyPairGenerator, KeyScheme};
use crate::error::{KeysError, KeysResult};
use crate::keystore::AccessKeyStore;
use crate::output::{ConsoleSecretSink, SecretSink};
use log::info;
use serde_json::json;
use std::sync::Arc;

/// Entry point for every key operation against one network
pub struct KeyManager {
    network_id: String,
    directory: Arc<dyn AccountDirectory>,
    key_store: Arc<dyn AccessKeyStore>,
    generator: Arc<dyn KeyPairGenerator>,
    secrets: Arc<dyn SecretSink>,
}

impl KeyManager {
    /// Manager with OS-random ed25519 keys and the stdout secret channel
    pub fn new(
        network_id: impl Into<String>,
        directory: Arc<dyn AccountDirectory>,
        key_store: Arc<dyn AccessKeyStore>,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            directory,
            key_store,
            generator: Arc::new(Ed25519Generator),
            secrets: Arc::new(ConsoleSecretSink::stdout()),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn KeyPairGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_secret_sink(mut self, secrets: Arc<dyn SecretSink>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Generate a key pair and authorize it on `account_id` with full access
    pub async fn add_full_access_key(&self, account_id: &str) -> KeysResult<KeyPair> {
        validate_account_id(account_id)?;
        self.add_new_key(account_id, AccessKeyPermission::FullAccess).await
    }

    /// Generate a key pair that may only call the listed methods of one contract
    pub async fn add_function_call_key(&self, params: &FunctionKeyParams) -> KeysResult<KeyPair> {
        let permission = AccessKeyPermission::FunctionCall {
            receiver_id: params.contract_id.clone(),
            method_names: params.method_names.clone(),
            allowance: params.allowance,
        };
        self.add_new_key(&params.account_id, permission).await
    }

    async fn add_new_key(
        &self,
        account_id: &str,
        permission: AccessKeyPermission,
    ) -> KeysResult<KeyPair> {
        let account = self.directory.account(account_id).await?;

        let key_pair = self.generator.generate(KeyScheme::Ed25519)?;
        account.add_key(&key_pair.public_key(), &permission).await?;
        info!(
            "Authorized {} on {} with {}",
            key_pair.public_key(),
            account_id,
            permission
        );

        self.secrets.emit(&key_pair)?;
        Ok(key_pair)
    }

    /// Create `new_account_id` through the testnet account factory, signed
    /// by `creator_account_id`.
    ///
    /// The new key pair is written to the key store before the ledger call,
    /// so a created account is never left without its credential. It is not
    /// emitted on the secret channel. An account that already has a stored
    /// credential is refused before anything is generated, so that credential
    /// is never overwritten.
    pub async fn create_testnet_account(&self, params: &CreateAccountParams) -> KeysResult<KeyPair> {
        if self.network_id != "testnet" {
            return Err(KeysError::InvalidInput(format!(
                "account factory '{}' only exists on testnet, not {}",
                TESTNET_ACCOUNT_FACTORY, self.network_id
            )));
        }
        if self
            .key_store
            .get_key(&self.network_id, &params.new_account_id)?
            .is_some()
        {
            return Err(KeysError::InvalidInput(format!(
                "a key for {} is already stored on {}; refusing to replace it",
                params.new_account_id, self.network_id
            )));
        }

        let creator = self.directory.account(&params.creator_account_id).await?;

        let key_pair = self.generator.generate(KeyScheme::Ed25519)?;
        let public_key = key_pair.public_key();
        self.key_store
            .set_key(&self.network_id, &params.new_account_id, &key_pair)?;

        creator
            .call_function(
                TESTNET_ACCOUNT_FACTORY,
                CREATE_ACCOUNT_METHOD,
                json!({
                    "new_account_id": params.new_account_id,
                    "new_public_key": public_key,
                }),
            )
            .await?;

        info!(
            "Created {} with key {} (signed by {})",
            params.new_account_id, public_key, params.creator_account_id
        );
        Ok(key_pair)
    }

    /// Keys currently authorized on `account_id`
    pub async fn list_keys(&self, account_id: &str) -> KeysResult<Vec<AccessKeyRecord>> {
        validate_account_id(account_id)?;
        let account = self.directory.account(account_id).await?;
        account.list_keys().await
    }

    /// Rotator sharing this manager's capabilities
    pub fn rotator(&self, options: RotationOptions) -> KeyRotator {
        KeyRotator::new(
            self.network_id.clone(),
            Arc::clone(&self.directory),
            Arc::clone(&self.key_store),
            Arc::clone(&self.generator),
            Arc::clone(&self.secrets),
        )
        .with_options(options)
    }
}
