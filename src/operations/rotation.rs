//! Key rotation: add a new full-access key, confirm it on the ledger, then
//! revoke the old one.
//!
//! The old key is only revoked once the ledger reports the new key, so the
//! account is never left without a working credential. Between the add and
//! the delete both keys are valid; that window is expected. No step is
//! retried; any error ends the rotation and is returned to the caller.

use crate::account::{AccessKeyPermission, AccountDirectory};
use crate::config::{validate_account_id, RotateKeyParams};
use crate::crypto::{KeyPair, KeyPairGenerator, KeyScheme};
use crate::error::KeysResult;
use crate::keystore::AccessKeyStore;
use crate::output::SecretSink;
use log::{info, warn};
use std::sync::Arc;

/// Optional behaviour around a rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationOptions {
    /// After the old key is revoked, save the new pair as the account's
    /// stored credential
    pub store_new_key: bool,
}

/// How a rotation that returned `Ok` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// New key confirmed and old key revoked
    OldKeyRemoved,
    /// New key was added but not visible when re-read; old key left in place
    OldKeyRetained,
}

/// Result of [`KeyRotator::rotate`]
#[derive(Debug)]
pub struct Rotation {
    pub key_pair: KeyPair,
    pub outcome: RotationOutcome,
}

impl Rotation {
    pub fn is_complete(&self) -> bool {
        self.outcome == RotationOutcome::OldKeyRemoved
    }
}

pub struct KeyRotator {
    network_id: String,
    directory: Arc<dyn AccountDirectory>,
    key_store: Arc<dyn AccessKeyStore>,
    generator: Arc<dyn KeyPairGenerator>,
    secrets: Arc<dyn SecretSink>,
    options: RotationOptions,
}

impl KeyRotator {
    pub fn new(
        network_id: impl Into<String>,
        directory: Arc<dyn AccountDirectory>,
        key_store: Arc<dyn AccessKeyStore>,
        generator: Arc<dyn KeyPairGenerator>,
        secrets: Arc<dyn SecretSink>,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            directory,
            key_store,
            generator,
            secrets,
            options: RotationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RotationOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace `old_public_key` on `account_id` with a freshly generated key.
    ///
    /// The new pair is emitted through the secret sink as soon as the ledger
    /// accepts it, before confirmation, so it is never lost even if a later
    /// step fails. The comparison against the re-read key list is exact
    /// string equality on the encoded public key.
    pub async fn rotate(&self, account_id: &str, old_public_key: &str) -> KeysResult<Rotation> {
        validate_account_id(account_id)?;
        let account = self.directory.account(account_id).await?;

        let key_pair = self.generator.generate(KeyScheme::Ed25519)?;
        let new_public_key = key_pair.public_key();

        account
            .add_key(&new_public_key, &AccessKeyPermission::FullAccess)
            .await?;
        info!("Added new full-access key {} to {}", new_public_key, account_id);

        self.secrets.emit(&key_pair)?;

        let keys = account.list_keys().await?;
        let confirmed = keys.iter().any(|key| key.public_key == new_public_key);
        if !confirmed {
            warn!(
                "New key {} not yet listed on {}; leaving {} in place",
                new_public_key, account_id, old_public_key
            );
            return Ok(Rotation {
                key_pair,
                outcome: RotationOutcome::OldKeyRetained,
            });
        }

        account.delete_key(old_public_key).await?;
        info!("Revoked {} on {}", old_public_key, account_id);

        if self.options.store_new_key {
            self.key_store
                .set_key(&self.network_id, account_id, &key_pair)?;
        }

        Ok(Rotation {
            key_pair,
            outcome: RotationOutcome::OldKeyRemoved,
        })
    }

    pub async fn rotate_with(&self, params: &RotateKeyParams) -> KeysResult<Rotation> {
        self.rotate(&params.account_id, &params.old_public_key).await
    }
}
