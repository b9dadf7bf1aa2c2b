//! Ledger-backed account capabilities
//!
//! Transactions are built, signed and sent by the `near-api` client library;
//! this module only maps between its types and ours. The signing key for an
//! account comes from the local key store.

use crate::account::{AccessKeyPermission, AccessKeyRecord, AccountDirectory, AccountKeyAdmin};
use crate::config::NetworkConfig;
use crate::error::{KeysError, KeysResult};
use crate::keystore::AccessKeyStore;
use async_trait::async_trait;
use log::{debug, info};
use near_api::{Account, Contract, RPCEndpoint, Signer};
use near_crypto::{PublicKey, SecretKey};
use near_primitives::account::{AccessKeyPermission as LedgerPermission, FunctionCallPermission};
use near_primitives::errors::{ActionErrorKind, InvalidTxError, TxExecutionError};
use near_primitives::types::AccountId;
use near_primitives::views::{AccessKeyPermissionView, FinalExecutionOutcomeView, FinalExecutionStatus};
use std::sync::Arc;

/// Resolves accounts against the RPC node named in a [`NetworkConfig`]
pub struct NearAccountDirectory {
    network_id: String,
    network: near_api::NetworkConfig,
    key_store: Arc<dyn AccessKeyStore>,
}

impl NearAccountDirectory {
    pub fn new(config: &NetworkConfig, key_store: Arc<dyn AccessKeyStore>) -> KeysResult<Self> {
        let mut network = match config.network_id.as_str() {
            "mainnet" => near_api::NetworkConfig::mainnet(),
            _ => near_api::NetworkConfig::testnet(),
        };
        network.rpc_endpoints = vec![RPCEndpoint::new(config.node_url()?)];

        Ok(Self {
            network_id: config.network_id.clone(),
            network,
            key_store,
        })
    }
}

#[async_trait]
impl AccountDirectory for NearAccountDirectory {
    async fn account(&self, account_id: &str) -> KeysResult<Box<dyn AccountKeyAdmin>> {
        let parsed = parse_account_id(account_id)?;
        let key_pair = self
            .key_store
            .get_key(&self.network_id, account_id)?
            .ok_or_else(|| {
                KeysError::NotFound(format!(
                    "no stored key for {} on {}",
                    account_id, self.network_id
                ))
            })?;
        let secret_key = key_pair
            .secret_key()
            .parse::<SecretKey>()
            .map_err(|e| KeysError::InvalidInput(format!("stored key for {}: {}", account_id, e)))?;
        let signer = Signer::new(Signer::from_secret_key(secret_key))
            .map_err(|e| KeysError::InvalidInput(format!("signer for {}: {}", account_id, e)))?;

        debug!(
            "Signing for {} on {} with {}",
            account_id,
            self.network_id,
            key_pair.public_key()
        );
        Ok(Box::new(NearAccount {
            account_id: parsed,
            account_id_str: account_id.to_string(),
            signer,
            network: self.network.clone(),
        }))
    }
}

/// Key-admin handle for one ledger account
pub struct NearAccount {
    account_id: AccountId,
    account_id_str: String,
    signer: Arc<Signer>,
    network: near_api::NetworkConfig,
}

#[async_trait]
impl AccountKeyAdmin for NearAccount {
    fn account_id(&self) -> &str {
        &self.account_id_str
    }

    async fn add_key(&self, public_key: &str, permission: &AccessKeyPermission) -> KeysResult<()> {
        let outcome = Account(self.account_id.clone())
            .add_key(to_ledger_permission(permission)?, parse_public_key(public_key)?)
            .with_signer(Arc::clone(&self.signer))
            .send_to(&self.network)
            .await
            .map_err(|e| classify_rpc_error(e.to_string()))?;
        check_outcome(outcome)?;

        info!("Added key {} ({}) to {}", public_key, permission, self.account_id);
        Ok(())
    }

    async fn list_keys(&self) -> KeysResult<Vec<AccessKeyRecord>> {
        let list = Account(self.account_id.clone())
            .list_keys()
            .fetch_from(&self.network)
            .await
            .map_err(|e| classify_rpc_error(e.to_string()))?;

        Ok(list
            .keys
            .into_iter()
            .map(|info| AccessKeyRecord {
                public_key: info.public_key.to_string(),
                permission: from_ledger_permission(info.access_key.permission),
            })
            .collect())
    }

    async fn delete_key(&self, public_key: &str) -> KeysResult<()> {
        let outcome = Account(self.account_id.clone())
            .delete_key(parse_public_key(public_key)?)
            .with_signer(Arc::clone(&self.signer))
            .send_to(&self.network)
            .await
            .map_err(|e| classify_rpc_error(e.to_string()))?;
        check_outcome(outcome)?;

        info!("Deleted key {} from {}", public_key, self.account_id);
        Ok(())
    }

    async fn call_function(
        &self,
        contract_id: &str,
        method_name: &str,
        args: serde_json::Value,
    ) -> KeysResult<()> {
        let outcome = Contract(parse_account_id(contract_id)?)
            .call_function(method_name, args)
            .map_err(|e| KeysError::InvalidInput(format!("{}.{}: {}", contract_id, method_name, e)))?
            .transaction()
            .with_signer(self.account_id.clone(), Arc::clone(&self.signer))
            .send_to(&self.network)
            .await
            .map_err(|e| classify_rpc_error(e.to_string()))?;
        check_outcome(outcome)?;

        info!("{} called {}.{}", self.account_id, contract_id, method_name);
        Ok(())
    }
}

fn parse_account_id(account_id: &str) -> KeysResult<AccountId> {
    account_id
        .parse::<AccountId>()
        .map_err(|e| KeysError::InvalidInput(format!("account id '{}': {}", account_id, e)))
}

fn parse_public_key(public_key: &str) -> KeysResult<PublicKey> {
    public_key
        .parse::<PublicKey>()
        .map_err(|e| KeysError::InvalidInput(format!("public key '{}': {}", public_key, e)))
}

fn to_ledger_permission(permission: &AccessKeyPermission) -> KeysResult<LedgerPermission> {
    Ok(match permission {
        AccessKeyPermission::FullAccess => LedgerPermission::FullAccess,
        AccessKeyPermission::FunctionCall {
            receiver_id,
            method_names,
            allowance,
        } => LedgerPermission::FunctionCall(FunctionCallPermission {
            allowance: *allowance,
            receiver_id: parse_account_id(receiver_id)?.to_string(),
            method_names: method_names.iter().cloned().collect(),
        }),
    })
}

fn from_ledger_permission(permission: AccessKeyPermissionView) -> AccessKeyPermission {
    match permission {
        AccessKeyPermissionView::FullAccess => AccessKeyPermission::FullAccess,
        AccessKeyPermissionView::FunctionCall {
            allowance,
            receiver_id,
            method_names,
        } => AccessKeyPermission::FunctionCall {
            receiver_id,
            method_names: method_names.into_iter().collect(),
            allowance,
        },
    }
}

/// A transaction that reached the ledger can still have failed there
fn check_outcome(outcome: FinalExecutionOutcomeView) -> KeysResult<()> {
    match outcome.status {
        FinalExecutionStatus::SuccessValue(_) => Ok(()),
        FinalExecutionStatus::Failure(err) => Err(classify_execution_error(err)),
        other => Err(KeysError::Rpc(format!(
            "transaction {} did not finish: {:?}",
            outcome.transaction.hash, other
        ))),
    }
}

fn classify_execution_error(err: TxExecutionError) -> KeysError {
    let message = err.to_string();
    match err {
        TxExecutionError::ActionError(action) => match action.kind {
            ActionErrorKind::AccountDoesNotExist { .. }
            | ActionErrorKind::DeleteKeyDoesNotExist { .. } => KeysError::NotFound(message),
            _ => KeysError::TransactionFailed(message),
        },
        TxExecutionError::InvalidTxError(InvalidTxError::InvalidAccessKeyError(_)) => {
            KeysError::Unauthorized(message)
        }
        TxExecutionError::InvalidTxError(InvalidTxError::SignerDoesNotExist { .. }) => {
            KeysError::NotFound(message)
        }
        _ => KeysError::TransactionFailed(message),
    }
}

/// The client library reports node-side rejections as text; sort the ones
/// the operator can act on out of plain connectivity failures
fn classify_rpc_error(message: String) -> KeysError {
    const UNAUTHORIZED: [&str; 3] = ["InvalidAccessKeyError", "AccessKeyNotFound", "NotEnoughAllowance"];
    const NOT_FOUND: [&str; 4] = [
        "UnknownAccount",
        "UnknownAccessKey",
        "AccountDoesNotExist",
        "SignerDoesNotExist",
    ];

    if UNAUTHORIZED.iter().any(|needle| message.contains(needle)) {
        KeysError::Unauthorized(message)
    } else if NOT_FOUND.iter().any(|needle| message.contains(needle)) {
        KeysError::NotFound(message)
    } else {
        KeysError::Rpc(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_function_call_permission_mapping() {
        let methods: BTreeSet<String> = ["post_image", "post_comment"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let permission = AccessKeyPermission::FunctionCall {
            receiver_id: "socialmedia.testnet".to_string(),
            method_names: methods.clone(),
            allowance: Some(250),
        };

        match to_ledger_permission(&permission).unwrap() {
            LedgerPermission::FunctionCall(call) => {
                assert_eq!(call.receiver_id, "socialmedia.testnet");
                assert_eq!(call.allowance, Some(250));
                assert_eq!(call.method_names.into_iter().collect::<BTreeSet<_>>(), methods);
            }
            LedgerPermission::FullAccess => panic!("expected a function-call permission"),
        }
    }

    #[test]
    fn test_ledger_view_mapping() {
        let view = AccessKeyPermissionView::FunctionCall {
            allowance: None,
            receiver_id: "socialmedia.testnet".to_string(),
            method_names: vec!["post_comment".to_string(), "post_image".to_string()],
        };

        let permission = from_ledger_permission(view);
        assert_eq!(
            permission.to_string(),
            "FunctionCall(socialmedia.testnet [post_comment,post_image])"
        );
        assert!(from_ledger_permission(AccessKeyPermissionView::FullAccess).is_full_access());
    }

    #[test]
    fn test_rpc_error_classification() {
        assert!(matches!(
            classify_rpc_error("InvalidTxError: InvalidAccessKeyError(AccessKeyNotFound)".into()),
            KeysError::Unauthorized(_)
        ));
        assert!(matches!(
            classify_rpc_error("UnknownAccount { requested_account_id: x }".into()),
            KeysError::NotFound(_)
        ));
        assert!(matches!(
            classify_rpc_error("error sending request: connection refused".into()),
            KeysError::Rpc(_)
        ));
    }

    #[test]
    fn test_invalid_public_key_rejected_locally() {
        assert!(matches!(
            parse_public_key("ed25519:not-base58!"),
            Err(KeysError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_requires_stored_key() {
        let config = NetworkConfig::testnet()
            .unwrap()
            .with_credentials_dir(std::env::temp_dir().join("near-keys-empty"));
        let store: Arc<dyn AccessKeyStore> = Arc::new(crate::keystore::InMemoryKeyStore::new());
        let directory = NearAccountDirectory::new(&config, store).unwrap();

        let result = directory.account("pivortex.testnet").await;
        assert!(matches!(result, Err(KeysError::NotFound(_))));
    }
}
