//! Account capabilities
//!
//! [`AccountDirectory`] hands out one [`AccountKeyAdmin`] handle per account
//! and per invocation; handles are never cached. The ledger is the source of
//! truth for [`AccessKeyRecord`]s, this crate only reads them.

pub mod near;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use near::NearAccountDirectory;
#[cfg(any(test, feature = "mock"))]
pub use mock::{LedgerOp, MockLedger};

use crate::error::KeysResult;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;

/// Authorization level of an access key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessKeyPermission {
    FullAccess,
    /// May only call `method_names` on `receiver_id` (any method when empty)
    FunctionCall {
        receiver_id: String,
        method_names: BTreeSet<String>,
        /// Remaining gas allowance in yoctoNEAR; `None` is unlimited
        allowance: Option<u128>,
    },
}

impl AccessKeyPermission {
    pub fn is_full_access(&self) -> bool {
        matches!(self, AccessKeyPermission::FullAccess)
    }
}

impl fmt::Display for AccessKeyPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKeyPermission::FullAccess => write!(f, "FullAccess"),
            AccessKeyPermission::FunctionCall {
                receiver_id,
                method_names,
                allowance,
            } => {
                let methods = if method_names.is_empty() {
                    "*".to_string()
                } else {
                    method_names.iter().cloned().collect::<Vec<_>>().join(",")
                };
                write!(f, "FunctionCall({} [{}]", receiver_id, methods)?;
                match allowance {
                    Some(allowance) => write!(f, " allowance={})", allowance),
                    None => write!(f, ")"),
                }
            }
        }
    }
}

/// An access key as reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyRecord {
    pub public_key: String,
    pub permission: AccessKeyPermission,
}

/// Key administration for one account, signed by the account's stored key
#[async_trait]
pub trait AccountKeyAdmin: Send + Sync {
    fn account_id(&self) -> &str;

    /// Authorize `public_key` on the account
    async fn add_key(&self, public_key: &str, permission: &AccessKeyPermission) -> KeysResult<()>;

    /// Every key currently authorized on the account
    async fn list_keys(&self) -> KeysResult<Vec<AccessKeyRecord>>;

    /// Revoke `public_key`
    async fn delete_key(&self, public_key: &str) -> KeysResult<()>;

    /// Call a contract method as this account
    async fn call_function(
        &self,
        contract_id: &str,
        method_name: &str,
        args: serde_json::Value,
    ) -> KeysResult<()>;
}

/// Resolves account identifiers to key-admin handles
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn account(&self, account_id: &str) -> KeysResult<Box<dyn AccountKeyAdmin>>;
}
