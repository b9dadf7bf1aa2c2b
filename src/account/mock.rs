//! In-memory ledger for tests
//!
//! Behaves like the remote ledger for the calls this crate makes: every
//! mutating call must be signed by a full-access key of the account, adding
//! a duplicate key or deleting a missing one fails, and the `testnet`
//! factory's `create_account` creates accounts. Failures and read lag can be
//! injected per operation.

use crate::account::{AccessKeyPermission, AccessKeyRecord, AccountDirectory, AccountKeyAdmin};
use crate::constants::{CREATE_ACCOUNT_METHOD, TESTNET_ACCOUNT_FACTORY};
use crate::error::{KeysError, KeysResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ledger operations that can be observed and failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    AddKey,
    ListKeys,
    DeleteKey,
    CallFunction,
}

/// Error to raise when an injected failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Rpc,
    Unauthorized,
    NotFound,
}

impl InjectedFailure {
    fn to_error(self, op: LedgerOp) -> KeysError {
        let message = format!("injected failure on {:?}", op);
        match self {
            InjectedFailure::Rpc => KeysError::Rpc(message),
            InjectedFailure::Unauthorized => KeysError::Unauthorized(message),
            InjectedFailure::NotFound => KeysError::NotFound(message),
        }
    }
}

/// One call seen by the ledger, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub op: LedgerOp,
    pub account_id: String,
    /// Public key, or `contract.method` for function calls
    pub target: String,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<String, Vec<AccessKeyRecord>>,
    signers: HashMap<String, String>,
    failures: HashMap<LedgerOp, InjectedFailure>,
    lagging: bool,
    hidden: HashSet<(String, String)>,
    calls: Vec<LedgerCall>,
}

/// Shared in-memory ledger; clones see the same state
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an account holding one full-access key, which also becomes the
    /// key handles sign with
    pub fn create_account(&self, account_id: &str, public_key: &str) {
        let mut state = self.lock();
        state.accounts.insert(
            account_id.to_string(),
            vec![AccessKeyRecord {
                public_key: public_key.to_string(),
                permission: AccessKeyPermission::FullAccess,
            }],
        );
        state
            .signers
            .insert(account_id.to_string(), public_key.to_string());
    }

    /// Switch the key handles for `account_id` sign with
    pub fn set_signer(&self, account_id: &str, public_key: &str) {
        self.lock()
            .signers
            .insert(account_id.to_string(), public_key.to_string());
    }

    /// Make every future `op` fail with `failure`
    pub fn fail(&self, op: LedgerOp, failure: InjectedFailure) {
        self.lock().failures.insert(op, failure);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// While lagging, keys added are applied but hidden from `list_keys`
    pub fn set_lagging(&self, lagging: bool) {
        let mut state = self.lock();
        state.lagging = lagging;
        if !lagging {
            state.hidden.clear();
        }
    }

    pub fn account_exists(&self, account_id: &str) -> bool {
        self.lock().accounts.contains_key(account_id)
    }

    /// Authoritative key set, ignoring lag
    pub fn keys(&self, account_id: &str) -> Vec<AccessKeyRecord> {
        self.lock()
            .accounts
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn public_keys(&self, account_id: &str) -> HashSet<String> {
        self.keys(account_id)
            .into_iter()
            .map(|record| record.public_key)
            .collect()
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: LedgerOp) -> usize {
        self.lock().calls.iter().filter(|call| call.op == op).count()
    }
}

#[async_trait]
impl AccountDirectory for MockLedger {
    async fn account(&self, account_id: &str) -> KeysResult<Box<dyn AccountKeyAdmin>> {
        let state = self.lock();
        if !state.accounts.contains_key(account_id) {
            return Err(KeysError::NotFound(format!("account {} does not exist", account_id)));
        }
        let signer = state.signers.get(account_id).cloned().ok_or_else(|| {
            KeysError::NotFound(format!("no signing key for {}", account_id))
        })?;
        Ok(Box::new(MockAccount {
            ledger: self.clone(),
            account_id: account_id.to_string(),
            signer,
        }))
    }
}

/// Handle bound to one account of a [`MockLedger`]
#[derive(Debug)]
pub struct MockAccount {
    ledger: MockLedger,
    account_id: String,
    signer: String,
}

impl MockAccount {
    /// Record the call, fire injected failures and check the signer still
    /// holds a full-access key
    fn begin(
        &self,
        state: &mut LedgerState,
        op: LedgerOp,
        target: &str,
        needs_full_access: bool,
    ) -> KeysResult<()> {
        state.calls.push(LedgerCall {
            op,
            account_id: self.account_id.clone(),
            target: target.to_string(),
        });
        if let Some(failure) = state.failures.get(&op) {
            return Err(failure.to_error(op));
        }

        let keys = state.accounts.get(&self.account_id).ok_or_else(|| {
            KeysError::NotFound(format!("account {} does not exist", self.account_id))
        })?;
        if needs_full_access {
            let authorized = keys
                .iter()
                .any(|k| k.public_key == self.signer && k.permission.is_full_access());
            if !authorized {
                return Err(KeysError::Unauthorized(format!(
                    "{} is not a full-access key of {}",
                    self.signer, self.account_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AccountKeyAdmin for MockAccount {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn add_key(&self, public_key: &str, permission: &AccessKeyPermission) -> KeysResult<()> {
        let mut state = self.ledger.lock();
        self.begin(&mut state, LedgerOp::AddKey, public_key, true)?;

        let lagging = state.lagging;
        let keys = state.accounts.entry(self.account_id.clone()).or_default();
        if keys.iter().any(|k| k.public_key == public_key) {
            return Err(KeysError::TransactionFailed(format!(
                "key {} already exists on {}",
                public_key, self.account_id
            )));
        }
        keys.push(AccessKeyRecord {
            public_key: public_key.to_string(),
            permission: permission.clone(),
        });
        if lagging {
            state
                .hidden
                .insert((self.account_id.clone(), public_key.to_string()));
        }
        Ok(())
    }

    async fn list_keys(&self) -> KeysResult<Vec<AccessKeyRecord>> {
        let mut state = self.ledger.lock();
        self.begin(&mut state, LedgerOp::ListKeys, "", false)?;

        let keys = state.accounts.get(&self.account_id).cloned().unwrap_or_default();
        Ok(keys
            .into_iter()
            .filter(|k| {
                !state
                    .hidden
                    .contains(&(self.account_id.clone(), k.public_key.clone()))
            })
            .collect())
    }

    async fn delete_key(&self, public_key: &str) -> KeysResult<()> {
        let mut state = self.ledger.lock();
        self.begin(&mut state, LedgerOp::DeleteKey, public_key, true)?;

        let keys = state.accounts.entry(self.account_id.clone()).or_default();
        let before = keys.len();
        keys.retain(|k| k.public_key != public_key);
        if keys.len() == before {
            return Err(KeysError::NotFound(format!(
                "key {} does not exist on {}",
                public_key, self.account_id
            )));
        }
        Ok(())
    }

    async fn call_function(
        &self,
        contract_id: &str,
        method_name: &str,
        args: serde_json::Value,
    ) -> KeysResult<()> {
        let mut state = self.ledger.lock();
        let target = format!("{}.{}", contract_id, method_name);
        self.begin(&mut state, LedgerOp::CallFunction, &target, true)?;

        if contract_id != TESTNET_ACCOUNT_FACTORY || method_name != CREATE_ACCOUNT_METHOD {
            return Ok(());
        }
        let field = |name: &str| {
            args.get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| KeysError::TransactionFailed(format!("missing argument {}", name)))
        };
        let new_account_id = field("new_account_id")?;
        let new_public_key = field("new_public_key")?;
        if state.accounts.contains_key(&new_account_id) {
            return Err(KeysError::TransactionFailed(format!(
                "account {} already exists",
                new_account_id
            )));
        }
        state.accounts.insert(
            new_account_id.clone(),
            vec![AccessKeyRecord {
                public_key: new_public_key.clone(),
                permission: AccessKeyPermission::FullAccess,
            }],
        );
        state.signers.insert(new_account_id, new_public_key);
        Ok(())
    }
}
