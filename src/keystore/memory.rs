use crate::crypto::KeyPair;
use crate::keystore::{AccessKeyStore, KeyStoreResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory key store.
///
/// Keys are lost when the process exits. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<(String, String), KeyPair>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys across all networks
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccessKeyStore for InMemoryKeyStore {
    fn set_key(&self, network_id: &str, account_id: &str, key_pair: &KeyPair) -> KeyStoreResult<()> {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((network_id.to_string(), account_id.to_string()), key_pair.clone());
        Ok(())
    }

    fn get_key(&self, network_id: &str, account_id: &str) -> KeyStoreResult<Option<KeyPair>> {
        Ok(self
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(network_id.to_string(), account_id.to_string()))
            .cloned())
    }

    fn remove_key(&self, network_id: &str, account_id: &str) -> KeyStoreResult<()> {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(network_id.to_string(), account_id.to_string()));
        Ok(())
    }

    fn list_accounts(&self, network_id: &str) -> KeyStoreResult<Vec<String>> {
        let mut accounts: Vec<String> = self
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(network, _)| network == network_id)
            .map(|(_, account)| account.clone())
            .collect();
        accounts.sort();
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519Generator, KeyPairGenerator, KeyScheme};

    #[test]
    fn test_in_memory_keystore() {
        let store = InMemoryKeyStore::new();
        let key = Ed25519Generator.generate(KeyScheme::Ed25519).unwrap();
        let public = key.public_key();

        store.set_key("testnet", "alice.testnet", &key).unwrap();
        assert_eq!(store.len(), 1);

        let retrieved = store.get_key("testnet", "alice.testnet").unwrap().unwrap();
        assert_eq!(retrieved.public_key(), public);
        assert!(store.get_key("mainnet", "alice.testnet").unwrap().is_none());
        assert_eq!(store.list_accounts("testnet").unwrap(), vec!["alice.testnet"]);

        store.remove_key("testnet", "alice.testnet").unwrap();
        assert!(store.is_empty());
    }
}
