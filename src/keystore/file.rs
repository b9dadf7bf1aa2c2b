//! Unencrypted file key store
//!
//! Layout: `<root>/<network_id>/<account_id>.json`, each file holding one
//! [`StoredCredential`]. Directories are created owner-only and files are
//! written with mode 600 on unix.

use crate::config::validate_account_id;
use crate::crypto::KeyPair;
use crate::keystore::{AccessKeyStore, KeyStoreError, KeyStoreResult, StoredCredential};
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct UnencryptedFileKeyStore {
    root: PathBuf,
}

impl UnencryptedFileKeyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn network_dir(&self, network_id: &str) -> KeyStoreResult<PathBuf> {
        if network_id.is_empty()
            || network_id.contains(['/', '\\'])
            || network_id.starts_with('.')
        {
            return Err(KeyStoreError::InvalidPath(network_id.to_string()));
        }
        Ok(self.root.join(network_id))
    }

    /// Path of the credential file for one account
    pub fn key_file_path(&self, network_id: &str, account_id: &str) -> KeyStoreResult<PathBuf> {
        validate_account_id(account_id)
            .map_err(|e| KeyStoreError::InvalidPath(e.to_string()))?;
        Ok(self.network_dir(network_id)?.join(format!("{}.json", account_id)))
    }
}

impl AccessKeyStore for UnencryptedFileKeyStore {
    fn set_key(&self, network_id: &str, account_id: &str, key_pair: &KeyPair) -> KeyStoreResult<()> {
        let path = self.key_file_path(network_id, account_id)?;
        ensure_private_dir(&self.network_dir(network_id)?)?;

        let credential = StoredCredential::new(account_id, key_pair);
        let json = serde_json::to_string(&credential)?;
        write_private_file(&path, json.as_bytes())?;

        info!(
            "Stored key {} for {} on {} at {}",
            credential.public_key,
            account_id,
            network_id,
            path.display()
        );
        Ok(())
    }

    fn get_key(&self, network_id: &str, account_id: &str) -> KeyStoreResult<Option<KeyPair>> {
        let path = self.key_file_path(network_id, account_id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored key at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let credential: StoredCredential = serde_json::from_str(&content)?;
        let key_pair = credential
            .to_key_pair()
            .map_err(|e| KeyStoreError::InvalidCredential {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(Some(key_pair))
    }

    fn remove_key(&self, network_id: &str, account_id: &str) -> KeyStoreResult<()> {
        let path = self.key_file_path(network_id, account_id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed stored key for {} on {}", account_id, network_id);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_accounts(&self, network_id: &str) -> KeyStoreResult<Vec<String>> {
        let dir = self.network_dir(network_id)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut accounts = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    accounts.push(stem.to_string());
                }
            }
        }
        accounts.sort();
        Ok(accounts)
    }
}

/// Ensure a directory exists with owner-only permissions
fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(dir)?.permissions();
        perms.set_mode(0o700);
        fs::set_permissions(dir, perms)?;
    }

    Ok(())
}

/// Write a file readable by the owner only
fn write_private_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;

    #[cfg(unix)]
    {
        // mode() only applies on creation; tighten files that already existed
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519Generator, KeyPairGenerator, KeyScheme};
    use tempfile::tempdir;

    fn new_key() -> KeyPair {
        Ed25519Generator.generate(KeyScheme::Ed25519).unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let store = UnencryptedFileKeyStore::new(dir.path());
        let key = new_key();

        store.set_key("testnet", "pivortex.testnet", &key).unwrap();
        let loaded = store.get_key("testnet", "pivortex.testnet").unwrap().unwrap();

        assert_eq!(loaded.public_key(), key.public_key());
        assert!(dir.path().join("testnet").join("pivortex.testnet.json").exists());
    }

    #[test]
    fn test_networks_are_separate() {
        let dir = tempdir().unwrap();
        let store = UnencryptedFileKeyStore::new(dir.path());
        store.set_key("testnet", "alice.testnet", &new_key()).unwrap();

        assert!(store.get_key("mainnet", "alice.testnet").unwrap().is_none());
        assert_eq!(store.list_accounts("testnet").unwrap(), vec!["alice.testnet"]);
        assert!(store.list_accounts("mainnet").unwrap().is_empty());
    }

    #[test]
    fn test_file_format() {
        let dir = tempdir().unwrap();
        let store = UnencryptedFileKeyStore::new(dir.path());
        let key = new_key();
        store.set_key("testnet", "bob.testnet", &key).unwrap();

        let path = store.key_file_path("testnet", "bob.testnet").unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["account_id"], "bob.testnet");
        assert_eq!(value["public_key"], key.public_key().as_str());
        assert_eq!(value["private_key"], key.secret_key().as_str());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = UnencryptedFileKeyStore::new(dir.path());
        store.set_key("testnet", "carol.testnet", &new_key()).unwrap();

        let path = store.key_file_path("testnet", "carol.testnet").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = UnencryptedFileKeyStore::new(dir.path());
        store.set_key("testnet", "dave.testnet", &new_key()).unwrap();

        store.remove_key("testnet", "dave.testnet").unwrap();
        store.remove_key("testnet", "dave.testnet").unwrap();
        assert!(store.get_key("testnet", "dave.testnet").unwrap().is_none());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = UnencryptedFileKeyStore::new(dir.path());

        assert!(store.key_file_path("testnet", "../escape").is_err());
        assert!(store.key_file_path("../testnet", "alice.testnet").is_err());
    }

    #[test]
    fn test_tampered_credential_rejected() {
        let dir = tempdir().unwrap();
        let store = UnencryptedFileKeyStore::new(dir.path());
        store.set_key("testnet", "erin.testnet", &new_key()).unwrap();

        let path = store.key_file_path("testnet", "erin.testnet").unwrap();
        let other = new_key();
        let tampered = serde_json::json!({
            "account_id": "erin.testnet",
            "public_key": other.public_key(),
            "private_key": new_key().secret_key().as_str(),
        });
        fs::write(&path, tampered.to_string()).unwrap();

        assert!(matches!(
            store.get_key("testnet", "erin.testnet"),
            Err(KeyStoreError::InvalidCredential { .. })
        ));
    }
}
