//! Network configuration
//!
//! A [`NetworkConfig`] is built once per invocation (defaults for the named
//! network, then an optional TOML or JSON file, then command line overrides)
//! and passed by reference to every capability that needs it.

pub mod error;
pub mod params;

pub use error::{ConfigError, ConfigResult};
pub use params::{validate_account_id, CreateAccountParams, FunctionKeyParams, RotateKeyParams};

use crate::constants::{
    CREDENTIALS_DIR, DEFAULT_NETWORK_ID, DEFAULT_REQUEST_TIMEOUT_SECS, MAINNET_EXPLORER_URL,
    MAINNET_HELPER_URL, MAINNET_NODE_URL, MAINNET_WALLET_URL, TESTNET_EXPLORER_URL,
    TESTNET_HELPER_URL, TESTNET_NODE_URL, TESTNET_WALLET_URL,
};
use log::debug;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Connection settings for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network identifier, also the key-store namespace (`testnet`, `mainnet`)
    pub network_id: String,
    /// JSON-RPC endpoint
    pub node_url: String,
    pub wallet_url: String,
    pub helper_url: String,
    pub explorer_url: String,
    /// Root of the per-user credential files
    pub credentials_dir: PathBuf,
    /// Timeout for plain HTTP requests issued by this crate
    pub request_timeout_secs: u64,
}

/// On-disk form: every field optional, missing ones come from the named network
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkConfigFile {
    network_id: Option<String>,
    node_url: Option<String>,
    wallet_url: Option<String>,
    helper_url: Option<String>,
    explorer_url: Option<String>,
    credentials_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl NetworkConfig {
    pub fn testnet() -> ConfigResult<Self> {
        Ok(Self {
            network_id: "testnet".to_string(),
            node_url: TESTNET_NODE_URL.to_string(),
            wallet_url: TESTNET_WALLET_URL.to_string(),
            helper_url: TESTNET_HELPER_URL.to_string(),
            explorer_url: TESTNET_EXPLORER_URL.to_string(),
            credentials_dir: default_credentials_dir()?,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        })
    }

    pub fn mainnet() -> ConfigResult<Self> {
        Ok(Self {
            network_id: "mainnet".to_string(),
            node_url: MAINNET_NODE_URL.to_string(),
            wallet_url: MAINNET_WALLET_URL.to_string(),
            helper_url: MAINNET_HELPER_URL.to_string(),
            explorer_url: MAINNET_EXPLORER_URL.to_string(),
            credentials_dir: default_credentials_dir()?,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        })
    }

    /// Built-in defaults for a named network
    pub fn for_network(network_id: &str) -> ConfigResult<Self> {
        match network_id {
            "testnet" => Self::testnet(),
            "mainnet" => Self::mainnet(),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }

    /// Load a configuration file. `.toml` files are parsed as TOML, anything
    /// else as JSON.
    ///
    /// A file naming a network without built-in defaults must spell out
    /// every URL itself.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        debug!("Loading network config from {}", path.display());
        let content = fs::read_to_string(path)?;
        let file: NetworkConfigFile = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        let network_id = file
            .network_id
            .clone()
            .unwrap_or_else(|| DEFAULT_NETWORK_ID.to_string());
        let config = match Self::for_network(&network_id) {
            Ok(defaults) => file.apply_to(defaults),
            Err(ConfigError::UnknownNetwork(_)) => file.into_custom(network_id)?,
            Err(e) => return Err(e),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the URLs parse and the network id is usable as a directory name
    pub fn validate(&self) -> ConfigResult<()> {
        if self.network_id.is_empty()
            || self.network_id.contains(['/', '\\'])
            || self.network_id.starts_with('.')
        {
            return Err(ConfigError::Validation(format!(
                "invalid network id '{}'",
                self.network_id
            )));
        }
        for (name, value) in [
            ("node_url", &self.node_url),
            ("wallet_url", &self.wallet_url),
            ("helper_url", &self.helper_url),
            ("explorer_url", &self.explorer_url),
        ] {
            Url::parse(value)
                .map_err(|e| ConfigError::Validation(format!("{} '{}': {}", name, value, e)))?;
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed RPC endpoint
    pub fn node_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.node_url)
            .map_err(|e| ConfigError::Validation(format!("node_url '{}': {}", self.node_url, e)))
    }

    pub fn with_node_url(mut self, node_url: impl Into<String>) -> Self {
        self.node_url = node_url.into();
        self
    }

    pub fn with_credentials_dir(mut self, credentials_dir: impl Into<PathBuf>) -> Self {
        self.credentials_dir = credentials_dir.into();
        self
    }
}

impl NetworkConfigFile {
    fn apply_to(self, mut config: NetworkConfig) -> NetworkConfig {
        if let Some(v) = self.node_url {
            config.node_url = v;
        }
        if let Some(v) = self.wallet_url {
            config.wallet_url = v;
        }
        if let Some(v) = self.helper_url {
            config.helper_url = v;
        }
        if let Some(v) = self.explorer_url {
            config.explorer_url = v;
        }
        if let Some(v) = self.credentials_dir {
            config.credentials_dir = v;
        }
        if let Some(v) = self.request_timeout_secs {
            config.request_timeout_secs = v;
        }
        config
    }

    fn into_custom(self, network_id: String) -> ConfigResult<NetworkConfig> {
        let missing = |field: &str| {
            ConfigError::Validation(format!(
                "network '{}' has no defaults, '{}' is required",
                network_id, field
            ))
        };
        Ok(NetworkConfig {
            node_url: self.node_url.ok_or_else(|| missing("node_url"))?,
            wallet_url: self.wallet_url.ok_or_else(|| missing("wallet_url"))?,
            helper_url: self.helper_url.ok_or_else(|| missing("helper_url"))?,
            explorer_url: self.explorer_url.ok_or_else(|| missing("explorer_url"))?,
            credentials_dir: match self.credentials_dir {
                Some(dir) => dir,
                None => default_credentials_dir()?,
            },
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            network_id,
        })
    }
}

/// `~/.near-credentials`
pub fn default_credentials_dir() -> ConfigResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        ConfigError::PathResolution("Unable to determine home directory".to_string())
    })?;
    Ok(home_dir.join(CREDENTIALS_DIR))
}
