//! Command line argument model for `near_keys`

use crate::config::{ConfigError, ConfigResult, NetworkConfig};
use crate::constants::DEFAULT_NETWORK_ID;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Manage access keys of NEAR accounts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML or JSON network configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Network to operate on
    #[arg(short, long, global = true, value_enum)]
    pub network: Option<NetworkArg>,

    /// Override the RPC endpoint
    #[arg(long, global = true)]
    pub node_url: Option<String>,

    /// Override the credentials directory
    #[arg(long, global = true)]
    pub credentials_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NetworkArg {
    Testnet,
    Mainnet,
}

impl NetworkArg {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkArg::Testnet => "testnet",
            NetworkArg::Mainnet => "mainnet",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a key pair and add it to an account with full access
    AddFullAccessKey {
        /// Account to add the key to; its stored key signs the transaction
        account_id: String,
    },
    /// Generate a key pair that may only call the given methods of one contract
    AddFunctionAccessKey {
        account_id: String,
        /// Contract the key may call
        #[arg(long)]
        contract: String,
        /// Comma separated method names
        #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
        methods: Vec<String>,
        /// Fee allowance in yoctoNEAR; unlimited when omitted
        #[arg(long)]
        allowance: Option<u128>,
    },
    /// Create a testnet account through the testnet account factory
    CreateTestnetAccount {
        /// Existing account paying for the creation
        creator_account_id: String,
        new_account_id: String,
    },
    /// Replace a full-access key with a freshly generated one
    RotateKey {
        account_id: String,
        /// Key to revoke once the new key is confirmed, e.g. ed25519:...
        old_public_key: String,
        /// Save the new key as the account's stored credential once the old key is revoked
        #[arg(long)]
        store_new_key: bool,
    },
    /// List the access keys of an account
    ListKeys { account_id: String },
    /// Show which chain the RPC node serves
    NodeStatus,
}

impl Cli {
    /// Resolve the effective network configuration: named network defaults
    /// or the config file, then flag overrides
    pub fn network_config(&self) -> ConfigResult<NetworkConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let config = NetworkConfig::from_file(path)?;
                if let Some(network) = self.network {
                    if network.as_str() != config.network_id {
                        return Err(ConfigError::Validation(format!(
                            "--network {} conflicts with network '{}' in {}",
                            network.as_str(),
                            config.network_id,
                            path.display()
                        )));
                    }
                }
                config
            }
            None => NetworkConfig::for_network(
                self.network.map(NetworkArg::as_str).unwrap_or(DEFAULT_NETWORK_ID),
            )?,
        };

        if let Some(node_url) = &self.node_url {
            config = config.with_node_url(node_url.clone());
        }
        if let Some(dir) = &self.credentials_dir {
            config = config.with_credentials_dir(dir.clone());
        }
        config.validate()?;
        Ok(config)
    }
}
