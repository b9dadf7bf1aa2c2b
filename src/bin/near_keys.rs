use clap::Parser;
use log::{debug, info};
use near_access_keys::account::NearAccountDirectory;
use near_access_keys::cli::{handle_command, Cli};
use near_access_keys::keystore::{AccessKeyStore, UnencryptedFileKeyStore};
use near_access_keys::logging;
use near_access_keys::operations::KeyManager;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = cli.network_config()?;
    info!("Using {} via {}", config.network_id, config.node_url);
    debug!("Credentials directory: {}", config.credentials_dir.display());

    let key_store: Arc<dyn AccessKeyStore> =
        Arc::new(UnencryptedFileKeyStore::new(config.credentials_dir.clone()));
    let directory = NearAccountDirectory::new(&config, Arc::clone(&key_store))?;
    let manager = KeyManager::new(config.network_id.clone(), Arc::new(directory), key_store);

    handle_command(cli.command, &manager, &config).await?;
    Ok(())
}
