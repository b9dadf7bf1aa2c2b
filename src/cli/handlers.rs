//! Command handlers for `near_keys`
//!
//! Each handler runs one operation and prints its result to stdout. Newly
//! generated private keys reach stdout only through the manager's secret
//! sink.

use crate::cli::args::Commands;
use crate::config::{CreateAccountParams, FunctionKeyParams, NetworkConfig, RotateKeyParams};
use crate::error::KeysResult;
use crate::node_status;
use crate::operations::{KeyManager, RotationOptions, RotationOutcome};
use log::{info, warn};

/// Dispatch a parsed command
pub async fn handle_command(
    command: Commands,
    manager: &KeyManager,
    config: &NetworkConfig,
) -> KeysResult<()> {
    match command {
        Commands::AddFullAccessKey { account_id } => {
            handle_add_full_access_key(manager, &account_id).await
        }
        Commands::AddFunctionAccessKey {
            account_id,
            contract,
            methods,
            allowance,
        } => {
            let params = FunctionKeyParams::new(account_id, contract, methods, allowance)?;
            handle_add_function_access_key(manager, &params).await
        }
        Commands::CreateTestnetAccount {
            creator_account_id,
            new_account_id,
        } => {
            let params = CreateAccountParams::new(creator_account_id, new_account_id)?;
            handle_create_testnet_account(manager, config, &params).await
        }
        Commands::RotateKey {
            account_id,
            old_public_key,
            store_new_key,
        } => {
            let params = RotateKeyParams::new(account_id, old_public_key)?;
            handle_rotate_key(manager, &params, RotationOptions { store_new_key }).await
        }
        Commands::ListKeys { account_id } => handle_list_keys(manager, &account_id).await,
        Commands::NodeStatus => handle_node_status(config).await,
    }
}

pub async fn handle_add_full_access_key(manager: &KeyManager, account_id: &str) -> KeysResult<()> {
    let key_pair = manager.add_full_access_key(account_id).await?;
    info!("Full-access key {} added to {}", key_pair.public_key(), account_id);
    Ok(())
}

pub async fn handle_add_function_access_key(
    manager: &KeyManager,
    params: &FunctionKeyParams,
) -> KeysResult<()> {
    let key_pair = manager.add_function_call_key(params).await?;
    info!(
        "Function-call key {} added to {} for {}",
        key_pair.public_key(),
        params.account_id,
        params.contract_id
    );
    Ok(())
}

pub async fn handle_create_testnet_account(
    manager: &KeyManager,
    config: &NetworkConfig,
    params: &CreateAccountParams,
) -> KeysResult<()> {
    let key_pair = manager.create_testnet_account(params).await?;
    println!("Account {} created", params.new_account_id);
    println!("Public key {}", key_pair.public_key());
    println!(
        "Credentials stored under {}",
        config
            .credentials_dir
            .join(&config.network_id)
            .join(format!("{}.json", params.new_account_id))
            .display()
    );
    Ok(())
}

pub async fn handle_rotate_key(
    manager: &KeyManager,
    params: &RotateKeyParams,
    options: RotationOptions,
) -> KeysResult<()> {
    let rotation = manager.rotator(options).rotate_with(params).await?;
    match rotation.outcome {
        RotationOutcome::OldKeyRemoved => {
            println!(
                "Rotated {}: {} replaced by {}",
                params.account_id,
                params.old_public_key,
                rotation.key_pair.public_key()
            );
        }
        RotationOutcome::OldKeyRetained => {
            println!(
                "New key {} added to {} but not yet visible; {} was kept. \
                 Delete it once the new key appears in list-keys.",
                rotation.key_pair.public_key(),
                params.account_id,
                params.old_public_key
            );
        }
    }
    Ok(())
}

pub async fn handle_list_keys(manager: &KeyManager, account_id: &str) -> KeysResult<()> {
    let keys = manager.list_keys(account_id).await?;
    if keys.is_empty() {
        println!("No access keys on {}", account_id);
        return Ok(());
    }
    for key in keys {
        println!("{}  {}", key.public_key, key.permission);
    }
    Ok(())
}

pub async fn handle_node_status(config: &NetworkConfig) -> KeysResult<()> {
    let status = node_status::fetch(config).await?;
    println!("Node:             {}", config.node_url);
    println!("Chain:            {}", status.chain_id);
    println!("Protocol version: {}", status.protocol_version);
    println!("Latest block:     {}", status.latest_block_height);
    if !status.matches_network(&config.network_id) {
        warn!(
            "Node serves '{}' but the configured network is '{}'",
            status.chain_id, config.network_id
        );
    }
    Ok(())
}
