//! RPC node health probe
//!
//! Plain `GET <node_url>/status`, outside the transaction client, so an
//! operator can check which chain a node serves before touching any keys.

use crate::config::NetworkConfig;
use crate::constants::USER_AGENT;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeStatusError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid node URL: {0}")]
    Url(String),

    #[error("Server error: HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Malformed status response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type NodeStatusResult<T> = Result<T, NodeStatusError>;

impl From<NodeStatusError> for crate::error::KeysError {
    fn from(error: NodeStatusError) -> Self {
        match error {
            NodeStatusError::Url(message) => crate::error::KeysError::InvalidInput(message),
            other => crate::error::KeysError::Rpc(other.to_string()),
        }
    }
}

/// Subset of the node's `/status` document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub chain_id: String,
    pub protocol_version: u32,
    pub latest_block_height: u64,
}

impl NodeStatus {
    /// Whether the node serves the chain named by `network_id`
    pub fn matches_network(&self, network_id: &str) -> bool {
        self.chain_id == network_id
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    chain_id: String,
    protocol_version: u32,
    sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
struct SyncInfo {
    latest_block_height: u64,
}

impl From<StatusResponse> for NodeStatus {
    fn from(response: StatusResponse) -> Self {
        Self {
            chain_id: response.chain_id,
            protocol_version: response.protocol_version,
            latest_block_height: response.sync_info.latest_block_height,
        }
    }
}

/// Parse a raw `/status` body
pub fn parse_status(body: &str) -> Result<NodeStatus, serde_json::Error> {
    serde_json::from_str::<StatusResponse>(body).map(NodeStatus::from)
}

/// Fetch the status of the node configured in `config`. Not retried.
pub async fn fetch(config: &NetworkConfig) -> NodeStatusResult<NodeStatus> {
    let url = config
        .node_url()
        .and_then(|base| {
            base.join("status").map_err(|e| {
                crate::config::ConfigError::Validation(format!("node_url '{}': {}", base, e))
            })
        })
        .map_err(|e| NodeStatusError::Url(e.to_string()))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;

    debug!("GET {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        let message = response.text().await.unwrap_or_default();
        return Err(NodeStatusError::Server {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(parse_status(&body)?)
}
