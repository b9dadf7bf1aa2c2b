/// Common constants used across the key tools.
///
/// These defaults are used for command line arguments and
/// configuration when explicit values are not provided.
pub const DEFAULT_NETWORK_ID: &str = "testnet";

/// Directory under the user's home where credential files live.
pub const CREDENTIALS_DIR: &str = ".near-credentials";

pub const TESTNET_NODE_URL: &str = "https://rpc.testnet.near.org";
pub const TESTNET_WALLET_URL: &str = "https://testnet.mynearwallet.com/";
pub const TESTNET_HELPER_URL: &str = "https://helper.testnet.near.org";
pub const TESTNET_EXPLORER_URL: &str = "https://testnet.nearblocks.io";

pub const MAINNET_NODE_URL: &str = "https://rpc.mainnet.near.org";
pub const MAINNET_WALLET_URL: &str = "https://app.mynearwallet.com/";
pub const MAINNET_HELPER_URL: &str = "https://helper.mainnet.near.org";
pub const MAINNET_EXPLORER_URL: &str = "https://nearblocks.io";

/// Account whose `create_account` method creates top-level testnet accounts.
pub const TESTNET_ACCOUNT_FACTORY: &str = "testnet";
pub const CREATE_ACCOUNT_METHOD: &str = "create_account";

/// Default timeout for plain HTTP requests to the node (status probe).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const USER_AGENT: &str = concat!("near-keys/", env!("CARGO_PKG_VERSION"));
