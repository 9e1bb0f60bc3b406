//! Client runtime configuration structures and loaders.
use std::env;
use std::time::Duration;

/// Configuration required to bootstrap a chain connection and sessions.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// RPC endpoint of the target chain node.
    pub rpc_url: String,
    /// Human-readable network name, for logs and sanity checks.
    pub network: String,
    /// Bounded wait for transaction confirmations.
    pub tx_timeout: Duration,
    /// Buffer size for per-session event subscriptions.
    pub event_buffer: usize,
}

impl ClientConfig {
    pub const DEFAULT_RPC_URL: &str = "ws://127.0.0.1:9944";
    pub const DEFAULT_NETWORK: &str = "local";
    pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_EVENT_BUFFER: usize = 64;

    /// Construct configuration from process environment variables, loading
    /// a `.env` file first when one exists.
    ///
    /// Environment variables:
    /// - `PG_RPC_URL` - Chain RPC endpoint (default: ws://127.0.0.1:9944)
    /// - `PG_NETWORK` - Network name (default: local)
    /// - `PG_TX_TIMEOUT_SECS` - Confirmation wait in seconds (default: 30)
    /// - `PG_EVENT_BUFFER` - Event subscription buffer (default: 64)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(url) = env::var("PG_RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(network) = env::var("PG_NETWORK") {
            config.network = network;
        }
        if let Some(secs) = read_env::<u64>("PG_TX_TIMEOUT_SECS") {
            config.tx_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(capacity) = read_env::<usize>("PG_EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }

        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: Self::DEFAULT_RPC_URL.to_string(),
            network: Self::DEFAULT_NETWORK.to_string(),
            tx_timeout: Duration::from_secs(Self::DEFAULT_TX_TIMEOUT_SECS),
            event_buffer: Self::DEFAULT_EVENT_BUFFER,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
