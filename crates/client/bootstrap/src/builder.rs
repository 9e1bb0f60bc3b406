//! Builds the connection manager used by front-ends.

use std::sync::Arc;

use anyhow::{Result, bail};

use chain_core::ChainClient;

use crate::config::ClientConfig;
use crate::manager::ConnectionManager;

/// Builder that assembles configuration and a chain backend into a
/// ready-to-connect [`ConnectionManager`].
///
/// The backend is injected: real network adapters live in their own
/// crates, and tests inject [`chain_core::MockChainClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    client: Option<Arc<dyn ChainClient>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Provide the chain backend to drive.
    pub fn chain_client(mut self, client: Arc<dyn ChainClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<ConnectionManager> {
        let Some(client) = self.client else {
            bail!("a chain backend must be provided before building");
        };

        Ok(ConnectionManager::new(client, self.config))
    }
}
