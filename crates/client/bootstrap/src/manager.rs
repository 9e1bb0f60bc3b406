//! Process-wide connection lifecycle.
//!
//! One [`ConnectionManager`] owns the wallet/chain connection for the whole
//! process and hands out per-contract session controllers. Components never
//! duplicate connection state; they borrow the manager.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};

use chain_core::{ChainClient, ContractAddress};
use game_core::GameConfig;
use session::SessionController;

use crate::config::ClientConfig;

/// Single owner of the chain connection and session factory.
pub struct ConnectionManager {
    client: Arc<dyn ChainClient>,
    config: ClientConfig,
    connected: AtomicBool,
}

impl ConnectionManager {
    pub(crate) fn new(client: Arc<dyn ChainClient>, config: ClientConfig) -> Self {
        Self {
            client,
            config,
            connected: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Establish the chain connection. Idempotent.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        self.client
            .connect()
            .await
            .with_context(|| format!("failed to connect to {}", self.config.rpc_url))?;
        self.client
            .health_check()
            .await
            .context("chain connection is unhealthy")?;

        self.connected.store(true, Ordering::Release);
        tracing::info!(
            backend = self.client.name(),
            network = self.client.network(),
            rpc_url = %self.config.rpc_url,
            "chain connection established"
        );
        Ok(())
    }

    /// Drop the connection. Sessions opened earlier keep their handles but
    /// new sessions require a reconnect.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            tracing::info!(backend = self.client.name(), "chain connection closed");
        }
    }

    /// Attach a session controller to an already deployed game.
    pub async fn open_session(&self, address: ContractAddress) -> Result<SessionController> {
        self.require_connected()?;

        SessionController::attach(Arc::clone(&self.client), address)
            .await
            .with_context(|| format!("failed to attach session to {address}"))
    }

    /// Validate a game config and deploy a fresh game instance.
    ///
    /// Validation happens before anything is signed: a structurally invalid
    /// config is reported with every violated constraint and never pays
    /// instantiation fees.
    pub async fn deploy_game(
        &self,
        config: GameConfig,
    ) -> Result<(ContractAddress, SessionController)> {
        self.require_connected()?;
        config.validate()?;

        let address = self
            .client
            .instantiate(config)
            .await
            .context("game instantiation failed")?;
        tracing::info!(%address, "game deployed");

        let controller = self.open_session(address).await?;
        Ok((address, controller))
    }

    fn require_connected(&self) -> Result<()> {
        if !self.is_connected() {
            bail!("not connected; call connect() first");
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("backend", &self.client.name())
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}
