//! Chain abstraction traits.
//!
//! This module defines a layered chain abstraction:
//! - Layer 0: ChainTransport (pure infrastructure)
//! - Layer 1: GameContract (typed game-contract calls)
//! - Layer 2: ChainClient (composite trait)

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use game_core::{AccountId, Balance, BlockNumber, Commitment, GameConfig, GameStatus};

use crate::types::{ContractAddress, GameEvent, Receipt, RoundSnapshot};

// ============================================================================
// Error Types
// ============================================================================

/// Failures surfaced by a chain backend.
///
/// Callers must be able to tell "definitely failed" apart from "outcome
/// unknown": resubmitting a state-changing call after an unknown outcome is
/// not safe, the correct recovery is a state re-query.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("network error: {0}")]
    Network(String),

    /// Transaction was mined but the contract reverted it. The reason is the
    /// on-chain error verbatim, when the backend can decode it.
    #[error("transaction reverted: {reason}")]
    Rejected { reason: String },

    #[error("signer declined to sign the transaction")]
    SignerDeclined,

    #[error("no confirmation within {waited:?}")]
    Timeout { waited: Duration },

    #[error("contract not found: {0}")]
    NotFound(ContractAddress),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ChainError {
    /// True when the transaction definitely did not take effect on-chain.
    ///
    /// For the remaining variants the submission may still land; callers
    /// should re-query state instead of blindly retrying.
    pub fn is_definite_failure(&self) -> bool {
        matches!(
            self,
            ChainError::Rejected { .. }
                | ChainError::SignerDeclined
                | ChainError::NotFound(_)
                | ChainError::Serialization(_)
        )
    }
}

// ============================================================================
// Layer 0: Pure Infrastructure
// ============================================================================

/// Pure chain infrastructure layer.
///
/// Connection lifecycle and chain metadata, without any game knowledge.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Establish (or re-establish) the RPC connection.
    async fn connect(&self) -> Result<(), ChainError>;

    /// Verify the connection is alive.
    async fn health_check(&self) -> Result<(), ChainError>;

    /// Height of the latest finalized block.
    async fn latest_block(&self) -> Result<BlockNumber, ChainError>;
}

// ============================================================================
// Layer 1: Game Contract Interface
// ============================================================================

/// Typed calls against a deployed public-good game contract.
///
/// Queries are read-only and need no signature; the remaining methods are
/// transactions that sign, submit, and wait for finality. A transaction
/// returning `Ok` means the receipt was confirmed; contract-level reverts
/// come back as [`ChainError::Rejected`].
#[async_trait]
pub trait GameContract: Send + Sync {
    /// Deploy a new game instance with the given rules.
    async fn instantiate(&self, config: GameConfig) -> Result<ContractAddress, ChainError>;

    async fn get_config(&self, address: &ContractAddress) -> Result<GameConfig, ChainError>;

    async fn get_status(&self, address: &ContractAddress) -> Result<GameStatus, ChainError>;

    async fn get_players(&self, address: &ContractAddress) -> Result<Vec<AccountId>, ChainError>;

    /// The round in play, or `None` before the game starts.
    async fn get_round(&self, address: &ContractAddress)
    -> Result<Option<RoundSnapshot>, ChainError>;

    /// Join the game, paying the configured fee.
    async fn join(
        &self,
        address: &ContractAddress,
        player: AccountId,
        fee: Balance,
    ) -> Result<Receipt, ChainError>;

    /// Open the first round once enough players have joined.
    async fn start_game(&self, address: &ContractAddress) -> Result<Receipt, ChainError>;

    /// Commit to a contribution for the current round, staking `stake`.
    async fn commit_contribution(
        &self,
        address: &ContractAddress,
        player: AccountId,
        commitment: Commitment,
        stake: Balance,
    ) -> Result<Receipt, ChainError>;

    /// Reveal a previously committed contribution.
    async fn reveal_contribution(
        &self,
        address: &ContractAddress,
        player: AccountId,
        contribution: Balance,
        nonce: u128,
    ) -> Result<Receipt, ChainError>;

    /// Close the current round and open the next one.
    async fn complete_round(&self, address: &ContractAddress) -> Result<Receipt, ChainError>;

    /// Close the final round and settle the game.
    async fn resolve(&self, address: &ContractAddress) -> Result<Receipt, ChainError>;

    /// Subscribe to the contract's event stream.
    ///
    /// The stream is infinite and cancelled by dropping the receiver.
    /// Delivery order is not guaranteed to match causal order and duplicates
    /// are possible; consumers must apply events idempotently.
    fn subscribe_events(&self, address: &ContractAddress) -> broadcast::Receiver<GameEvent>;
}

// ============================================================================
// Layer 2: Composite Trait
// ============================================================================

/// Everything a session controller needs from a chain backend.
pub trait ChainClient: ChainTransport + GameContract + Send + Sync {
    /// Backend name (e.g. "Substrate", "Mock").
    fn name(&self) -> &str;

    /// Network name (e.g. "mainnet", "testnet", "local").
    fn network(&self) -> &str;
}
