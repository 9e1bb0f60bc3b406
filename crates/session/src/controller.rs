//! Session controller: precondition-gated actions for one game contract.
//!
//! The controller is the only writer for its session. Every state-changing
//! action is checked against the latest projection before anything is
//! signed, so calls that are guaranteed to revert never pay fees. The chain
//! stays the final arbiter: a passing local check can still lose a race,
//! and the resulting revert is surfaced as [`ActionError::ChainRejected`].
//!
//! The projection is never mutated optimistically. Confirmation arrives
//! through the event projector, so renderers only ever see chain truth.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use chain_core::{ChainClient, ContractAddress, Receipt};
use game_core::{AccountId, Balance, Commitment, GameConfig, GameStatus};

use crate::errors::{ActionError, Result, ValidationError};
use crate::projector::{self, SharedState};
use crate::state::SessionState;

/// Expected reward distribution, computed client-side for display only.
///
/// The authoritative distribution is computed on-chain when the round
/// settles; this preview exists so UIs can show the outcome immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardPreview {
    pub expected_payouts: Vec<(AccountId, Balance)>,
    pub receipt: Receipt,
}

/// Orchestrates one game session bound to one contract address.
///
/// Mutating calls are serialized per session: a second call while one is
/// in flight fails fast with [`ActionError::OperationInProgress`] instead
/// of racing. Independent controllers (distinct contract addresses) share
/// nothing and proceed concurrently.
pub struct SessionController {
    client: Arc<dyn ChainClient>,
    address: ContractAddress,
    config: GameConfig,
    shared: Arc<SharedState>,
    in_flight: AtomicBool,
    projector: JoinHandle<()>,
}

impl SessionController {
    /// Attach to a deployed game: fetch its config, subscribe to events,
    /// and build the initial projection from a full query.
    ///
    /// The subscription is opened before the initial query so no event can
    /// fall into the gap between them.
    pub async fn attach(client: Arc<dyn ChainClient>, address: ContractAddress) -> Result<Self> {
        let config = client.get_config(&address).await?;

        let shared = SharedState::new(SessionState::new());
        let events = client.subscribe_events(&address);
        projector::resync(client.as_ref(), &address, &shared)
            .await
            .map_err(ActionError::StaleProjection)?;

        let projector = projector::spawn(
            Arc::clone(&client),
            address,
            Arc::clone(&shared),
            events,
        );

        tracing::info!(%address, backend = client.name(), network = client.network(), "session attached");

        Ok(Self {
            client,
            address,
            config,
            shared,
            in_flight: AtomicBool::new(false),
            projector,
        })
    }

    pub fn address(&self) -> &ContractAddress {
        &self.address
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current projection snapshot.
    pub fn state(&self) -> SessionState {
        self.shared.snapshot()
    }

    /// Read-only subscription to projection changes, for rendering.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.subscribe()
    }

    /// Rebuild the projection from a full on-chain query.
    ///
    /// Use after an unknown-outcome failure ([`ActionError::outcome_unknown`])
    /// before deciding whether a retry is needed at all.
    pub async fn sync(&self) -> Result<()> {
        projector::resync(self.client.as_ref(), &self.address, &self.shared)
            .await
            .map_err(ActionError::StaleProjection)
    }

    /// Join the game as `player`, paying exactly the configured fee.
    pub async fn join(&self, player: AccountId, fee: Balance) -> Result<Receipt> {
        let _guard = self.begin()?;
        let state = self.state();

        self.require_status(&state, GameStatus::Ready)?;
        // Membership first: a player who already joined a full game should
        // hear that, not that the game is full.
        if state.is_player(&player) {
            return Err(ValidationError::AlreadyJoined.into());
        }
        if state.players.len() >= usize::from(self.config.max_players) {
            return Err(ValidationError::GameFull {
                max: self.config.max_players,
            }
            .into());
        }
        if fee != self.config.join_fee {
            return Err(ValidationError::WrongJoinFee {
                expected: self.config.join_fee,
                provided: fee,
            }
            .into());
        }

        tracing::debug!(%player, fee, "submitting join");
        let receipt = self.client.join(&self.address, player, fee).await?;
        Ok(receipt)
    }

    /// Start the game once enough players have joined.
    pub async fn start_game(&self) -> Result<Receipt> {
        let _guard = self.begin()?;
        let state = self.state();

        self.require_status(&state, GameStatus::Ready)?;
        if state.players.len() < usize::from(self.config.min_players) {
            return Err(ValidationError::InsufficientPlayers {
                needed: self.config.min_players,
                have: state.players.len(),
            }
            .into());
        }

        tracing::debug!(players = state.players.len(), "submitting start_game");
        let receipt = self.client.start_game(&self.address).await?;
        Ok(receipt)
    }

    /// Contribute to the current round.
    ///
    /// The contribution is committed, not sent in the clear: the submitted
    /// transaction carries `hash(contribution, nonce)` and stakes the
    /// maximum round contribution, so the amount stays hidden until
    /// [`Self::reveal_round`]. The same `(contribution, nonce)` pair must be
    /// presented at reveal.
    pub async fn play_round(
        &self,
        player: AccountId,
        contribution: Balance,
        nonce: u128,
    ) -> Result<Receipt> {
        let _guard = self.begin()?;
        let state = self.state();

        self.require_status(&state, GameStatus::InProgress)?;
        if !state.is_player(&player) {
            return Err(ValidationError::NotAPlayer.into());
        }
        if !self.config.contribution_in_bounds(contribution) {
            return Err(ValidationError::ContributionOutOfRange {
                min: self.config.min_round_contribution,
                max: self.config.max_round_contribution,
                provided: contribution,
            }
            .into());
        }
        if state.has_committed(&player) {
            return Err(ValidationError::AlreadyCommitted.into());
        }

        let commitment = Commitment::new(contribution, nonce);
        tracing::debug!(%player, round = state.current_round, "submitting contribution commitment");
        let receipt = self
            .client
            .commit_contribution(
                &self.address,
                player,
                commitment,
                self.config.max_round_contribution,
            )
            .await?;
        Ok(receipt)
    }

    /// Reveal a contribution committed earlier this round.
    pub async fn reveal_round(
        &self,
        player: AccountId,
        contribution: Balance,
        nonce: u128,
    ) -> Result<Receipt> {
        let _guard = self.begin()?;
        let state = self.state();

        self.require_status(&state, GameStatus::InProgress)?;
        if !state.has_committed(&player) || state.has_revealed(&player) {
            return Err(ValidationError::NothingToReveal.into());
        }

        tracing::debug!(%player, round = state.current_round, "submitting reveal");
        let receipt = self
            .client
            .reveal_contribution(&self.address, player, contribution, nonce)
            .await?;
        Ok(receipt)
    }

    /// Close the current round and open the next one.
    ///
    /// Only valid mid-game; the final round of a rounds-based game is
    /// settled with [`Self::resolve`] instead.
    pub async fn complete_round(&self) -> Result<Receipt> {
        let _guard = self.begin()?;
        let state = self.state();

        self.require_status(&state, GameStatus::InProgress)?;
        self.require_all_revealed(&state)?;
        if self.config.is_rounds_based && state.current_round >= self.config.max_rounds {
            return Err(ValidationError::FinalRound {
                current: state.current_round,
            }
            .into());
        }

        tracing::debug!(round = state.current_round, "submitting complete_round");
        let receipt = self.client.complete_round(&self.address).await?;
        Ok(receipt)
    }

    /// Settle the game after the final round.
    ///
    /// Returns the expected distribution for display; the on-chain payout
    /// is authoritative and arrives through the event stream.
    pub async fn resolve(&self) -> Result<RewardPreview> {
        let _guard = self.begin()?;
        let state = self.state();

        self.require_status(&state, GameStatus::InProgress)?;
        self.require_all_revealed(&state)?;
        if self.config.is_rounds_based && state.current_round < self.config.max_rounds {
            return Err(ValidationError::NotFinalRound {
                current: state.current_round,
                max: self.config.max_rounds,
            }
            .into());
        }

        let expected_payouts = state
            .contributions
            .iter()
            .map(|(player, contribution)| (*player, self.config.reward_for(*contribution)))
            .collect();

        tracing::debug!(round = state.current_round, "submitting resolve");
        let receipt = self.client.resolve(&self.address).await?;
        Ok(RewardPreview {
            expected_payouts,
            receipt,
        })
    }

    fn require_status(&self, state: &SessionState, expected: GameStatus) -> Result<()> {
        if state.status != expected {
            return Err(ValidationError::InvalidState {
                expected,
                actual: state.status,
            }
            .into());
        }
        Ok(())
    }

    fn require_all_revealed(&self, state: &SessionState) -> Result<()> {
        if !state.all_revealed() {
            return Err(ValidationError::RoundIncomplete {
                round: state.current_round,
                revealed: state.contributions.len(),
                players: state.players.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Claim the single in-flight slot for this session.
    fn begin(&self) -> Result<InFlightGuard<'_>> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(ActionError::OperationInProgress);
        }
        Ok(InFlightGuard(&self.in_flight))
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("address", &self.address)
            .field("backend", &self.client.name())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // Detach: stop consuming events and abandon any pending
        // confirmation wait. No retries outlive the session.
        self.projector.abort();
        tracing::debug!(address = %self.address, "session detached");
    }
}

/// Releases the in-flight slot when the action finishes, on every path.
#[derive(Debug)]
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{GameContract, MockChainClient};
    use game_core::GameConfig;

    fn config() -> GameConfig {
        GameConfig {
            max_players: 4,
            min_players: 2,
            min_round_contribution: 100,
            max_round_contribution: 1_000,
            round_reward_multiplier: 20,
            post_round_actions: false,
            round_timeout: 25,
            max_rounds: 2,
            join_fee: 0,
            is_rounds_based: true,
        }
    }

    #[tokio::test]
    async fn in_flight_slot_is_exclusive_until_released() {
        let client = Arc::new(MockChainClient::new());
        let address = client.instantiate(config()).await.unwrap();
        let controller = SessionController::attach(client, address).await.unwrap();

        let guard = controller.begin().unwrap();
        assert!(matches!(
            controller.begin().unwrap_err(),
            ActionError::OperationInProgress
        ));
        // Controllers show up in test failure output by address.
        assert!(format!("{controller:?}").contains("SessionController"));

        drop(guard);
        assert!(controller.begin().is_ok());
    }

    #[tokio::test]
    async fn slot_released_after_failed_action() {
        let client = Arc::new(MockChainClient::new());
        let address = client.instantiate(config()).await.unwrap();
        let controller = SessionController::attach(client, address).await.unwrap();

        // Validation failure: not enough players to start.
        let err = controller.start_game().await.unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));

        // The guard must not leak; a new action can claim the slot.
        assert!(controller.begin().is_ok());
    }
}
