//! Mock chain client for testing without a network.
//!
//! Implements the public-good contract rules in-memory: join fees, player
//! bounds, commit–reveal rounds, and multiplier payouts. Every transaction
//! advances a fake block height and each emitted event lands in its own
//! block, so projector tests exercise the monotonic apply guard directly.
//! Revert reasons use the contract's own error names.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use game_core::{AccountId, Balance, BlockNumber, Commitment, GameConfig, GameStatus, RoundId};

use crate::traits::{ChainClient, ChainError, ChainTransport, GameContract};
use crate::types::{ContractAddress, GameEvent, GameEventKind, Receipt, RoundSnapshot, TxId};

/// Failure injected into the next transaction.
enum InjectedFailure {
    /// Wallet refuses to sign; nothing reaches the chain.
    Decline,
    /// Transaction mines but the contract reverts it.
    Reject(String),
    /// Effects land on-chain but the confirmation wait gives up, so the
    /// caller sees an unknown outcome.
    Timeout,
}

struct MockRound {
    id: RoundId,
    commitments: Vec<(AccountId, Commitment)>,
    reveals: Vec<(AccountId, Balance)>,
}

impl MockRound {
    fn new(id: RoundId) -> Self {
        Self {
            id,
            commitments: Vec::new(),
            reveals: Vec::new(),
        }
    }
}

struct MockGame {
    config: GameConfig,
    status: GameStatus,
    players: Vec<AccountId>,
    round: Option<MockRound>,
    next_round_id: RoundId,
}

/// In-memory chain client simulating the game contract.
pub struct MockChainClient {
    games: Mutex<HashMap<ContractAddress, MockGame>>,
    block: AtomicU64,
    tx_counter: AtomicU64,
    contract_counter: AtomicU64,
    events: broadcast::Sender<GameEvent>,
    injected: Mutex<Option<InjectedFailure>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::with_event_capacity(64)
    }

    /// Small capacities let tests force `Lagged` on slow subscribers.
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            games: Mutex::new(HashMap::new()),
            block: AtomicU64::new(0),
            tx_counter: AtomicU64::new(0),
            contract_counter: AtomicU64::new(0),
            events,
            injected: Mutex::new(None),
        }
    }

    /// Number of game transactions that reached the chain, including
    /// reverted ones (instantiation is not counted). Lets tests assert
    /// that local validation submitted nothing.
    pub fn transaction_count(&self) -> u64 {
        self.tx_counter.load(Ordering::Acquire)
    }

    /// Make the next transaction fail as if the wallet refused to sign.
    pub fn decline_next_signing(&self) {
        *self.injected.lock().unwrap() = Some(InjectedFailure::Decline);
    }

    /// Make the next transaction revert on-chain with `reason`.
    pub fn reject_next(&self, reason: &str) {
        *self.injected.lock().unwrap() = Some(InjectedFailure::Reject(reason.to_string()));
    }

    /// Make the next transaction apply its effects but report a timeout,
    /// leaving the caller with an unknown outcome.
    pub fn timeout_next(&self) {
        *self.injected.lock().unwrap() = Some(InjectedFailure::Timeout);
    }

    fn next_tx_id(&self) -> TxId {
        let n = self.tx_counter.fetch_add(1, Ordering::AcqRel) + 1;
        TxId::from_bytes(n.to_le_bytes().to_vec())
    }

    fn emit(&self, address: ContractAddress, kind: GameEventKind) -> BlockNumber {
        let block = self.block.fetch_add(1, Ordering::AcqRel) + 1;
        let event = GameEvent {
            block,
            address,
            kind,
        };
        if self.events.send(event).is_err() {
            // No subscribers yet; events are best-effort.
            tracing::trace!(%address, "no subscribers for game event");
        }
        block
    }

    /// Run a state-changing call against one game, honoring injected
    /// failures and emitting the resulting events.
    fn transact(
        &self,
        address: &ContractAddress,
        apply: impl FnOnce(&mut MockGame) -> Result<Vec<GameEventKind>, String>,
    ) -> Result<Receipt, ChainError> {
        let injected = self.injected.lock().unwrap().take();

        if let Some(InjectedFailure::Decline) = injected {
            return Err(ChainError::SignerDeclined);
        }

        let tx_id = self.next_tx_id();

        if let Some(InjectedFailure::Reject(reason)) = injected {
            return Err(ChainError::Rejected { reason });
        }

        let kinds = {
            let mut games = self.games.lock().unwrap();
            let game = games
                .get_mut(address)
                .ok_or(ChainError::NotFound(*address))?;
            apply(game).map_err(|reason| ChainError::Rejected { reason })?
        };

        let mut block = self.block.load(Ordering::Acquire);
        for kind in kinds {
            block = self.emit(*address, kind);
        }

        if let Some(InjectedFailure::Timeout) = injected {
            return Err(ChainError::Timeout {
                waited: Duration::from_secs(30),
            });
        }

        Ok(Receipt {
            tx_id,
            block,
            status: crate::types::TransactionStatus::Confirmed { block },
        })
    }
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainTransport for MockChainClient {
    async fn connect(&self) -> Result<(), ChainError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChainError> {
        Ok(())
    }

    async fn latest_block(&self) -> Result<BlockNumber, ChainError> {
        Ok(self.block.load(Ordering::Acquire))
    }
}

#[async_trait]
impl GameContract for MockChainClient {
    async fn instantiate(&self, config: GameConfig) -> Result<ContractAddress, ChainError> {
        let n = self.contract_counter.fetch_add(1, Ordering::AcqRel) + 1;
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        let address = ContractAddress::from_bytes(bytes);

        self.games.lock().unwrap().insert(
            address,
            MockGame {
                config,
                status: GameStatus::Ready,
                players: Vec::new(),
                round: None,
                next_round_id: 1,
            },
        );

        Ok(address)
    }

    async fn get_config(&self, address: &ContractAddress) -> Result<GameConfig, ChainError> {
        let games = self.games.lock().unwrap();
        games
            .get(address)
            .map(|g| g.config.clone())
            .ok_or(ChainError::NotFound(*address))
    }

    async fn get_status(&self, address: &ContractAddress) -> Result<GameStatus, ChainError> {
        let games = self.games.lock().unwrap();
        games
            .get(address)
            .map(|g| g.status)
            .ok_or(ChainError::NotFound(*address))
    }

    async fn get_players(&self, address: &ContractAddress) -> Result<Vec<AccountId>, ChainError> {
        let games = self.games.lock().unwrap();
        games
            .get(address)
            .map(|g| g.players.clone())
            .ok_or(ChainError::NotFound(*address))
    }

    async fn get_round(
        &self,
        address: &ContractAddress,
    ) -> Result<Option<RoundSnapshot>, ChainError> {
        let games = self.games.lock().unwrap();
        let game = games.get(address).ok_or(ChainError::NotFound(*address))?;

        Ok(game.round.as_ref().map(|round| RoundSnapshot {
            id: round.id,
            commitments: round.commitments.clone(),
            reveals: round.reveals.clone(),
            total_contribution: round.reveals.iter().map(|(_, amount)| amount).sum(),
        }))
    }

    async fn join(
        &self,
        address: &ContractAddress,
        player: AccountId,
        fee: Balance,
    ) -> Result<Receipt, ChainError> {
        self.transact(address, |game| {
            if game.status != GameStatus::Ready {
                return Err("InvalidGameState".into());
            }
            if game.players.len() >= game.config.max_players as usize {
                return Err("MaxPlayersReached".into());
            }
            if game.players.contains(&player) {
                return Err("PlayerAlreadyJoined".into());
            }
            if fee < game.config.join_fee {
                return Err("InsufficientJoiningFees".into());
            }

            game.players.push(player);
            Ok(vec![GameEventKind::PlayerJoined { player }])
        })
    }

    async fn start_game(&self, address: &ContractAddress) -> Result<Receipt, ChainError> {
        self.transact(address, |game| {
            if game.status != GameStatus::Ready {
                return Err("InvalidGameState".into());
            }
            if game.players.len() < game.config.min_players as usize {
                return Err("NotEnoughPlayers".into());
            }

            game.round = Some(MockRound::new(game.next_round_id));
            game.next_round_id += 1;
            game.status = GameStatus::InProgress;
            Ok(vec![GameEventKind::GameStarted])
        })
    }

    async fn commit_contribution(
        &self,
        address: &ContractAddress,
        player: AccountId,
        commitment: Commitment,
        stake: Balance,
    ) -> Result<Receipt, ChainError> {
        self.transact(address, |game| {
            if game.status != GameStatus::InProgress {
                return Err("GameNotStarted".into());
            }
            if stake < game.config.max_round_contribution {
                return Err("InvalidRoundContribution".into());
            }
            let player_count = game.players.len();
            let round = game.round.as_mut().ok_or("NoCurrentRound")?;
            if round.commitments.iter().any(|(p, _)| *p == player) {
                return Err("PlayerAlreadyCommitted".into());
            }

            round.commitments.push((player, commitment));

            let mut kinds = vec![GameEventKind::ContributionCommitted { player, commitment }];
            if round.commitments.len() == player_count {
                kinds.push(GameEventKind::AllPlayersCommitted { round: round.id });
            }
            Ok(kinds)
        })
    }

    async fn reveal_contribution(
        &self,
        address: &ContractAddress,
        player: AccountId,
        contribution: Balance,
        nonce: u128,
    ) -> Result<Receipt, ChainError> {
        self.transact(address, |game| {
            let round = game.round.as_mut().ok_or("NoCurrentRound")?;

            let commitment = round
                .commitments
                .iter()
                .find(|(p, _)| *p == player)
                .map(|(_, c)| *c)
                .ok_or("CommitmentNotFound")?;
            if !commitment.matches(contribution, nonce) {
                return Err("InvalidReveal".into());
            }
            if round.reveals.iter().any(|(p, _)| *p == player) {
                return Err("InvalidRoundState".into());
            }

            round.reveals.push((player, contribution));
            Ok(vec![GameEventKind::ContributionRevealed {
                player,
                contribution,
            }])
        })
    }

    async fn complete_round(&self, address: &ContractAddress) -> Result<Receipt, ChainError> {
        self.transact(address, |game| {
            let player_count = game.players.len();
            let config = game.config.clone();
            let round = game.round.as_mut().ok_or("NoCurrentRound")?;
            if round.reveals.len() != player_count {
                return Err("NotAllPlayersRevealed".into());
            }

            let payouts = payouts_for(&config, &round.reveals);
            let completed = round.id;
            let mut kinds = vec![GameEventKind::RoundCompleted {
                round: completed,
                payouts,
            }];

            // Rounds-based games end after the last configured round;
            // open-ended games keep opening fresh rounds.
            if config.is_rounds_based && game.next_round_id > config.max_rounds {
                game.round = None;
                game.status = GameStatus::Resolved;
                kinds.push(GameEventKind::GameResolved);
            } else {
                game.round = Some(MockRound::new(game.next_round_id));
                game.next_round_id += 1;
            }
            Ok(kinds)
        })
    }

    async fn resolve(&self, address: &ContractAddress) -> Result<Receipt, ChainError> {
        self.transact(address, |game| {
            if game.status != GameStatus::InProgress {
                return Err("InvalidGameState".into());
            }
            let player_count = game.players.len();
            let config = game.config.clone();
            let round = game.round.as_mut().ok_or("NoCurrentRound")?;
            if round.reveals.len() != player_count {
                return Err("NotAllPlayersRevealed".into());
            }

            let payouts = payouts_for(&config, &round.reveals);
            let completed = round.id;
            game.round = None;
            game.status = GameStatus::Resolved;
            Ok(vec![
                GameEventKind::RoundCompleted {
                    round: completed,
                    payouts,
                },
                GameEventKind::GameResolved,
            ])
        })
    }

    fn subscribe_events(&self, _address: &ContractAddress) -> broadcast::Receiver<GameEvent> {
        // One firehose channel; consumers filter by contract address.
        self.events.subscribe()
    }
}

impl ChainClient for MockChainClient {
    fn name(&self) -> &str {
        "Mock"
    }

    fn network(&self) -> &str {
        "local"
    }
}

fn payouts_for(
    config: &GameConfig,
    reveals: &[(AccountId, Balance)],
) -> Vec<(AccountId, Balance)> {
    reveals
        .iter()
        .map(|(player, contribution)| (*player, config.reward_for(*contribution)))
        .collect()
}
