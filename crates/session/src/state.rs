//! Client-side projection of on-chain game state.
//!
//! `SessionState` is a cache of chain truth, never authoritative. It is
//! rebuilt from full queries and folded forward from confirmed events; it
//! lives only as long as its controller and is never persisted.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use chain_core::{GameEvent, GameEventKind, RoundSnapshot};
use game_core::{AccountId, Balance, BlockNumber, GameStatus, RoundId};

/// Projected state of one game session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub status: GameStatus,
    /// Confirmed participants, bounded by the config's `max_players`.
    pub players: BTreeSet<AccountId>,
    /// Round in play; 0 until the game starts.
    pub current_round: RoundId,
    /// Players whose commitment for the current round is confirmed.
    pub committed: BTreeSet<AccountId>,
    /// Revealed contributions for the current round.
    pub contributions: BTreeMap<AccountId, Balance>,
    /// Payouts of the most recently completed round, for display.
    pub last_payouts: Vec<(AccountId, Balance)>,
    /// Monotonic marker of the last applied block; stale-event guard.
    pub last_synced_block: BlockNumber,
}

impl SessionState {
    /// Empty projection for a freshly attached session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the projection from a full on-chain query.
    pub fn from_snapshot(
        status: GameStatus,
        players: Vec<AccountId>,
        round: Option<RoundSnapshot>,
        block: BlockNumber,
    ) -> Self {
        let mut state = Self {
            status,
            players: players.into_iter().collect(),
            last_synced_block: block,
            ..Self::default()
        };

        if let Some(round) = round {
            state.current_round = round.id;
            state.committed = round.commitments.iter().map(|(p, _)| *p).collect();
            state.contributions = round.reveals.iter().copied().collect();
        }

        state
    }

    /// Fold one confirmed event into the projection.
    ///
    /// Events at or below `last_synced_block` are stale duplicates (or
    /// reordered deliveries) and are discarded; applying the same event
    /// twice is therefore a no-op. Returns whether the event was applied.
    pub fn apply(&mut self, event: &GameEvent) -> bool {
        if event.block <= self.last_synced_block {
            return false;
        }

        match &event.kind {
            GameEventKind::PlayerJoined { player } => {
                self.players.insert(*player);
            }
            GameEventKind::GameStarted => {
                self.status = GameStatus::InProgress;
                self.current_round = 1;
            }
            GameEventKind::ContributionCommitted { player, .. } => {
                self.committed.insert(*player);
            }
            GameEventKind::AllPlayersCommitted { .. } => {
                // Informational; commitment set already tracks this.
            }
            GameEventKind::ContributionRevealed {
                player,
                contribution,
            } => {
                self.contributions.insert(*player, *contribution);
            }
            GameEventKind::RoundCompleted { round, payouts } => {
                self.last_payouts = payouts.clone();
                self.current_round = round + 1;
                self.committed.clear();
                self.contributions.clear();
            }
            GameEventKind::GameResolved => {
                self.status = GameStatus::Resolved;
            }
            GameEventKind::GameCancelled => {
                self.status = GameStatus::Cancelled;
            }
        }

        self.last_synced_block = event.block;
        true
    }

    pub fn is_player(&self, account: &AccountId) -> bool {
        self.players.contains(account)
    }

    pub fn has_committed(&self, account: &AccountId) -> bool {
        self.committed.contains(account)
    }

    pub fn has_revealed(&self, account: &AccountId) -> bool {
        self.contributions.contains_key(account)
    }

    /// Every joined player has revealed for the current round.
    pub fn all_revealed(&self) -> bool {
        !self.players.is_empty() && self.contributions.len() == self.players.len()
    }
}
