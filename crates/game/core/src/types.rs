//! Core value types shared across the client stack.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Native token amount (smallest denomination).
pub type Balance = u128;

/// Block height on the target chain.
pub type BlockNumber = u64;

/// One-based round counter; 0 means the game has not started.
pub type RoundId = u32;

/// Participant address (32 bytes, chain-level account identifier).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic address filled with a single byte. Handy for tests and
    /// local mock chains.
    pub const fn from_seed(seed: u8) -> Self {
        Self([seed; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form: enough to tell accounts apart in logs.
        write!(f, "AccountId(0x{}..)", hex::encode(&self.0[..4]))
    }
}

/// Lifecycle of a game session as reported by the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Accepting players; the game has not started.
    Ready,
    /// Rounds are being played.
    InProgress,
    /// All rounds finished and rewards distributed.
    Resolved,
    /// Aborted before completion (e.g. by its creator).
    Cancelled,
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::Ready
    }
}

impl GameStatus {
    /// Whether the session can still accept state-changing play actions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Resolved | GameStatus::Cancelled)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameStatus::Ready => "ready",
            GameStatus::InProgress => "in-progress",
            GameStatus::Resolved => "resolved",
            GameStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}
