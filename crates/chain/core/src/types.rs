//! Common types for chain interactions.

use std::fmt;

use serde::{Deserialize, Serialize};

use game_core::{AccountId, Balance, BlockNumber, Commitment, RoundId};

/// Address of a deployed game contract (32 bytes).
///
/// Each game instance is one contract; the address is the session key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractAddress(pub [u8; 32]);

impl ContractAddress {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractAddress(0x{}..)", hex::encode(&self.0[..4]))
    }
}

/// Generic transaction identifier (backend-specific digest bytes).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub Vec<u8>);

impl TxId {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId(0x{})", hex::encode(&self.0))
    }
}

/// Transaction status as seen by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Submitted, not yet final.
    Pending,
    /// Included and final.
    Confirmed { block: BlockNumber },
    /// Mined but reverted by the contract.
    Failed { reason: String },
}

/// Outcome of a submitted transaction after the finality wait.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: TxId,
    pub block: BlockNumber,
    pub status: TransactionStatus,
}

/// On-chain view of the round in play, returned by full-state queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub id: RoundId,
    /// Players who committed this round, with their commitments.
    pub commitments: Vec<(AccountId, Commitment)>,
    /// Revealed contributions so far.
    pub reveals: Vec<(AccountId, Balance)>,
    /// Sum of revealed contributions.
    pub total_contribution: Balance,
}

/// An event emitted by a game contract, tagged with its finality point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Block at which the event became final. Drives the projector's
    /// monotonic apply guard.
    pub block: BlockNumber,
    /// Contract that emitted the event.
    pub address: ContractAddress,
    pub kind: GameEventKind,
}

/// The game contract's event set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventKind {
    PlayerJoined {
        player: AccountId,
    },
    GameStarted,
    ContributionCommitted {
        player: AccountId,
        commitment: Commitment,
    },
    /// Everyone has committed; UIs use this to prompt reveals.
    AllPlayersCommitted {
        round: RoundId,
    },
    ContributionRevealed {
        player: AccountId,
        contribution: Balance,
    },
    RoundCompleted {
        round: RoundId,
        payouts: Vec<(AccountId, Balance)>,
    },
    GameResolved,
    GameCancelled,
}
