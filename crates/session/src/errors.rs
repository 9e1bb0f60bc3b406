//! Unified error types surfaced by session actions.
//!
//! Validation failures are caught locally and never cost a transaction;
//! chain-originated failures carry enough detail to tell "definitely
//! failed" from "outcome unknown, re-query before retrying".

use std::time::Duration;

use thiserror::Error;

use chain_core::ChainError;
use game_core::{Balance, GameStatus, RoundId};

pub type Result<T> = std::result::Result<T, ActionError>;

/// Client-side precondition failure. No transaction was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("action requires game status {expected}, current status is {actual}")]
    InvalidState {
        expected: GameStatus,
        actual: GameStatus,
    },

    #[error("game is full ({max} players)")]
    GameFull { max: u8 },

    #[error("player has already joined this game")]
    AlreadyJoined,

    #[error("join fee must be exactly {expected}, got {provided}")]
    WrongJoinFee { expected: Balance, provided: Balance },

    #[error("game needs {needed} players to start, only {have} joined")]
    InsufficientPlayers { needed: u8, have: usize },

    #[error("account is not a player in this game")]
    NotAPlayer,

    #[error("contribution {provided} outside bounds [{min}, {max}]")]
    ContributionOutOfRange {
        min: Balance,
        max: Balance,
        provided: Balance,
    },

    #[error("player already committed a contribution this round")]
    AlreadyCommitted,

    #[error("player has no unrevealed commitment this round")]
    NothingToReveal,

    #[error("round {round} incomplete: {revealed}/{players} players revealed")]
    RoundIncomplete {
        round: RoundId,
        revealed: usize,
        players: usize,
    },

    #[error("round {current} is the final round; resolve the game instead")]
    FinalRound { current: RoundId },

    #[error("round {current} is not the final round of {max}")]
    NotFinalRound { current: RoundId, max: RoundId },
}

/// Failure of a session action, local or chain-originated.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Local precondition check failed; nothing was submitted.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Another mutating call for this session is still in flight.
    #[error("another operation for this session is already in progress")]
    OperationInProgress,

    /// Transaction was mined but reverted, with the on-chain reason.
    #[error("transaction rejected on-chain: {reason}")]
    ChainRejected { reason: String },

    /// The wallet refused to sign; safe to retry after user action.
    #[error("signer declined the transaction")]
    SignerDeclined,

    /// No confirmation within the bounded wait. The transaction may still
    /// have landed; re-query state before considering a retry.
    #[error("no confirmation within {waited:?}")]
    Timeout { waited: Duration },

    /// The projection fell behind and the recovery re-query failed too.
    #[error("projection is stale and full re-query failed")]
    StaleProjection(#[source] ChainError),

    /// Remaining transport failures (network, missing contract, codec).
    #[error(transparent)]
    Chain(ChainError),
}

impl From<ChainError> for ActionError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rejected { reason } => ActionError::ChainRejected { reason },
            ChainError::SignerDeclined => ActionError::SignerDeclined,
            ChainError::Timeout { waited } => ActionError::Timeout { waited },
            other => ActionError::Chain(other),
        }
    }
}

impl ActionError {
    /// True when the submitted transaction may have taken effect anyway.
    ///
    /// Blindly resubmitting after such a failure can double-apply a
    /// state-changing action; callers should `sync` and re-check instead.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            ActionError::Timeout { .. } => true,
            ActionError::Chain(err) | ActionError::StaleProjection(err) => {
                !err.is_definite_failure()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_errors_map_to_distinct_kinds() {
        let err: ActionError = ChainError::Rejected {
            reason: "MaxPlayersReached".into(),
        }
        .into();
        assert!(matches!(err, ActionError::ChainRejected { .. }));
        assert!(!err.outcome_unknown());

        let err: ActionError = ChainError::SignerDeclined.into();
        assert!(matches!(err, ActionError::SignerDeclined));

        let err: ActionError = ChainError::Timeout {
            waited: Duration::from_secs(30),
        }
        .into();
        assert!(err.outcome_unknown());

        let err: ActionError = ChainError::Network("connection reset".into()).into();
        assert!(err.outcome_unknown());
    }
}
