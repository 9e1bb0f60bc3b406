//! Contribution commitments for commit–reveal rounds.
//!
//! Players stake the maximum round contribution when committing so the real
//! amount leaks nothing on-chain; the commitment binds them to the value
//! they later reveal.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::Balance;

/// Hash binding a player to a `(contribution, nonce)` pair for one round.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    /// Commit to a contribution with a player-chosen nonce.
    ///
    /// Preimage layout matches the contract: little-endian contribution
    /// bytes followed by little-endian nonce bytes.
    pub fn new(contribution: Balance, nonce: u128) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(contribution.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        Self(hasher.finalize().into())
    }

    /// Verify a reveal against this commitment.
    pub fn matches(&self, contribution: Balance, nonce: u128) -> bool {
        *self == Self::new(contribution, nonce)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_is_deterministic() {
        assert_eq!(Commitment::new(100, 144), Commitment::new(100, 144));
    }

    #[test]
    fn reveal_must_match_both_halves() {
        let commitment = Commitment::new(100, 144);
        assert!(commitment.matches(100, 144));
        assert!(!commitment.matches(200, 144));
        assert!(!commitment.matches(100, 145));
    }

    #[test]
    fn different_nonces_hide_equal_contributions() {
        assert_ne!(Commitment::new(100, 1), Commitment::new(100, 2));
    }
}
