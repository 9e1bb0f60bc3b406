//! Immutable game configuration and its structural validator.
//!
//! A `GameConfig` is fixed at contract instantiation and treated as
//! read-only for the lifetime of every session that references it.
//! Validation happens client-side before the instantiation transaction is
//! ever submitted, so a structurally invalid config never pays fees for a
//! guaranteed revert.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Balance, RoundId};

/// Rules of one game instance, set once at contract creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Upper bound on the player set.
    pub max_players: u8,
    /// Players required before the game may start.
    pub min_players: u8,
    /// Smallest contribution accepted per round.
    pub min_round_contribution: Balance,
    /// Largest contribution accepted per round. Also the amount staked on
    /// commit, so the real contribution stays hidden until reveal.
    pub max_round_contribution: Balance,
    /// Reward multiplier applied to revealed contributions, scaled by 10
    /// (a value of 15 pays out 1.5x).
    pub round_reward_multiplier: u16,
    /// Whether additional actions are permitted after a round closes.
    pub post_round_actions: bool,
    /// Blocks allowed per round before it is considered stale.
    pub round_timeout: u32,
    /// Round cap; ignored unless `is_rounds_based` is set.
    pub max_rounds: RoundId,
    /// Amount required to join; zero means free entry.
    pub join_fee: Balance,
    /// When false the game is open-ended and `max_rounds` does not apply.
    pub is_rounds_based: bool,
}

impl GameConfig {
    /// Scale divisor for `round_reward_multiplier`.
    pub const MULTIPLIER_SCALE: Balance = 10;

    /// Check every structural invariant, reporting all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut violations = Vec::new();

        if self.min_players == 0 {
            violations.push(ConfigViolation::NoPlayers);
        }
        if self.min_players > self.max_players {
            violations.push(ConfigViolation::PlayerBoundsInverted {
                min: self.min_players,
                max: self.max_players,
            });
        }
        if self.min_round_contribution > self.max_round_contribution {
            violations.push(ConfigViolation::ContributionBoundsInverted {
                min: self.min_round_contribution,
                max: self.max_round_contribution,
            });
        }
        if self.round_reward_multiplier == 0 {
            violations.push(ConfigViolation::ZeroRewardMultiplier);
        }
        if self.round_timeout == 0 {
            violations.push(ConfigViolation::ZeroRoundTimeout);
        }
        if self.is_rounds_based && self.max_rounds == 0 {
            violations.push(ConfigViolation::ZeroMaxRounds);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { violations })
        }
    }

    /// Expected reward for a revealed contribution, for display only.
    ///
    /// The authoritative distribution is computed on-chain; this mirrors the
    /// contract formula so UIs can preview payouts.
    pub fn reward_for(&self, contribution: Balance) -> Balance {
        contribution.saturating_mul(Balance::from(self.round_reward_multiplier))
            / Self::MULTIPLIER_SCALE
    }

    /// Whether `contribution` falls inside the configured bounds.
    pub fn contribution_in_bounds(&self, contribution: Balance) -> bool {
        (self.min_round_contribution..=self.max_round_contribution).contains(&contribution)
    }
}

/// A single violated configuration constraint.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("min_players must be at least 1")]
    NoPlayers,

    #[error("min_players ({min}) exceeds max_players ({max})")]
    PlayerBoundsInverted { min: u8, max: u8 },

    #[error("min_round_contribution ({min}) exceeds max_round_contribution ({max})")]
    ContributionBoundsInverted { min: Balance, max: Balance },

    #[error("round_reward_multiplier must be positive")]
    ZeroRewardMultiplier,

    #[error("round_timeout must be positive")]
    ZeroRoundTimeout,

    #[error("max_rounds must be positive for a rounds-based game")]
    ZeroMaxRounds,
}

/// Structural validation failure carrying every violated constraint, not
/// just the first one found.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid game configuration: {}", format_violations(violations))]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
