//! Domain types for the public-good game client.
//!
//! This crate holds the chain-agnostic value objects shared by every layer:
//! participant addresses, the immutable game configuration, game/round
//! status enums, and the commitment scheme used to hide round contributions
//! until reveal. It has no knowledge of any particular blockchain.

pub mod commitment;
pub mod config;
pub mod types;

pub use commitment::Commitment;
pub use config::{ConfigError, ConfigViolation, GameConfig};
pub use types::{AccountId, Balance, BlockNumber, GameStatus, RoundId};
