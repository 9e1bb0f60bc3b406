//! Chain abstraction layer for the public-good game client.
//!
//! This crate defines the seam between the orchestration core and whatever
//! blockchain the game contract is deployed on.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: ChainClient (composite trait)
//!          ├── ChainTransport
//!          └── GameContract
//!
//! Layer 1: GameContract (typed calls against one deployed game)
//!
//! Layer 0: ChainTransport (pure infrastructure: connect, health, blocks)
//! ```
//!
//! # Design Philosophy
//!
//! - **Layer 0 (Transport)**: connection lifecycle and chain metadata, no
//!   game knowledge
//! - **Layer 1 (Contract)**: typed queries and transactions for the game
//!   contract interface, plus the event subscription
//! - **Layer 2 (Composite)**: everything a session controller needs from a
//!   backend, behind one object-safe trait
//!
//! Wire-level RPC and transaction signing belong to backend adapter crates;
//! only the trait seam and an in-memory [`MockChainClient`] live here.

pub mod mock;
pub mod traits;
pub mod types;

pub use mock::MockChainClient;
pub use traits::{ChainClient, ChainError, ChainTransport, GameContract};
pub use types::{
    ContractAddress, GameEvent, GameEventKind, Receipt, RoundSnapshot, TransactionStatus, TxId,
};
