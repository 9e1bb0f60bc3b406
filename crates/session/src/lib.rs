//! Orchestration core for on-chain public-good game sessions.
//!
//! One [`SessionController`] drives one deployed game contract through its
//! join → start → play → resolve lifecycle. The controller checks every
//! action against a client-side projection of on-chain state before
//! submitting, so transactions that are guaranteed to revert never pay
//! fees, and it never treats its own projection as truth: state changes
//! only land after the chain confirms them.
//!
//! # Usage
//!
//! ```ignore
//! use session::SessionController;
//!
//! let controller = SessionController::attach(client, address).await?;
//! let mut states = controller.subscribe();
//!
//! controller.join(me, controller.config().join_fee).await?;
//! // ... render from `states` as confirmations arrive ...
//! ```

pub mod controller;
pub mod errors;
pub mod state;

mod projector;

pub use controller::{RewardPreview, SessionController};
pub use errors::{ActionError, Result, ValidationError};
pub use state::SessionState;
