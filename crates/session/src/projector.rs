//! Event-stream projector: folds confirmed on-chain events into the
//! session projection and publishes snapshots for renderers.

use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use chain_core::{ChainClient, ChainError, ContractAddress, GameEvent};

use crate::state::SessionState;

/// Projection storage shared between the controller and the projector task.
///
/// Every accepted mutation is mirrored into the watch channel, which is the
/// read-only subscription handed to UI layers.
pub(crate) struct SharedState {
    state: RwLock<SessionState>,
    tx: watch::Sender<SessionState>,
}

impl SharedState {
    pub(crate) fn new(initial: SessionState) -> Arc<Self> {
        let (tx, _) = watch::channel(initial.clone());
        Arc::new(Self {
            state: RwLock::new(initial),
            tx,
        })
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        self.state.read().unwrap().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub(crate) fn apply(&self, event: &GameEvent) -> bool {
        let mut state = self.state.write().unwrap();
        let applied = state.apply(event);
        if applied {
            // send_replace: the latest snapshot must be stored even while
            // no subscriber is alive, so late subscribers start current.
            self.tx.send_replace(state.clone());
        }
        applied
    }

    pub(crate) fn replace(&self, next: SessionState) {
        let mut state = self.state.write().unwrap();
        // A racing event may already have advanced past the queried block.
        if next.last_synced_block < state.last_synced_block {
            return;
        }
        *state = next.clone();
        self.tx.send_replace(next);
    }
}

/// Spawn the projector task for one session.
///
/// The task consumes the contract's event subscription until the stream
/// closes or the task is aborted (controller drop). A lagged subscription
/// means events were missed, so the projection is rebuilt from a full
/// query instead of trusting whatever is still buffered.
pub(crate) fn spawn(
    client: Arc<dyn ChainClient>,
    address: ContractAddress,
    shared: Arc<SharedState>,
    mut events: broadcast::Receiver<GameEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if event.address != address {
                        continue;
                    }
                    if !shared.apply(&event) {
                        tracing::trace!(block = event.block, "discarded stale or duplicate event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, %address, "event subscription lagged; re-querying state");
                    if let Err(err) = resync(client.as_ref(), &address, &shared).await {
                        // Surfaced to callers as a stale projection on
                        // their next sync attempt.
                        tracing::error!(error = %err, %address, "re-query after event gap failed");
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!(%address, "event stream closed; projector stopping");
                    break;
                }
            }
        }
    })
}

/// Rebuild the projection from a full on-chain query.
pub(crate) async fn resync(
    client: &dyn ChainClient,
    address: &ContractAddress,
    shared: &SharedState,
) -> Result<(), ChainError> {
    // Stamp with the height read before the queries. A transaction landing
    // mid-query then carries a later block than the stamp, so its event
    // replays through `apply` instead of being discarded as stale.
    let block = client.latest_block().await?;
    let status = client.get_status(address).await?;
    let players = client.get_players(address).await?;
    let round = client.get_round(address).await?;

    shared.replace(SessionState::from_snapshot(status, players, round, block));
    Ok(())
}
