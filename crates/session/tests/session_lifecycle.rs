//! End-to-end session scenarios against the in-memory mock chain.
//!
//! Drives full join → start → commit → reveal → resolve lifecycles through
//! the controller and checks that the projection converges on chain truth,
//! that local validation submits nothing, and that unknown-outcome failures
//! recover through a full re-query.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use chain_core::{GameContract, MockChainClient};
use game_core::{AccountId, GameConfig, GameStatus};
use session::{ActionError, SessionController, SessionState, ValidationError};

const WAIT: Duration = Duration::from_secs(5);

fn duo_config() -> GameConfig {
    GameConfig {
        max_players: 2,
        min_players: 2,
        min_round_contribution: 100,
        max_round_contribution: 1_000,
        round_reward_multiplier: 20,
        post_round_actions: false,
        round_timeout: 25,
        max_rounds: 2,
        join_fee: 10_000,
        is_rounds_based: true,
    }
}

async fn attach(
    client: &Arc<MockChainClient>,
    config: GameConfig,
) -> (SessionController, chain_core::ContractAddress) {
    let address = client.instantiate(config).await.unwrap();
    let controller = SessionController::attach(Arc::clone(client) as _, address)
        .await
        .unwrap();
    (controller, address)
}

async fn wait_for(
    controller: &SessionController,
    predicate: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    let mut states = controller.subscribe();
    timeout(WAIT, states.wait_for(predicate))
        .await
        .expect("projection did not converge in time")
        .expect("projection channel closed")
        .clone()
}

#[tokio::test]
async fn two_players_join_then_start() {
    let client = Arc::new(MockChainClient::new());
    let (controller, _) = attach(&client, duo_config()).await;

    let alice = AccountId::from_seed(1);
    let bob = AccountId::from_seed(2);

    controller.join(alice, 10_000).await.unwrap();
    controller.join(bob, 10_000).await.unwrap();

    // Both joins are confirmed via events; the game has not started.
    let state = wait_for(&controller, |s| s.players.len() == 2).await;
    assert_eq!(state.status, GameStatus::Ready);
    assert!(state.is_player(&alice) && state.is_player(&bob));

    controller.start_game().await.unwrap();
    let state = wait_for(&controller, |s| s.status == GameStatus::InProgress).await;
    assert_eq!(state.current_round, 1);
}

#[tokio::test]
async fn join_preconditions_fail_locally_without_transactions() {
    let client = Arc::new(MockChainClient::new());
    let (controller, _) = attach(&client, duo_config()).await;

    let alice = AccountId::from_seed(1);
    let bob = AccountId::from_seed(2);

    // Wrong fee: rejected before submission.
    let err = controller.join(alice, 9_999).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::WrongJoinFee {
            expected: 10_000,
            provided: 9_999,
        })
    ));
    assert_eq!(client.transaction_count(), 0);

    controller.join(alice, 10_000).await.unwrap();
    controller.join(bob, 10_000).await.unwrap();
    wait_for(&controller, |s| s.players.len() == 2).await;
    let submitted = client.transaction_count();

    // Game is full: the third join fails locally and costs nothing.
    let err = controller
        .join(AccountId::from_seed(3), 10_000)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::GameFull { max: 2 })
    ));
    assert_eq!(client.transaction_count(), submitted);
    assert_eq!(controller.state().players.len(), 2);

    // Duplicate join: same story.
    let err = controller.join(alice, 10_000).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::AlreadyJoined)
    ));
    assert_eq!(client.transaction_count(), submitted);
}

#[tokio::test]
async fn start_requires_min_players() {
    let client = Arc::new(MockChainClient::new());
    let (controller, _) = attach(&client, duo_config()).await;

    controller.join(AccountId::from_seed(1), 10_000).await.unwrap();
    wait_for(&controller, |s| s.players.len() == 1).await;

    let submitted = client.transaction_count();
    let err = controller.start_game().await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::InsufficientPlayers { needed: 2, have: 1 })
    ));
    assert_eq!(client.transaction_count(), submitted);

    // With exactly min_players the start goes through.
    controller.join(AccountId::from_seed(2), 10_000).await.unwrap();
    wait_for(&controller, |s| s.players.len() == 2).await;
    controller.start_game().await.unwrap();
    wait_for(&controller, |s| s.status == GameStatus::InProgress).await;
}

#[tokio::test]
async fn full_two_round_game_resolves_with_expected_payouts() {
    let client = Arc::new(MockChainClient::new());
    let (controller, _) = attach(&client, duo_config()).await;

    let alice = AccountId::from_seed(1);
    let bob = AccountId::from_seed(2);

    controller.join(alice, 10_000).await.unwrap();
    controller.join(bob, 10_000).await.unwrap();
    wait_for(&controller, |s| s.players.len() == 2).await;
    controller.start_game().await.unwrap();
    wait_for(&controller, |s| s.status == GameStatus::InProgress).await;

    // Round 1: commit then reveal both, then advance.
    controller.play_round(alice, 100, 11).await.unwrap();
    controller.play_round(bob, 400, 12).await.unwrap();
    wait_for(&controller, |s| s.committed.len() == 2).await;

    controller.reveal_round(alice, 100, 11).await.unwrap();
    controller.reveal_round(bob, 400, 12).await.unwrap();
    wait_for(&controller, |s| s.all_revealed()).await;

    // Mid-game rounds advance with complete_round, not resolve.
    let err = controller.resolve().await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::NotFinalRound { current: 1, max: 2 })
    ));

    controller.complete_round().await.unwrap();
    let state = wait_for(&controller, |s| s.current_round == 2).await;
    assert_eq!(state.last_payouts, vec![(alice, 200), (bob, 800)]);
    assert!(state.contributions.is_empty());

    // Round 2 (final): complete_round is refused, resolve settles.
    controller.play_round(alice, 300, 21).await.unwrap();
    controller.play_round(bob, 1_000, 22).await.unwrap();
    wait_for(&controller, |s| s.committed.len() == 2).await;

    controller.reveal_round(alice, 300, 21).await.unwrap();
    controller.reveal_round(bob, 1_000, 22).await.unwrap();
    wait_for(&controller, |s| s.all_revealed()).await;

    let err = controller.complete_round().await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::FinalRound { current: 2 })
    ));

    let preview = controller.resolve().await.unwrap();
    assert_eq!(preview.expected_payouts, vec![(alice, 600), (bob, 2_000)]);

    // The chain's distribution matches the display-only preview here
    // because both use the same contract formula.
    let state = wait_for(&controller, |s| s.status == GameStatus::Resolved).await;
    assert_eq!(state.last_payouts, preview.expected_payouts);
}

#[tokio::test]
async fn play_round_guards_contribution_and_membership() {
    let client = Arc::new(MockChainClient::new());
    let (controller, _) = attach(&client, duo_config()).await;

    let alice = AccountId::from_seed(1);
    let bob = AccountId::from_seed(2);
    let mallory = AccountId::from_seed(9);

    controller.join(alice, 10_000).await.unwrap();
    controller.join(bob, 10_000).await.unwrap();
    wait_for(&controller, |s| s.players.len() == 2).await;

    // Playing before the game starts is an invalid state, checked locally.
    let err = controller.play_round(alice, 100, 1).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::InvalidState { .. })
    ));

    controller.start_game().await.unwrap();
    wait_for(&controller, |s| s.status == GameStatus::InProgress).await;
    let submitted = client.transaction_count();

    let err = controller.play_round(mallory, 100, 1).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::NotAPlayer)
    ));

    let err = controller.play_round(alice, 5_000, 1).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::ContributionOutOfRange {
            min: 100,
            max: 1_000,
            provided: 5_000,
        })
    ));

    controller.play_round(alice, 100, 1).await.unwrap();
    wait_for(&controller, |s| s.has_committed(&alice)).await;

    // Double contribution in one round is caught locally.
    let err = controller.play_round(alice, 200, 2).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::AlreadyCommitted)
    ));

    // Only the single valid commit reached the chain.
    assert_eq!(client.transaction_count(), submitted + 1);
}

#[tokio::test]
async fn chain_failures_surface_as_distinct_kinds() {
    let client = Arc::new(MockChainClient::new());
    let (controller, _) = attach(&client, duo_config()).await;
    let alice = AccountId::from_seed(1);

    client.decline_next_signing();
    let err = controller.join(alice, 10_000).await.unwrap_err();
    assert!(matches!(err, ActionError::SignerDeclined));
    assert!(!err.outcome_unknown());

    client.reject_next("MaxPlayersReached");
    let err = controller.join(alice, 10_000).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::ChainRejected { ref reason } if reason == "MaxPlayersReached"
    ));
}

#[tokio::test]
async fn timeout_recovers_via_full_requery_not_retry() {
    let client = Arc::new(MockChainClient::new());
    let (controller, _) = attach(&client, duo_config()).await;
    let alice = AccountId::from_seed(1);

    // The join lands on-chain but confirmation never arrives.
    client.timeout_next();
    let err = controller.join(alice, 10_000).await.unwrap_err();
    assert!(matches!(err, ActionError::Timeout { .. }));
    assert!(err.outcome_unknown());

    // A full re-query reveals the transaction took effect; a blind retry
    // would have reverted with PlayerAlreadyJoined on-chain.
    controller.sync().await.unwrap();
    assert!(controller.state().is_player(&alice));

    let err = controller.join(alice, 10_000).await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Validation(ValidationError::AlreadyJoined)
    ));
}

#[tokio::test]
async fn lagged_subscription_recovers_via_requery() {
    // Capacity 1: the second event overwrites the first before the
    // projector task gets scheduled, forcing a lagged subscription.
    let client = Arc::new(MockChainClient::with_event_capacity(1));
    let (controller, _) = attach(&client, duo_config()).await;

    let alice = AccountId::from_seed(1);
    let bob = AccountId::from_seed(2);

    controller.join(alice, 10_000).await.unwrap();
    controller.join(bob, 10_000).await.unwrap();

    // The dropped join never reaches `apply`; the projection converges on
    // chain truth through the full re-query instead.
    let state = wait_for(&controller, |s| s.players.len() == 2).await;
    assert!(state.is_player(&alice) && state.is_player(&bob));
    assert_eq!(state.status, GameStatus::Ready);
    assert_eq!(state.last_synced_block, 2);
}

#[tokio::test]
async fn independent_sessions_do_not_interfere() {
    let client = Arc::new(MockChainClient::new());
    let (first, first_address) = attach(&client, duo_config()).await;
    let (second, second_address) = attach(&client, duo_config()).await;
    assert_ne!(first_address, second_address);

    let alice = AccountId::from_seed(1);
    let bob = AccountId::from_seed(2);

    // Same accounts participate in both games; the projections stay
    // scoped to their own contract.
    first.join(alice, 10_000).await.unwrap();
    second.join(bob, 10_000).await.unwrap();

    let state = wait_for(&first, |s| s.players.len() == 1).await;
    assert!(state.is_player(&alice) && !state.is_player(&bob));

    let state = wait_for(&second, |s| s.players.len() == 1).await;
    assert!(state.is_player(&bob) && !state.is_player(&alice));
}

#[tokio::test]
async fn detaching_stops_event_consumption() {
    let client = Arc::new(MockChainClient::new());
    let (controller, address) = attach(&client, duo_config()).await;
    let mut states = controller.subscribe();

    controller.join(AccountId::from_seed(1), 10_000).await.unwrap();
    timeout(WAIT, states.wait_for(|s| s.players.len() == 1))
        .await
        .unwrap()
        .unwrap();

    drop(controller);

    // The watch channel closes once the controller (its only sender home)
    // is gone, so renderers observe the session ending.
    let closed = timeout(WAIT, states.changed()).await.unwrap();
    assert!(closed.is_err());

    // Chain-side activity continues without the detached session caring.
    client
        .join(&address, AccountId::from_seed(2), 10_000)
        .await
        .unwrap();
}
