//! Directory worker lifecycle: creation, removal, supervision, drain

mod common;

use common::*;
use duelgrid_session_core::{
    CreateSessionParams, GameEvent, GameOutcome, SessionError, SessionId,
};

fn params() -> CreateSessionParams {
    CreateSessionParams::default().with_config(deterministic_config())
}

#[tokio::test]
async fn duplicate_session_id_fails_loudly() {
    let directory = start_directory();
    directory
        .create_session(SessionId::new(40), params())
        .await
        .unwrap();

    match directory
        .create_session(SessionId::new(40), params())
        .await
        .unwrap_err()
    {
        SessionError::DuplicateSession(id) => assert_eq!(id, SessionId::new(40)),
        other => panic!("expected DuplicateSession, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_config_is_a_creation_failure() {
    let directory = start_directory();
    let bad = CreateSessionParams::default()
        .with_config(deterministic_config().with_board_size(0));

    assert!(matches!(
        directory
            .create_session(SessionId::new(41), bad)
            .await
            .unwrap_err(),
        SessionError::CreationFailed(_)
    ));
    // Nothing was counted for the failed spawn
    let stats = directory.stats().await.unwrap();
    assert_eq!(stats.live_sessions, 0);
    assert_eq!(stats.total_created, 0);
}

#[tokio::test]
async fn remove_is_idempotent_and_frees_the_id() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(42), params())
        .await
        .unwrap();
    let _alice = join(&session, "alice").await;

    // Unknown id is a no-op success
    directory.remove_session(SessionId::new(999)).await.unwrap();

    directory.remove_session(SessionId::new(42)).await.unwrap();
    directory.remove_session(SessionId::new(42)).await.unwrap();

    // The entry is gone immediately, so the id can be reused once the
    // old task reports termination
    wait_for_stats(&directory, |s| s.live_sessions == 0 && s.total_terminated == 1).await;
    directory
        .create_session(SessionId::new(42), params())
        .await
        .unwrap();
}

#[tokio::test]
async fn natural_termination_is_reported_back() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(43), params())
        .await
        .unwrap();
    let _alice = join(&session, "alice").await;

    // Sole participant leaves; the session self-terminates and the
    // supervision monitor updates the counters
    session.leave("alice").await.unwrap();
    let stats = wait_for_stats(&directory, |s| s.live_sessions == 0).await;
    assert_eq!(stats.total_created, 1);
    assert_eq!(stats.total_terminated, 1);
    assert!(!stats.shutting_down);
}

#[tokio::test]
async fn shutdown_drains_all_live_sessions() {
    let directory = start_directory();
    let first = directory
        .create_session(SessionId::new(44), params())
        .await
        .unwrap();
    let second = directory
        .create_session(SessionId::new(45), params())
        .await
        .unwrap();
    let mut alice = join(&first, "alice").await;
    let mut bob = join(&second, "bob").await;

    // Resolves only after both children report termination, in whichever
    // order they arrive
    directory.shutdown().await.unwrap();

    for player in [&mut alice, &mut bob] {
        assert!(matches!(next_event(player).await, GameEvent::GameAborted));
        assert!(matches!(
            next_event(player).await,
            GameEvent::GameEnded {
                outcome: GameOutcome::Abandoned
            }
        ));
    }

    // The worker is gone
    assert!(directory.stats().await.is_err());
    assert!(matches!(
        directory
            .create_session(SessionId::new(46), params())
            .await
            .unwrap_err(),
        SessionError::ShuttingDown
    ));
    assert!(matches!(
        first.snapshot().await.unwrap_err(),
        SessionError::SessionNotFound(_)
    ));
}

#[tokio::test]
async fn shutdown_with_no_sessions_finishes_immediately() {
    let directory = start_directory();
    directory.shutdown().await.unwrap();
    // Idempotent, including after the worker is gone
    directory.shutdown().await.unwrap();
}

#[tokio::test]
async fn creation_is_rejected_while_draining() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(47), params())
        .await
        .unwrap();
    let _alice = join(&session, "alice").await;

    // Issue shutdown and a create concurrently; the create either hits the
    // draining worker or the closed mailbox, both are ShuttingDown
    let (shutdown, create) = futures::join!(
        directory.shutdown(),
        directory.create_session(SessionId::new(48), params()),
    );
    shutdown.unwrap();
    assert!(matches!(create.unwrap_err(), SessionError::ShuttingDown));
}
