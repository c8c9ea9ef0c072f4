//! Turn timer behavior under a paused clock

mod common;

use common::*;
use std::time::Duration;
use duelgrid_session_core::{
    CreateSessionParams, GameEvent, GameOutcome, Position, SessionId, SessionState, Slot,
};

fn params() -> CreateSessionParams {
    CreateSessionParams::default().with_config(deterministic_config())
}

#[tokio::test(start_paused = true)]
async fn expired_turn_produces_the_fallback_move() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(30), params())
        .await
        .unwrap();

    let (mut alice, mut bob) = join_pair(&session).await;
    wait_for_begin(&mut alice).await;
    wait_for_begin(&mut bob).await;

    // Alice never moves; the deadline plays the first vacant cell for her
    tokio::time::sleep(Duration::from_secs(31)).await;

    match next_event(&mut bob).await {
        GameEvent::MovePlayed {
            mover,
            position,
            next_mover,
        } => {
            assert_eq!(mover, Slot(1));
            assert_eq!(position, Position::new(0, 0));
            assert_eq!(next_mover, Some(Slot(2)));
        }
        other => panic!("expected MovePlayed, got {:?}", other),
    }
    assert_eq!(session.snapshot().await.unwrap().move_count, 1);
}

#[tokio::test(start_paused = true)]
async fn timer_rearms_for_each_turn() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(31), params())
        .await
        .unwrap();

    let (mut alice, mut bob) = join_pair(&session).await;
    wait_for_begin(&mut alice).await;
    wait_for_begin(&mut bob).await;

    // A real move cancels the turn-0 timer and arms one for turn 1
    session.make_move("alice", Position::new(2, 2)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(31)).await;

    // Only the turn-1 deadline fired, auto-playing for bob
    match next_event(&mut bob).await {
        GameEvent::MovePlayed { mover, .. } => assert_eq!(mover, Slot(1)),
        other => panic!("expected alice's move, got {:?}", other),
    }
    match next_event(&mut bob).await {
        GameEvent::MovePlayed {
            mover, position, ..
        } => {
            assert_eq!(mover, Slot(2));
            assert_eq!(position, Position::new(0, 0));
        }
        other => panic!("expected the fallback move, got {:?}", other),
    }
    assert_eq!(session.snapshot().await.unwrap().move_count, 2);
}

#[tokio::test(start_paused = true)]
async fn unattended_game_completes_on_timeouts_alone() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(32), params())
        .await
        .unwrap();

    let (mut alice, mut bob) = join_pair(&session).await;
    wait_for_begin(&mut alice).await;
    wait_for_begin(&mut bob).await;

    // Fallback moves claim cells row-major with alternating movers, so
    // slot 1 takes cells 0, 2, 4, 6 and completes the 2-4-6 anti-diagonal
    // on its fourth auto-move. Walk the clock past each deadline.
    for _ in 0..7 {
        tokio::time::sleep(Duration::from_secs(31)).await;
    }

    let mut moves = 0;
    let outcome = loop {
        match next_event(&mut bob).await {
            GameEvent::MovePlayed { .. } => moves += 1,
            GameEvent::GameEnded { outcome } => break outcome,
            other => panic!("unexpected event {:?}", other),
        }
    };

    assert_eq!(moves, 7);
    assert_eq!(outcome, GameOutcome::Loss);
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Ended);
    assert_eq!(snapshot.move_count, 7);
}

#[tokio::test(start_paused = true)]
async fn no_timer_fires_after_the_game_ends() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(33), params())
        .await
        .unwrap();

    let (mut alice, mut bob) = join_pair(&session).await;
    wait_for_begin(&mut alice).await;
    wait_for_begin(&mut bob).await;

    // Quick top-row win for alice
    for (i, position) in [(0, 0), (1, 1), (0, 1), (1, 0), (0, 2)].iter().enumerate() {
        let identity = if i % 2 == 0 { "alice" } else { "bob" };
        session
            .make_move(identity, Position::new(position.0, position.1))
            .await
            .unwrap();
    }
    // Drain bob through the end of the game
    loop {
        if matches!(next_event(&mut bob).await, GameEvent::GameEnded { .. }) {
            break;
        }
    }

    // Hours of idle time produce nothing further
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(bob.events.try_recv().is_err());
    assert_eq!(session.snapshot().await.unwrap().move_count, 5);
}

#[tokio::test(start_paused = true)]
async fn abort_cancels_the_pending_deadline() {
    let directory = start_directory();
    let session = directory
        .create_session(SessionId::new(34), params())
        .await
        .unwrap();

    let (mut alice, mut bob) = join_pair(&session).await;
    wait_for_begin(&mut alice).await;
    wait_for_begin(&mut bob).await;

    session.leave("alice").await.unwrap();
    loop {
        if matches!(next_event(&mut bob).await, GameEvent::GameEnded { .. }) {
            break;
        }
    }

    tokio::time::sleep(Duration::from_secs(120)).await;
    // An aborted game keeps its move count; a timer surviving the abort
    // would have auto-played here
    assert!(bob.events.try_recv().is_err());
    assert_eq!(session.snapshot().await.unwrap().move_count, 0);
}
