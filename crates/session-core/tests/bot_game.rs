//! Automated participant plays a complete game

mod common;

use common::*;
use duelgrid_session_core::api::event_channel;
use duelgrid_session_core::{
    CreateSessionParams, GameEvent, GameOutcome, SessionId, SessionState, Slot,
};

#[tokio::test]
async fn bot_completes_a_game_against_a_scripted_opponent() {
    let directory = start_directory();
    let params = CreateSessionParams::default()
        .with_config(deterministic_config())
        .with_automated_opponent();
    let session = directory
        .create_session(SessionId::new(50), params)
        .await
        .unwrap();

    // The human mirrors the bot's strategy: first vacant cell, own turn only
    let (sink, mut events) = event_channel();
    let (my_slot, snapshot) = session.join("human", "human", sink).await.unwrap();
    let mut board = duelgrid_session_core::game::Board::from_cells(
        snapshot.board_size,
        snapshot.cells,
    );

    let mut my_outcome = None;
    while let Some(event) = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        events.recv(),
    )
    .await
    .expect("game stalled")
    {
        match event {
            GameEvent::GameBegun { first_mover } => {
                if first_mover == my_slot {
                    let position = board.fallback_move().unwrap();
                    session.make_move("human", position).await.unwrap();
                }
            }
            GameEvent::MovePlayed {
                mover,
                position,
                next_mover,
            } => {
                board.place(position, mover);
                if next_mover == Some(my_slot) {
                    let position = board.fallback_move().unwrap();
                    session.make_move("human", position).await.unwrap();
                }
            }
            GameEvent::GameEnded { outcome } => {
                my_outcome = Some(outcome);
                break;
            }
            _ => {}
        }
    }

    // Both sides play first-vacant, so whoever moved first holds cells
    // 0, 2, 4, 6 and wins on the anti-diagonal after seven moves
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Ended);
    assert_eq!(snapshot.move_count, 7);

    let first_mover_won = snapshot.cells[2] == snapshot.cells[4]
        && snapshot.cells[4] == snapshot.cells[6]
        && snapshot.cells[2].is_some();
    assert!(first_mover_won, "expected an anti-diagonal win");

    // Outcome framing matches which slot the human landed in
    let winner = snapshot.cells[2].unwrap();
    let expected = if winner == my_slot {
        GameOutcome::Win
    } else {
        GameOutcome::Loss
    };
    assert_eq!(my_outcome, Some(expected));
}

#[tokio::test]
async fn bot_session_drains_cleanly_on_shutdown() {
    let directory = start_directory();
    let params = CreateSessionParams::default()
        .with_config(deterministic_config())
        .with_automated_opponent();
    let session = directory
        .create_session(SessionId::new(51), params)
        .await
        .unwrap();

    // Do not join; the bot alone cannot start the game
    let snapshot = session.snapshot().await.unwrap();
    assert!(snapshot.state == SessionState::WaitingForPlayers);
    assert!(snapshot.participants.len() <= 1);

    directory.shutdown().await.unwrap();
    assert!(directory.stats().await.is_err());
}

#[tokio::test]
async fn bot_takes_the_first_move_when_drawn_as_first_mover() {
    let directory = start_directory();
    // Force slot 1; whether the bot or the human holds it depends on join
    // order, so assert on behavior: the game always progresses
    let params = CreateSessionParams::default()
        .with_config(deterministic_config().with_first_mover(Slot(1)))
        .with_automated_opponent();
    let session = directory
        .create_session(SessionId::new(52), params)
        .await
        .unwrap();

    let mut human = join(&session, "human").await;
    wait_for_begin(&mut human).await;

    // If it is the human's turn nothing happens until we move; resolve by
    // reacting exactly once, then expect a bot move to follow
    let snapshot = session.snapshot().await.unwrap();
    if snapshot.current_mover == Some(human.slot) {
        let board = duelgrid_session_core::game::Board::from_cells(
            snapshot.board_size,
            snapshot.cells,
        );
        session
            .make_move("human", board.fallback_move().unwrap())
            .await
            .unwrap();
    }

    // The next recorded move not made by the human must come from the bot
    loop {
        match next_event(&mut human).await {
            GameEvent::MovePlayed { mover, .. } if mover != human.slot => break,
            GameEvent::MovePlayed { .. } => {}
            other => panic!("unexpected event {:?}", other),
        }
    }
}
