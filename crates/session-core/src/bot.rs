//! Automated participant
//!
//! Joins through the public session protocol like any remote client,
//! mirrors the board from broadcast events, and plays the same
//! deterministic fallback move the turn-timeout path uses whenever it
//! becomes the mover. Replay determinism makes the mirrored board sound.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::types::{event_channel, GameEvent};
use crate::game::Board;
use crate::session::SessionClient;

/// Display name the automated participant joins under
pub const BOT_DISPLAY_NAME: &str = "Automaton";

/// Spawn an automated participant for the session behind `client`
pub(crate) fn spawn_bot(client: SessionClient) -> JoinHandle<()> {
    let identity = format!("bot:{}", client.id().0);
    tokio::spawn(run_bot(client, identity))
}

async fn run_bot(client: SessionClient, identity: String) {
    let (sink, mut events) = event_channel();
    let (my_slot, snapshot) = match client.join(&identity, BOT_DISPLAY_NAME, sink).await {
        Ok(joined) => joined,
        Err(e) => {
            warn!("Bot could not join {}: {}", client.id(), e);
            return;
        }
    };
    debug!("Bot joined {} as {}", client.id(), my_slot);

    let mut board = Board::from_cells(snapshot.board_size, snapshot.cells);
    if snapshot.current_mover == Some(my_slot) {
        play(&client, &identity, &board).await;
    }

    while let Some(event) = events.recv().await {
        match event {
            GameEvent::GameBegun { first_mover } => {
                if first_mover == my_slot {
                    play(&client, &identity, &board).await;
                }
            }
            GameEvent::MovePlayed {
                mover,
                position,
                next_mover,
            } => {
                board.place(position, mover);
                if next_mover == Some(my_slot) {
                    play(&client, &identity, &board).await;
                }
            }
            GameEvent::GameEnded { .. } | GameEvent::GameAborted => break,
            _ => {}
        }
    }
    debug!("Bot for {} stopped", client.id());
}

async fn play(client: &SessionClient, identity: &str, board: &Board) {
    let Some(position) = board.fallback_move() else {
        return;
    };
    // Losing the race against the turn timer is fine; both paths compute
    // the same move and the rejection carries no state change
    if let Err(e) = client.make_move(identity, position).await {
        debug!("Bot move {} rejected: {}", position, e);
    }
}
