//! Game session state machine task

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::client::{SessionClient, SessionCommand};
use super::timer::TurnTimer;
use crate::api::config::SessionConfig;
use crate::api::types::{
    EventSink, GameEvent, GameOutcome, GameSnapshot, ParticipantInfo, Position, SessionId,
    SessionState, Slot,
};
use crate::errors::{Result, SessionError};
use crate::game::Board;

/// Spawn a session task; returns the client handle and the task handle the
/// directory watches for termination
pub(crate) fn spawn_session(id: SessionId, config: SessionConfig) -> (SessionClient, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = GameSession::new(id, config, tx.clone());
    let handle = tokio::spawn(session.run(rx));
    (SessionClient::new(id, tx), handle)
}

/// A participant position and its delivery targets
///
/// The slot stays reserved for the identity even after its notification
/// sink is cleared; only the delivery target is optional.
struct ParticipantSlot {
    slot: Slot,
    identity: String,
    display_name: String,
    notify: Option<EventSink>,
    owner: Option<EventSink>,
}

/// Per-session state, mutated only by the session's own task
struct GameSession {
    id: SessionId,
    config: SessionConfig,
    state: SessionState,
    board: Board,
    /// Append-only move record; its length is the turn index
    moves: Vec<Position>,
    participants: Vec<ParticipantSlot>,
    current_mover: Option<Slot>,
    timer: Option<TurnTimer>,
    /// Sender into our own mailbox, for the begin transition and timers
    self_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl GameSession {
    fn new(id: SessionId, config: SessionConfig, self_tx: mpsc::UnboundedSender<SessionCommand>) -> Self {
        let board = Board::new(config.board_size);
        Self {
            id,
            config,
            state: SessionState::WaitingForPlayers,
            board,
            moves: Vec::new(),
            participants: Vec::new(),
            current_mover: None,
            timer: None,
            self_tx,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionCommand>) {
        debug!("{} task started", self.id);
        while let Some(command) = rx.recv().await {
            if self.handle_command(command) {
                break;
            }
        }
        self.cancel_timer();
        debug!("{} task ended in state {:?}", self.id, self.state);
    }

    /// Process one command; returns true when the session should terminate
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Join {
                identity,
                display_name,
                observer,
                owner,
                reply,
            } => {
                self.handle_join(identity, display_name, observer, owner, reply);
                false
            }
            SessionCommand::Leave { identity, reply } => self.handle_leave(identity, reply),
            SessionCommand::MakeMove {
                identity,
                position,
                reply,
            } => {
                self.handle_make_move(identity, position, reply);
                false
            }
            SessionCommand::Say {
                identity,
                text,
                reply,
            } => {
                self.handle_say(identity, text, reply);
                false
            }
            SessionCommand::RebindObserver { identity, sink } => {
                self.handle_rebind(identity, sink);
                false
            }
            SessionCommand::ObserverClosed { identity } => {
                self.handle_observer_closed(identity);
                false
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
                false
            }
            SessionCommand::Begin => {
                self.handle_begin();
                false
            }
            SessionCommand::TurnTimeout { guarded_turn } => {
                self.handle_turn_timeout(guarded_turn);
                false
            }
            SessionCommand::Terminate => self.handle_terminate(),
        }
    }

    fn handle_join(
        &mut self,
        identity: String,
        display_name: String,
        observer: EventSink,
        owner: Option<EventSink>,
        reply: oneshot::Sender<Result<(Slot, GameSnapshot)>>,
    ) {
        if self.state != SessionState::WaitingForPlayers {
            let _ = reply.send(Err(SessionError::GameAlreadyStarted));
            return;
        }
        if self.participants.len() >= self.config.capacity {
            let _ = reply.send(Err(SessionError::SessionFull));
            return;
        }

        let slot = Slot((self.participants.len() + 1) as u8);
        // Announce to the existing observers before recording the newcomer,
        // so the joiner does not see its own join event
        self.broadcast(GameEvent::PlayerJoined {
            slot,
            identity: identity.clone(),
            display_name: display_name.clone(),
        });
        info!("{}: {} joined as {}", self.id, identity, slot);
        self.participants.push(ParticipantSlot {
            slot,
            identity,
            display_name,
            notify: Some(observer),
            owner,
        });

        let _ = reply.send(Ok((slot, self.snapshot())));

        if self.participants.len() == self.config.capacity {
            // The transition runs through our own mailbox so the join reply
            // is never blocked on it
            let _ = self.self_tx.send(SessionCommand::Begin);
        }
    }

    fn handle_begin(&mut self) {
        if self.state != SessionState::WaitingForPlayers
            || self.participants.len() < self.config.capacity
        {
            debug!("{}: stale begin ignored in state {:?}", self.id, self.state);
            return;
        }

        self.state = SessionState::Playing;
        let first_mover = self.config.first_mover.unwrap_or_else(|| {
            let mut rng = match self.config.rng_seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            Slot(rng.gen_range(1..=self.config.capacity as u8))
        });
        self.current_mover = Some(first_mover);
        self.arm_timer();
        info!("{}: playing, first mover {}", self.id, first_mover);
        self.broadcast_begin(first_mover);
    }

    fn handle_make_move(
        &mut self,
        identity: String,
        position: Position,
        reply: oneshot::Sender<Result<()>>,
    ) {
        let Some(slot) = self.slot_of(&identity) else {
            let _ = reply.send(Err(SessionError::NotInSession));
            return;
        };
        if self.state != SessionState::Playing || self.current_mover != Some(slot) {
            let _ = reply.send(Err(SessionError::NotYourTurn));
            return;
        }
        if !self.board.is_vacant(position) {
            let _ = reply.send(Err(SessionError::InvalidPosition));
            return;
        }

        let _ = reply.send(Ok(()));
        self.apply_move(slot, position);
    }

    /// Shared move path for player moves and timeout fallbacks
    fn apply_move(&mut self, mover: Slot, position: Position) {
        let placed = self.board.place(position, mover);
        debug_assert!(placed, "apply_move called with an invalid position");
        self.moves.push(position);

        let winner = self.board.winner();
        let board_full = self.moves.len() == self.board.size() * self.board.size();
        let draw = winner.is_none() && board_full;
        let next_mover = if winner.is_some() || draw {
            None
        } else {
            Some(self.next_slot(mover))
        };

        debug!(
            "{}: {} played {} (turn {})",
            self.id,
            mover,
            position,
            self.moves.len() - 1
        );
        self.broadcast(GameEvent::MovePlayed {
            mover,
            position,
            next_mover,
        });

        if let Some(winner) = winner {
            self.finish(|slot| {
                if slot == winner {
                    GameOutcome::Win
                } else {
                    GameOutcome::Loss
                }
            });
        } else if draw {
            self.finish(|_| GameOutcome::Draw);
        } else {
            self.current_mover = next_mover;
            self.arm_timer();
        }
    }

    /// Transition to Ended and deliver per-recipient outcome framing
    fn finish(&mut self, outcome_for: impl Fn(Slot) -> GameOutcome) {
        self.state = SessionState::Ended;
        self.current_mover = None;
        self.cancel_timer();
        info!("{} ended after {} moves", self.id, self.moves.len());
        for participant in &self.participants {
            if let Some(sink) = &participant.notify {
                let _ = sink.send(GameEvent::GameEnded {
                    outcome: outcome_for(participant.slot),
                });
            }
        }
    }

    fn handle_leave(&mut self, identity: String, reply: oneshot::Sender<Result<()>>) -> bool {
        let Some(index) = self
            .participants
            .iter()
            .position(|p| p.identity == identity)
        else {
            let _ = reply.send(Err(SessionError::NotInSession));
            return false;
        };

        let slot = self.participants[index].slot;
        // The slot stays reserved; only the delivery target is cleared
        self.participants[index].notify = None;
        let _ = reply.send(Ok(()));
        info!("{}: {} left {}", self.id, identity, slot);
        self.broadcast(GameEvent::PlayerLeft { slot, identity });

        if !self.state.is_terminal() {
            self.abort_game();
        }

        if self.participants.iter().all(|p| p.notify.is_none()) {
            debug!("{}: no observers attached, terminating", self.id);
            return true;
        }
        false
    }

    /// Force-transition to Aborted with per-participant abandoned outcomes
    fn abort_game(&mut self) {
        self.state = SessionState::Aborted;
        self.current_mover = None;
        self.cancel_timer();
        self.broadcast(GameEvent::GameAborted);
        for participant in &self.participants {
            if let Some(sink) = &participant.notify {
                let _ = sink.send(GameEvent::GameEnded {
                    outcome: GameOutcome::Abandoned,
                });
            }
        }
    }

    fn handle_say(&mut self, identity: String, text: String, reply: oneshot::Sender<Result<()>>) {
        let Some(slot) = self.slot_of(&identity) else {
            let _ = reply.send(Err(SessionError::NotInSession));
            return;
        };
        let display_name = self.participants[slot.index()].display_name.clone();
        let _ = reply.send(Ok(()));
        self.broadcast(GameEvent::Chat {
            slot,
            display_name,
            text,
        });
    }

    fn handle_turn_timeout(&mut self, guarded_turn: usize) {
        // A move and a fired timer can race; the turn index decides
        if self.state != SessionState::Playing || self.moves.len() != guarded_turn {
            debug!(
                "{}: stale turn timer for turn {} ignored",
                self.id, guarded_turn
            );
            return;
        }
        let Some(mover) = self.current_mover else {
            return;
        };
        let Some(position) = self.board.fallback_move() else {
            return;
        };
        info!(
            "{}: turn {} timed out, auto-playing {} for {}",
            self.id, guarded_turn, position, mover
        );
        self.timer = None;
        self.apply_move(mover, position);
    }

    fn handle_rebind(&mut self, identity: String, sink: EventSink) {
        match self.participants.iter_mut().find(|p| p.identity == identity) {
            Some(participant) => {
                debug!("{}: observer for {} rebound", self.id, identity);
                participant.notify = Some(sink);
            }
            None => debug!("{}: rebind for unknown identity {}", self.id, identity),
        }
    }

    fn handle_observer_closed(&mut self, identity: String) {
        match self.participants.iter_mut().find(|p| p.identity == identity) {
            Some(participant) => {
                debug!("{}: observer for {} detached", self.id, identity);
                participant.notify = None;
            }
            None => debug!("{}: observer close for unknown identity {}", self.id, identity),
        }
    }

    fn handle_terminate(&mut self) -> bool {
        debug!("{}: termination signal", self.id);
        if !self.state.is_terminal() {
            self.abort_game();
        }
        true
    }

    fn slot_of(&self, identity: &str) -> Option<Slot> {
        self.participants
            .iter()
            .find(|p| p.identity == identity)
            .map(|p| p.slot)
    }

    fn next_slot(&self, slot: Slot) -> Slot {
        Slot((slot.0 % self.config.capacity as u8) + 1)
    }

    fn arm_timer(&mut self) {
        self.cancel_timer();
        self.timer = Some(TurnTimer::arm(&self.self_tx, &self.config, self.moves.len()));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Deliver an event to every attached observer, silently skipping
    /// detached slots and closed channels
    fn broadcast(&self, event: GameEvent) {
        for participant in &self.participants {
            if let Some(sink) = &participant.notify {
                let _ = sink.send(event.clone());
            }
        }
    }

    /// The begin event also reaches participant owner channels, so the actor
    /// owning a slot learns the game started even with its observer detached
    fn broadcast_begin(&self, first_mover: Slot) {
        let event = GameEvent::GameBegun { first_mover };
        for participant in &self.participants {
            if let Some(sink) = &participant.notify {
                let _ = sink.send(event.clone());
            }
            if let Some(owner) = &participant.owner {
                let duplicate = participant
                    .notify
                    .as_ref()
                    .is_some_and(|n| n.same_channel(owner));
                if !duplicate {
                    let _ = owner.send(event.clone());
                }
            }
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            session_id: self.id,
            state: self.state,
            board_size: self.board.size(),
            cells: self.board.cells().to_vec(),
            move_count: self.moves.len(),
            current_mover: self.current_mover,
            participants: self
                .participants
                .iter()
                .map(|p| ParticipantInfo {
                    slot: p.slot,
                    identity: p.identity.clone(),
                    display_name: p.display_name.clone(),
                    connected: p.notify.is_some(),
                })
                .collect(),
        }
    }
}
