//! Session command mailbox and the participant-facing client

use tokio::sync::{mpsc, oneshot};

use crate::api::types::{EventSink, GameSnapshot, Position, SessionId, Slot};
use crate::errors::{Result, SessionError};

/// Commands processed by the session task
pub(crate) enum SessionCommand {
    Join {
        identity: String,
        display_name: String,
        observer: EventSink,
        /// Channel of the actor owning the participant; receives the begin
        /// event even when the user-facing observer is detached
        owner: Option<EventSink>,
        reply: oneshot::Sender<Result<(Slot, GameSnapshot)>>,
    },
    Leave {
        identity: String,
        reply: oneshot::Sender<Result<()>>,
    },
    MakeMove {
        identity: String,
        position: Position,
        reply: oneshot::Sender<Result<()>>,
    },
    Say {
        identity: String,
        text: String,
        reply: oneshot::Sender<Result<()>>,
    },
    RebindObserver {
        identity: String,
        sink: EventSink,
    },
    ObserverClosed {
        identity: String,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    /// Re-enqueued by the session itself when capacity is reached, so the
    /// waiting-to-playing transition never blocks the join reply
    Begin,
    TurnTimeout {
        guarded_turn: usize,
    },
    Terminate,
}

/// Handle to a running session
///
/// Cheap to clone; all methods go through the session mailbox. A closed
/// mailbox surfaces as `SessionNotFound`.
#[derive(Clone, Debug)]
pub struct SessionClient {
    id: SessionId,
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionClient {
    pub(crate) fn new(id: SessionId, tx: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| SessionError::SessionNotFound(self.id))
    }

    async fn request<T>(&self, rx: oneshot::Receiver<T>) -> Result<T> {
        rx.await.map_err(|_| SessionError::SessionNotFound(self.id))
    }

    /// Join the session with an observer sink
    pub async fn join(
        &self,
        identity: &str,
        display_name: &str,
        observer: EventSink,
    ) -> Result<(Slot, GameSnapshot)> {
        self.join_inner(identity, display_name, observer, None).await
    }

    /// Join with a separate owner channel for the actor holding the slot
    pub async fn join_with_owner(
        &self,
        identity: &str,
        display_name: &str,
        observer: EventSink,
        owner: EventSink,
    ) -> Result<(Slot, GameSnapshot)> {
        self.join_inner(identity, display_name, observer, Some(owner))
            .await
    }

    async fn join_inner(
        &self,
        identity: &str,
        display_name: &str,
        observer: EventSink,
        owner: Option<EventSink>,
    ) -> Result<(Slot, GameSnapshot)> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Join {
            identity: identity.to_string(),
            display_name: display_name.to_string(),
            observer,
            owner,
            reply,
        })?;
        self.request(rx).await?
    }

    /// Leave the session; aborts a game in progress
    pub async fn leave(&self, identity: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Leave {
            identity: identity.to_string(),
            reply,
        })?;
        self.request(rx).await?
    }

    /// Play a move at `position`
    pub async fn make_move(&self, identity: &str, position: Position) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::MakeMove {
            identity: identity.to_string(),
            position,
            reply,
        })?;
        self.request(rx).await?
    }

    /// Broadcast a chat line to the session
    pub async fn say(&self, identity: &str, text: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Say {
            identity: identity.to_string(),
            text: text.to_string(),
            reply,
        })?;
        self.request(rx).await?
    }

    /// Redirect the slot's notification delivery to a reconnected channel
    pub fn rebind_observer(&self, identity: &str, sink: EventSink) -> Result<()> {
        self.send(SessionCommand::RebindObserver {
            identity: identity.to_string(),
            sink,
        })
    }

    /// Clear the slot's notification delivery after a channel close; the
    /// slot itself remains reserved
    pub fn observer_closed(&self, identity: &str) -> Result<()> {
        self.send(SessionCommand::ObserverClosed {
            identity: identity.to_string(),
        })
    }

    /// Read-only state snapshot
    pub async fn snapshot(&self) -> Result<GameSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply })?;
        self.request(rx).await
    }

    /// Signal the session to terminate; used by the directory for removal
    /// and drain
    pub fn terminate(&self) -> Result<()> {
        self.send(SessionCommand::Terminate)
    }
}
