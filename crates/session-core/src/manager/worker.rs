//! Session directory worker task

use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::api::config::DirectoryConfig;
use crate::api::types::{CreateSessionParams, SessionId};
use crate::bot;
use crate::errors::{Result, SessionError};
use crate::session::{spawn_session, SessionClient};

/// Directory counters for tests and ops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStats {
    pub live_sessions: usize,
    pub total_created: u64,
    pub total_terminated: u64,
    pub shutting_down: bool,
}

enum DirectoryCommand {
    Create {
        id: SessionId,
        params: CreateSessionParams,
        reply: oneshot::Sender<Result<SessionClient>>,
    },
    Remove {
        id: SessionId,
        reply: oneshot::Sender<Result<()>>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<DirectoryStats>,
    },
    /// Reported by the per-child monitor task when a session task finishes;
    /// the epoch ties the notice to one spawn, so a stale notice for a
    /// reused id never evicts its successor
    ChildTerminated { id: SessionId, epoch: u64 },
}

/// Handle to the directory worker; cheap to clone
#[derive(Clone)]
pub struct DirectoryClient {
    tx: mpsc::UnboundedSender<DirectoryCommand>,
}

impl DirectoryClient {
    /// Create a session for `id`
    ///
    /// Fails with `DuplicateSession` on id collision and `ShuttingDown`
    /// while draining.
    pub async fn create_session(
        &self,
        id: SessionId,
        params: CreateSessionParams,
    ) -> Result<SessionClient> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(DirectoryCommand::Create { id, params, reply })
            .map_err(|_| SessionError::ShuttingDown)?;
        rx.await.map_err(|_| SessionError::ShuttingDown)?
    }

    /// Remove a session; idempotent, unknown ids are a no-op success
    pub async fn remove_session(&self, id: SessionId) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(DirectoryCommand::Remove { id, reply })
            .is_err()
        {
            // Worker already drained; nothing left to remove
            return Ok(());
        }
        rx.await.unwrap_or(Ok(()))
    }

    /// Drain all live sessions and stop the worker; resolves once the last
    /// child has reported termination. Idempotent.
    pub async fn shutdown(&self) -> Result<()> {
        let (done, rx) = oneshot::channel();
        if self.tx.send(DirectoryCommand::Shutdown { done }).is_err() {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }

    /// Current directory counters
    pub async fn stats(&self) -> Result<DirectoryStats> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(DirectoryCommand::Stats { reply })
            .map_err(|_| SessionError::ShuttingDown)?;
        rx.await.map_err(|_| SessionError::ShuttingDown)
    }
}

/// Directory entry point
pub struct SessionDirectory;

impl SessionDirectory {
    /// Start the worker task and return its client handle
    pub fn start(config: DirectoryConfig) -> DirectoryClient {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = DirectoryWorker {
            config,
            sessions: HashMap::new(),
            live_sessions: 0,
            total_created: 0,
            total_terminated: 0,
            shutting_down: false,
            shutdown_acks: Vec::new(),
            next_epoch: 0,
            self_tx: tx.clone(),
        };
        tokio::spawn(worker.run(rx));
        DirectoryClient { tx }
    }
}

/// Entry in the local session table
struct SessionHandle {
    client: SessionClient,
    created_at: Instant,
    epoch: u64,
}

/// Worker state, mutated only by the worker task itself
struct DirectoryWorker {
    config: DirectoryConfig,
    sessions: HashMap<SessionId, SessionHandle>,
    live_sessions: usize,
    total_created: u64,
    total_terminated: u64,
    shutting_down: bool,
    /// Pending shutdown callers, acked once the drain completes
    shutdown_acks: Vec<oneshot::Sender<()>>,
    next_epoch: u64,
    self_tx: mpsc::UnboundedSender<DirectoryCommand>,
}

impl DirectoryWorker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DirectoryCommand>) {
        info!("Session directory started on {}", self.config.node_name);
        while let Some(command) = rx.recv().await {
            self.handle_command(command);
            if self.shutting_down && self.live_sessions == 0 {
                break;
            }
        }
        for ack in self.shutdown_acks.drain(..) {
            let _ = ack.send(());
        }
        info!(
            "Session directory on {} drained ({} sessions served)",
            self.config.node_name, self.total_created
        );
    }

    fn handle_command(&mut self, command: DirectoryCommand) {
        match command {
            DirectoryCommand::Create { id, params, reply } => {
                let _ = reply.send(self.create_session(id, params));
            }
            DirectoryCommand::Remove { id, reply } => {
                self.remove_session(id);
                let _ = reply.send(Ok(()));
            }
            DirectoryCommand::Shutdown { done } => self.begin_shutdown(done),
            DirectoryCommand::Stats { reply } => {
                let _ = reply.send(DirectoryStats {
                    live_sessions: self.live_sessions,
                    total_created: self.total_created,
                    total_terminated: self.total_terminated,
                    shutting_down: self.shutting_down,
                });
            }
            DirectoryCommand::ChildTerminated { id, epoch } => self.child_terminated(id, epoch),
        }
    }

    fn create_session(
        &mut self,
        id: SessionId,
        params: CreateSessionParams,
    ) -> Result<SessionClient> {
        if self.shutting_down {
            return Err(SessionError::ShuttingDown);
        }
        if self.sessions.contains_key(&id) {
            // An optimistically removed predecessor may still be terminating
            // under the same id; fail loudly rather than overwrite
            warn!("Create for {} collided with a live entry", id);
            return Err(SessionError::DuplicateSession(id));
        }

        let config = params.config.unwrap_or_else(|| self.config.session.clone());
        config
            .validate()
            .map_err(SessionError::CreationFailed)?;

        let (client, task) = spawn_session(id, config);
        let epoch = self.next_epoch;
        self.next_epoch += 1;

        // Supervision: report child termination back through our own mailbox
        let monitor_tx = self.self_tx.clone();
        tokio::spawn(async move {
            let _ = task.await;
            let _ = monitor_tx.send(DirectoryCommand::ChildTerminated { id, epoch });
        });

        // Counted only after the spawn is confirmed
        self.sessions.insert(
            id,
            SessionHandle {
                client: client.clone(),
                created_at: Instant::now(),
                epoch,
            },
        );
        self.live_sessions += 1;
        self.total_created += 1;
        info!(
            "Created {} ({} live on {})",
            id, self.live_sessions, self.config.node_name
        );

        if params.automated_opponent {
            bot::spawn_bot(client.clone());
        }

        Ok(client)
    }

    fn remove_session(&mut self, id: SessionId) {
        match self.sessions.remove(&id) {
            Some(handle) => {
                // Entry is dropped immediately; the live count follows once
                // the monitor reports actual termination
                debug!(
                    "Removing {} after {:?}",
                    id,
                    handle.created_at.elapsed()
                );
                let _ = handle.client.terminate();
            }
            None => debug!("Remove for unknown {} is a no-op", id),
        }
    }

    fn begin_shutdown(&mut self, done: oneshot::Sender<()>) {
        if !self.shutting_down {
            self.shutting_down = true;
            if self.live_sessions > 0 {
                info!(
                    "Directory shutdown: draining {} live sessions",
                    self.live_sessions
                );
                for handle in self.sessions.values() {
                    let _ = handle.client.terminate();
                }
            }
        }
        self.shutdown_acks.push(done);
    }

    fn child_terminated(&mut self, id: SessionId, epoch: u64) {
        // The table entry may already belong to a later session reusing the id
        if self.sessions.get(&id).is_some_and(|h| h.epoch == epoch) {
            self.sessions.remove(&id);
        }
        self.live_sessions = self.live_sessions.saturating_sub(1);
        self.total_terminated += 1;
        debug!("{} terminated ({} live)", id, self.live_sessions);
    }
}
