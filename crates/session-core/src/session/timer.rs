//! Turn-indexed move deadline

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::client::SessionCommand;
use crate::api::config::SessionConfig;

/// One-shot deadline for a single turn
///
/// Fires a `TurnTimeout` back through the session's own mailbox. Cancellation
/// is best-effort task abort; a firing already in the mailbox is filtered by
/// the guarded turn index on the receiving side.
pub(crate) struct TurnTimer {
    handle: JoinHandle<()>,
}

impl TurnTimer {
    /// Arm a timer for the turn with index `guarded_turn`
    pub fn arm(
        session_tx: &mpsc::UnboundedSender<SessionCommand>,
        config: &SessionConfig,
        guarded_turn: usize,
    ) -> Self {
        let tx = session_tx.clone();
        let timeout = config.turn_timeout;
        let handle = tokio::spawn(async move {
            sleep(timeout).await;
            // Send failure just means the session task is already gone
            let _ = tx.send(SessionCommand::TurnTimeout { guarded_turn });
        });
        Self { handle }
    }

    /// Best-effort cancel
    pub fn cancel(self) {
        self.handle.abort();
    }
}
