//! Handles for snap requests that may resolve later.

use snapsheet::IntentToken;
use tokio::sync::oneshot;

use crate::state::ModalState;

/// How a snap request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapOutcome {
    /// The sheet started moving toward this state.
    Applied(ModalState),
    /// A newer request for the same state replaced this one before it ran.
    Superseded,
    /// The modal was dropped before the request ran.
    Dropped,
}

/// A pending or resolved snap request.
///
/// Requests made before the modal is measured wait for the measurement.
/// Await [`outcome`](Self::outcome) to learn what happened.
#[derive(Debug)]
pub struct SnapTicket {
    token: IntentToken,
    outcome: oneshot::Receiver<SnapOutcome>,
}

impl SnapTicket {
    pub(crate) fn new(token: IntentToken, outcome: oneshot::Receiver<SnapOutcome>) -> Self {
        Self { token, outcome }
    }

    pub fn token(&self) -> IntentToken {
        self.token
    }

    pub async fn outcome(self) -> SnapOutcome {
        self.outcome.await.unwrap_or(SnapOutcome::Dropped)
    }

    /// Outcome if already known.
    pub fn try_outcome(&mut self) -> Option<SnapOutcome> {
        match self.outcome.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(SnapOutcome::Dropped),
        }
    }
}
