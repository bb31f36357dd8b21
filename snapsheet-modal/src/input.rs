//! Text inputs inside the modal.

use thiserror::Error;

/// Failure reported by a host input while blurring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("input is no longer attached")]
    Detached,

    #[error("host error: {0}")]
    Host(String),
}

/// A focusable text input the modal blurs when it starts closing.
pub trait FocusableInput {
    fn is_focused(&self) -> bool;

    fn blur(&mut self) -> Result<(), InputError>;
}
