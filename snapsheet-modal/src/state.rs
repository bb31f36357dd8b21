use std::fmt;
use std::str::FromStr;

use crate::modal::ModalError;

/// Where a modal rests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Middle,
    Opened,
}

impl ModalState {
    /// Snap index of this state. Without a middle point `Middle` has no
    /// index of its own and maps to `Opened`.
    pub fn index(self, has_middle: bool) -> usize {
        match (self, has_middle) {
            (ModalState::Closed, _) => 0,
            (ModalState::Middle, true) => 1,
            (ModalState::Middle, false) | (ModalState::Opened, false) => 1,
            (ModalState::Opened, true) => 2,
        }
    }

    /// State resting at snap index `index`.
    pub fn from_index(index: usize, has_middle: bool) -> Self {
        match (index, has_middle) {
            (0, _) => ModalState::Closed,
            (1, true) => ModalState::Middle,
            _ => ModalState::Opened,
        }
    }
}

impl fmt::Display for ModalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModalState::Closed => "closed",
            ModalState::Middle => "middle",
            ModalState::Opened => "opened",
        };
        f.write_str(name)
    }
}

impl FromStr for ModalState {
    type Err = ModalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closed" => Ok(ModalState::Closed),
            "middle" => Ok(ModalState::Middle),
            "opened" => Ok(ModalState::Opened),
            other => Err(ModalError::UnknownState(other.to_string())),
        }
    }
}
