pub mod input;
pub mod modal;
pub mod options;
pub mod state;
pub mod ticket;

pub use input::{FocusableInput, InputError};
pub use modal::{ModalError, ModalEvent, SnapSheetModal};
pub use options::ModalOptions;
pub use state::ModalState;
pub use ticket::{SnapOutcome, SnapTicket};
