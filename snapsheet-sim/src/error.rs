use snapsheet::SheetError;
use snapsheet_modal::ModalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Modal(#[from] ModalError),

    #[error("{0}")]
    Usage(String),
}
