use crate::model::Night;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    InvalidRange { start: Night, end: Night },
    InvalidPrice(String),
    /// Another modal (price prompt or confirmation) is already open.
    ModalOpen,
    /// `commit_single` needs exactly one pending cell.
    PendingMismatch { expected: usize, found: usize },
    NothingPending,
    NoPricePrompt,
    NothingToConfirm,
    LimitExceeded(&'static str),
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::InvalidRange { start, end } => {
                write!(f, "invalid range: end {end} must be after start {start}")
            }
            GridError::InvalidPrice(input) => write!(f, "invalid price: {input:?}"),
            GridError::ModalOpen => write!(f, "another prompt is already open"),
            GridError::PendingMismatch { expected, found } => {
                write!(f, "expected {expected} pending cell(s), found {found}")
            }
            GridError::NothingPending => write!(f, "no pending cells"),
            GridError::NoPricePrompt => write!(f, "no price prompt is open"),
            GridError::NothingToConfirm => write!(f, "no destructive action awaiting confirmation"),
            GridError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for GridError {}
