use thiserror::Error;

use crate::catalog::ActionType;
use crate::history::HistoryId;
use crate::player::{PlayerId, Position};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Action {action} is not available for position {position}")]
    InvalidAction {
        action: ActionType,
        position: Position,
    },

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("History entry {0} not found")]
    HistoryEntryNotFound(HistoryId),

    #[error("Unsupported position: {0}")]
    UnsupportedPosition(String),

    #[error("Invalid player: {0}")]
    InvalidPlayer(String),

    #[error("Invalid on-court roster: {0}")]
    InvalidRoster(String),

    #[error("An undo is already in progress")]
    UndoInFlight,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::PlayerNotFound(_) | LedgerError::HistoryEntryNotFound(_)
        )
    }

    /// Message shown to the scorer. Programming errors collapse into a generic failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            LedgerError::PlayerNotFound(_) => "Player not found",
            LedgerError::HistoryEntryNotFound(_) => "Nothing to undo",
            LedgerError::UnsupportedPosition(_) => "Player position is not supported",
            LedgerError::InvalidPlayer(_) => "Player data is invalid",
            LedgerError::InvalidRoster(_) => "On-court selection is invalid",
            LedgerError::UndoInFlight => "An undo is already in progress",
            LedgerError::Storage(_) => "Failed to save statistics",
            LedgerError::Export(_) => "Failed to export statistics",
            LedgerError::InvalidAction { .. } => "Failed to update statistics",
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Export(err.to_string())
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}
