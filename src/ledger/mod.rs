pub mod engine;
pub mod service;
pub mod undo;

pub use engine::{LedgerUpdate, OnCourtRoster, StatLedger, ON_COURT_SIZE};
pub use service::{AppliedAction, LedgerService, LedgerServiceBuilder};
pub use undo::{UndoCoordinator, UndoOutcome, UndoState};
