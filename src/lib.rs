// Statistics ledger and performance scoring for live volleyball scoring.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod export;
pub mod history;
pub mod ledger;
pub mod player;
pub mod scoring;
pub mod telemetry;

// Re-export commonly used types for easier access in tests
pub use catalog::{ActionType, PointsPlayedPolicy};
pub use config::LedgerConfig;
pub use errors::LedgerError;
pub use history::{HistoryEntry, HistoryStore, InMemoryHistoryStore};
pub use ledger::{LedgerService, OnCourtRoster, StatLedger, UndoCoordinator, UndoOutcome};
pub use player::{InMemoryPlayerRepository, Player, PlayerId, PlayerRepository, Position};
pub use scoring::{PerformanceScore, PerformanceScorer};
