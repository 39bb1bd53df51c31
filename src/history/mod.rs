pub mod models;
pub mod repository;

pub use models::{HistoryEntry, HistoryId};
pub use repository::{HistoryStore, InMemoryHistoryStore, PostgresHistoryStore};
