use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{HistoryEntry, HistoryId};
use crate::catalog::ActionType;
use crate::errors::LedgerError;
use crate::player::PlayerId;

/// Append-only log of applied actions. Only the newest entry is ever deleted by undo.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record(
        &self,
        player_id: PlayerId,
        action: ActionType,
    ) -> Result<HistoryEntry, LedgerError>;

    /// Most recently inserted entry across all players.
    async fn last_global(&self) -> Result<Option<HistoryEntry>, LedgerError>;

    async fn delete(&self, entry_id: HistoryId) -> Result<(), LedgerError>;

    /// Drops every entry referencing a deleted player. Returns how many were removed.
    async fn purge_player(&self, player_id: PlayerId) -> Result<u64, LedgerError>;

    async fn clear(&self) -> Result<(), LedgerError>;
}

#[derive(Debug, Default)]
struct HistoryLog {
    entries: Vec<HistoryEntry>,
    next_id: HistoryId,
}

/// In-memory implementation of HistoryStore for development and testing
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistoryStore {
    log: Arc<RwLock<HistoryLog>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.log.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.log.read().await.entries.clone()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    #[instrument(skip(self))]
    async fn record(
        &self,
        player_id: PlayerId,
        action: ActionType,
    ) -> Result<HistoryEntry, LedgerError> {
        let mut log = self.log.write().await;
        log.next_id += 1;
        let entry = HistoryEntry {
            id: log.next_id,
            player_id,
            action_type: action,
            timestamp: Utc::now(),
        };
        log.entries.push(entry.clone());

        debug!(entry_id = entry.id, "History entry recorded in memory");
        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn last_global(&self) -> Result<Option<HistoryEntry>, LedgerError> {
        let log = self.log.read().await;
        Ok(log.entries.last().cloned())
    }

    #[instrument(skip(self))]
    async fn delete(&self, entry_id: HistoryId) -> Result<(), LedgerError> {
        let mut log = self.log.write().await;
        let Some(index) = log.entries.iter().position(|e| e.id == entry_id) else {
            warn!(entry_id, "History entry not found for deletion in memory");
            return Err(LedgerError::HistoryEntryNotFound(entry_id));
        };
        log.entries.remove(index);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_player(&self, player_id: PlayerId) -> Result<u64, LedgerError> {
        let mut log = self.log.write().await;
        let before = log.entries.len();
        log.entries.retain(|e| e.player_id != player_id);
        Ok((before - log.entries.len()) as u64)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), LedgerError> {
        let mut log = self.log.write().await;
        log.entries.clear();
        Ok(())
    }
}

/// PostgreSQL implementation of history store
pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the stat_history table when it does not exist yet. Needs the players table.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), LedgerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS stat_history (
                id BIGSERIAL PRIMARY KEY,
                player_id BIGINT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                stat_type TEXT NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create stat_history table");
            LedgerError::from(e)
        })?;
        Ok(())
    }
}

fn entry_from_row(row: &sqlx::postgres::PgRow) -> Result<HistoryEntry, LedgerError> {
    let stat_type: String = row.try_get("stat_type")?;
    let action_type = stat_type
        .parse::<ActionType>()
        .map_err(|_| LedgerError::Storage(format!("unknown stat type {stat_type}")))?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;

    Ok(HistoryEntry {
        id: row.try_get("id")?,
        player_id: row.try_get("player_id")?,
        action_type,
        timestamp,
    })
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    #[instrument(skip(self))]
    async fn record(
        &self,
        player_id: PlayerId,
        action: ActionType,
    ) -> Result<HistoryEntry, LedgerError> {
        let row = sqlx::query(
            "INSERT INTO stat_history (player_id, stat_type) VALUES ($1, $2)
             RETURNING id, player_id, stat_type, timestamp",
        )
        .bind(player_id)
        .bind(action.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, player_id, "Failed to record history entry");
            LedgerError::from(e)
        })?;

        entry_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn last_global(&self) -> Result<Option<HistoryEntry>, LedgerError> {
        // Timestamps can tie within a rally; the serial id cannot.
        let row = sqlx::query(
            "SELECT id, player_id, stat_type, timestamp FROM stat_history
             ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, entry_id: HistoryId) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM stat_history WHERE id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!(entry_id, "History entry not found for deletion");
            return Err(LedgerError::HistoryEntryNotFound(entry_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_player(&self, player_id: PlayerId) -> Result<u64, LedgerError> {
        let result = sqlx::query("DELETE FROM stat_history WHERE player_id = $1")
            .bind(player_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM stat_history")
            .execute(&self.pool)
            .await?;
        info!(entries = result.rows_affected(), "History cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_global_tracks_newest_entry_across_players() {
        let store = InMemoryHistoryStore::new();
        assert!(store.last_global().await.unwrap().is_none());

        let first = store.record(1, ActionType::AttackPoint).await.unwrap();
        let second = store.record(2, ActionType::ServiceFail).await.unwrap();
        assert!(second.id > first.id);

        let last = store.last_global().await.unwrap().unwrap();
        assert_eq!(last, second);

        store.delete(second.id).await.unwrap();
        assert_eq!(store.last_global().await.unwrap().unwrap(), first);
    }

    #[tokio::test]
    async fn deleting_missing_entry_is_not_found() {
        let store = InMemoryHistoryStore::new();
        let entry = store.record(1, ActionType::Faults).await.unwrap();
        store.delete(entry.id).await.unwrap();

        let again = store.delete(entry.id).await;
        assert!(matches!(again, Err(LedgerError::HistoryEntryNotFound(id)) if id == entry.id));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_deletion() {
        let store = InMemoryHistoryStore::new();
        let first = store.record(1, ActionType::BlockFail).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.record(1, ActionType::BlockFail).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn purge_removes_only_that_players_entries() {
        let store = InMemoryHistoryStore::new();
        store.record(1, ActionType::AttackFail).await.unwrap();
        store.record(2, ActionType::AttackFail).await.unwrap();
        store.record(1, ActionType::Faults).await.unwrap();

        assert_eq!(store.purge_player(1).await.unwrap(), 2);
        let remaining = store.entries().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].player_id, 2);

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }
}
