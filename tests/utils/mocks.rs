use std::time::Duration;

use async_trait::async_trait;

use volleystats::{
    history::HistoryId, ActionType, HistoryEntry, HistoryStore, InMemoryHistoryStore, LedgerError,
    PlayerId,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum FailureMode {
    Record,
    Delete,
    /// Removes the entry, then reports it as already gone.
    DeleteRaced,
}

/// History store that delegates to memory but fails one kind of call.
#[derive(Clone)]
pub struct FailingHistoryStore {
    inner: InMemoryHistoryStore,
    mode: FailureMode,
}

#[allow(dead_code)]
impl FailingHistoryStore {
    pub fn new(mode: FailureMode) -> Self {
        Self {
            inner: InMemoryHistoryStore::new(),
            mode,
        }
    }

    pub fn inner(&self) -> &InMemoryHistoryStore {
        &self.inner
    }
}

#[async_trait]
impl HistoryStore for FailingHistoryStore {
    async fn record(
        &self,
        player_id: PlayerId,
        action: ActionType,
    ) -> Result<HistoryEntry, LedgerError> {
        if self.mode == FailureMode::Record {
            return Err(LedgerError::Storage("history table locked".to_string()));
        }
        self.inner.record(player_id, action).await
    }

    async fn last_global(&self) -> Result<Option<HistoryEntry>, LedgerError> {
        self.inner.last_global().await
    }

    async fn delete(&self, entry_id: HistoryId) -> Result<(), LedgerError> {
        match self.mode {
            FailureMode::Delete => Err(LedgerError::Storage("history table locked".to_string())),
            FailureMode::DeleteRaced => {
                self.inner.delete(entry_id).await?;
                Err(LedgerError::HistoryEntryNotFound(entry_id))
            }
            FailureMode::Record => self.inner.delete(entry_id).await,
        }
    }

    async fn purge_player(&self, player_id: PlayerId) -> Result<u64, LedgerError> {
        self.inner.purge_player(player_id).await
    }

    async fn clear(&self) -> Result<(), LedgerError> {
        self.inner.clear().await
    }
}

/// History store whose appends take a while to land.
#[derive(Clone)]
pub struct SlowHistoryStore {
    inner: InMemoryHistoryStore,
    delay: Duration,
}

#[allow(dead_code)]
impl SlowHistoryStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryHistoryStore::new(),
            delay,
        }
    }

    pub fn inner(&self) -> &InMemoryHistoryStore {
        &self.inner
    }
}

#[async_trait]
impl HistoryStore for SlowHistoryStore {
    async fn record(
        &self,
        player_id: PlayerId,
        action: ActionType,
    ) -> Result<HistoryEntry, LedgerError> {
        tokio::time::sleep(self.delay).await;
        self.inner.record(player_id, action).await
    }

    async fn last_global(&self) -> Result<Option<HistoryEntry>, LedgerError> {
        self.inner.last_global().await
    }

    async fn delete(&self, entry_id: HistoryId) -> Result<(), LedgerError> {
        self.inner.delete(entry_id).await
    }

    async fn purge_player(&self, player_id: PlayerId) -> Result<u64, LedgerError> {
        self.inner.purge_player(player_id).await
    }

    async fn clear(&self) -> Result<(), LedgerError> {
        self.inner.clear().await
    }
}
