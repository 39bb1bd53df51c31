use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tracing::{debug, error, info, instrument, Instrument};

use super::engine::{shift, LedgerUpdate, OnCourtRoster, StatLedger};
use crate::{
    catalog::{available_actions, ActionType},
    config::LedgerConfig,
    errors::LedgerError,
    export::{export_rows, PlayerExportRow},
    history::{HistoryEntry, HistoryStore},
    player::{NewPlayer, Player, PlayerId, PlayerPatch, PlayerRepository},
    scoring::{PerformanceScore, PerformanceScorer},
};

/// An action that was fully committed: counters, fan-out and history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedAction {
    pub player: Player,
    pub entry: HistoryEntry,
}

/// Records actions against the player store and keeps the history in step.
///
/// Clones share the same stores and write lock.
#[derive(Clone)]
pub struct LedgerService {
    players: Arc<dyn PlayerRepository>,
    history: Arc<dyn HistoryStore>,
    ledger: StatLedger,
    scorer: PerformanceScorer,
    write_lock: Arc<AsyncMutex<()>>,
}

impl LedgerService {
    pub fn builder(
        players: Arc<dyn PlayerRepository>,
        history: Arc<dyn HistoryStore>,
    ) -> LedgerServiceBuilder {
        LedgerServiceBuilder::new(players, history)
    }

    pub fn ledger(&self) -> &StatLedger {
        &self.ledger
    }

    pub fn scorer(&self) -> &PerformanceScorer {
        &self.scorer
    }

    pub(crate) fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Serializes every mutation of the ledger.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Applies an action for a player and fans the points played out to the court.
    ///
    /// Returns only once the counters and the history entry are both stored.
    /// The work runs on its own task, so dropping the returned future does not
    /// stop it between the counter write and the history append.
    #[instrument(skip(self, on_court), fields(on_court = on_court.len()))]
    pub async fn apply_action(
        &self,
        player_id: PlayerId,
        action: ActionType,
        on_court: &OnCourtRoster,
    ) -> Result<AppliedAction, LedgerError> {
        let service = self.clone();
        let on_court = on_court.clone();
        let task = tokio::spawn(
            async move { service.apply_locked(player_id, action, &on_court).await }
                .in_current_span(),
        );
        task.await.map_err(join_failed)?
    }

    async fn apply_locked(
        &self,
        player_id: PlayerId,
        action: ActionType,
        on_court: &OnCourtRoster,
    ) -> Result<AppliedAction, LedgerError> {
        let _guard = self.lock_writes().await;

        let player = self.require_player(player_id).await?;
        let update = self
            .ledger
            .apply(&player, action, on_court)
            .inspect_err(|err| error!(%err, "Rejected action outside the position's set"))?;

        let player = self.commit(update).await?;

        let entry = self
            .history
            .record(player_id, action)
            .await
            .inspect_err(|err| {
                error!(
                    %err,
                    player_id,
                    action = %action,
                    "Counters stored but history append failed; this action cannot be undone"
                )
            })?;

        info!(
            player_id,
            action = %action,
            entry_id = entry.id,
            performance = player.performance,
            "Action recorded"
        );

        Ok(AppliedAction { player, entry })
    }

    /// Stores the acting player and every fanned-out player with fresh performance.
    ///
    /// All next states are computed before the first write, so a missing
    /// on-court player aborts without touching storage.
    pub(crate) async fn commit(&self, update: LedgerUpdate) -> Result<Player, LedgerError> {
        let LedgerUpdate {
            player: mut acting,
            points_played_delta,
            fan_out,
        } = update;

        let mut others = Vec::with_capacity(fan_out.len());
        for id in fan_out {
            let mut other = self.require_player(id).await?;
            other.points_played = shift(other.points_played, points_played_delta);
            other.performance = self.scorer.score(&other).normalized;
            others.push(other);
        }
        acting.performance = self.scorer.score(&acting).normalized;

        self.players
            .update(
                acting.id,
                &PlayerPatch::new()
                    .with_counters(acting.counters)
                    .with_points_played(acting.points_played)
                    .with_performance(acting.performance),
            )
            .await?;

        for other in &others {
            self.players
                .update(
                    other.id,
                    &PlayerPatch::new()
                        .with_points_played(other.points_played)
                        .with_performance(other.performance),
                )
                .await?;
        }

        debug!(
            player_id = acting.id,
            fanned_out = others.len(),
            "Ledger update committed"
        );
        Ok(acting)
    }

    pub(crate) async fn require_player(&self, id: PlayerId) -> Result<Player, LedgerError> {
        self.players
            .get_by_id(id)
            .await?
            .ok_or(LedgerError::PlayerNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn add_player(&self, name: &str, position: &str) -> Result<Player, LedgerError> {
        let new_player = NewPlayer::parse(name, position)?;
        let _guard = self.lock_writes().await;
        let player = self.players.add(new_player).await?;
        info!(player_id = player.id, position = %player.position, "Player created");
        Ok(player)
    }

    /// Deletes a player together with every history entry pointing at them.
    #[instrument(skip(self))]
    pub async fn remove_player(&self, player_id: PlayerId) -> Result<(), LedgerError> {
        let _guard = self.lock_writes().await;
        self.players.delete(player_id).await?;
        let purged = self.history.purge_player(player_id).await?;
        info!(player_id, purged, "Player removed");
        Ok(())
    }

    /// Zeroes all statistics and clears the history so undo cannot cross the reset.
    #[instrument(skip(self))]
    pub async fn reset_all(&self) -> Result<(), LedgerError> {
        let _guard = self.lock_writes().await;
        self.players.reset_all().await?;
        self.history.clear().await?;
        info!("All player statistics reset");
        Ok(())
    }

    pub async fn get_player(&self, player_id: PlayerId) -> Result<Player, LedgerError> {
        self.require_player(player_id).await
    }

    pub async fn list_players(&self) -> Result<Vec<Player>, LedgerError> {
        self.players.list().await
    }

    /// Actions the scorer can record for this player.
    pub async fn actions_for(&self, player_id: PlayerId) -> Result<Vec<ActionType>, LedgerError> {
        let player = self.require_player(player_id).await?;
        Ok(available_actions(player.position))
    }

    pub async fn score_player(&self, player_id: PlayerId) -> Result<PerformanceScore, LedgerError> {
        let player = self.require_player(player_id).await?;
        Ok(self.scorer.score(&player))
    }

    pub async fn export(&self) -> Result<Vec<PlayerExportRow>, LedgerError> {
        let players = self.players.list().await?;
        Ok(export_rows(&players))
    }
}

/// A detached ledger task panicked or was aborted by the runtime.
pub(crate) fn join_failed(err: tokio::task::JoinError) -> LedgerError {
    error!(%err, "Ledger task did not complete");
    LedgerError::Storage(format!("ledger task failed: {err}"))
}

pub struct LedgerServiceBuilder {
    players: Arc<dyn PlayerRepository>,
    history: Arc<dyn HistoryStore>,
    ledger: StatLedger,
    scorer: PerformanceScorer,
}

impl LedgerServiceBuilder {
    fn new(players: Arc<dyn PlayerRepository>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            players,
            history,
            ledger: StatLedger::default(),
            scorer: PerformanceScorer::default(),
        }
    }

    pub fn with_config(mut self, config: &LedgerConfig) -> Self {
        self.ledger = StatLedger::new(config.points_played_policy);
        self.scorer = PerformanceScorer::new(config.include_points_played);
        self
    }

    pub fn with_ledger(mut self, ledger: StatLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_scorer(mut self, scorer: PerformanceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn build(self) -> LedgerService {
        LedgerService {
            players: self.players,
            history: self.history,
            ledger: self.ledger,
            scorer: self.scorer,
            write_lock: Arc::new(AsyncMutex::new(())),
        }
    }
}
