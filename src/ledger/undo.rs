use std::sync::{Arc, Mutex};

use tracing::{error, info, instrument, warn, Instrument};

use super::engine::OnCourtRoster;
use super::service::{join_failed, LedgerService};
use crate::errors::LedgerError;
use crate::history::HistoryEntry;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoState {
    #[default]
    Idle,
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// The newest action was reversed and its history entry removed.
    Reverted { entry: HistoryEntry, player: Player },
    /// History is empty.
    NothingToUndo,
}

/// Single-level undo of the most recent action across all players.
///
/// Only one undo runs at a time; a second request while one is in flight is
/// rejected with [`LedgerError::UndoInFlight`].
pub struct UndoCoordinator {
    service: Arc<LedgerService>,
    state: Arc<Mutex<UndoState>>,
}

/// Returns the coordinator to Idle however the undo ends.
struct FlightGuard {
    state: Arc<Mutex<UndoState>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = UndoState::Idle;
    }
}

impl UndoCoordinator {
    pub fn new(service: Arc<LedgerService>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(UndoState::Idle)),
        }
    }

    pub fn state(&self) -> UndoState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<FlightGuard, LedgerError> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *state == UndoState::InFlight {
            warn!("Undo requested while another undo is running");
            return Err(LedgerError::UndoInFlight);
        }
        *state = UndoState::InFlight;
        Ok(FlightGuard {
            state: self.state.clone(),
        })
    }

    /// Reverses the newest history entry for the given on-court roster.
    ///
    /// The undo runs to completion on its own task and the coordinator stays
    /// in flight until it does, even if the caller stops waiting.
    #[instrument(skip(self, on_court), fields(on_court = on_court.len()))]
    pub async fn undo_last(&self, on_court: &OnCourtRoster) -> Result<UndoOutcome, LedgerError> {
        let flight = self.begin()?;
        let service = self.service.clone();
        let on_court = on_court.clone();
        let task = tokio::spawn(
            async move {
                let _flight = flight;
                revert_newest(&service, &on_court).await
            }
            .in_current_span(),
        );
        task.await.map_err(join_failed)?
    }
}

async fn revert_newest(
    service: &LedgerService,
    on_court: &OnCourtRoster,
) -> Result<UndoOutcome, LedgerError> {
    let _guard = service.lock_writes().await;

    let Some(entry) = service.history().last_global().await? else {
        info!("Nothing to undo");
        return Ok(UndoOutcome::NothingToUndo);
    };

    let player = service.require_player(entry.player_id).await?;
    let update = service
        .ledger()
        .reverse(&player, entry.action_type, on_court);
    let player = service.commit(update).await?;

    match service.history().delete(entry.id).await {
        Ok(()) => {}
        Err(LedgerError::HistoryEntryNotFound(id)) => {
            warn!(entry_id = id, "History entry already removed");
        }
        Err(err) => {
            error!(
                %err,
                entry_id = entry.id,
                player_id = entry.player_id,
                "Counters reversed but history entry still present"
            );
            return Err(err);
        }
    }

    info!(
        entry_id = entry.id,
        player_id = entry.player_id,
        action = %entry.action_type,
        "Action undone"
    );
    Ok(UndoOutcome::Reverted { entry, player })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionType;
    use crate::history::{HistoryStore, InMemoryHistoryStore};
    use crate::player::InMemoryPlayerRepository;

    fn coordinator() -> (Arc<LedgerService>, UndoCoordinator) {
        let service = Arc::new(
            LedgerService::builder(
                Arc::new(InMemoryPlayerRepository::new()),
                Arc::new(InMemoryHistoryStore::new()),
            )
            .build(),
        );
        let undo = UndoCoordinator::new(service.clone());
        (service, undo)
    }

    #[tokio::test]
    async fn empty_history_is_nothing_to_undo() {
        let (_, undo) = coordinator();
        let outcome = undo.undo_last(&OnCourtRoster::empty()).await.unwrap();
        assert_eq!(outcome, UndoOutcome::NothingToUndo);
        assert_eq!(undo.state(), UndoState::Idle);
    }

    #[tokio::test]
    async fn second_request_while_in_flight_is_rejected() {
        let (_, undo) = coordinator();
        let flight = undo.begin().unwrap();
        assert_eq!(undo.state(), UndoState::InFlight);

        let result = undo.undo_last(&OnCourtRoster::empty()).await;
        assert!(matches!(result, Err(LedgerError::UndoInFlight)));

        drop(flight);
        assert_eq!(undo.state(), UndoState::Idle);
    }

    #[tokio::test]
    async fn undo_reverts_newest_action_only() {
        let (service, undo) = coordinator();
        let a = service.add_player("Anna", "r4").await.unwrap();
        let b = service.add_player("Bea", "central").await.unwrap();
        let court = OnCourtRoster::new([a.id, b.id]).unwrap();

        service
            .apply_action(a.id, ActionType::AttackPoint, &court)
            .await
            .unwrap();
        let after_first_a = service.get_player(a.id).await.unwrap();
        let after_first_b = service.get_player(b.id).await.unwrap();
        service
            .apply_action(b.id, ActionType::BlockFail, &court)
            .await
            .unwrap();

        let outcome = undo.undo_last(&court).await.unwrap();
        let UndoOutcome::Reverted { entry, player } = outcome else {
            panic!("expected a reverted action");
        };
        assert_eq!(entry.action_type, ActionType::BlockFail);
        assert_eq!(player, after_first_b);
        assert_eq!(service.get_player(a.id).await.unwrap(), after_first_a);
    }

    #[tokio::test]
    async fn missing_player_fails_and_returns_to_idle() {
        let players = Arc::new(InMemoryPlayerRepository::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let service = Arc::new(LedgerService::builder(players, history.clone()).build());
        let undo = UndoCoordinator::new(service);

        history.record(77, ActionType::Faults).await.unwrap();

        let result = undo.undo_last(&OnCourtRoster::empty()).await;
        assert!(matches!(result, Err(LedgerError::PlayerNotFound(77))));
        assert_eq!(undo.state(), UndoState::Idle);
        // entry stays so the inconsistency is visible
        assert_eq!(history.len().await, 1);
    }
}
