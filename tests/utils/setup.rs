use std::sync::Arc;

use volleystats::{
    HistoryStore, InMemoryHistoryStore, InMemoryPlayerRepository, LedgerService, OnCourtRoster,
    Player, PlayerRepository, UndoCoordinator,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub service: Arc<LedgerService>,
    pub undo: UndoCoordinator,
    pub players: InMemoryPlayerRepository,
    pub history: Arc<dyn HistoryStore>,
    pub court: Vec<Player>,
    pub bench: Vec<Player>,
    pub roster: OnCourtRoster,
}

impl TestSetup {
    #[allow(dead_code)]
    pub async fn player(&self, index: usize) -> Player {
        self.service.get_player(self.court[index].id).await.unwrap()
    }

    #[allow(dead_code)]
    pub async fn history_is_empty(&self) -> bool {
        self.history.last_global().await.unwrap().is_none()
    }

    #[allow(dead_code)]
    pub async fn snapshot(&self) -> Vec<Player> {
        self.players.list().await.unwrap()
    }
}

pub struct TestSetupBuilder {
    court: Vec<(&'static str, &'static str)>,
    bench: Vec<(&'static str, &'static str)>,
    history: Option<Arc<dyn HistoryStore>>,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            court: vec![],
            bench: vec![],
            history: None,
        }
    }

    /// Outside hitter first, then the rest of a standard six.
    pub fn with_full_court(mut self) -> Self {
        self.court = vec![
            ("Anna", "r4"),
            ("Bea", "pointu"),
            ("Chloe", "central"),
            ("Dana", "central"),
            ("Eva", "passeur"),
            ("Lea", "libero"),
        ];
        self
    }

    pub fn with_bench_player(mut self, name: &'static str, position: &'static str) -> Self {
        self.bench.push((name, position));
        self
    }

    pub fn with_history_store(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub async fn build(self) -> TestSetup {
        let players = InMemoryPlayerRepository::new();
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(InMemoryHistoryStore::new()));
        let service = Arc::new(
            LedgerService::builder(Arc::new(players.clone()), history.clone()).build(),
        );
        let undo = UndoCoordinator::new(service.clone());

        let mut court = Vec::new();
        for (name, position) in &self.court {
            court.push(service.add_player(name, position).await.unwrap());
        }
        let mut bench = Vec::new();
        for (name, position) in &self.bench {
            bench.push(service.add_player(name, position).await.unwrap());
        }

        let roster = OnCourtRoster::new(court.iter().map(|p| p.id)).unwrap();

        TestSetup {
            service,
            undo,
            players,
            history,
            court,
            bench,
            roster,
        }
    }
}
