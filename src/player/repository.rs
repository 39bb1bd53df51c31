use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{CategoryCounters, NewPlayer, Player, PlayerCounters, PlayerId, PlayerPatch};
use crate::errors::LedgerError;

/// Storage for player rows.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Player>, LedgerError>;
    async fn get_by_id(&self, id: PlayerId) -> Result<Option<Player>, LedgerError>;
    async fn update(&self, id: PlayerId, patch: &PlayerPatch) -> Result<(), LedgerError>;
    async fn add(&self, player: NewPlayer) -> Result<Player, LedgerError>;
    async fn delete(&self, id: PlayerId) -> Result<(), LedgerError>;

    /// Zeroes every counter and performance score for every player.
    async fn reset_all(&self) -> Result<(), LedgerError>;
}

#[derive(Debug, Default)]
struct PlayerTable {
    rows: BTreeMap<PlayerId, Player>,
    next_id: PlayerId,
}

/// In-memory implementation of PlayerRepository for development and testing
#[derive(Debug, Default, Clone)]
pub struct InMemoryPlayerRepository {
    table: Arc<RwLock<PlayerTable>>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn player_count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Player>, LedgerError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: PlayerId) -> Result<Option<Player>, LedgerError> {
        let table = self.table.read().await;
        let player = table.rows.get(&id).cloned();
        if player.is_none() {
            debug!(player_id = id, "Player not found in memory");
        }
        Ok(player)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: PlayerId, patch: &PlayerPatch) -> Result<(), LedgerError> {
        let mut table = self.table.write().await;
        let Some(player) = table.rows.get_mut(&id) else {
            warn!(player_id = id, "Player not found for update in memory");
            return Err(LedgerError::PlayerNotFound(id));
        };
        patch.apply_to(player);
        debug!(player_id = id, "Player updated in memory");
        Ok(())
    }

    #[instrument(skip(self, player), fields(name = %player.name()))]
    async fn add(&self, player: NewPlayer) -> Result<Player, LedgerError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let created = Player::new(table.next_id, player);
        table.rows.insert(created.id, created.clone());

        debug!(player_id = created.id, "Player created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: PlayerId) -> Result<(), LedgerError> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_none() {
            warn!(player_id = id, "Player not found for deletion in memory");
            return Err(LedgerError::PlayerNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_all(&self) -> Result<(), LedgerError> {
        let mut table = self.table.write().await;
        for player in table.rows.values_mut() {
            player.reset_stats();
        }
        info!(players = table.rows.len(), "Player statistics reset in memory");
        Ok(())
    }
}

const PLAYER_COLUMNS: &str = "id, name, position, \
    attacks, attack_success, attack_point, \
    services, service_success, service_point, \
    receptions, reception_success, reception_point, \
    blocks, block_success, block_point, \
    passes_fail, faults, points_played, performance";

/// PostgreSQL implementation of player repository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the players table when it does not exist yet.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), LedgerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS players (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                position TEXT NOT NULL,
                attacks BIGINT NOT NULL DEFAULT 0,
                attack_success BIGINT NOT NULL DEFAULT 0,
                attack_point BIGINT NOT NULL DEFAULT 0,
                services BIGINT NOT NULL DEFAULT 0,
                service_success BIGINT NOT NULL DEFAULT 0,
                service_point BIGINT NOT NULL DEFAULT 0,
                receptions BIGINT NOT NULL DEFAULT 0,
                reception_success BIGINT NOT NULL DEFAULT 0,
                reception_point BIGINT NOT NULL DEFAULT 0,
                blocks BIGINT NOT NULL DEFAULT 0,
                block_success BIGINT NOT NULL DEFAULT 0,
                block_point BIGINT NOT NULL DEFAULT 0,
                passes_fail BIGINT NOT NULL DEFAULT 0,
                faults BIGINT NOT NULL DEFAULT 0,
                points_played BIGINT NOT NULL DEFAULT 0,
                performance DOUBLE PRECISION NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create players table");
            LedgerError::from(e)
        })?;
        Ok(())
    }
}

fn counter(row: &PgRow, column: &str) -> Result<u32, LedgerError> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| LedgerError::InvalidPlayer(format!("column {column} holds {value}")))
}

fn category(
    row: &PgRow,
    total: &str,
    success: &str,
    point: &str,
) -> Result<CategoryCounters, LedgerError> {
    CategoryCounters::new(
        counter(row, total)?,
        counter(row, success)?,
        counter(row, point)?,
    )
}

fn player_from_row(row: &PgRow) -> Result<Player, LedgerError> {
    let position: String = row.try_get("position")?;
    Ok(Player {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        position: position.parse()?,
        counters: PlayerCounters {
            attack: category(row, "attacks", "attack_success", "attack_point")?,
            service: category(row, "services", "service_success", "service_point")?,
            reception: category(row, "receptions", "reception_success", "reception_point")?,
            block: category(row, "blocks", "block_success", "block_point")?,
            passes_fail: counter(row, "passes_fail")?,
            faults: counter(row, "faults")?,
        },
        points_played: counter(row, "points_played")?,
        performance: row.try_get("performance")?,
    })
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Player>, LedgerError> {
        let rows = sqlx::query(&format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list players from database");
                LedgerError::from(e)
            })?;

        rows.iter().map(player_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: PlayerId) -> Result<Option<Player>, LedgerError> {
        let row = sqlx::query(&format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, player_id = id, "Failed to fetch player from database");
                LedgerError::from(e)
            })?;

        row.as_ref().map(player_from_row).transpose()
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: PlayerId, patch: &PlayerPatch) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            warn!(player_id = id, "Player not found for update");
            return Err(LedgerError::PlayerNotFound(id));
        };
        let mut player = player_from_row(&row)?;
        patch.apply_to(&mut player);

        let c = &player.counters;
        sqlx::query(
            "UPDATE players SET name = $2, position = $3,
                attacks = $4, attack_success = $5, attack_point = $6,
                services = $7, service_success = $8, service_point = $9,
                receptions = $10, reception_success = $11, reception_point = $12,
                blocks = $13, block_success = $14, block_point = $15,
                passes_fail = $16, faults = $17, points_played = $18, performance = $19
             WHERE id = $1",
        )
        .bind(id)
        .bind(&player.name)
        .bind(player.position.label())
        .bind(i64::from(c.attack.total()))
        .bind(i64::from(c.attack.success()))
        .bind(i64::from(c.attack.point()))
        .bind(i64::from(c.service.total()))
        .bind(i64::from(c.service.success()))
        .bind(i64::from(c.service.point()))
        .bind(i64::from(c.reception.total()))
        .bind(i64::from(c.reception.success()))
        .bind(i64::from(c.reception.point()))
        .bind(i64::from(c.block.total()))
        .bind(i64::from(c.block.success()))
        .bind(i64::from(c.block.point()))
        .bind(i64::from(c.passes_fail))
        .bind(i64::from(c.faults))
        .bind(i64::from(player.points_played))
        .bind(player.performance)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, player_id = id, "Failed to update player in database");
            LedgerError::from(e)
        })?;

        tx.commit().await?;
        debug!(player_id = id, "Player updated in database");
        Ok(())
    }

    #[instrument(skip(self, player), fields(name = %player.name()))]
    async fn add(&self, player: NewPlayer) -> Result<Player, LedgerError> {
        let id: PlayerId =
            sqlx::query_scalar("INSERT INTO players (name, position) VALUES ($1, $2) RETURNING id")
                .bind(player.name())
                .bind(player.position().label())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to create player in database");
                    LedgerError::from(e)
                })?;

        debug!(player_id = id, "Player created in database");
        Ok(Player::new(id, player))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: PlayerId) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!(player_id = id, "Player not found for deletion");
            return Err(LedgerError::PlayerNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_all(&self) -> Result<(), LedgerError> {
        let result = sqlx::query(
            "UPDATE players SET
                attacks = 0, attack_success = 0, attack_point = 0,
                services = 0, service_success = 0, service_point = 0,
                receptions = 0, reception_success = 0, reception_point = 0,
                blocks = 0, block_success = 0, block_point = 0,
                passes_fail = 0, faults = 0, points_played = 0, performance = 0",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to reset player statistics");
            LedgerError::from(e)
        })?;

        info!(players = result.rows_affected(), "Player statistics reset in database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;

    async fn seeded(repo: &InMemoryPlayerRepository, name: &str, position: Position) -> Player {
        repo.add(NewPlayer::new(name, position).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn assigns_increasing_ids_that_are_never_reused() {
        let repo = InMemoryPlayerRepository::new();
        let first = seeded(&repo, "Anna", Position::Libero).await;
        let second = seeded(&repo, "Bea", Position::Central).await;
        assert!(second.id > first.id);

        repo.delete(second.id).await.unwrap();
        let third = seeded(&repo, "Chloe", Position::Setter).await;
        assert!(third.id > second.id);
        assert_eq!(repo.player_count().await, 2);
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let repo = InMemoryPlayerRepository::new();
        let player = seeded(&repo, "Anna", Position::OutsideHitter).await;

        repo.update(player.id, &PlayerPatch::new().with_performance(6.5))
            .await
            .unwrap();

        let stored = repo.get_by_id(player.id).await.unwrap().unwrap();
        assert_eq!(stored.performance, 6.5);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_players() {
        let repo = InMemoryPlayerRepository::new();
        let update = repo.update(42, &PlayerPatch::new()).await;
        assert!(matches!(update, Err(LedgerError::PlayerNotFound(42))));
        assert!(matches!(
            repo.delete(42).await,
            Err(LedgerError::PlayerNotFound(42))
        ));
        assert!(repo.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reset_all_zeroes_every_player() {
        let repo = InMemoryPlayerRepository::new();
        let player = seeded(&repo, "Anna", Position::Central).await;
        let mut counters = PlayerCounters::default();
        counters.faults = 3;
        repo.update(
            player.id,
            &PlayerPatch::new()
                .with_counters(counters)
                .with_points_played(5)
                .with_performance(7.0),
        )
        .await
        .unwrap();

        repo.reset_all().await.unwrap();

        let stored = repo.get_by_id(player.id).await.unwrap().unwrap();
        assert_eq!(stored.counters, PlayerCounters::default());
        assert_eq!(stored.points_played, 0);
        assert_eq!(stored.performance, 0.0);
        assert_eq!(stored.name, "Anna");
    }
}
