//! Flat per-player rows handed to the spreadsheet exporter.

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::player::{Player, PlayerId};

/// Every counter of a player, one column each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerExportRow {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    pub attacks: u32,
    pub attack_success: u32,
    pub attack_point: u32,
    pub services: u32,
    pub service_success: u32,
    pub service_point: u32,
    pub receptions: u32,
    pub reception_success: u32,
    pub reception_point: u32,
    pub blocks: u32,
    pub block_success: u32,
    pub block_point: u32,
    pub passes_fail: u32,
    pub faults: u32,
    pub points_played: u32,
    pub performance: f64,
}

impl From<&Player> for PlayerExportRow {
    fn from(player: &Player) -> Self {
        let c = &player.counters;
        Self {
            id: player.id,
            name: player.name.clone(),
            position: player.position.label().to_string(),
            attacks: c.attack.total(),
            attack_success: c.attack.success(),
            attack_point: c.attack.point(),
            services: c.service.total(),
            service_success: c.service.success(),
            service_point: c.service.point(),
            receptions: c.reception.total(),
            reception_success: c.reception.success(),
            reception_point: c.reception.point(),
            blocks: c.block.total(),
            block_success: c.block.success(),
            block_point: c.block.point(),
            passes_fail: c.passes_fail,
            faults: c.faults,
            points_played: player.points_played,
            performance: player.performance,
        }
    }
}

pub fn export_rows(players: &[Player]) -> Vec<PlayerExportRow> {
    players.iter().map(PlayerExportRow::from).collect()
}

pub fn to_json(rows: &[PlayerExportRow]) -> Result<String, LedgerError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Outcome;
    use crate::player::{NewPlayer, Position};

    #[test]
    fn rows_carry_every_counter() {
        let mut player = Player::new(3, NewPlayer::new("Anna", Position::OutsideHitter).unwrap());
        player.counters.attack.record(Outcome::Point);
        player.counters.reception.record(Outcome::Fail);
        player.counters.reception.record(Outcome::Point);
        player.counters.faults = 2;
        player.points_played = 4;
        player.performance = 7.25;

        let rows = export_rows(std::slice::from_ref(&player));
        let row = &rows[0];
        assert_eq!(row.position, "r4");
        assert_eq!((row.attacks, row.attack_success, row.attack_point), (1, 1, 1));
        assert_eq!(
            (row.receptions, row.reception_success, row.reception_point),
            (2, 1, 1)
        );
        assert_eq!(row.faults, 2);
        assert_eq!(row.points_played, 4);
        assert_eq!(row.performance, 7.25);
    }

    #[test]
    fn json_uses_column_names() {
        let player = Player::new(1, NewPlayer::new("Lea", Position::Libero).unwrap());
        let json = to_json(&export_rows(&[player])).unwrap();
        assert!(json.contains("\"attackSuccess\": 0"));
        assert!(json.contains("\"pointsPlayed\": 0"));
        assert!(json.contains("\"receptionPoint\": 0"));
        assert!(json.contains("\"position\": \"libero\""));
    }
}
