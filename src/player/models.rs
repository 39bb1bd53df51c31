use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{Category, Outcome};
use crate::errors::LedgerError;

pub type PlayerId = i64;

/// Court position. Decides which actions a player can record and how they are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    Libero,
    /// "r4"
    OutsideHitter,
    /// "pointu"
    Opposite,
    Central,
    /// "passeur"
    Setter,
}

impl Position {
    /// Label stored in the players table.
    pub fn label(&self) -> &'static str {
        match self {
            Position::Libero => "libero",
            Position::OutsideHitter => "r4",
            Position::Opposite => "pointu",
            Position::Central => "central",
            Position::Setter => "passeur",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "libero" => Ok(Position::Libero),
            "r4" | "outside" | "outsidehitter" | "outside_hitter" => Ok(Position::OutsideHitter),
            "pointu" | "opposite" => Ok(Position::Opposite),
            "central" | "middle" => Ok(Position::Central),
            "passeur" | "setter" => Ok(Position::Setter),
            _ => Err(LedgerError::UnsupportedPosition(s.to_string())),
        }
    }
}

impl TryFrom<String> for Position {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.label().to_string()
    }
}

/// Counters for one category. Always holds `point <= success <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCategoryCounters")]
pub struct CategoryCounters {
    total: u32,
    success: u32,
    point: u32,
}

#[derive(Deserialize)]
struct RawCategoryCounters {
    total: u32,
    success: u32,
    point: u32,
}

impl TryFrom<RawCategoryCounters> for CategoryCounters {
    type Error = LedgerError;

    fn try_from(raw: RawCategoryCounters) -> Result<Self, Self::Error> {
        CategoryCounters::new(raw.total, raw.success, raw.point)
    }
}

impl CategoryCounters {
    pub fn new(total: u32, success: u32, point: u32) -> Result<Self, LedgerError> {
        if point > success || success > total {
            return Err(LedgerError::InvalidPlayer(format!(
                "counters out of order: total={total} success={success} point={point}"
            )));
        }
        Ok(Self {
            total,
            success,
            point,
        })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn success(&self) -> u32 {
        self.success
    }

    pub fn point(&self) -> u32 {
        self.point
    }

    /// Attempts that were neither a success nor a point.
    pub fn fail(&self) -> u32 {
        self.total - self.success
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.total = self.total.saturating_add(1);
        if matches!(outcome, Outcome::Success | Outcome::Point) {
            self.success = self.success.saturating_add(1);
        }
        if outcome == Outcome::Point {
            self.point = self.point.saturating_add(1);
        }
    }

    /// Removes one recorded outcome of the given kind. Returns false, leaving the
    /// counters untouched, when there is none left to remove.
    pub fn revert(&mut self, outcome: Outcome) -> bool {
        let available = match outcome {
            Outcome::Fail => self.fail(),
            Outcome::Success => self.success - self.point,
            Outcome::Point => self.point,
        };
        if available == 0 {
            return false;
        }

        self.total -= 1;
        if matches!(outcome, Outcome::Success | Outcome::Point) {
            self.success -= 1;
        }
        if outcome == Outcome::Point {
            self.point -= 1;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCounters {
    pub attack: CategoryCounters,
    pub service: CategoryCounters,
    pub reception: CategoryCounters,
    pub block: CategoryCounters,
    pub passes_fail: u32,
    pub faults: u32,
}

impl PlayerCounters {
    pub fn category(&self, category: Category) -> &CategoryCounters {
        match category {
            Category::Attack => &self.attack,
            Category::Service => &self.service,
            Category::Reception => &self.reception,
            Category::Block => &self.block,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut CategoryCounters {
        match category {
            Category::Attack => &mut self.attack,
            Category::Service => &mut self.service,
            Category::Reception => &mut self.reception,
            Category::Block => &mut self.block,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub counters: PlayerCounters,
    pub points_played: u32,
    /// Cached 0-10 score, refreshed after every mutation that affects it.
    pub performance: f64,
}

impl Player {
    pub fn new(id: PlayerId, new_player: NewPlayer) -> Self {
        Self {
            id,
            name: new_player.name,
            position: new_player.position,
            counters: PlayerCounters::default(),
            points_played: 0,
            performance: 0.0,
        }
    }

    pub fn reset_stats(&mut self) {
        self.counters = PlayerCounters::default();
        self.points_played = 0;
        self.performance = 0.0;
    }
}

/// Validated input for creating a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    name: String,
    position: Position,
}

impl NewPlayer {
    pub fn new(name: &str, position: Position) -> Result<Self, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidPlayer(
                "player name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            position,
        })
    }

    /// Parses the position label as typed on the roster form.
    pub fn parse(name: &str, position: &str) -> Result<Self, LedgerError> {
        Self::new(name, position.parse()?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Partial update of a player row. `None` fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub position: Option<Position>,
    pub counters: Option<PlayerCounters>,
    pub points_played: Option<u32>,
    pub performance: Option<f64>,
}

impl PlayerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counters(mut self, counters: PlayerCounters) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn with_points_played(mut self, points_played: u32) -> Self {
        self.points_played = Some(points_played);
        self
    }

    pub fn with_performance(mut self, performance: f64) -> Self {
        self.performance = Some(performance);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, player: &mut Player) {
        if let Some(name) = &self.name {
            player.name = name.clone();
        }
        if let Some(position) = self.position {
            player.position = position;
        }
        if let Some(counters) = self.counters {
            player.counters = counters;
        }
        if let Some(points_played) = self.points_played {
            player.points_played = points_played;
        }
        if let Some(performance) = self.performance {
            player.performance = performance;
        }
    }
}
