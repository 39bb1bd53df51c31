//! Static table of recordable actions: what each one increments and which
//! positions may record it.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::player::Position;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ActionType {
    AttackSuccess,
    AttackFail,
    AttackPoint,
    ServiceSuccess,
    ServiceFail,
    ServicePoint,
    ReceptionSuccess,
    ReceptionFail,
    BlockSuccess,
    BlockFail,
    BlockPoint,
    PassesFail,
    Faults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Attack,
    Service,
    Reception,
    Block,
}

/// How a categorized action lands in its counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// total + success
    Success,
    /// total only
    Fail,
    /// total + success + point
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterDelta {
    Category { category: Category, outcome: Outcome },
    PassesFail,
    Faults,
}

/// Which actions leave `pointsPlayed` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsPlayedPolicy {
    /// serviceSuccess, receptionSuccess and blockSuccess do not count a rally.
    #[default]
    Standard,
    /// Standard plus attackSuccess, as recorded by older scoring sheets.
    Legacy,
}

impl PointsPlayedPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(PointsPlayedPolicy::Standard),
            "legacy" => Some(PointsPlayedPolicy::Legacy),
            _ => None,
        }
    }

    pub fn counts_point_played(&self, action: ActionType) -> bool {
        match action {
            ActionType::ServiceSuccess
            | ActionType::ReceptionSuccess
            | ActionType::BlockSuccess => false,
            ActionType::AttackSuccess => *self == PointsPlayedPolicy::Standard,
            _ => true,
        }
    }
}

pub fn effects_of(action: ActionType) -> CounterDelta {
    use Category::*;
    use Outcome::*;

    let (category, outcome) = match action {
        ActionType::AttackSuccess => (Attack, Success),
        ActionType::AttackFail => (Attack, Fail),
        ActionType::AttackPoint => (Attack, Point),
        ActionType::ServiceSuccess => (Service, Success),
        ActionType::ServiceFail => (Service, Fail),
        ActionType::ServicePoint => (Service, Point),
        ActionType::ReceptionSuccess => (Reception, Success),
        ActionType::ReceptionFail => (Reception, Fail),
        ActionType::BlockSuccess => (Block, Success),
        ActionType::BlockFail => (Block, Fail),
        ActionType::BlockPoint => (Block, Point),
        ActionType::PassesFail => return CounterDelta::PassesFail,
        ActionType::Faults => return CounterDelta::Faults,
    };

    CounterDelta::Category { category, outcome }
}

const LIBERO_ACTIONS: &[ActionType] = &[
    ActionType::ReceptionSuccess,
    ActionType::ReceptionFail,
    ActionType::PassesFail,
];

pub fn is_available(action: ActionType, position: Position) -> bool {
    match position {
        Position::Libero => LIBERO_ACTIONS.contains(&action),
        // Every court position other than libero records the full set.
        Position::OutsideHitter | Position::Opposite | Position::Central | Position::Setter => {
            true
        }
    }
}

/// Actions offered for a position, grouped service, attack, reception, block, pass, fault.
pub fn available_actions(position: Position) -> Vec<ActionType> {
    const DISPLAY_ORDER: [ActionType; 13] = [
        ActionType::ServiceSuccess,
        ActionType::ServiceFail,
        ActionType::ServicePoint,
        ActionType::AttackSuccess,
        ActionType::AttackFail,
        ActionType::AttackPoint,
        ActionType::ReceptionSuccess,
        ActionType::ReceptionFail,
        ActionType::BlockSuccess,
        ActionType::BlockFail,
        ActionType::BlockPoint,
        ActionType::PassesFail,
        ActionType::Faults,
    ];

    DISPLAY_ORDER
        .into_iter()
        .filter(|action| is_available(*action, position))
        .collect()
}

pub fn all_actions() -> impl Iterator<Item = ActionType> {
    ActionType::iter()
}
