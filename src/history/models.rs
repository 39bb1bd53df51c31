use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ActionType;
use crate::player::PlayerId;

pub type HistoryId = i64;

/// One applied action. Ids grow with insertion order, which alone defines recency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub player_id: PlayerId,
    pub action_type: ActionType,
    pub timestamp: DateTime<Utc>,
}
