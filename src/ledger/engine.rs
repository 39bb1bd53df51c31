use std::collections::HashSet;
use tracing::{debug, warn};

use crate::catalog::{effects_of, is_available, ActionType, CounterDelta, PointsPlayedPolicy};
use crate::errors::LedgerError;
use crate::player::{Player, PlayerId};

/// Players on court at once.
pub const ON_COURT_SIZE: usize = 6;

/// Snapshot of the players currently on court. Fixed for the whole of one action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnCourtRoster {
    ids: Vec<PlayerId>,
}

impl OnCourtRoster {
    pub fn new(ids: impl IntoIterator<Item = PlayerId>) -> Result<Self, LedgerError> {
        let ids: Vec<PlayerId> = ids.into_iter().collect();
        if ids.len() > ON_COURT_SIZE {
            return Err(LedgerError::InvalidRoster(format!(
                "{} players on court, at most {ON_COURT_SIZE} allowed",
                ids.len()
            )));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = ids.iter().find(|id| !seen.insert(**id)) {
            return Err(LedgerError::InvalidRoster(format!(
                "player {duplicate} listed twice"
            )));
        }

        Ok(Self { ids })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[PlayerId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Next state computed for one action, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerUpdate {
    /// Acting player's next state, `points_played` included when they are on court.
    pub player: Player,
    /// +1, 0 or -1 applied to the points played of every on-court player.
    pub points_played_delta: i32,
    /// Other on-court players whose points played move by the delta.
    pub fan_out: Vec<PlayerId>,
}

/// Pure counter arithmetic for applying and reversing actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatLedger {
    policy: PointsPlayedPolicy,
}

impl StatLedger {
    pub fn new(policy: PointsPlayedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PointsPlayedPolicy {
        self.policy
    }

    pub fn apply(
        &self,
        player: &Player,
        action: ActionType,
        on_court: &OnCourtRoster,
    ) -> Result<LedgerUpdate, LedgerError> {
        if !is_available(action, player.position) {
            return Err(LedgerError::InvalidAction {
                action,
                position: player.position,
            });
        }

        let mut next = player.clone();
        match effects_of(action) {
            CounterDelta::Category { category, outcome } => {
                next.counters.category_mut(category).record(outcome);
            }
            CounterDelta::PassesFail => {
                next.counters.passes_fail = next.counters.passes_fail.saturating_add(1);
            }
            CounterDelta::Faults => next.counters.faults = next.counters.faults.saturating_add(1),
        }

        let delta = if self.policy.counts_point_played(action) {
            1
        } else {
            0
        };
        Ok(self.fan_out(next, delta, on_court))
    }

    /// Exact inverse of `apply`, clamped so no counter goes below zero.
    pub fn reverse(
        &self,
        player: &Player,
        action: ActionType,
        on_court: &OnCourtRoster,
    ) -> LedgerUpdate {
        let mut next = player.clone();
        let reverted = match effects_of(action) {
            CounterDelta::Category { category, outcome } => {
                next.counters.category_mut(category).revert(outcome)
            }
            CounterDelta::PassesFail => decrement(&mut next.counters.passes_fail),
            CounterDelta::Faults => decrement(&mut next.counters.faults),
        };
        if !reverted {
            warn!(
                player_id = player.id,
                action = %action,
                "Nothing left to reverse, counters left unchanged"
            );
        }

        let delta = if self.policy.counts_point_played(action) {
            -1
        } else {
            0
        };
        self.fan_out(next, delta, on_court)
    }

    fn fan_out(&self, mut player: Player, delta: i32, on_court: &OnCourtRoster) -> LedgerUpdate {
        if delta == 0 {
            return LedgerUpdate {
                player,
                points_played_delta: 0,
                fan_out: Vec::new(),
            };
        }

        if on_court.contains(player.id) {
            player.points_played = shift(player.points_played, delta);
        }
        let fan_out: Vec<PlayerId> = on_court
            .ids()
            .iter()
            .copied()
            .filter(|id| *id != player.id)
            .collect();

        debug!(
            player_id = player.id,
            delta,
            others = fan_out.len(),
            "Points played fan-out computed"
        );

        LedgerUpdate {
            player,
            points_played_delta: delta,
            fan_out,
        }
    }
}

pub(crate) fn shift(points_played: u32, delta: i32) -> u32 {
    points_played.saturating_add_signed(delta)
}

fn decrement(counter: &mut u32) -> bool {
    if *counter == 0 {
        return false;
    }
    *counter -= 1;
    true
}
