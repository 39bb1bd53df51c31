use serde::{Deserialize, Serialize};

use super::weights::{weights_for, Stat, StatKind};
use super::MAX_PERFORMANCE;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceScore {
    /// Weighted sum, per point played when rate-based scoring applies.
    pub raw: f64,
    /// `raw` placed between `min` and `max` on a 0-10 scale.
    pub normalized: f64,
    pub max: f64,
    pub min: f64,
}

/// Position-weighted performance score.
///
/// Bounds come from the player's own attempts: `max` is the score had every
/// attempt succeeded, `min` had every attempt failed. The same raw score can
/// therefore normalize differently as a match goes on.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceScorer {
    include_points_played: bool,
}

impl Default for PerformanceScorer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PerformanceScorer {
    pub fn new(include_points_played: bool) -> Self {
        Self {
            include_points_played,
        }
    }

    pub fn includes_points_played(&self) -> bool {
        self.include_points_played
    }

    pub fn score(&self, player: &Player) -> PerformanceScore {
        let weights = weights_for(player.position);
        let counters = &player.counters;

        let raw: f64 = weights
            .iter()
            .map(|(stat, weight)| weight * f64::from(stat.value(counters)))
            .sum();

        let mut max = 0.0;
        let mut min = 0.0;
        for (stat, weight) in weights {
            match stat.kind() {
                StatKind::Success(category) if has_stat(weights, StatKind::Fail(category)) => {
                    max += weight * f64::from(counters.category(category).total());
                }
                StatKind::Fail(category) if has_stat(weights, StatKind::Success(category)) => {
                    min += weight * f64::from(counters.category(category).total());
                }
                _ => {
                    let contribution = weight * f64::from(stat.value(counters));
                    if *weight > 0.0 {
                        max += contribution;
                    } else {
                        min += contribution;
                    }
                }
            }
        }

        let divisor = if self.include_points_played && player.points_played > 0 {
            f64::from(player.points_played)
        } else {
            1.0
        };
        let raw = raw / divisor;
        let max = max / divisor;
        let min = min / divisor;

        let normalized = if max == min {
            0.0
        } else {
            ((raw - min) / (max - min) * MAX_PERFORMANCE).clamp(0.0, MAX_PERFORMANCE)
        };

        PerformanceScore {
            raw,
            normalized,
            max,
            min,
        }
    }
}

fn has_stat(weights: &[(Stat, f64)], kind: StatKind) -> bool {
    weights.iter().any(|(stat, _)| stat.kind() == kind)
}
