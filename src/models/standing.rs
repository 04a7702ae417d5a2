//! Input and output rows of the standings calculation.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Performance record of one participant, as fed to the standings calculation.
///
/// `points_for` / `points_against` are only present where score difference is tracked
/// (group rosters); the competition leaderboard leaves them empty.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub participant_id: ParticipantId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: i64,
    pub points_for: Option<i64>,
    pub points_against: Option<i64>,
}

impl StatLine {
    pub fn matches_played(&self) -> u32 {
        self.wins.saturating_add(self.losses).saturating_add(self.draws)
    }

    pub fn point_difference(&self) -> Option<i64> {
        Some(self.points_for?.saturating_sub(self.points_against?))
    }
}

/// One ranked row of a standings table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based rank.
    pub position: u32,
    pub participant_id: ParticipantId,
    pub name: String,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_for: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_against: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_difference: Option<i64>,
    /// Percentage of matches won, rounded to two decimals; 0 before any match.
    pub win_percentage: f64,
}
