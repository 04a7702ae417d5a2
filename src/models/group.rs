//! Group, its roster pivot (GroupParticipant) and GroupStatus.

use crate::models::participant::{Identity, MatchStatistics, ParticipantId};
use crate::models::settings::GroupSettings;
use crate::models::standing::{Standing, StatLine};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type GroupId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupStatus::Pending => "pending",
            GroupStatus::Active => "active",
            GroupStatus::Completed => "completed",
            GroupStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A participant's seat in one group, with the stats earned there.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupParticipant {
    pub participant_id: ParticipantId,
    pub name: String,
    /// Slot within the group, assigned sequentially on join.
    pub position: u32,
    pub seed: Option<u32>,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: i64,
    pub points_for: i64,
    pub points_against: i64,
    pub advanced: bool,
    pub eliminated: bool,
    pub joined_at: DateTime<Utc>,
}

impl GroupParticipant {
    pub(crate) fn new(identity: Identity, position: u32, seed: Option<u32>, now: DateTime<Utc>) -> Self {
        Self {
            participant_id: identity.id,
            name: identity.name,
            position,
            seed,
            wins: 0,
            losses: 0,
            draws: 0,
            points: 0,
            points_for: 0,
            points_against: 0,
            advanced: false,
            eliminated: false,
            joined_at: now,
        }
    }

    pub fn matches_played(&self) -> u32 {
        self.wins.saturating_add(self.losses).saturating_add(self.draws)
    }

    pub fn statistics(&self) -> MatchStatistics {
        MatchStatistics {
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            points: self.points,
            points_for: self.points_for,
            points_against: self.points_against,
        }
    }

    /// Group rosters always track score difference.
    pub fn stat_line(&self) -> StatLine {
        StatLine {
            participant_id: self.participant_id,
            name: self.name.clone(),
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            points: self.points,
            points_for: Some(self.points_for),
            points_against: Some(self.points_against),
        }
    }
}

/// A group of participants inside one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// Unique within the round, 1-based.
    pub group_number: u32,
    pub name: String,
    pub(crate) status: GroupStatus,
    pub(crate) max_players: u32,
    pub(crate) roster: Vec<GroupParticipant>,
    /// Snapshot derived from `roster`; regenerated wholesale on every roster or stat change.
    pub(crate) standings: Vec<Standing>,
    pub settings: GroupSettings,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Empty pending group.
    pub fn new(group_number: u32, name: impl Into<String>, max_players: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_number,
            name: name.into(),
            status: GroupStatus::Pending,
            max_players,
            roster: Vec::new(),
            standings: Vec::new(),
            settings: GroupSettings::default(),
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_settings(mut self, settings: GroupSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn status(&self) -> GroupStatus {
        self.status
    }

    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    pub fn roster(&self) -> &[GroupParticipant] {
        &self.roster
    }

    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&GroupParticipant> {
        self.roster.iter().find(|p| p.participant_id == id)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participant(id).is_some()
    }

    pub fn participant_count(&self) -> usize {
        self.roster.len()
    }

    pub fn is_full(&self) -> bool {
        self.roster.len() >= self.max_players as usize
    }

    /// Roster entries not marked eliminated.
    pub fn active_participants(&self) -> impl Iterator<Item = &GroupParticipant> {
        self.roster.iter().filter(|p| !p.eliminated)
    }

    pub fn advancing_participants(&self) -> impl Iterator<Item = &GroupParticipant> {
        self.roster.iter().filter(|p| p.advanced)
    }

    /// Who currently holds the given 1-based standings position.
    pub fn participant_by_position(&self, position: u32) -> Option<&GroupParticipant> {
        let standing = self.standings.iter().find(|s| s.position == position)?;
        self.participant(standing.participant_id)
    }

    /// 0 pending, 50 active, 100 completed. Match-level progress is not tracked.
    pub fn progress(&self) -> u8 {
        match self.status {
            GroupStatus::Pending | GroupStatus::Cancelled => 0,
            GroupStatus::Active => 50,
            GroupStatus::Completed => 100,
        }
    }
}
