//! Round and RoundStatus.

use crate::models::group::{Group, GroupStatus};
use crate::models::participant::ParticipantId;
use crate::models::settings::{BracketSide, RoundSettings};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type RoundId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundStatus::Pending => "pending",
            RoundStatus::Active => "active",
            RoundStatus::Completed => "completed",
            RoundStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One stage of a competition, split into groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    /// Unique within the competition; defines sequencing.
    pub round_number: u32,
    pub(crate) status: RoundStatus,
    /// Planned number of groups.
    pub(crate) total_groups: u32,
    pub(crate) is_elimination_round: bool,
    /// Participants advancing from each group; None means nobody advances (round-robin, finals).
    pub(crate) players_advance: Option<u32>,
    pub settings: RoundSettings,
    pub(crate) groups: Vec<Group>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Round {
    pub fn new(round_number: u32, name: impl Into<String>, total_groups: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            round_number,
            status: RoundStatus::Pending,
            total_groups,
            is_elimination_round: false,
            players_advance: None,
            settings: RoundSettings::default(),
            groups: Vec::new(),
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark as an elimination round where `players_advance` leave each group (None for a final).
    pub fn elimination(mut self, players_advance: Option<u32>) -> Self {
        self.is_elimination_round = true;
        self.players_advance = players_advance;
        self
    }

    pub fn with_settings(mut self, settings: RoundSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Planned group count.
    pub fn total_groups(&self) -> u32 {
        self.total_groups
    }

    pub fn is_elimination_round(&self) -> bool {
        self.is_elimination_round
    }

    /// Raw advance count; see [`Round::advancement`] for the effective rule.
    pub fn players_advance(&self) -> Option<u32> {
        self.players_advance
    }

    pub fn bracket(&self) -> BracketSide {
        self.settings.bracket
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, group_number: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.group_number == group_number)
    }

    pub fn completed_groups(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.status == GroupStatus::Completed)
            .count()
    }

    /// How many participants advance from each group when it completes, if any.
    pub fn advancement(&self) -> Option<u32> {
        if self.is_elimination_round {
            self.players_advance
        } else {
            None
        }
    }

    /// Participants across every group, in group then roster order.
    pub fn all_participants(&self) -> Vec<ParticipantId> {
        self.groups
            .iter()
            .flat_map(|g| g.roster().iter().map(|p| p.participant_id))
            .collect()
    }

    /// Participants flagged as advanced; empty unless this round eliminates.
    pub fn advancing_participants(&self) -> Vec<ParticipantId> {
        if self.advancement().is_none() {
            return Vec::new();
        }
        self.groups
            .iter()
            .flat_map(|g| g.advancing_participants().map(|p| p.participant_id))
            .collect()
    }

    /// Participants who played this round without advancing.
    pub fn non_advancing_participants(&self) -> Vec<ParticipantId> {
        self.groups
            .iter()
            .flat_map(|g| g.roster().iter().filter(|p| !p.advanced).map(|p| p.participant_id))
            .collect()
    }

    /// 0 pending, 100 completed, otherwise the share of completed groups.
    pub fn progress(&self) -> u8 {
        match self.status {
            RoundStatus::Pending => 0,
            RoundStatus::Completed => 100,
            RoundStatus::Active | RoundStatus::Cancelled => {
                if self.total_groups == 0 {
                    return 0;
                }
                (self.completed_groups() as u64 * 100 / self.total_groups as u64).min(100) as u8
            }
        }
    }
}
