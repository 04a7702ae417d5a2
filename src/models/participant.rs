//! Identity, Participant and the per-participant statistics they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identity reference supplied by the identity provider.
pub type ParticipantId = Uuid;

/// An already-vetted identity: id plus display name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: ParticipantId,
    pub name: String,
}

impl Identity {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Identity with a freshly generated id (tests, CSV rows without an id).
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), name)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    #[default]
    Participant,
    Admin,
    Organizer,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    #[default]
    Registered,
    Confirmed,
    Withdrawn,
    Eliminated,
    Disqualified,
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParticipantStatus::Registered => "registered",
            ParticipantStatus::Confirmed => "confirmed",
            ParticipantStatus::Withdrawn => "withdrawn",
            ParticipantStatus::Eliminated => "eliminated",
            ParticipantStatus::Disqualified => "disqualified",
        };
        f.write_str(s)
    }
}

/// Externally reported results for one participant, merged into the running totals.
///
/// Unknown keys are rejected when this arrives as JSON.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchStatistics {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: i64,
    pub points_for: i64,
    pub points_against: i64,
}

impl MatchStatistics {
    /// Field-wise sum, or `None` when any counter would overflow.
    pub fn checked_add(&self, other: &MatchStatistics) -> Option<MatchStatistics> {
        Some(MatchStatistics {
            wins: self.wins.checked_add(other.wins)?,
            losses: self.losses.checked_add(other.losses)?,
            draws: self.draws.checked_add(other.draws)?,
            points: self.points.checked_add(other.points)?,
            points_for: self.points_for.checked_add(other.points_for)?,
            points_against: self.points_against.checked_add(other.points_against)?,
        })
    }
}

/// A competition-scoped participant record (one per competition and identity).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    /// Seeding hint; lower seeds are placed first. Unseeded players go last.
    pub seed: Option<u32>,
    /// None until a leaderboard has been computed.
    pub current_ranking: Option<u32>,
    pub points: i64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub entry_fee_paid: Option<f64>,
    pub fee_paid: bool,
    pub registered_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub withdrawal_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// New registration: role participant, status registered, zeroed stats.
    pub fn register(identity: Identity, entry_fee: Option<f64>, now: DateTime<Utc>) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            role: ParticipantRole::Participant,
            status: ParticipantStatus::Registered,
            seed: None,
            current_ranking: None,
            points: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            entry_fee_paid: entry_fee,
            fee_paid: entry_fee.is_none(),
            registered_at: now,
            confirmed_at: None,
            withdrawn_at: None,
            withdrawal_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_player(&self) -> bool {
        self.role == ParticipantRole::Participant
    }

    /// Confirmed player: counts towards capacity, planning and the leaderboard.
    pub fn is_confirmed_player(&self) -> bool {
        self.is_player() && self.status == ParticipantStatus::Confirmed
    }

    /// Registered, confirmed or eliminated (not withdrawn or disqualified).
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ParticipantStatus::Registered | ParticipantStatus::Confirmed | ParticipantStatus::Eliminated
        )
    }

    pub fn matches_played(&self) -> u32 {
        self.wins.saturating_add(self.losses).saturating_add(self.draws)
    }

    /// Cumulative totals as a statistics record (score totals are not tracked here).
    pub fn statistics(&self) -> MatchStatistics {
        MatchStatistics {
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            points: self.points,
            ..Default::default()
        }
    }

    /// Replace the cumulative totals with already-merged ones.
    pub(crate) fn set_statistics(&mut self, totals: &MatchStatistics, now: DateTime<Utc>) {
        self.wins = totals.wins;
        self.losses = totals.losses;
        self.draws = totals.draws;
        self.points = totals.points;
        self.updated_at = now;
    }
}
