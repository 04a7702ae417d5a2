//! Competition, its format/type/status enums and construction-time derivations.

use crate::models::participant::{Participant, ParticipantId, ParticipantRole};
use crate::models::round::Round;
use crate::models::settings::CompetitionSettings;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a competition.
pub type CompetitionId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionFormat {
    #[default]
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
    Ladder,
    League,
}

impl fmt::Display for CompetitionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompetitionFormat::SingleElimination => "single_elimination",
            CompetitionFormat::DoubleElimination => "double_elimination",
            CompetitionFormat::RoundRobin => "round_robin",
            CompetitionFormat::Swiss => "swiss",
            CompetitionFormat::Ladder => "ladder",
            CompetitionFormat::League => "league",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionType {
    #[default]
    Tournament,
    League,
    SingleMatch,
    Ladder,
    RoundRobin,
}

/// Lifecycle: draft → open → in_progress → completed, or cancelled from any non-terminal state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    #[default]
    Draft,
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl CompetitionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CompetitionStatus::Completed | CompetitionStatus::Cancelled)
    }
}

impl fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompetitionStatus::Draft => "draft",
            CompetitionStatus::Open => "open",
            CompetitionStatus::InProgress => "in_progress",
            CompetitionStatus::Completed => "completed",
            CompetitionStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Human-readable registration state shown next to a competition.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    NotYetOpen,
    InProgress,
    Completed,
    Closed,
    Full,
    Open,
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegistrationStatus::NotYetOpen => "Registration not yet open",
            RegistrationStatus::InProgress => "Competition in progress",
            RegistrationStatus::Completed => "Competition completed",
            RegistrationStatus::Closed => "Registration closed",
            RegistrationStatus::Full => "Competition full",
            RegistrationStatus::Open => "Registration open",
        };
        f.write_str(s)
    }
}

/// Lowercase ASCII slug: alphanumeric runs joined by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// The competition aggregate: owns its participants and rounds (which own their groups).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub created_by: ParticipantId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub competition_type: CompetitionType,
    pub format: CompetitionFormat,
    pub sport: String,
    pub is_public: bool,
    pub is_ranked: bool,
    pub(crate) status: CompetitionStatus,
    pub registration_start: Option<NaiveDate>,
    pub registration_end: Option<NaiveDate>,
    pub min_participants: u32,
    /// None means unlimited.
    pub max_participants: Option<u32>,
    pub entry_fee: Option<f64>,
    pub settings: CompetitionSettings,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// None for open-ended formats (ladder).
    pub(crate) total_rounds: Option<u32>,
    pub(crate) rounds_completed: u32,
    pub(crate) cancellation_reason: Option<String>,
    pub(crate) participants: Vec<Participant>,
    pub(crate) rounds: Vec<Round>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Competition {
    /// Draft competition with the slug derived from the name.
    pub fn new(
        name: impl Into<String>,
        format: CompetitionFormat,
        created_by: ParticipantId,
        now: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        let competition_type = match format {
            CompetitionFormat::League => CompetitionType::League,
            CompetitionFormat::Ladder => CompetitionType::Ladder,
            CompetitionFormat::RoundRobin => CompetitionType::RoundRobin,
            _ => CompetitionType::Tournament,
        };
        Self {
            id: Uuid::new_v4(),
            created_by,
            name,
            slug,
            description: None,
            competition_type,
            format,
            sport: "squash".to_string(),
            is_public: true,
            is_ranked: false,
            status: CompetitionStatus::Draft,
            registration_start: None,
            registration_end: None,
            min_participants: 2,
            max_participants: None,
            entry_fee: None,
            settings: CompetitionSettings::default(),
            start_date: None,
            end_date: None,
            total_rounds: None,
            rounds_completed: 0,
            cancellation_reason: None,
            participants: Vec::new(),
            rounds: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_capacity(mut self, min_participants: u32, max_participants: Option<u32>) -> Self {
        self.min_participants = min_participants;
        self.max_participants = max_participants;
        self
    }

    pub fn with_registration_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.registration_start = start;
        self.registration_end = end;
        self
    }

    pub fn with_entry_fee(mut self, entry_fee: Option<f64>) -> Self {
        self.entry_fee = entry_fee;
        self
    }

    pub fn with_settings(mut self, settings: CompetitionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Rename, re-deriving the slug.
    pub fn rename(&mut self, name: impl Into<String>, now: DateTime<Utc>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
        self.updated_at = now;
    }

    pub fn status(&self) -> CompetitionStatus {
        self.status
    }

    pub fn total_rounds(&self) -> Option<u32> {
        self.total_rounds
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Records with role `participant`.
    pub fn players(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_player())
    }

    pub fn admins(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| p.role == ParticipantRole::Admin)
    }

    pub fn organizers(&self) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(|p| p.role == ParticipantRole::Organizer)
    }

    /// Not withdrawn or disqualified.
    pub fn active_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_active())
    }

    pub fn confirmed_players(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_confirmed_player())
    }

    /// Number of confirmed players.
    pub fn participant_count(&self) -> usize {
        self.confirmed_players().count()
    }

    pub fn is_full(&self) -> bool {
        match self.max_participants {
            Some(max) => self.participant_count() >= max as usize,
            None => false,
        }
    }

    /// "Free" or the fee with two decimals.
    pub fn formatted_entry_fee(&self) -> String {
        match self.entry_fee {
            Some(fee) if fee > 0.0 => format!("${:.2}", fee),
            _ => "Free".to_string(),
        }
    }

    /// Rounds ordered by round number.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, round_number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.round_number == round_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_derived_from_name() {
        assert_eq!(slugify("Summer Squash Open 2025"), "summer-squash-open-2025");
        assert_eq!(slugify("  Club -- Ladder!! "), "club-ladder");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn new_competition_is_draft_with_slug() {
        let c = Competition::new("Winter League", CompetitionFormat::League, Uuid::new_v4(), Utc::now());
        assert_eq!(c.status(), CompetitionStatus::Draft);
        assert_eq!(c.slug, "winter-league");
        assert_eq!(c.competition_type, CompetitionType::League);
        assert_eq!(c.min_participants, 2);
        assert_eq!(c.formatted_entry_fee(), "Free");
    }

    #[test]
    fn rename_rederives_slug() {
        let mut c = Competition::new("Old", CompetitionFormat::Swiss, Uuid::new_v4(), Utc::now());
        c.rename("Brand New Cup", Utc::now());
        assert_eq!(c.slug, "brand-new-cup");
    }

    #[test]
    fn formatted_entry_fee_uses_two_decimals() {
        let c = Competition::new("Cup", CompetitionFormat::Swiss, Uuid::new_v4(), Utc::now())
            .with_entry_fee(Some(12.5));
        assert_eq!(c.formatted_entry_fee(), "$12.50");
    }
}
