//! Typed settings for competitions, rounds and groups.
//!
//! Every struct rejects unknown keys, and every option is an enumerated value, so a
//! misspelled or unsupported setting fails at the boundary instead of being stored.

use crate::models::error::{CompetitionError, CompetitionResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

fn parse_settings<T: DeserializeOwned>(json: &str) -> CompetitionResult<T> {
    serde_json::from_str(json).map_err(|e| CompetitionError::InvalidSettings(e.to_string()))
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringSystem {
    #[default]
    BestOf3,
    BestOf5,
    FirstTo11,
    FirstTo15,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancementCriteria {
    TopN,
    #[default]
    WinnerOnly,
    TopPercentage,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tiebreaker {
    HeadToHead,
    #[default]
    PointDifference,
    GamesWon,
    SetsWon,
}

/// Which part of the bracket a round belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    /// Single-elimination main bracket.
    #[default]
    Main,
    Winners,
    Losers,
    Swiss,
    /// Round-robin, league or ladder stage.
    GroupStage,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMethod {
    #[default]
    ScoreBased,
    Random,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSystem {
    #[default]
    Standard,
    Tennis,
    Custom,
}

/// Competition-wide options.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompetitionSettings {
    /// Group count for round-robin, league and ladder stages (not derived by the planner).
    pub group_count: Option<u32>,
    /// Upper bound on Swiss rounds; the planner never exceeds 8.
    pub swiss_max_rounds: Option<u32>,
}

impl CompetitionSettings {
    pub fn from_json(json: &str) -> CompetitionResult<Self> {
        parse_settings(json)
    }
}

/// Round-specific options.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoundSettings {
    pub scoring_system: ScoringSystem,
    pub allow_ties: bool,
    pub time_limit_minutes: Option<u32>,
    pub advancement_criteria: AdvancementCriteria,
    pub tiebreaker: Tiebreaker,
    pub bracket: BracketSide,
    pub pairing_method: Option<PairingMethod>,
}

impl RoundSettings {
    pub fn from_json(json: &str) -> CompetitionResult<Self> {
        parse_settings(json)
    }

    pub fn for_bracket(bracket: BracketSide) -> Self {
        let mut settings = Self {
            bracket,
            ..Self::default()
        };
        match bracket {
            BracketSide::Swiss => settings.pairing_method = Some(PairingMethod::ScoreBased),
            BracketSide::GroupStage => settings.allow_ties = true,
            BracketSide::Main | BracketSide::Winners | BracketSide::Losers => {
                settings.scoring_system = ScoringSystem::BestOf5;
            }
        }
        settings
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeLimits {
    pub match_minutes: Option<u32>,
    pub warm_up_minutes: Option<u32>,
}

/// Group-specific options.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupSettings {
    pub match_format: ScoringSystem,
    pub round_robin: bool,
    pub double_round_robin: bool,
    pub point_system: PointSystem,
    pub tiebreaker: Tiebreaker,
    pub time_limits: TimeLimits,
}

impl GroupSettings {
    pub fn from_json(json: &str) -> CompetitionResult<Self> {
        parse_settings(json)
    }
}
