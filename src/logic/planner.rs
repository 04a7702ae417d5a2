//! Bracket planning: how many rounds a format needs, how many groups each round has,
//! what the rounds are called and who advances.

use crate::models::{
    BracketSide, CompetitionError, CompetitionFormat, CompetitionResult, CompetitionSettings,
    Round, RoundSettings,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Swiss competitions never plan more rounds than this.
pub const MAX_SWISS_ROUNDS: u32 = 8;

/// Elimination groups are sized for roughly this many players.
const PLAYERS_PER_ELIMINATION_GROUP: usize = 4;

/// Planned shape of one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundSpec {
    pub round_number: u32,
    pub name: String,
    pub total_groups: u32,
    pub is_elimination_round: bool,
    pub players_advance: Option<u32>,
    pub bracket: BracketSide,
}

impl RoundSpec {
    /// Build the pending round described here.
    pub fn materialize(&self, now: DateTime<Utc>) -> Round {
        let round = Round::new(self.round_number, self.name.clone(), self.total_groups, now)
            .with_settings(RoundSettings::for_bracket(self.bracket));
        if self.is_elimination_round {
            round.elimination(self.players_advance)
        } else {
            round
        }
    }
}

/// Round topology for a format and participant count.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketPlan {
    pub format: CompetitionFormat,
    pub participant_count: usize,
    /// None for open-ended formats (ladder).
    pub total_rounds: Option<u32>,
    pub rounds: Vec<RoundSpec>,
}

/// ceil(log2(n)) for n >= 2, computed on integers.
fn ceil_log2(n: usize) -> u32 {
    usize::BITS - (n - 1).leading_zeros()
}

/// Groups in elimination round `round_number` (1-based): players left / 4, at least one.
fn elimination_groups(participant_count: usize, round_number: u32) -> u32 {
    let players_in_round = participant_count >> (round_number - 1);
    (players_in_round / PLAYERS_PER_ELIMINATION_GROUP).max(1) as u32
}

/// "Finals", "Semi Finals", "Quarter Finals", "Round of N", falling back to "Round k" past 32.
pub fn elimination_round_name(round_number: u32, total_rounds: u32) -> String {
    let remaining = total_rounds - round_number + 1;
    match remaining {
        1 => "Finals".to_string(),
        2 => "Semi Finals".to_string(),
        3 => "Quarter Finals".to_string(),
        _ => {
            let players = 1u64.checked_shl(remaining).unwrap_or(u64::MAX);
            if players <= 32 {
                format!("Round of {}", players)
            } else {
                format!("Round {}", round_number)
            }
        }
    }
}

fn single_elimination(n: usize) -> Vec<RoundSpec> {
    let total = ceil_log2(n);
    (1..=total)
        .map(|i| RoundSpec {
            round_number: i,
            name: elimination_round_name(i, total),
            total_groups: elimination_groups(n, i),
            is_elimination_round: true,
            players_advance: if i < total { Some(1) } else { None },
            bracket: BracketSide::Main,
        })
        .collect()
}

fn double_elimination(n: usize) -> Vec<RoundSpec> {
    let main_rounds = ceil_log2(n);
    let winners = (1..=main_rounds).map(|i| RoundSpec {
        round_number: i,
        name: format!("Winners Round {}", i),
        total_groups: elimination_groups(n, i),
        is_elimination_round: true,
        players_advance: Some(1),
        bracket: BracketSide::Winners,
    });
    let losers = (1..main_rounds).map(|i| RoundSpec {
        round_number: main_rounds + i,
        name: format!("Losers Round {}", i),
        total_groups: (elimination_groups(n, i) / 2).max(1),
        is_elimination_round: true,
        players_advance: Some(1),
        bracket: BracketSide::Losers,
    });
    winners.chain(losers).collect()
}

fn swiss(n: usize, settings: &CompetitionSettings) -> Vec<RoundSpec> {
    let cap = settings
        .swiss_max_rounds
        .unwrap_or(MAX_SWISS_ROUNDS)
        .clamp(1, MAX_SWISS_ROUNDS);
    let total = ceil_log2(n).min(cap);
    (1..=total)
        .map(|i| RoundSpec {
            round_number: i,
            name: format!("Swiss Round {}", i),
            total_groups: (n / 2) as u32,
            is_elimination_round: false,
            players_advance: None,
            bracket: BracketSide::Swiss,
        })
        .collect()
}

fn single_stage(format: CompetitionFormat, settings: &CompetitionSettings) -> Vec<RoundSpec> {
    let name = match format {
        CompetitionFormat::League => "League",
        CompetitionFormat::Ladder => "Ladder",
        _ => "Group Stage",
    };
    vec![RoundSpec {
        round_number: 1,
        name: name.to_string(),
        total_groups: settings.group_count.unwrap_or(1).max(1),
        is_elimination_round: false,
        players_advance: None,
        bracket: BracketSide::GroupStage,
    }]
}

/// Plan the rounds for `format` with `participant_count` players.
///
/// Fails with `InvalidPlan` for fewer than two participants.
pub fn plan_bracket(
    format: CompetitionFormat,
    participant_count: usize,
    settings: &CompetitionSettings,
) -> CompetitionResult<BracketPlan> {
    if participant_count < 2 {
        return Err(CompetitionError::InvalidPlan {
            format: format.to_string(),
            participants: participant_count,
        });
    }

    let rounds = match format {
        CompetitionFormat::SingleElimination => single_elimination(participant_count),
        CompetitionFormat::DoubleElimination => double_elimination(participant_count),
        CompetitionFormat::Swiss => swiss(participant_count, settings),
        CompetitionFormat::RoundRobin | CompetitionFormat::League | CompetitionFormat::Ladder => {
            single_stage(format, settings)
        }
    };
    let total_rounds = match format {
        CompetitionFormat::Ladder => None,
        _ => Some(rounds.len() as u32),
    };

    Ok(BracketPlan {
        format,
        participant_count,
        total_rounds,
        rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;

    fn plan(format: CompetitionFormat, n: usize) -> BracketPlan {
        plan_bracket(format, n, &CompetitionSettings::default()).unwrap()
    }

    #[test]
    fn ceil_log2_matches_float_version() {
        for n in 2..2000usize {
            assert_eq!(ceil_log2(n), (n as f64).log2().ceil() as u32, "n = {}", n);
        }
    }

    #[test]
    fn eight_player_single_elimination() {
        let p = plan(CompetitionFormat::SingleElimination, 8);
        let names: Vec<_> = p.rounds.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Quarter Finals", "Semi Finals", "Finals"]);
        let advance: Vec<_> = p.rounds.iter().map(|r| r.players_advance).collect();
        assert_eq!(advance, vec![Some(1), Some(1), None]);
        let groups: Vec<_> = p.rounds.iter().map(|r| r.total_groups).collect();
        assert_eq!(groups, vec![2, 1, 1]);
        assert_eq!(p.total_rounds, Some(3));
        assert!(p.rounds.iter().all(|r| r.is_elimination_round));
    }

    #[test]
    fn large_brackets_fall_back_to_numbered_rounds() {
        let p = plan(CompetitionFormat::SingleElimination, 100);
        let names: Vec<_> = p.rounds.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Round 1",
                "Round 2",
                "Round of 32",
                "Round of 16",
                "Quarter Finals",
                "Semi Finals",
                "Finals"
            ]
        );
        assert_eq!(p.rounds[0].total_groups, 25);
        assert_eq!(p.rounds[1].total_groups, 12);
    }

    #[test]
    fn double_elimination_appends_losers_rounds() {
        let p = plan(CompetitionFormat::DoubleElimination, 16);
        assert_eq!(p.rounds.len(), 7);
        assert_eq!(p.total_rounds, Some(7));
        let losers: Vec<_> = p.rounds.iter().filter(|r| r.bracket == BracketSide::Losers).collect();
        assert_eq!(losers.len(), 3);
        assert_eq!(losers[0].round_number, 5);
        assert_eq!(losers[0].name, "Losers Round 1");
        // winners round 1 has 4 groups, round 2 has 2, round 3 has 1
        let losers_groups: Vec<_> = losers.iter().map(|r| r.total_groups).collect();
        assert_eq!(losers_groups, vec![2, 1, 1]);
        assert!(p.rounds.iter().all(|r| r.players_advance == Some(1)));
    }

    #[test]
    fn swiss_rounds_are_capped() {
        let p = plan(CompetitionFormat::Swiss, 1000);
        assert_eq!(p.rounds.len(), 8);
        assert!(p.rounds.iter().all(|r| r.total_groups == 500 && !r.is_elimination_round));
        assert!(p.rounds.iter().all(|r| r.players_advance.is_none()));

        let p = plan(CompetitionFormat::Swiss, 5);
        assert_eq!(p.rounds.len(), 3);
        assert_eq!(p.rounds[0].total_groups, 2);
    }

    #[test]
    fn swiss_respects_configured_cap() {
        let settings = CompetitionSettings {
            swiss_max_rounds: Some(4),
            ..CompetitionSettings::default()
        };
        let p = plan_bracket(CompetitionFormat::Swiss, 1000, &settings).unwrap();
        assert_eq!(p.rounds.len(), 4);
    }

    #[test]
    fn single_stage_formats_use_configured_groups() {
        let settings = CompetitionSettings {
            group_count: Some(3),
            ..CompetitionSettings::default()
        };
        let p = plan_bracket(CompetitionFormat::RoundRobin, 12, &settings).unwrap();
        assert_eq!(p.rounds.len(), 1);
        assert_eq!(p.rounds[0].total_groups, 3);
        assert!(!p.rounds[0].is_elimination_round);
        assert_eq!(p.total_rounds, Some(1));

        let ladder = plan(CompetitionFormat::Ladder, 12);
        assert_eq!(ladder.total_rounds, None);
        assert_eq!(ladder.rounds[0].total_groups, 1);
    }

    #[test]
    fn fewer_than_two_participants_is_invalid() {
        for n in 0..2 {
            let err = plan_bracket(CompetitionFormat::SingleElimination, n, &CompetitionSettings::default())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPlan);
        }
    }

    #[test]
    fn materialized_round_keeps_spec_values() {
        let p = plan(CompetitionFormat::SingleElimination, 8);
        let round = p.rounds[0].materialize(Utc::now());
        assert_eq!(round.round_number, 1);
        assert_eq!(round.total_groups, 2);
        assert!(round.is_elimination_round);
        assert_eq!(round.players_advance, Some(1));
        assert!(round.groups().is_empty());
    }
}
