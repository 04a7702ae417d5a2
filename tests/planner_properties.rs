/// Property-based tests for bracket planning, standings and group generation.
use chrono::{TimeZone, Utc};
use competition_engine::models::{CompetitionSettings, StatLine};
use competition_engine::{calculate_standings, plan_bracket, CompetitionFormat, Identity, Round};
use proptest::prelude::*;
use std::collections::BTreeSet;
use uuid::Uuid;

// Smallest k with 2^k >= n
fn rounds_needed(n: usize) -> usize {
    let mut k = 0;
    while (1usize << k) < n {
        k += 1;
    }
    k
}

fn stat_line_strategy() -> impl Strategy<Value = StatLine> {
    (-20i64..40, 0u32..10, 0u32..10, proptest::option::of(0i64..60)).prop_map(
        |(points, wins, losses, points_for)| StatLine {
            participant_id: Uuid::new_v4(),
            name: format!("p{points}-{wins}"),
            wins,
            losses,
            draws: 0,
            points,
            points_for,
            points_against: points_for.map(|pf| 60 - pf),
        },
    )
}

proptest! {
    #[test]
    fn single_elimination_needs_ceil_log2_rounds(n in 2usize..5000) {
        let plan = plan_bracket(CompetitionFormat::SingleElimination, n, &CompetitionSettings::default()).unwrap();
        prop_assert_eq!(plan.rounds.len(), rounds_needed(n));
        prop_assert_eq!(plan.total_rounds, Some(rounds_needed(n) as u32));

        let (last, earlier) = plan.rounds.split_last().unwrap();
        prop_assert_eq!(last.players_advance, None);
        prop_assert!(earlier.iter().all(|r| r.players_advance == Some(1)));
        prop_assert!(plan.rounds.iter().all(|r| r.total_groups >= 1 && r.is_elimination_round));
    }

    #[test]
    fn round_numbers_are_contiguous(n in 2usize..2000) {
        for format in [CompetitionFormat::DoubleElimination, CompetitionFormat::Swiss] {
            let plan = plan_bracket(format, n, &CompetitionSettings::default()).unwrap();
            let numbers: Vec<u32> = plan.rounds.iter().map(|r| r.round_number).collect();
            let expected: Vec<u32> = (1..=plan.rounds.len() as u32).collect();
            prop_assert_eq!(numbers, expected);
        }
    }

    #[test]
    fn swiss_rounds_are_capped_at_eight(n in 2usize..100_000) {
        let plan = plan_bracket(CompetitionFormat::Swiss, n, &CompetitionSettings::default()).unwrap();
        prop_assert_eq!(plan.rounds.len(), rounds_needed(n).min(8));
        prop_assert!(plan.rounds.iter().all(|r| r.total_groups as usize == n / 2));
    }

    #[test]
    fn standings_are_a_stable_permutation(lines in prop::collection::vec(stat_line_strategy(), 0..40)) {
        let table = calculate_standings(&lines);
        prop_assert_eq!(table.len(), lines.len());

        let positions: Vec<u32> = table.iter().map(|s| s.position).collect();
        let expected: Vec<u32> = (1..=lines.len() as u32).collect();
        prop_assert_eq!(positions, expected);

        let input: BTreeSet<Uuid> = lines.iter().map(|l| l.participant_id).collect();
        let output: BTreeSet<Uuid> = table.iter().map(|s| s.participant_id).collect();
        prop_assert_eq!(input, output);

        prop_assert!(table.windows(2).all(|w| w[0].points >= w[1].points));
        prop_assert_eq!(calculate_standings(&lines), table);
    }

    #[test]
    fn group_generation_seats_everyone_once(n in 0usize..120, total_groups in 1u32..16) {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap();
        let entrants: Vec<Identity> = (0..n).map(|i| Identity::named(format!("P{i}"))).collect();
        let mut round = Round::new(1, "Round 1", total_groups, now);
        round.generate_groups(&entrants, now).unwrap();

        prop_assert_eq!(round.groups().len(), total_groups as usize);
        let seated = round.all_participants();
        let expected: Vec<Uuid> = entrants.iter().map(|i| i.id).collect();
        prop_assert_eq!(seated, expected);
        prop_assert!(round.groups().iter().all(|g| g.participant_count() <= g.max_players() as usize));
    }
}
