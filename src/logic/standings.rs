//! Standings: rank a roster by points, then wins, then point difference.

use crate::models::{Standing, StatLine};
use std::cmp::Ordering;

/// Percentage of matches won, rounded to two decimals. 0 when nothing was played.
pub fn win_percentage(wins: u32, matches_played: u32) -> f64 {
    if matches_played == 0 {
        return 0.0;
    }
    let pct = wins as f64 / matches_played as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Point difference only breaks ties when both sides track it.
fn compare_point_difference(a: &StatLine, b: &StatLine) -> Ordering {
    match (a.point_difference(), b.point_difference()) {
        (Some(a), Some(b)) => b.cmp(&a),
        _ => Ordering::Equal,
    }
}

fn compare(a: &StatLine, b: &StatLine) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| compare_point_difference(a, b))
}

/// Order the records and assign positions 1..=N.
///
/// The sort is stable: records still tied after every key keep their input order, so the
/// same roster always yields the same table.
pub fn calculate_standings(lines: &[StatLine]) -> Vec<Standing> {
    let mut ordered: Vec<&StatLine> = lines.iter().collect();
    ordered.sort_by(|a, b| compare(a, b));

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let matches_played = line.matches_played();
            Standing {
                position: index as u32 + 1,
                participant_id: line.participant_id,
                name: line.name.clone(),
                matches_played,
                wins: line.wins,
                losses: line.losses,
                draws: line.draws,
                points: line.points,
                points_for: line.points_for,
                points_against: line.points_against,
                point_difference: line.point_difference(),
                win_percentage: win_percentage(line.wins, matches_played),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn line(name: &str, points: i64, wins: u32) -> StatLine {
        StatLine {
            participant_id: Uuid::new_v4(),
            name: name.to_string(),
            wins,
            losses: 0,
            draws: 0,
            points,
            points_for: None,
            points_against: None,
        }
    }

    fn names(standings: &[Standing]) -> Vec<&str> {
        standings.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn points_tie_is_broken_by_wins() {
        let lines = vec![line("1", 10, 3), line("2", 10, 4), line("3", 7, 1)];
        let standings = calculate_standings(&lines);
        assert_eq!(names(&standings), vec!["2", "1", "3"]);
        assert_eq!(
            standings.iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn point_difference_breaks_remaining_ties_when_tracked() {
        let mut a = line("a", 6, 2);
        a.points_for = Some(30);
        a.points_against = Some(28);
        let mut b = line("b", 6, 2);
        b.points_for = Some(33);
        b.points_against = Some(20);
        let standings = calculate_standings(&[a, b]);
        assert_eq!(names(&standings), vec!["b", "a"]);
        assert_eq!(standings[0].point_difference, Some(13));
    }

    #[test]
    fn untracked_difference_keeps_input_order() {
        let lines = vec![line("x", 3, 1), line("y", 3, 1), line("z", 3, 1)];
        assert_eq!(names(&calculate_standings(&lines)), vec!["x", "y", "z"]);
    }

    #[test]
    fn win_percentage_is_rounded_and_safe_on_zero() {
        assert_eq!(win_percentage(0, 0), 0.0);
        assert_eq!(win_percentage(1, 3), 33.33);
        assert_eq!(win_percentage(2, 3), 66.67);
        assert_eq!(win_percentage(4, 4), 100.0);
    }

    #[test]
    fn empty_roster_gives_empty_table() {
        assert!(calculate_standings(&[]).is_empty());
    }
}
