//! Integration tests for the group lifecycle: roster, results, standings and advancement.

use chrono::{DateTime, TimeZone, Utc};
use competition_engine::models::{ErrorKind, GroupStatus};
use competition_engine::{CompetitionError, Group, Identity, MatchStatistics};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
}

fn group_with(names: &[&str]) -> (Group, Vec<Identity>) {
    let mut group = Group::new(1, "Group A", 8, now());
    let ids: Vec<Identity> = names.iter().map(|n| Identity::named(*n)).collect();
    for (i, identity) in ids.iter().enumerate() {
        group.add_participant(identity.clone(), Some(i as u32 + 1), now()).unwrap();
    }
    (group, ids)
}

fn stats(points: i64, wins: u32) -> MatchStatistics {
    MatchStatistics {
        wins,
        points,
        ..Default::default()
    }
}

#[test]
fn positions_are_assigned_in_join_order() {
    let (group, ids) = group_with(&["Ann", "Bob", "Cid"]);
    let positions: Vec<u32> = group.roster().iter().map(|p| p.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
    assert_eq!(group.participant(ids[2].id).unwrap().seed, Some(3));
    assert_eq!(group.standings().len(), 3);
}

#[test]
fn duplicate_and_overfull_rosters_are_rejected() {
    let mut group = Group::new(1, "Group A", 2, now());
    let ann = Identity::named("Ann");
    group.add_participant(ann.clone(), None, now()).unwrap();
    let err = group.add_participant(ann, None, now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);

    group.add_participant(Identity::named("Bob"), None, now()).unwrap();
    assert!(group.is_full());
    let err = group.add_participant(Identity::named("Cid"), None, now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionNotMet);
    assert_eq!(group.participant_count(), 2);
}

#[test]
fn start_needs_two_players_and_a_pending_group() {
    let (mut group, _) = group_with(&["Ann"]);
    assert!(!group.can_start());
    let err = group.start(now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionNotMet);
    assert_eq!(group.status(), GroupStatus::Pending);

    group.add_participant(Identity::named("Bob"), None, now()).unwrap();
    group.start(now()).unwrap();
    assert_eq!(group.status(), GroupStatus::Active);
    assert_eq!(group.progress(), 50);

    let err = group.start(now()).unwrap_err();
    assert!(matches!(err, CompetitionError::InvalidStateTransition { .. }));
}

#[test]
fn points_tie_is_broken_by_wins() {
    let (mut group, ids) = group_with(&["One", "Two", "Three"]);
    group.start(now()).unwrap();
    group.record_result(ids[0].id, &stats(10, 3), now()).unwrap();
    group.record_result(ids[1].id, &stats(10, 4), now()).unwrap();
    group.record_result(ids[2].id, &stats(7, 1), now()).unwrap();

    let order: Vec<_> = group.standings().iter().map(|s| s.participant_id).collect();
    assert_eq!(order, vec![ids[1].id, ids[0].id, ids[2].id]);
    assert_eq!(group.participant_by_position(1).unwrap().name, "Two");
}

#[test]
fn results_accumulate() {
    let (mut group, ids) = group_with(&["Ann", "Bob"]);
    group.record_result(ids[0].id, &stats(3, 1), now()).unwrap();
    group.record_result(ids[0].id, &stats(1, 0), now()).unwrap();
    let ann = group.participant(ids[0].id).unwrap();
    assert_eq!(ann.points, 4);
    assert_eq!(ann.wins, 1);
}

#[test]
fn completion_advances_the_top_of_the_table() {
    let (mut group, ids) = group_with(&["Ann", "Bob", "Cid", "Dee"]);
    group.start(now()).unwrap();
    group.record_result(ids[2].id, &stats(9, 3), now()).unwrap();
    group.record_result(ids[3].id, &stats(6, 2), now()).unwrap();
    group.complete(Some(2), now()).unwrap();

    let advanced: Vec<_> = group.advancing_participants().map(|p| p.participant_id).collect();
    assert_eq!(advanced, vec![ids[2].id, ids[3].id]);
    assert!(group.roster().iter().all(|p| !p.eliminated));
    assert_eq!(group.progress(), 100);
}

#[test]
fn advancement_larger_than_roster_advances_everyone() {
    let (mut group, _) = group_with(&["Ann", "Bob"]);
    group.start(now()).unwrap();
    group.complete(Some(5), now()).unwrap();
    assert_eq!(group.advancing_participants().count(), 2);
}

#[test]
fn completing_twice_fails_and_leaves_standings_alone() {
    let (mut group, ids) = group_with(&["Ann", "Bob"]);
    group.start(now()).unwrap();
    group.record_result(ids[1].id, &stats(3, 1), now()).unwrap();
    group.complete(Some(1), now()).unwrap();
    let before = group.clone();

    let err = group.complete(Some(1), now()).unwrap_err();
    assert!(matches!(err, CompetitionError::InvalidStateTransition { .. }));
    assert_eq!(group, before);
}

#[test]
fn completing_a_pending_group_is_an_invalid_transition() {
    let (mut group, _) = group_with(&["Ann", "Bob"]);
    let err = group.complete(None, now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
}

#[test]
fn finished_groups_are_frozen() {
    let (mut group, ids) = group_with(&["Ann", "Bob"]);
    group.start(now()).unwrap();
    group.complete(None, now()).unwrap();

    for err in [
        group.add_participant(Identity::named("Late"), None, now()).unwrap_err(),
        group.remove_participant(ids[0].id, now()).unwrap_err(),
        group.record_result(ids[0].id, &stats(3, 1), now()).unwrap_err(),
        group.cancel(now()).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
    }
    assert_eq!(group.participant_count(), 2);
}

#[test]
fn unknown_participant_is_not_found() {
    let (mut group, _) = group_with(&["Ann", "Bob"]);
    let stranger = Identity::named("Stranger");
    let err = group.record_result(stranger.id, &stats(1, 1), now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn removing_keeps_standings_in_sync() {
    let (mut group, ids) = group_with(&["Ann", "Bob", "Cid"]);
    group.remove_participant(ids[1].id, now()).unwrap();
    assert_eq!(group.participant_count(), 2);
    assert!(group.standings().iter().all(|s| s.participant_id != ids[1].id));
}

#[test]
fn manual_elimination_only_flags_the_participant() {
    let (mut group, ids) = group_with(&["Ann", "Bob"]);
    group.eliminate_participant(ids[0].id, now()).unwrap();
    assert_eq!(group.active_participants().count(), 1);
    assert_eq!(group.participant_count(), 2);
}

#[test]
fn cancelled_group_reports_no_progress() {
    let (mut group, _) = group_with(&["Ann", "Bob"]);
    group.start(now()).unwrap();
    group.cancel(now()).unwrap();
    assert_eq!(group.status(), GroupStatus::Cancelled);
    assert_eq!(group.progress(), 0);
}

#[test]
fn overflowing_results_are_refused_without_changes() {
    let (mut group, ids) = group_with(&["Ann", "Bob"]);
    let huge = MatchStatistics {
        wins: u32::MAX,
        ..Default::default()
    };
    group.record_result(ids[0].id, &huge, now()).unwrap();
    let one_loss = MatchStatistics {
        losses: 1,
        ..Default::default()
    };
    group.record_result(ids[0].id, &one_loss, now()).unwrap();
    assert_eq!(group.standings()[0].matches_played, u32::MAX);

    let before = group.clone();
    let err = group.record_result(ids[0].id, &stats(0, 1), now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionNotMet);
    assert_eq!(group, before);

    group.record_result(ids[1].id, &stats(i64::MAX, 0), now()).unwrap();
    let err = group.record_result(ids[1].id, &stats(1, 0), now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionNotMet);
    assert_eq!(group.participant(ids[1].id).unwrap().points, i64::MAX);
}

#[test]
fn capacity_is_read_through_accessors() {
    let group = Group::new(3, "Group C", 5, now());
    assert_eq!(group.max_players(), 5);
    assert_eq!(group.status(), GroupStatus::Pending);
}
