//! Integration tests for the group stage: formation, scheduling, GSL slots, standings.

mod common;

use carom_tournament::logic::GroupSchedule;
use carom_tournament::models::{GroupFormat, PairingPolicy, WinReason};
use carom_tournament::store;
use carom_tournament::{
    create_player, disqualify_entrant, generate_groups, group_standings, preview_groups,
    record_match_result, register_entrant, swap_entrants, tournament_standings, EntrantStatus,
    MatchResult, Registration, TournamentConfig, TournamentError, TournamentStatus,
};
use chrono::Duration;
use common::{enroll, open_with, play_out, start_time, win};
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

#[test]
fn waitlisted_entrants_never_form_groups() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    let entrants = enroll(&mut conn, t.id, "Player", 84);
    let waitlisted: HashSet<_> = entrants
        .iter()
        .filter(|e| e.status == EntrantStatus::Waitlist)
        .map(|e| e.id)
        .collect();
    assert_eq!(waitlisted.len(), 20);

    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    assert_eq!(stage.groups.len(), 16);
    assert!(stage.groups.iter().all(|g| g.members.len() == 4));
    assert!(stage
        .groups
        .iter()
        .flat_map(|g| g.members.iter())
        .all(|id| !waitlisted.contains(id)));
    assert_eq!(stage.matches.len(), 16 * 6);
    assert_eq!(
        store::tournaments::get(&conn, t.id).unwrap().status,
        TournamentStatus::GroupStage
    );
}

#[test]
fn snake_seeding_balances_groups() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    let entrants = enroll(&mut conn, t.id, "Player", 64);
    // Registration order is also seed order: averages strictly decrease.
    let seed_rank: HashMap<_, usize> = entrants.iter().enumerate().map(|(i, e)| (e.id, i + 1)).collect();

    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    let sums: Vec<usize> = stage
        .groups
        .iter()
        .map(|g| g.members.iter().map(|id| seed_rank[id]).sum())
        .collect();
    let spread = sums.iter().max().unwrap() - sums.iter().min().unwrap();
    assert!(spread <= 4, "seed sums {sums:?}");

    let groups = stage.groups.len();
    for g in &stage.groups {
        let ranks: Vec<usize> = g.members.iter().map(|id| seed_rank[id]).collect();
        assert!(!(ranks.contains(&1) && ranks.contains(&groups)));
        // Members are stored best seed first.
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn formation_does_not_depend_on_registration_order() {
    let mut averages: Vec<f64> = (0..24).map(|i| 0.5 + i as f64 / 20.0).collect();
    let reference = averages.clone();
    averages.shuffle(&mut rand::thread_rng());

    let layout = |avgs: &[f64]| {
        let (mut conn, t) = open_with(TournamentConfig::default());
        for avg in avgs {
            let player = create_player(&conn, &format!("Player {avg:.2}"), None).unwrap();
            register_entrant(&mut conn, t.id, &Registration { player_id: player.id, handicap: 20, average: *avg })
                .unwrap();
        }
        preview_groups(&conn, t.id, &HashMap::new())
            .unwrap()
            .into_iter()
            .map(|plan| (plan.name, plan.members.into_iter().map(|e| e.name).collect::<Vec<_>>()))
            .collect::<Vec<_>>()
    };
    assert_eq!(layout(&reference), layout(&averages));
}

#[test]
fn groups_are_laid_out_over_tables_and_blocks() {
    let config = TournamentConfig { tables_available: 3, block_minutes: 60, ..Default::default() };
    let (mut conn, t) = open_with(config);
    enroll(&mut conn, t.id, "Player", 20);

    let late = start_time() + Duration::hours(5);
    let overrides = HashMap::from([(
        "B".to_string(),
        GroupSchedule { table_number: Some(9), start_time: Some(late) },
    )]);
    let stage = generate_groups(&mut conn, t.id, &overrides).unwrap();
    let names: Vec<&str> = stage.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    let tables: Vec<u32> = stage.groups.iter().map(|g| g.table_number).collect();
    assert_eq!(tables, vec![1, 9, 3, 1, 2]);
    assert_eq!(stage.groups[1].start_time, late);
    assert_eq!(stage.groups[3].start_time, start_time() + Duration::minutes(60));
}

#[test]
fn preview_writes_nothing() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    enroll(&mut conn, t.id, "Player", 10);
    let plans = preview_groups(&conn, t.id, &HashMap::new()).unwrap();
    assert_eq!(plans.len(), 3);
    assert!(store::phases::list_by_tournament(&conn, t.id).unwrap().is_empty());
    assert_eq!(store::tournaments::get(&conn, t.id).unwrap().status, TournamentStatus::Registration);
}

#[test]
fn generating_twice_fails_with_fixture_already_exists() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    enroll(&mut conn, t.id, "Player", 8);
    generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    assert!(matches!(
        generate_groups(&mut conn, t.id, &HashMap::new()),
        Err(TournamentError::FixtureAlreadyExists)
    ));
    assert_eq!(store::phases::list_by_tournament(&conn, t.id).unwrap().len(), 1);
}

#[test]
fn no_active_players_is_a_validation_error() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    let err = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap_err();
    assert!(matches!(err, TournamentError::InsufficientPlayers));
    assert!(store::phases::list_by_tournament(&conn, t.id).unwrap().is_empty());
}

#[test]
fn gsl_group_fills_later_matches_as_results_arrive() {
    let config = TournamentConfig { group_format: GroupFormat::Gsl, ..Default::default() };
    let (mut conn, t) = open_with(config);
    let seeds = enroll(&mut conn, t.id, "Player", 4);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    assert_eq!(stage.groups[0].policy, PairingPolicy::GslQuartet);
    let m = &stage.matches;
    assert_eq!(m.len(), 5);

    // Seed 4 upsets seed 1; seed 2 beats seed 3.
    record_match_result(&mut conn, m[0].id, &win(12, 20)).unwrap();
    record_match_result(&mut conn, m[1].id, &win(20, 15)).unwrap();

    let winners = store::matches::get(&conn, m[2].id).unwrap();
    assert_eq!((winners.player1, winners.player2), (Some(seeds[3].id), Some(seeds[1].id)));
    let losers = store::matches::get(&conn, m[3].id).unwrap();
    assert_eq!((losers.player1, losers.player2), (Some(seeds[0].id), Some(seeds[2].id)));

    let tie = MatchResult { score1: 20, score2: 20, innings: 18, finished: true, ..Default::default() };
    assert!(matches!(
        record_match_result(&mut conn, m[2].id, &tie),
        Err(TournamentError::InvalidResult(_))
    ));

    record_match_result(&mut conn, m[2].id, &win(20, 8)).unwrap();
    record_match_result(&mut conn, m[3].id, &win(20, 8)).unwrap();
    let decider = store::matches::get(&conn, m[4].id).unwrap();
    assert_eq!((decider.player1, decider.player2), (Some(seeds[1].id), Some(seeds[0].id)));
}

#[test]
fn round_robin_allows_draws_and_scores_them() {
    let (mut conn, t) = open_with(TournamentConfig { group_size: 3, ..Default::default() });
    enroll(&mut conn, t.id, "Player", 3);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    assert_eq!(stage.matches.len(), 3);

    let tie = MatchResult { score1: 15, score2: 15, innings: 30, finished: true, ..Default::default() };
    let drawn = record_match_result(&mut conn, stage.matches[0].id, &tie).unwrap();
    assert!(drawn.is_draw());

    let rows = group_standings(&conn, stage.groups[0].id).unwrap();
    let draws: u32 = rows.iter().map(|r| r.draws).sum();
    assert_eq!(draws, 2);
    assert!(rows.iter().filter(|r| r.draws == 1).all(|r| r.points == 1));
}

#[test]
fn disqualification_awards_walkovers_without_touching_averages() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    let entrants = enroll(&mut conn, t.id, "Player", 4);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();

    // Seed 2 plays one normal match first.
    let opener = stage
        .matches
        .iter()
        .find(|m| m.involves(entrants[1].id) && m.involves(entrants[2].id))
        .unwrap();
    record_match_result(&mut conn, opener.id, &win(20, 12)).unwrap();

    let settled = disqualify_entrant(&mut conn, t.id, entrants[3].id).unwrap();
    assert_eq!(settled.len(), 3);
    for m in &settled {
        assert_eq!(m.win_reason, Some(WinReason::Wo));
        assert_eq!(m.innings, Some(0));
        let winner = m.winner.unwrap();
        assert_eq!(m.sheet_for(winner).unwrap().0, t.config.group_points_limit);
    }

    let rows = group_standings(&conn, stage.groups[0].id).unwrap();
    let second = rows.iter().find(|r| r.entrant_id == entrants[1].id).unwrap();
    assert_eq!(second.played, 1);
    assert_eq!(second.wins, 2);
    assert_eq!(second.innings, 10);
    assert!((second.average - 2.0).abs() < 1e-9);

    assert!(matches!(
        disqualify_entrant(&mut conn, t.id, entrants[3].id),
        Err(TournamentError::InvalidState(_))
    ));
}

#[test]
fn sheets_beyond_the_phase_limits_are_rejected() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    enroll(&mut conn, t.id, "Player", 4);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    let m = &stage.matches[0];

    let too_long = MatchResult { innings: t.config.group_innings_limit + 1, ..win(20, 10) };
    assert!(matches!(
        record_match_result(&mut conn, m.id, &too_long),
        Err(TournamentError::InvalidResult(_))
    ));
    assert!(matches!(
        record_match_result(&mut conn, m.id, &win(t.config.group_points_limit + 1, 10)),
        Err(TournamentError::InvalidResult(_))
    ));
    assert!(!store::matches::get(&conn, m.id).unwrap().is_completed());

    let at_limit = MatchResult { innings: t.config.group_innings_limit, ..win(20, 10) };
    assert!(record_match_result(&mut conn, m.id, &at_limit).unwrap().is_completed());
}

#[test]
fn handicap_caps_each_players_score() {
    let (mut conn, t) = open_with(TournamentConfig { use_handicap: true, ..Default::default() });
    let entrants = enroll(&mut conn, t.id, "Player", 4);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    let (low, high) = (&entrants[0], &entrants[2]);
    assert_eq!((low.handicap, high.handicap), (20, 22));
    let m = stage
        .matches
        .iter()
        .find(|m| m.involves(low.id) && m.involves(high.id))
        .unwrap();
    let sheet = |low_score: u32, high_score: u32| {
        if m.player1 == Some(low.id) {
            win(low_score, high_score)
        } else {
            win(high_score, low_score)
        }
    };

    assert!(matches!(
        record_match_result(&mut conn, m.id, &sheet(21, 10)),
        Err(TournamentError::InvalidResult(_))
    ));
    let decided = record_match_result(&mut conn, m.id, &sheet(15, 22)).unwrap();
    assert_eq!(decided.winner, Some(high.id));
}

#[test]
fn walkover_target_follows_handicap_when_enabled() {
    let (mut conn, t) = open_with(TournamentConfig { use_handicap: true, ..Default::default() });
    let entrants = enroll(&mut conn, t.id, "Player", 4);
    generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();

    let settled = disqualify_entrant(&mut conn, t.id, entrants[0].id).unwrap();
    for m in &settled {
        let winner = m.winner.unwrap();
        let handicap = entrants.iter().find(|e| e.id == winner).unwrap().handicap;
        assert_eq!(m.sheet_for(winner).unwrap().0, handicap);
    }
}

#[test]
fn swap_exchanges_matches_and_group_membership() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    enroll(&mut conn, t.id, "Player", 8);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    let (group_a, group_b) = (&stage.groups[0], &stage.groups[1]);
    let (a, b) = (group_a.members[0], group_b.members[0]);

    swap_entrants(&mut conn, t.id, a, b).unwrap();

    let a_matches = store::matches::list_by_group(&conn, group_a.id).unwrap();
    assert!(a_matches.iter().all(|m| !m.involves(a)));
    assert_eq!(a_matches.iter().filter(|m| m.involves(b)).count(), 3);
    let stored_a = store::groups::get(&conn, group_a.id).unwrap();
    assert_eq!(stored_a.members[0], b);
    let stored_b = store::groups::get(&conn, group_b.id).unwrap();
    assert_eq!(stored_b.members[0], a);

    assert!(matches!(
        swap_entrants(&mut conn, t.id, a, a),
        Err(TournamentError::InvalidConfiguration(_))
    ));
}

#[test]
fn tournament_standings_rank_by_points_then_average() {
    let (mut conn, t) = open_with(TournamentConfig::default());
    enroll(&mut conn, t.id, "Player", 8);
    generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    play_out(&mut conn, t.id);

    let rows = tournament_standings(&conn, t.id).unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), (1..=8).collect::<Vec<_>>());
    assert!(rows.windows(2).all(|w| w[0].points >= w[1].points));
    assert_eq!(rows[0].points, 6);
    assert!(rows[0].particular_average > 0.0);
}
