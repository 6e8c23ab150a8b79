//! Integration tests for the playoffs: bracket layout, repechage, advancement, ranking points.

mod common;

use carom_tournament::models::{Category, PhaseKind, PointScale, SlotSource, WinReason};
use carom_tournament::store;
use carom_tournament::{
    assign_ranking_points, disqualify_entrant, finalize_tournament, generate_groups,
    generate_next_round, generate_playoffs, record_match_result, recompute_global_ranking,
    EntrantStatus, RankingSettings, TournamentConfig, TournamentError, TournamentStatus,
};
use chrono::NaiveDate;
use common::{enroll, open_with, play_out, win};
use std::collections::HashMap;

fn four_team_playoff() -> TournamentConfig {
    TournamentConfig {
        qualifiers_per_group: 2,
        playoff_target_size: 4,
        ..Default::default()
    }
}

#[test]
fn playoffs_wait_for_every_group_match() {
    let (mut conn, t) = open_with(four_team_playoff());
    enroll(&mut conn, t.id, "Player", 8);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    record_match_result(&mut conn, stage.matches[0].id, &win(20, 5)).unwrap();

    assert!(matches!(
        generate_playoffs(&mut conn, t.id),
        Err(TournamentError::PendingMatches { pending: 11 })
    ));
    assert_eq!(store::phases::list_by_tournament(&conn, t.id).unwrap().len(), 1);
    assert_eq!(store::tournaments::get(&conn, t.id).unwrap().status, TournamentStatus::GroupStage);
}

#[test]
fn full_tournament_from_groups_to_ranking() {
    let (mut conn, t) = open_with(four_team_playoff());
    let entrants = enroll(&mut conn, t.id, "Player", 8);
    generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    play_out(&mut conn, t.id);

    let playoffs = generate_playoffs(&mut conn, t.id).unwrap();
    assert_eq!(playoffs.qualifiers.len(), 4);
    assert!(playoffs.qualifiers[..2].iter().all(|q| q.rank_in_group == 1));
    assert_eq!(playoffs.phases.len(), 1);
    assert_eq!(playoffs.phases[0].name, "Semifinals");
    assert_eq!(playoffs.matches.len(), 2);

    let seeds: Vec<_> = playoffs.qualifiers.iter().map(|q| q.entrant_id).collect();
    let semi = &playoffs.matches[0];
    assert_eq!((semi.player1, semi.player2), (Some(seeds[0]), Some(seeds[3])));
    for e in &entrants {
        let stored = store::entrants::get(&conn, e.id).unwrap();
        let expected = if seeds.contains(&e.id) { EntrantStatus::Active } else { EntrantStatus::Eliminated };
        assert_eq!(stored.status, expected);
    }

    // One semifinal open: no new round, no new rows.
    record_match_result(&mut conn, playoffs.matches[0].id, &win(25, 10)).unwrap();
    let match_rows = store::matches::list_by_tournament(&conn, t.id).unwrap().len();
    assert!(matches!(
        generate_next_round(&mut conn, t.id),
        Err(TournamentError::PendingMatches { pending: 1 })
    ));
    assert_eq!(store::phases::list_by_tournament(&conn, t.id).unwrap().len(), 2);
    assert_eq!(store::matches::list_by_tournament(&conn, t.id).unwrap().len(), match_rows);
    assert!(matches!(
        finalize_tournament(&mut conn, t.id),
        Err(TournamentError::InvalidState(_))
    ));

    record_match_result(&mut conn, playoffs.matches[1].id, &win(25, 10)).unwrap();
    let final_round = generate_next_round(&mut conn, t.id).unwrap();
    assert_eq!(final_round.phase.kind, PhaseKind::Final);
    assert_eq!(final_round.matches.len(), 1);
    assert_eq!(
        (final_round.matches[0].player1, final_round.matches[0].player2),
        (Some(seeds[0]), Some(seeds[1]))
    );

    record_match_result(&mut conn, final_round.matches[0].id, &win(30, 22)).unwrap();
    assert!(matches!(
        generate_next_round(&mut conn, t.id),
        Err(TournamentError::TournamentComplete)
    ));
    assert!(matches!(
        assign_ranking_points(&mut conn, t.id, &PointScale::default()),
        Err(TournamentError::InvalidState(_))
    ));

    let finished = finalize_tournament(&mut conn, t.id).unwrap();
    assert_eq!(finished.status, TournamentStatus::Finished);

    let records = assign_ranking_points(&mut conn, t.id, &PointScale::default()).unwrap();
    assert_eq!(records.len(), 8);
    let by_entrant: HashMap<_, _> = records.iter().map(|r| (r.entrant_id, (r.position, r.points))).collect();
    assert_eq!(by_entrant[&seeds[0]], (1, 60));
    assert_eq!(by_entrant[&seeds[1]], (2, 50));
    assert_eq!(by_entrant[&seeds[2]], (3, 40));
    assert_eq!(by_entrant[&seeds[3]], (3, 40));
    assert_eq!(records.iter().filter(|r| r.position == 5 && r.points == 30).count(), 4);

    let again = assign_ranking_points(&mut conn, t.id, &PointScale::default()).unwrap();
    let again_by_entrant: HashMap<_, _> = again.iter().map(|r| (r.entrant_id, (r.position, r.points))).collect();
    assert_eq!(by_entrant, again_by_entrant);
    assert_eq!(store::rankings::list_for_tournament(&conn, t.id).unwrap().len(), 8);

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    recompute_global_ranking(&mut conn, today, &RankingSettings::default()).unwrap();
    let champion = entrants.iter().find(|e| e.id == seeds[0]).unwrap();
    let player = store::players::get(&conn, champion.player_id).unwrap();
    assert_eq!(player.ranking, 60);
    assert_eq!(player.ranking_annual, 60);
    assert_eq!(player.category, Category::C);
    assert_eq!(player.tournaments_played, 1);
}

#[test]
fn excess_qualifiers_play_a_preliminary_round() {
    let config = TournamentConfig {
        max_players: 128,
        qualifiers_per_group: 2,
        playoff_target_size: 32,
        ..Default::default()
    };
    let (mut conn, t) = open_with(config);
    enroll(&mut conn, t.id, "Player", 108);
    let stage = generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    assert_eq!(stage.groups.len(), 27);
    play_out(&mut conn, t.id);

    let playoffs = generate_playoffs(&mut conn, t.id).unwrap();
    assert_eq!(playoffs.qualifiers.len(), 54);
    assert_eq!(playoffs.phases.len(), 2);
    let (prelim_phase, main_phase) = (&playoffs.phases[0], &playoffs.phases[1]);
    assert_eq!(prelim_phase.kind, PhaseKind::EliminationPrelim);
    assert_eq!(main_phase.kind, PhaseKind::Elimination);
    assert_eq!(main_phase.name, "Round of 32");

    let prelims = store::matches::list_by_phase(&conn, prelim_phase.id).unwrap();
    assert_eq!(prelims.len(), 22);
    let main = store::matches::list_by_phase(&conn, main_phase.id).unwrap();
    assert_eq!(main.len(), 16);
    let fed_slots = main
        .iter()
        .flat_map(|m| [m.player1_source, m.player2_source])
        .filter(|s| matches!(s, Some(SlotSource::WinnerOf(_))))
        .count();
    assert_eq!(fed_slots, 22);
    let direct_slots = main
        .iter()
        .flat_map(|m| [m.player1, m.player2])
        .flatten()
        .count();
    assert_eq!(direct_slots, 10);

    for m in &prelims {
        record_match_result(&mut conn, m.id, &win(25, 11)).unwrap();
    }
    let main = store::matches::list_by_phase(&conn, main_phase.id).unwrap();
    assert!(main.iter().all(|m| m.has_both_players()));
    for m in &prelims {
        let loser = store::entrants::get(&conn, m.player2.unwrap()).unwrap();
        assert_eq!(loser.status, EntrantStatus::Eliminated);
    }
}

#[test]
fn disqualified_seed_forfeits_once_the_prelim_winner_arrives() {
    let config = TournamentConfig {
        qualifiers_per_group: 2,
        playoff_target_size: 4,
        ..Default::default()
    };
    let (mut conn, t) = open_with(config.clone());
    enroll(&mut conn, t.id, "Player", 12);
    generate_groups(&mut conn, t.id, &HashMap::new()).unwrap();
    play_out(&mut conn, t.id);

    let playoffs = generate_playoffs(&mut conn, t.id).unwrap();
    assert_eq!(playoffs.qualifiers.len(), 6);
    let prelims: Vec<_> = playoffs.matches.iter().filter(|m| m.phase_id == playoffs.phases[0].id).collect();
    assert_eq!(prelims.len(), 2);

    let top_seed = playoffs.qualifiers[0].entrant_id;
    let settled = disqualify_entrant(&mut conn, t.id, top_seed).unwrap();
    assert!(settled.is_empty());

    let feeder = prelims[1];
    let decided = record_match_result(&mut conn, feeder.id, &win(25, 9)).unwrap();
    let prelim_winner = decided.winner.unwrap();

    let main = store::matches::list_by_phase(&conn, playoffs.phases[1].id).unwrap();
    let forfeited = main.iter().find(|m| m.involves(top_seed)).unwrap();
    assert!(forfeited.is_completed());
    assert_eq!(forfeited.win_reason, Some(WinReason::Wo));
    assert_eq!(forfeited.winner, Some(prelim_winner));
    assert_eq!(
        forfeited.sheet_for(prelim_winner).unwrap().0,
        config.elimination_points_limit
    );
}
