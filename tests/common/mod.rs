//! Shared fixtures: in-memory database, tournaments, rosters and result helpers.
#![allow(dead_code)]

use carom_tournament::store::{self, open_in_memory};
use carom_tournament::{
    create_player, create_tournament, record_match_result, register_entrant, Entrant, GameMatch,
    MatchResult, Registration, Tournament, TournamentConfig, TournamentId,
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 7)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub fn open_with(config: TournamentConfig) -> (Connection, Tournament) {
    let conn = open_in_memory().unwrap();
    let tournament = create_tournament(&conn, "Spring Open", start_time(), config).unwrap();
    (conn, tournament)
}

/// Register `n` new players; the first registered has the best average.
pub fn enroll(conn: &mut Connection, tournament_id: TournamentId, prefix: &str, n: usize) -> Vec<Entrant> {
    (0..n)
        .map(|i| {
            let player = create_player(conn, &format!("{prefix} {i:03}"), None).unwrap();
            let registration = Registration {
                player_id: player.id,
                handicap: 20 + (i as u32 % 5),
                average: (n - i) as f64 / 10.0,
            };
            register_entrant(conn, tournament_id, &registration).unwrap()
        })
        .collect()
}

pub fn win(score1: u32, score2: u32) -> MatchResult {
    MatchResult {
        score1,
        score2,
        innings: 10,
        high_run1: 3,
        high_run2: 2,
        finished: true,
    }
}

/// Matches ready to be played: both players known, not completed.
pub fn playable(conn: &Connection, tournament_id: TournamentId) -> Vec<GameMatch> {
    store::matches::list_by_tournament(conn, tournament_id)
        .unwrap()
        .into_iter()
        .filter(|m| !m.is_completed() && m.has_both_players())
        .collect()
}

/// Play every open match (player 1 wins) until nothing is left to play.
pub fn play_out(conn: &mut Connection, tournament_id: TournamentId) {
    loop {
        let open = playable(conn, tournament_id);
        if open.is_empty() {
            break;
        }
        for m in open {
            record_match_result(conn, m.id, &win(20, 10)).unwrap();
        }
    }
}
