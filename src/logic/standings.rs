//! Standings calculator: a pure reduction of the match log into ranked rows.
//!
//! Walkovers count toward wins, losses and points but never toward caroms,
//! innings or matches played, so they cannot distort averages.

use crate::models::{Entrant, EntrantId, GameMatch, StandingsRow};
use std::cmp::Ordering;
use std::collections::HashMap;

const WIN_POINTS: u32 = 2;
const DRAW_POINTS: u32 = 1;

/// Running totals for one entrant while folding over matches.
#[derive(Default)]
struct Tally {
    played: u32,
    wins: u32,
    losses: u32,
    draws: u32,
    points: u32,
    carom_for: u32,
    carom_against: u32,
    innings: u32,
    high_run: u32,
    best_match_average: f64,
}

impl Tally {
    fn record(&mut self, m: &GameMatch, entrant: EntrantId) {
        let Some((carom_for, carom_against, high_run)) = m.sheet_for(entrant) else {
            return;
        };
        match m.winner {
            Some(w) if w == entrant => {
                self.wins += 1;
                self.points += WIN_POINTS;
            }
            Some(_) => self.losses += 1,
            None => {
                self.draws += 1;
                self.points += DRAW_POINTS;
            }
        }
        if m.is_walkover() {
            return;
        }
        let innings = m.innings.unwrap_or(0);
        self.played += 1;
        self.carom_for += carom_for;
        self.carom_against += carom_against;
        self.innings += innings;
        self.high_run = self.high_run.max(high_run);
        if innings > 0 {
            self.best_match_average = self
                .best_match_average
                .max(f64::from(carom_for) / f64::from(innings));
        }
    }

    fn into_row(self, entrant: &Entrant, track_particular: bool) -> StandingsRow {
        let average = ratio(self.carom_for, u64::from(self.innings));
        let weighted_average = ratio(
            self.carom_for,
            u64::from(entrant.handicap) * u64::from(self.played),
        );
        StandingsRow {
            entrant_id: entrant.id,
            name: entrant.name.clone(),
            handicap: entrant.handicap,
            rank: 0,
            played: self.played,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            points: self.points,
            carom_for: self.carom_for,
            carom_against: self.carom_against,
            innings: self.innings,
            high_run: self.high_run,
            average,
            weighted_average,
            particular_average: if track_particular { self.best_match_average } else { 0.0 },
        }
    }
}

fn ratio(numerator: u32, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / denominator as f64
    }
}

/// Unsorted rows, one per entrant, in the order given.
fn tally(entrants: &[Entrant], matches: &[GameMatch], track_particular: bool) -> Vec<StandingsRow> {
    let mut tallies: HashMap<EntrantId, Tally> =
        entrants.iter().map(|e| (e.id, Tally::default())).collect();
    for m in matches
        .iter()
        .filter(|m| m.is_completed() && m.has_both_players())
    {
        for slot in [m.player1, m.player2].into_iter().flatten() {
            if let Some(t) = tallies.get_mut(&slot) {
                t.record(m, slot);
            }
        }
    }
    entrants
        .iter()
        .map(|e| {
            tallies
                .remove(&e.id)
                .unwrap_or_default()
                .into_row(e, track_particular)
        })
        .collect()
}

/// Group ordering: points, fewer decided matches, carom difference, higher handicap, caroms.
pub fn compare_group(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(a.decided().cmp(&b.decided()))
        .then(b.carom_difference().cmp(&a.carom_difference()))
        .then(b.handicap.cmp(&a.handicap))
        .then(b.carom_for.cmp(&a.carom_for))
}

/// Tournament-wide ordering: points, then general average.
pub fn compare_global(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.average.total_cmp(&a.average))
}

fn ranked(mut rows: Vec<StandingsRow>, compare: fn(&StandingsRow, &StandingsRow) -> Ordering) -> Vec<StandingsRow> {
    rows.sort_by(compare);
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    rows
}

/// Standings of one group. `members` should be in seed order; it breaks exact ties.
pub fn group_standings(members: &[Entrant], matches: &[GameMatch]) -> Vec<StandingsRow> {
    ranked(tally(members, matches, false), compare_group)
}

/// Standings across every match of the tournament, with best single-match averages.
pub fn global_standings(entrants: &[Entrant], matches: &[GameMatch]) -> Vec<StandingsRow> {
    ranked(tally(entrants, matches, true), compare_global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntrantStatus, MatchResult};
    use uuid::Uuid;

    fn entrant(name: &str, handicap: u32) -> Entrant {
        Entrant {
            id: Uuid::new_v4(),
            tournament_id: Uuid::nil(),
            player_id: Uuid::new_v4(),
            name: name.to_string(),
            club: None,
            handicap,
            average: 0.0,
            status: EntrantStatus::Active,
            registration_order: 0,
            ranking_snapshot: 0,
        }
    }

    fn played(a: &Entrant, b: &Entrant, score_a: u32, score_b: u32, innings: u32) -> GameMatch {
        let mut m = GameMatch::new(Uuid::nil(), None, 1, 0, Some(a.id), Some(b.id));
        let result = MatchResult {
            score1: score_a,
            score2: score_b,
            innings,
            high_run1: score_a.min(4),
            high_run2: score_b.min(4),
            finished: true,
        };
        m.apply_result(&result, true).unwrap();
        m
    }

    #[test]
    fn walkover_counts_for_points_but_not_averages() {
        let p1 = entrant("P1", 20);
        let p2 = entrant("P2", 20);
        let p3 = entrant("P3", 20);
        let normal = played(&p1, &p2, 20, 12, 10);
        let mut wo = GameMatch::new(Uuid::nil(), None, 1, 1, Some(p1.id), Some(p3.id));
        wo.award_walkover(p1.id, 20).unwrap();

        let rows = group_standings(&[p1.clone(), p2, p3], &[normal, wo]);
        let row = rows.iter().find(|r| r.entrant_id == p1.id).unwrap();
        assert_eq!(row.played, 1);
        assert_eq!(row.wins, 2);
        assert_eq!(row.points, 4);
        assert_eq!(row.innings, 10);
        assert_eq!(row.carom_for, 20);
        assert!((row.average - 2.0).abs() < 1e-9);
        assert!((row.weighted_average - 1.0).abs() < 1e-9);
    }

    #[test]
    fn averages_are_zero_without_innings() {
        let p1 = entrant("P1", 0);
        let rows = group_standings(&[p1], &[]);
        assert_eq!(rows[0].average, 0.0);
        assert_eq!(rows[0].weighted_average, 0.0);
        assert_eq!(rows[0].rank, 1);
    }

    #[test]
    fn draw_gives_one_point_each() {
        let a = entrant("A", 20);
        let b = entrant("B", 20);
        let m = played(&a, &b, 15, 15, 20);
        let rows = group_standings(&[a, b], &[m]);
        assert!(rows.iter().all(|r| r.points == 1 && r.draws == 1));
    }

    #[test]
    fn fewer_matches_ranks_higher_on_equal_points() {
        // GSL-like: A wins twice; B wins twice and loses once.
        let a = entrant("A", 20);
        let b = entrant("B", 20);
        let c = entrant("C", 20);
        let d = entrant("D", 20);
        let matches = vec![
            played(&a, &d, 20, 5, 10),
            played(&b, &c, 20, 5, 10),
            played(&a, &b, 20, 19, 10),
            played(&c, &d, 20, 5, 10),
            played(&b, &c, 20, 5, 10),
        ];
        let rows = group_standings(&[a.clone(), b.clone(), c, d], &matches);
        assert_eq!(rows[0].entrant_id, a.id);
        assert_eq!(rows[1].entrant_id, b.id);
    }

    #[test]
    fn carom_difference_then_handicap_break_ties() {
        let a = entrant("A", 20);
        let b = entrant("B", 30);
        let c = entrant("C", 25);
        // Each wins once with the same difference; handicap decides.
        let matches = vec![
            played(&a, &b, 20, 10, 10),
            played(&b, &c, 20, 10, 10),
            played(&c, &a, 20, 10, 10),
        ];
        let rows = group_standings(&[a, b.clone(), c.clone()], &matches);
        assert_eq!(rows[0].entrant_id, b.id);
        assert_eq!(rows[1].entrant_id, c.id);
    }

    #[test]
    fn global_standings_track_best_match_average() {
        let a = entrant("A", 20);
        let b = entrant("B", 20);
        let matches = vec![played(&a, &b, 20, 10, 10), played(&b, &a, 12, 20, 5)];
        let rows = global_standings(&[a.clone(), b], &matches);
        assert_eq!(rows[0].entrant_id, a.id);
        assert!((rows[0].particular_average - 4.0).abs() < 1e-9);
        assert!((rows[0].average - 40.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn open_matches_are_ignored() {
        let a = entrant("A", 20);
        let b = entrant("B", 20);
        let open = GameMatch::new(Uuid::nil(), None, 1, 0, Some(a.id), Some(b.id));
        let rows = group_standings(&[a, b], &[open]);
        assert!(rows.iter().all(|r| r.points == 0 && r.decided() == 0));
    }
}
