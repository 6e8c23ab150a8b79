//! Match results, walkovers and the entrant swaps and disqualifications that cause them.

use crate::logic::roster::promotable;
use crate::logic::rounds::resolve_feeds;
use crate::models::{
    Entrant, EntrantId, EntrantStatus, GameMatch, MatchId, MatchResult, Phase, PhaseId, PhaseKind,
    Tournament, TournamentError, TournamentId, TournamentStatus,
};
use crate::services::entrant_of;
use crate::store;
use rusqlite::Connection;
use std::collections::HashMap;

/// Caroms a player needs to win a match: their handicap, or the phase points limit.
/// A walkover credits the winner with exactly this.
fn walkover_target(tournament: &Tournament, kind: PhaseKind, winner: &Entrant) -> u32 {
    if tournament.config.use_handicap {
        winner.handicap
    } else {
        tournament.config.points_limit(kind)
    }
}

/// Reject a sheet above the innings limit of the phase or above a player's target.
fn check_limits(
    tournament: &Tournament,
    kind: PhaseKind,
    m: &GameMatch,
    result: &MatchResult,
    entrants: &HashMap<EntrantId, Entrant>,
) -> Result<(), TournamentError> {
    let innings_limit = tournament.config.innings_limit(kind);
    if result.innings > innings_limit {
        return Err(TournamentError::InvalidResult(format!(
            "{} innings exceed the limit of {innings_limit}",
            result.innings
        )));
    }
    for (slot, score) in [(m.player1, result.score1), (m.player2, result.score2)] {
        let Some(entrant) = slot.and_then(|id| entrants.get(&id)) else {
            continue;
        };
        let target = walkover_target(tournament, kind, entrant);
        if score > target {
            return Err(TournamentError::InvalidResult(format!(
                "{} cannot score {score}, the target is {target}",
                entrant.name
            )));
        }
    }
    Ok(())
}

/// Tournament-wide state needed to push decided matches into the slots they feed.
struct Cascade<'a> {
    tournament: &'a Tournament,
    entrants: HashMap<EntrantId, Entrant>,
    phase_kinds: HashMap<PhaseId, PhaseKind>,
    matches: Vec<GameMatch>,
}

impl<'a> Cascade<'a> {
    fn load(conn: &Connection, tournament: &'a Tournament) -> Result<Self, TournamentError> {
        Ok(Self {
            tournament,
            entrants: store::entrants::list_by_tournament(conn, tournament.id)?
                .into_iter()
                .map(|e| (e.id, e))
                .collect(),
            phase_kinds: store::phases::list_by_tournament(conn, tournament.id)?
                .into_iter()
                .map(|p| (p.id, p.kind))
                .collect(),
            matches: store::matches::list_by_tournament(conn, tournament.id)?,
        })
    }

    fn is_disqualified(&self, entrant: Option<EntrantId>) -> bool {
        entrant
            .and_then(|id| self.entrants.get(&id))
            .is_some_and(|e| e.status == EntrantStatus::Disqualified)
    }

    /// Settle `m` as a walkover against its disqualified participant, if it has one.
    fn settle_disqualified(&self, m: &mut GameMatch) -> Result<bool, TournamentError> {
        if m.is_completed() || !m.has_both_players() {
            return Ok(false);
        }
        let absent = [m.player1, m.player2]
            .into_iter()
            .flatten()
            .find(|id| self.is_disqualified(Some(*id)));
        let Some(absent) = absent else {
            return Ok(false);
        };
        let Some(winner) = m.opponent_of(absent) else {
            return Ok(false);
        };
        if self.is_disqualified(Some(winner)) {
            return Ok(false);
        }
        let winner_entrant = self
            .entrants
            .get(&winner)
            .ok_or(TournamentError::not_found("Entrant", winner))?;
        let kind = self
            .phase_kinds
            .get(&m.phase_id)
            .copied()
            .ok_or(TournamentError::not_found("Phase", m.phase_id))?;
        m.award_walkover(winner, walkover_target(self.tournament, kind, winner_entrant))?;
        log::warn!("Walkover to {} in match {}: opponent is disqualified", winner_entrant.name, m.id);
        Ok(true)
    }

    /// Fill every slot fed by `decided`, walking over disqualified entrants as slots resolve.
    fn propagate(&mut self, conn: &Connection, decided: GameMatch) -> Result<(), TournamentError> {
        let mut queue = vec![decided];
        while let Some(done) = queue.pop() {
            for id in resolve_feeds(&mut self.matches, &done) {
                let Some(index) = self.matches.iter().position(|m| m.id == id) else {
                    continue;
                };
                let mut m = self.matches[index].clone();
                if self.settle_disqualified(&mut m)? {
                    queue.push(m.clone());
                }
                store::matches::update_match(conn, &m)?;
                self.matches[index] = m;
            }
        }
        Ok(())
    }
}

/// Whether anything downstream already relies on the current result of `m`.
fn result_locked(conn: &Connection, phase: &Phase, m: &GameMatch, cascade: &Cascade) -> Result<bool, TournamentError> {
    let feeds_played = cascade.matches.iter().any(|other| {
        other.is_completed()
            && [other.player1_source, other.player2_source]
                .into_iter()
                .flatten()
                .any(|s| s.feeding_match() == m.id)
    });
    if feeds_played {
        return Ok(true);
    }
    if matches!(phase.kind, PhaseKind::Elimination | PhaseKind::Final) {
        let later = store::phases::list_by_tournament(conn, phase.tournament_id)?
            .iter()
            .any(|p| p.sequence_order > phase.sequence_order);
        return Ok(later);
    }
    Ok(false)
}

/// Record a referee score sheet for one match.
///
/// A finished sheet completes the match, fills the slots it feeds and, in the playoffs,
/// eliminates the loser. A completed match may be corrected until a result depends on it.
pub fn record_match_result(
    conn: &mut Connection,
    match_id: MatchId,
    result: &MatchResult,
) -> Result<GameMatch, TournamentError> {
    let tx = conn.transaction()?;
    let mut m = store::matches::get(&tx, match_id)?;
    let phase = store::phases::get(&tx, m.phase_id)?;
    let tournament = store::tournaments::get(&tx, phase.tournament_id)?;
    let expected = if phase.kind.is_elimination() {
        TournamentStatus::Playoffs
    } else {
        TournamentStatus::GroupStage
    };
    tournament.require_status(expected)?;

    let mut cascade = Cascade::load(&tx, &tournament)?;
    let previous_loser = m.loser();
    if m.is_completed() {
        if !result.finished {
            return Err(TournamentError::InvalidState(
                "a completed match cannot be reopened".to_string(),
            ));
        }
        if m.is_walkover() || result_locked(&tx, &phase, &m, &cascade)? {
            return Err(TournamentError::InvalidState(
                "this result can no longer be changed".to_string(),
            ));
        }
    }

    let allow_draw = match m.group_id {
        Some(group_id) => store::groups::get(&tx, group_id)?.policy.allows_draws(),
        None => false,
    };
    check_limits(&tournament, phase.kind, &m, result, &cascade.entrants)?;
    m.apply_result(result, allow_draw)?;
    store::matches::update_match(&tx, &m)?;

    if m.is_completed() {
        if phase.kind.is_elimination() {
            if let Some(previous) = previous_loser.filter(|p| Some(*p) != m.loser()) {
                store::entrants::update_status(&tx, previous, EntrantStatus::Active)?;
            }
            if let Some(loser) = m.loser() {
                store::entrants::update_status(&tx, loser, EntrantStatus::Eliminated)?;
            }
        }
        cascade.propagate(&tx, m.clone())?;
    }
    tx.commit()?;
    log::info!(
        "Recorded {}-{} in match {} ({:?})",
        m.score1.unwrap_or(0),
        m.score2.unwrap_or(0),
        m.id,
        m.status
    );
    Ok(m)
}

/// Exchange two entrants of a tournament in every match, group and status.
pub fn swap_entrants(
    conn: &mut Connection,
    tournament_id: TournamentId,
    a: EntrantId,
    b: EntrantId,
) -> Result<(), TournamentError> {
    if a == b {
        return Err(TournamentError::InvalidConfiguration(
            "cannot swap an entrant with itself".to_string(),
        ));
    }
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    if tournament.status == TournamentStatus::Finished {
        return Err(TournamentError::InvalidState(
            "entrants of a finished tournament cannot be swapped".to_string(),
        ));
    }
    let first = entrant_of(&tx, tournament_id, a)?;
    let second = entrant_of(&tx, tournament_id, b)?;

    let mut touched = 0;
    for mut m in store::matches::list_by_tournament(&tx, tournament_id)? {
        if m.swap_entrants(a, b) {
            store::matches::update_match(&tx, &m)?;
            touched += 1;
        }
    }
    store::groups::swap_members(&tx, a, b)?;
    if first.status != second.status {
        store::entrants::update_status(&tx, a, second.status)?;
        store::entrants::update_status(&tx, b, first.status)?;
    }
    tx.commit()?;
    log::info!("Swapped {} and {} across {} matches", first.name, second.name, touched);
    Ok(())
}

/// Disqualify an entrant: every open match with a known opponent becomes a walkover
/// for that opponent, and later matches fed by those walkovers are filled in.
/// Before groups are drawn, an active entrant's spot passes to the earliest waitlisted one.
/// Returns the matches settled by walkover.
pub fn disqualify_entrant(
    conn: &mut Connection,
    tournament_id: TournamentId,
    entrant_id: EntrantId,
) -> Result<Vec<GameMatch>, TournamentError> {
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    if tournament.status == TournamentStatus::Finished {
        return Err(TournamentError::InvalidState(
            "entrants of a finished tournament cannot be disqualified".to_string(),
        ));
    }
    let entrant = entrant_of(&tx, tournament_id, entrant_id)?;
    if entrant.status == EntrantStatus::Disqualified {
        return Err(TournamentError::InvalidState(format!(
            "{} is already disqualified",
            entrant.name
        )));
    }
    store::entrants::update_status(&tx, entrant_id, EntrantStatus::Disqualified)?;

    // During registration the freed spot goes to the head of the waitlist.
    let mut promoted = None;
    if tournament.status == TournamentStatus::Registration && entrant.is_active() {
        let remaining = store::entrants::list_by_tournament(&tx, tournament_id)?;
        if let Some(next) = promotable(&remaining).into_iter().next() {
            store::entrants::update_status(&tx, next.id, EntrantStatus::Active)?;
            promoted = Some(next.name.clone());
        }
    }

    let mut cascade = Cascade::load(&tx, &tournament)?;
    let mut settled = Vec::new();
    for index in 0..cascade.matches.len() {
        let mut m = cascade.matches[index].clone();
        if !m.involves(entrant_id) || !cascade.settle_disqualified(&mut m)? {
            continue;
        }
        store::matches::update_match(&tx, &m)?;
        cascade.matches[index] = m.clone();
        settled.push(m);
    }
    for m in &settled {
        cascade.propagate(&tx, m.clone())?;
    }
    tx.commit()?;
    log::warn!(
        "{} disqualified from {}: {} walkovers awarded",
        entrant.name,
        tournament.name,
        settled.len()
    );
    if let Some(name) = promoted {
        log::info!("{} promoted from the waitlist of {}", name, tournament.name);
    }
    Ok(settled)
}
