//! Playoff generation, round advancement and closing the tournament.

use crate::logic::bracket::{build_bracket, main_bracket_seeds, plan_bracket, prelim_matches};
use crate::logic::qualifiers::{select_qualifiers, Qualifier};
use crate::logic::rounds::next_round;
use crate::models::{
    round_name, EntrantId, EntrantStatus, GameMatch, Phase, PhaseKind, Tournament, TournamentError,
    TournamentId, TournamentStatus,
};
use crate::store;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// Everything written by [`generate_playoffs`].
#[derive(Clone, Debug, Serialize)]
pub struct Playoffs {
    pub qualifiers: Vec<Qualifier>,
    /// The preliminary round (if any), then the first main round.
    pub phases: Vec<Phase>,
    pub matches: Vec<GameMatch>,
}

/// A newly generated elimination round.
#[derive(Clone, Debug, Serialize)]
pub struct RoundAdvance {
    pub phase: Phase,
    pub matches: Vec<GameMatch>,
}

fn elimination_kind(matches: usize) -> PhaseKind {
    if matches == 1 {
        PhaseKind::Final
    } else {
        PhaseKind::Elimination
    }
}

/// Most recent elimination phase of a tournament.
pub(crate) fn current_elimination_phase(
    conn: &Connection,
    tournament_id: TournamentId,
) -> Result<Phase, TournamentError> {
    store::phases::list_by_tournament(conn, tournament_id)?
        .into_iter()
        .rev()
        .find(|p| p.kind.is_elimination())
        .ok_or_else(|| TournamentError::InvalidState("playoffs have not been generated".to_string()))
}

/// Select the qualifiers of a finished group stage and lay out the elimination bracket.
///
/// Qualifiers beyond the bracket size first meet in a preliminary round whose winners
/// already have their slots in the main bracket.
pub fn generate_playoffs(conn: &mut Connection, tournament_id: TournamentId) -> Result<Playoffs, TournamentError> {
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    tournament.require_status(TournamentStatus::GroupStage)?;
    let group_phase = store::phases::find_group_phase(&tx, tournament_id)?
        .ok_or_else(|| TournamentError::InvalidState("groups have not been generated".to_string()))?;

    let group_matches = store::matches::list_by_phase(&tx, group_phase.id)?;
    let pending = group_matches.iter().filter(|m| !m.is_completed()).count();
    if pending > 0 {
        return Err(TournamentError::PendingMatches { pending });
    }

    let groups = store::groups::list_by_phase(&tx, group_phase.id)?;
    let entrants = store::entrants::list_by_tournament(&tx, tournament_id)?;
    let qualifiers = select_qualifiers(
        &groups,
        &entrants,
        &group_matches,
        tournament.config.qualifiers_per_group,
    )?;
    let seed_list: Vec<EntrantId> = qualifiers.iter().map(|q| q.entrant_id).collect();
    let plan = plan_bracket(&seed_list, tournament.config.playoff_target_size as usize)?;

    let mut sequence = store::phases::next_sequence_order(&tx, tournament_id)?;
    let mut phases = Vec::new();
    let mut matches = Vec::new();
    let mut round = 1;

    let prelims = if plan.excess() > 0 {
        let phase = Phase::new(tournament_id, "Preliminary round", PhaseKind::EliminationPrelim, sequence);
        sequence += 1;
        let prelims = prelim_matches(phase.id, round, &plan);
        round += 1;
        phases.push(phase);
        prelims
    } else {
        Vec::new()
    };
    let seeds = main_bracket_seeds(&plan, &prelims);
    matches.extend(prelims);

    let first_round_matches = plan.size / 2;
    let main_phase = Phase::new(
        tournament_id,
        round_name(first_round_matches),
        elimination_kind(first_round_matches),
        sequence,
    );
    matches.extend(build_bracket(main_phase.id, round, &seeds, plan.size)?);
    phases.push(main_phase);

    for phase in &phases {
        store::phases::insert_phase(&tx, phase)?;
    }
    for m in &matches {
        store::matches::insert_match(&tx, m)?;
    }

    let qualified: HashSet<EntrantId> = seed_list.iter().copied().collect();
    for entrant in entrants
        .iter()
        .filter(|e| e.is_active() && !qualified.contains(&e.id))
    {
        store::entrants::update_status(&tx, entrant.id, EntrantStatus::Eliminated)?;
    }

    store::tournaments::update_status(&tx, tournament_id, TournamentStatus::Playoffs)?;
    tx.commit()?;
    log::info!(
        "Generated playoffs for {}: {} qualifiers, bracket of {}, {} preliminary matches",
        tournament.name,
        qualifiers.len(),
        plan.size,
        plan.excess()
    );
    Ok(Playoffs { qualifiers, phases, matches })
}

/// Pair the winners of the latest elimination round into the next one.
pub fn generate_next_round(
    conn: &mut Connection,
    tournament_id: TournamentId,
) -> Result<RoundAdvance, TournamentError> {
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    tournament.require_status(TournamentStatus::Playoffs)?;
    let current = current_elimination_phase(&tx, tournament_id)?;
    let round = store::matches::list_by_phase(&tx, current.id)?;

    let phase_id = Uuid::new_v4();
    let matches = next_round(&round, phase_id)?;
    let phase = Phase {
        id: phase_id,
        ..Phase::new(
            tournament_id,
            round_name(matches.len()),
            elimination_kind(matches.len()),
            store::phases::next_sequence_order(&tx, tournament_id)?,
        )
    };
    store::phases::insert_phase(&tx, &phase)?;
    for m in &matches {
        store::matches::insert_match(&tx, m)?;
    }
    tx.commit()?;
    log::info!("{}: advanced to {} ({} matches)", tournament.name, phase.name, matches.len());
    Ok(RoundAdvance { phase, matches })
}

/// Close the tournament once its final has a winner.
pub fn finalize_tournament(conn: &mut Connection, tournament_id: TournamentId) -> Result<Tournament, TournamentError> {
    let tx = conn.transaction()?;
    let mut tournament = store::tournaments::get(&tx, tournament_id)?;
    tournament.require_status(TournamentStatus::Playoffs)?;
    let current = current_elimination_phase(&tx, tournament_id)?;
    if current.kind != PhaseKind::Final {
        return Err(TournamentError::InvalidState(format!(
            "the current round is {}, not the final",
            current.name
        )));
    }
    let final_round = store::matches::list_by_phase(&tx, current.id)?;
    let pending = final_round
        .iter()
        .filter(|m| !m.is_completed() || m.winner.is_none())
        .count();
    if pending > 0 {
        return Err(TournamentError::PendingMatches { pending });
    }

    store::tournaments::update_status(&tx, tournament_id, TournamentStatus::Finished)?;
    tx.commit()?;
    tournament.status = TournamentStatus::Finished;
    log::info!("{} is finished", tournament.name);
    Ok(tournament)
}
