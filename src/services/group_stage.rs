//! Group stage generation, its dry-run preview, and standings views.

use crate::logic::group_matches::generate_group_matches;
use crate::logic::groups::{plan_groups, GroupPlan, GroupSchedule};
use crate::logic::roster::eligible;
use crate::logic::standings;
use crate::models::{
    EntrantStatus, GameMatch, Group, GroupId, Phase, PhaseKind, StandingsRow, TournamentError,
    TournamentId, TournamentStatus,
};
use crate::store;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Everything written by [`generate_groups`].
#[derive(Clone, Debug, Serialize)]
pub struct GroupStage {
    pub phase: Phase,
    pub groups: Vec<Group>,
    pub matches: Vec<GameMatch>,
}

/// The groups `generate_groups` would create right now. Writes nothing.
pub fn preview_groups(
    conn: &Connection,
    tournament_id: TournamentId,
    overrides: &HashMap<String, GroupSchedule>,
) -> Result<Vec<GroupPlan>, TournamentError> {
    let tournament = store::tournaments::get(conn, tournament_id)?;
    let entrants = store::entrants::list_by_tournament(conn, tournament_id)?;
    plan_groups(&tournament, &eligible(&entrants), overrides)
}

/// Form the groups of a tournament, schedule them, and create every group match.
pub fn generate_groups(
    conn: &mut Connection,
    tournament_id: TournamentId,
    overrides: &HashMap<String, GroupSchedule>,
) -> Result<GroupStage, TournamentError> {
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    if store::phases::find_group_phase(&tx, tournament_id)?.is_some() {
        return Err(TournamentError::FixtureAlreadyExists);
    }
    tournament.require_status(TournamentStatus::Registration)?;

    let entrants = store::entrants::list_by_tournament(&tx, tournament_id)?;
    let plans = plan_groups(&tournament, &eligible(&entrants), overrides)?;

    let phase = Phase::new(
        tournament_id,
        "Group stage",
        PhaseKind::Group,
        store::phases::next_sequence_order(&tx, tournament_id)?,
    );
    store::phases::insert_phase(&tx, &phase)?;

    let mut groups = Vec::with_capacity(plans.len());
    let mut matches = Vec::new();
    for plan in plans {
        let group = Group {
            id: Uuid::new_v4(),
            phase_id: phase.id,
            name: plan.name,
            table_number: plan.table_number,
            start_time: plan.start_time,
            policy: plan.policy,
            members: plan.members.iter().map(|e| e.id).collect(),
        };
        store::groups::insert_group(&tx, &group)?;
        for m in generate_group_matches(phase.id, group.id, group.policy, &group.members) {
            store::matches::insert_match(&tx, &m)?;
            matches.push(m);
        }
        groups.push(group);
    }

    store::tournaments::update_status(&tx, tournament_id, TournamentStatus::GroupStage)?;
    tx.commit()?;
    log::info!(
        "Generated {} groups and {} matches for {}",
        groups.len(),
        matches.len(),
        tournament.name
    );
    Ok(GroupStage { phase, groups, matches })
}

pub fn group_standings(conn: &Connection, group_id: GroupId) -> Result<Vec<StandingsRow>, TournamentError> {
    let group = store::groups::get(conn, group_id)?;
    let members = group
        .members
        .iter()
        .map(|id| store::entrants::get(conn, *id))
        .collect::<Result<Vec<_>, _>>()?;
    let matches = store::matches::list_by_group(conn, group_id)?;
    Ok(standings::group_standings(&members, &matches))
}

/// Tournament-wide table over every match played so far.
pub fn tournament_standings(
    conn: &Connection,
    tournament_id: TournamentId,
) -> Result<Vec<StandingsRow>, TournamentError> {
    store::tournaments::get(conn, tournament_id)?;
    let entrants: Vec<_> = store::entrants::list_by_tournament(conn, tournament_id)?
        .into_iter()
        .filter(|e| e.status != EntrantStatus::Waitlist)
        .collect();
    let matches = store::matches::list_by_tournament(conn, tournament_id)?;
    Ok(standings::global_standings(&entrants, &matches))
}
