//! Tournament ranking points and the national ranking recompute.

use crate::config::RankingSettings;
use crate::logic::global_ranking::aggregate;
use crate::logic::ranking_points::assign_positions;
use crate::models::{PlayerRanking, PointScale, RankingRecord, TournamentError, TournamentId, TournamentStatus};
use crate::store;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Store final positions and points of a finished tournament, replacing earlier ones.
pub fn assign_ranking_points(
    conn: &mut Connection,
    tournament_id: TournamentId,
    scale: &PointScale,
) -> Result<Vec<RankingRecord>, TournamentError> {
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    tournament.require_status(TournamentStatus::Finished)?;

    let mut rounds = Vec::new();
    for phase in store::phases::list_by_tournament(&tx, tournament_id)?
        .iter()
        .rev()
        .filter(|p| p.kind.is_elimination())
    {
        rounds.push(store::matches::list_by_phase(&tx, phase.id)?);
    }
    let entrants = store::entrants::list_by_tournament(&tx, tournament_id)?;
    let records = assign_positions(&rounds, &entrants, scale)?;

    store::rankings::delete_for_tournament(&tx, tournament_id)?;
    for record in &records {
        store::rankings::insert_record(&tx, record)?;
    }
    tx.commit()?;
    log::info!("Assigned ranking points to {} entrants of {}", records.len(), tournament.name);
    Ok(records)
}

/// Rebuild every player's national and annual ranking from all stored results.
pub fn recompute_global_ranking(
    conn: &mut Connection,
    today: NaiveDate,
    settings: &RankingSettings,
) -> Result<Vec<PlayerRanking>, TournamentError> {
    let tx = conn.transaction()?;
    let results = store::rankings::list_results(&tx)?;
    let rankings = aggregate(&results, today, settings);
    store::players::reset_rankings(&tx)?;
    for ranking in &rankings {
        store::players::update_ranking(&tx, ranking)?;
    }
    tx.commit()?;
    log::info!(
        "Recomputed the national ranking from {} results: {} ranked players",
        results.len(),
        rankings.len()
    );
    Ok(rankings)
}
