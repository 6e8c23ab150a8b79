//! Tournament and player creation, entrant registration, roster import and removal.

use crate::logic::roster::{initial_status, parse_roster_csv, promotable};
use crate::models::{
    Entrant, EntrantId, EntrantStatus, Player, PlayerId, Tournament, TournamentConfig,
    TournamentError, TournamentId, TournamentStatus,
};
use crate::services::entrant_of;
use crate::store;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Deserialize;
use std::io::Read;
use uuid::Uuid;

/// Registration request for an existing global player.
#[derive(Clone, Debug, Deserialize)]
pub struct Registration {
    pub player_id: PlayerId,
    pub handicap: u32,
    #[serde(default)]
    pub average: f64,
}

pub fn create_tournament(
    conn: &Connection,
    name: &str,
    start_time: NaiveDateTime,
    config: TournamentConfig,
) -> Result<Tournament, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::InvalidConfiguration(
            "tournament name cannot be empty".to_string(),
        ));
    }
    config.validate()?;
    let tournament = Tournament::new(name, start_time, config);
    store::tournaments::insert_tournament(conn, &tournament)?;
    log::info!("Created tournament {} ({})", tournament.name, tournament.id);
    Ok(tournament)
}

/// Create a global player. Names are unique across the federation.
pub fn create_player(conn: &Connection, name: &str, club: Option<&str>) -> Result<Player, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::InvalidConfiguration(
            "player name cannot be empty".to_string(),
        ));
    }
    if store::players::find_by_name(conn, name)?.is_some() {
        return Err(TournamentError::InvalidState(format!(
            "a player named {name} already exists"
        )));
    }
    let player = Player::new(name, club.map(str::to_string));
    store::players::insert_player(conn, &player)?;
    Ok(player)
}

fn validate_average(average: f64) -> Result<(), TournamentError> {
    if !average.is_finite() || average < 0.0 {
        return Err(TournamentError::InvalidConfiguration(format!(
            "average must be a non-negative number (got {average})"
        )));
    }
    Ok(())
}

/// Insert one entrant: active while there is room, waitlisted once `max_players` is reached.
fn enroll(
    conn: &Connection,
    tournament: &Tournament,
    player: &Player,
    handicap: u32,
    average: f64,
) -> Result<Entrant, TournamentError> {
    validate_average(average)?;
    if store::entrants::is_registered(conn, tournament.id, player.id)? {
        return Err(TournamentError::InvalidState(format!(
            "{} is already registered",
            player.name
        )));
    }
    let active = store::entrants::count_active(conn, tournament.id)?;
    let entrant = Entrant {
        id: Uuid::new_v4(),
        tournament_id: tournament.id,
        player_id: player.id,
        name: player.name.clone(),
        club: player.club.clone(),
        handicap,
        average,
        status: initial_status(active, tournament.config.max_players),
        registration_order: store::entrants::next_registration_order(conn, tournament.id)?,
        ranking_snapshot: player.ranking,
    };
    store::entrants::insert_entrant(conn, &entrant)?;
    if entrant.status == EntrantStatus::Waitlist {
        log::info!("{} joins the waitlist of {}", entrant.name, tournament.name);
    }
    Ok(entrant)
}

pub fn register_entrant(
    conn: &mut Connection,
    tournament_id: TournamentId,
    registration: &Registration,
) -> Result<Entrant, TournamentError> {
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    tournament.require_status(TournamentStatus::Registration)?;
    let player = store::players::get(&tx, registration.player_id)?;
    let entrant = enroll(&tx, &tournament, &player, registration.handicap, registration.average)?;
    tx.commit()?;
    Ok(entrant)
}

/// Register every row of a `name,club,handicap,average` file, creating unknown players.
/// The whole file is rejected if any row fails.
pub fn import_roster_csv<R: Read>(
    conn: &mut Connection,
    tournament_id: TournamentId,
    reader: R,
) -> Result<Vec<Entrant>, TournamentError> {
    let rows = parse_roster_csv(reader)?;
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    tournament.require_status(TournamentStatus::Registration)?;

    let mut entrants = Vec::with_capacity(rows.len());
    for row in &rows {
        let player = store::players::upsert_by_name(&tx, &row.name, row.club.as_deref())?;
        entrants.push(enroll(&tx, &tournament, &player, row.handicap, row.average)?);
    }
    tx.commit()?;
    log::info!("Imported {} entrants into {}", entrants.len(), tournament.name);
    Ok(entrants)
}

/// Delete entrants and fill each freed active spot from the waitlist, earliest first.
/// Returns the promoted entrants.
pub fn remove_entrants(
    conn: &mut Connection,
    tournament_id: TournamentId,
    entrant_ids: &[EntrantId],
) -> Result<Vec<Entrant>, TournamentError> {
    let tx = conn.transaction()?;
    let tournament = store::tournaments::get(&tx, tournament_id)?;
    if store::phases::find_group_phase(&tx, tournament_id)?.is_some() {
        return Err(TournamentError::InvalidState(
            "entrants cannot be removed once groups exist".to_string(),
        ));
    }
    tournament.require_status(TournamentStatus::Registration)?;

    let mut freed = 0;
    for id in entrant_ids {
        let entrant = entrant_of(&tx, tournament_id, *id)?;
        if entrant.is_active() {
            freed += 1;
        }
        store::entrants::delete(&tx, entrant.id)?;
    }

    let remaining = store::entrants::list_by_tournament(&tx, tournament_id)?;
    let mut promoted = Vec::new();
    for entrant in promotable(&remaining).into_iter().take(freed) {
        store::entrants::update_status(&tx, entrant.id, EntrantStatus::Active)?;
        let mut entrant = entrant.clone();
        entrant.status = EntrantStatus::Active;
        promoted.push(entrant);
    }
    tx.commit()?;
    log::info!(
        "Removed {} entrants from {}, promoted {} from the waitlist",
        entrant_ids.len(),
        tournament.name,
        promoted.len()
    );
    Ok(promoted)
}
