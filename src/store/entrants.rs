use crate::models::{Entrant, EntrantId, EntrantStatus, PlayerId, TournamentError, TournamentId};
use crate::store::parse_enum;
use rusqlite::{params, Connection, OptionalExtension};

const SELECT: &str = "SELECT tp.id, tp.tournament_id, tp.player_id, p.name, p.club, tp.handicap, tp.average, tp.status, tp.registration_order, tp.ranking_snapshot FROM tournament_players tp JOIN players p ON p.id = tp.player_id";

pub fn insert_entrant(conn: &Connection, e: &Entrant) -> Result<(), TournamentError> {
    conn.execute(
        "INSERT INTO tournament_players (id, tournament_id, player_id, handicap, average, status, registration_order, ranking_snapshot) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            e.id,
            e.tournament_id,
            e.player_id,
            e.handicap,
            e.average,
            e.status.as_str(),
            e.registration_order,
            e.ranking_snapshot,
        ],
    )?;
    Ok(())
}

fn parse_entrant_row(row: &rusqlite::Row) -> rusqlite::Result<Entrant> {
    Ok(Entrant {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        player_id: row.get(2)?,
        name: row.get(3)?,
        club: row.get(4)?,
        handicap: row.get(5)?,
        average: row.get(6)?,
        status: parse_enum(row, 7)?,
        registration_order: row.get(8)?,
        ranking_snapshot: row.get(9)?,
    })
}

pub fn find_by_id(conn: &Connection, id: EntrantId) -> Result<Option<Entrant>, TournamentError> {
    let sql = format!("{SELECT} WHERE tp.id = ?1");
    Ok(conn.query_row(&sql, params![id], parse_entrant_row).optional()?)
}

pub fn get(conn: &Connection, id: EntrantId) -> Result<Entrant, TournamentError> {
    find_by_id(conn, id)?.ok_or(TournamentError::not_found("Entrant", id))
}

/// All entrants of a tournament in registration order.
pub fn list_by_tournament(conn: &Connection, tournament_id: TournamentId) -> Result<Vec<Entrant>, TournamentError> {
    let sql = format!("{SELECT} WHERE tp.tournament_id = ?1 ORDER BY tp.registration_order ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_entrant_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn is_registered(
    conn: &Connection,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<bool, TournamentError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tournament_players WHERE tournament_id = ?1 AND player_id = ?2",
        params![tournament_id, player_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn count_active(conn: &Connection, tournament_id: TournamentId) -> Result<usize, TournamentError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tournament_players WHERE tournament_id = ?1 AND status = ?2",
        params![tournament_id, EntrantStatus::Active.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Next free position in the registration sequence.
pub fn next_registration_order(conn: &Connection, tournament_id: TournamentId) -> Result<u32, TournamentError> {
    let next: u32 = conn.query_row(
        "SELECT COALESCE(MAX(registration_order) + 1, 0) FROM tournament_players WHERE tournament_id = ?1",
        params![tournament_id],
        |row| row.get(0),
    )?;
    Ok(next)
}

pub fn update_status(conn: &Connection, id: EntrantId, status: EntrantStatus) -> Result<(), TournamentError> {
    let updated = conn.execute(
        "UPDATE tournament_players SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if updated == 0 {
        return Err(TournamentError::not_found("Entrant", id));
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: EntrantId) -> Result<(), TournamentError> {
    let deleted = conn.execute("DELETE FROM tournament_players WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(TournamentError::not_found("Entrant", id));
    }
    Ok(())
}
