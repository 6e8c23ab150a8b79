use crate::models::{Phase, PhaseId, PhaseKind, TournamentError, TournamentId};
use crate::store::parse_enum;
use rusqlite::{params, Connection, OptionalExtension};

const COLUMNS: &str = "id, tournament_id, name, type, sequence_order";

pub fn insert_phase(conn: &Connection, p: &Phase) -> Result<(), TournamentError> {
    conn.execute(
        "INSERT INTO phases (id, tournament_id, name, type, sequence_order) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![p.id, p.tournament_id, p.name, p.kind.as_str(), p.sequence_order],
    )?;
    Ok(())
}

fn parse_phase_row(row: &rusqlite::Row) -> rusqlite::Result<Phase> {
    Ok(Phase {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        name: row.get(2)?,
        kind: parse_enum(row, 3)?,
        sequence_order: row.get(4)?,
    })
}

pub fn get(conn: &Connection, id: PhaseId) -> Result<Phase, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM phases WHERE id = ?1");
    conn.query_row(&sql, params![id], parse_phase_row)
        .optional()?
        .ok_or(TournamentError::not_found("Phase", id))
}

/// Phases of a tournament in progression order.
pub fn list_by_tournament(conn: &Connection, tournament_id: TournamentId) -> Result<Vec<Phase>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM phases WHERE tournament_id = ?1 ORDER BY sequence_order ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_phase_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn find_group_phase(conn: &Connection, tournament_id: TournamentId) -> Result<Option<Phase>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM phases WHERE tournament_id = ?1 AND type = ?2");
    Ok(conn
        .query_row(&sql, params![tournament_id, PhaseKind::Group.as_str()], parse_phase_row)
        .optional()?)
}

pub fn next_sequence_order(conn: &Connection, tournament_id: TournamentId) -> Result<u32, TournamentError> {
    let next: u32 = conn.query_row(
        "SELECT COALESCE(MAX(sequence_order) + 1, 0) FROM phases WHERE tournament_id = ?1",
        params![tournament_id],
        |row| row.get(0),
    )?;
    Ok(next)
}
