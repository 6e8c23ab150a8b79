use crate::models::{RankingRecord, TournamentError, TournamentId, TournamentResult, TournamentStatus};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

pub fn delete_for_tournament(conn: &Connection, tournament_id: TournamentId) -> Result<(), TournamentError> {
    conn.execute(
        "DELETE FROM ranking_records WHERE tournament_id = ?1",
        params![tournament_id],
    )?;
    Ok(())
}

pub fn insert_record(conn: &Connection, r: &RankingRecord) -> Result<(), TournamentError> {
    conn.execute(
        "INSERT INTO ranking_records (tournament_id, entrant_id, player_id, position, points) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![r.tournament_id, r.entrant_id, r.player_id, r.position, r.points],
    )?;
    Ok(())
}

fn parse_record_row(row: &rusqlite::Row) -> rusqlite::Result<RankingRecord> {
    Ok(RankingRecord {
        tournament_id: row.get(0)?,
        entrant_id: row.get(1)?,
        player_id: row.get(2)?,
        position: row.get(3)?,
        points: row.get(4)?,
    })
}

/// Records of one tournament by position.
pub fn list_for_tournament(conn: &Connection, tournament_id: TournamentId) -> Result<Vec<RankingRecord>, TournamentError> {
    let mut stmt = conn.prepare(
        "SELECT tournament_id, entrant_id, player_id, position, points FROM ranking_records WHERE tournament_id = ?1 ORDER BY position ASC",
    )?;
    let rows = stmt
        .query_map(params![tournament_id], parse_record_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Every ranking record of a finished tournament, with the tournament's name and date.
pub fn list_results(conn: &Connection) -> Result<Vec<TournamentResult>, TournamentError> {
    let mut stmt = conn.prepare(
        "SELECT r.player_id, r.tournament_id, t.name, t.start_time, r.points FROM ranking_records r JOIN tournaments t ON t.id = r.tournament_id WHERE t.status = ?1",
    )?;
    let rows = stmt
        .query_map(params![TournamentStatus::Finished.as_str()], |row| {
            let start_time: NaiveDateTime = row.get(3)?;
            Ok(TournamentResult {
                player_id: row.get(0)?,
                tournament_id: row.get(1)?,
                tournament_name: row.get(2)?,
                start_date: start_time.date(),
                points: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
