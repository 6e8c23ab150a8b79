use crate::models::{
    GameMatch, GroupId, MatchId, PhaseId, SlotSource, TournamentError, TournamentId,
};
use crate::store::parse_enum;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

const COLUMNS: &str = "m.id, m.phase_id, m.group_id, m.round_number, m.bracket_position, m.player1_id, m.player2_id, m.player1_source_kind, m.player1_source_match, m.player2_source_kind, m.player2_source_match, m.score1, m.score2, m.innings, m.high_run1, m.high_run2, m.winner_id, m.status, m.win_reason";

fn source_parts(source: Option<SlotSource>) -> (Option<&'static str>, Option<MatchId>) {
    match source {
        Some(s) => (Some(s.kind_str()), Some(s.feeding_match())),
        None => (None, None),
    }
}

pub fn insert_match(conn: &Connection, m: &GameMatch) -> Result<(), TournamentError> {
    let (kind1, match1) = source_parts(m.player1_source);
    let (kind2, match2) = source_parts(m.player2_source);
    conn.execute(
        "INSERT INTO matches (id, phase_id, group_id, round_number, bracket_position, player1_id, player2_id, player1_source_kind, player1_source_match, player2_source_kind, player2_source_match, score1, score2, innings, high_run1, high_run2, winner_id, status, win_reason) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            m.id,
            m.phase_id,
            m.group_id,
            m.round_number,
            m.bracket_position,
            m.player1,
            m.player2,
            kind1,
            match1,
            kind2,
            match2,
            m.score1,
            m.score2,
            m.innings,
            m.high_run1,
            m.high_run2,
            m.winner,
            m.status.as_str(),
            m.win_reason.map(|r| r.as_str()),
        ],
    )?;
    Ok(())
}

/// Write back the mutable part of a match: slots, score sheet and outcome.
pub fn update_match(conn: &Connection, m: &GameMatch) -> Result<(), TournamentError> {
    let updated = conn.execute(
        "UPDATE matches SET player1_id = ?1, player2_id = ?2, score1 = ?3, score2 = ?4, innings = ?5, high_run1 = ?6, high_run2 = ?7, winner_id = ?8, status = ?9, win_reason = ?10 WHERE id = ?11",
        params![
            m.player1,
            m.player2,
            m.score1,
            m.score2,
            m.innings,
            m.high_run1,
            m.high_run2,
            m.winner,
            m.status.as_str(),
            m.win_reason.map(|r| r.as_str()),
            m.id,
        ],
    )?;
    if updated == 0 {
        return Err(TournamentError::not_found("Match", m.id));
    }
    Ok(())
}

fn parse_source(row: &rusqlite::Row, kind_idx: usize) -> rusqlite::Result<Option<SlotSource>> {
    let kind: Option<String> = row.get(kind_idx)?;
    let feeding: Option<Uuid> = row.get(kind_idx + 1)?;
    match (kind, feeding) {
        (Some(kind), Some(id)) => SlotSource::from_parts(&kind, id)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(kind_idx, Type::Text, Box::new(e))),
        _ => Ok(None),
    }
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<GameMatch> {
    let win_reason: Option<String> = row.get(18)?;
    Ok(GameMatch {
        id: row.get(0)?,
        phase_id: row.get(1)?,
        group_id: row.get(2)?,
        round_number: row.get(3)?,
        bracket_position: row.get(4)?,
        player1: row.get(5)?,
        player2: row.get(6)?,
        player1_source: parse_source(row, 7)?,
        player2_source: parse_source(row, 9)?,
        score1: row.get(11)?,
        score2: row.get(12)?,
        innings: row.get(13)?,
        high_run1: row.get(14)?,
        high_run2: row.get(15)?,
        winner: row.get(16)?,
        status: parse_enum(row, 17)?,
        win_reason: match win_reason {
            Some(text) => Some(text.parse().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(18, Type::Text, Box::new(e))
            })?),
            None => None,
        },
    })
}

fn query_matches<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<GameMatch>, TournamentError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn find_by_id(conn: &Connection, id: MatchId) -> Result<Option<GameMatch>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM matches m WHERE m.id = ?1");
    Ok(conn.query_row(&sql, params![id], parse_match_row).optional()?)
}

pub fn get(conn: &Connection, id: MatchId) -> Result<GameMatch, TournamentError> {
    find_by_id(conn, id)?.ok_or(TournamentError::not_found("Match", id))
}

/// Matches of a phase in bracket order.
pub fn list_by_phase(conn: &Connection, phase_id: PhaseId) -> Result<Vec<GameMatch>, TournamentError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM matches m WHERE m.phase_id = ?1 ORDER BY m.round_number ASC, m.bracket_position ASC"
    );
    query_matches(conn, &sql, params![phase_id])
}

pub fn list_by_group(conn: &Connection, group_id: GroupId) -> Result<Vec<GameMatch>, TournamentError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM matches m WHERE m.group_id = ?1 ORDER BY m.round_number ASC, m.bracket_position ASC"
    );
    query_matches(conn, &sql, params![group_id])
}

/// Every match of a tournament, phase by phase.
pub fn list_by_tournament(conn: &Connection, tournament_id: TournamentId) -> Result<Vec<GameMatch>, TournamentError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM matches m JOIN phases p ON p.id = m.phase_id WHERE p.tournament_id = ?1 ORDER BY p.sequence_order ASC, m.round_number ASC, m.bracket_position ASC"
    );
    query_matches(conn, &sql, params![tournament_id])
}
