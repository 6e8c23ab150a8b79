use crate::models::{Tournament, TournamentConfig, TournamentError, TournamentId, TournamentStatus};
use crate::store::parse_enum;
use rusqlite::{params, Connection, OptionalExtension};

const COLUMNS: &str = "id, name, start_time, max_players, group_size, group_format, qualifiers_per_group, playoff_target_size, group_points_limit, group_innings_limit, elimination_points_limit, elimination_innings_limit, final_points_limit, final_innings_limit, use_handicap, tables_available, block_minutes, status";

pub fn insert_tournament(conn: &Connection, t: &Tournament) -> Result<(), TournamentError> {
    let c = &t.config;
    let sql = format!(
        "INSERT INTO tournaments ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
    );
    conn.execute(
        &sql,
        params![
            t.id,
            t.name,
            t.start_time,
            c.max_players,
            c.group_size,
            c.group_format.as_str(),
            c.qualifiers_per_group,
            c.playoff_target_size,
            c.group_points_limit,
            c.group_innings_limit,
            c.elimination_points_limit,
            c.elimination_innings_limit,
            c.final_points_limit,
            c.final_innings_limit,
            c.use_handicap,
            c.tables_available,
            c.block_minutes,
            t.status.as_str(),
        ],
    )?;
    Ok(())
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        name: row.get(1)?,
        start_time: row.get(2)?,
        config: TournamentConfig {
            max_players: row.get(3)?,
            group_size: row.get(4)?,
            group_format: parse_enum(row, 5)?,
            qualifiers_per_group: row.get(6)?,
            playoff_target_size: row.get(7)?,
            group_points_limit: row.get(8)?,
            group_innings_limit: row.get(9)?,
            elimination_points_limit: row.get(10)?,
            elimination_innings_limit: row.get(11)?,
            final_points_limit: row.get(12)?,
            final_innings_limit: row.get(13)?,
            use_handicap: row.get(14)?,
            tables_available: row.get(15)?,
            block_minutes: row.get(16)?,
        },
        status: parse_enum(row, 17)?,
    })
}

pub fn find_by_id(conn: &Connection, id: TournamentId) -> Result<Option<Tournament>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM tournaments WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], parse_tournament_row).optional()?)
}

pub fn get(conn: &Connection, id: TournamentId) -> Result<Tournament, TournamentError> {
    find_by_id(conn, id)?.ok_or(TournamentError::not_found("Tournament", id))
}

pub fn update_status(
    conn: &Connection,
    id: TournamentId,
    status: TournamentStatus,
) -> Result<(), TournamentError> {
    let updated = conn.execute(
        "UPDATE tournaments SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if updated == 0 {
        return Err(TournamentError::not_found("Tournament", id));
    }
    Ok(())
}
