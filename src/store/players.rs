use crate::models::{Player, PlayerId, PlayerRanking, TournamentError};
use crate::store::parse_enum;
use rusqlite::{params, Connection, OptionalExtension};

const COLUMNS: &str = "id, name, club, ranking, ranking_annual, category, tournaments_played, tournaments_played_annual";

pub fn insert_player(conn: &Connection, p: &Player) -> Result<(), TournamentError> {
    conn.execute(
        "INSERT INTO players (id, name, club, ranking, ranking_annual, category, tournaments_played, tournaments_played_annual) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            p.id,
            p.name,
            p.club,
            p.ranking,
            p.ranking_annual,
            p.category.as_str(),
            p.tournaments_played,
            p.tournaments_played_annual,
        ],
    )?;
    Ok(())
}

/// Find a player by exact name or create one. A missing club is filled in when supplied.
pub fn upsert_by_name(conn: &Connection, name: &str, club: Option<&str>) -> Result<Player, TournamentError> {
    if let Some(mut existing) = find_by_name(conn, name)? {
        if existing.club.is_none() && club.is_some() {
            conn.execute(
                "UPDATE players SET club = ?1 WHERE id = ?2",
                params![club, existing.id],
            )?;
            existing.club = club.map(str::to_string);
        }
        return Ok(existing);
    }
    let player = Player::new(name, club.map(str::to_string));
    insert_player(conn, &player)?;
    Ok(player)
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        club: row.get(2)?,
        ranking: row.get(3)?,
        ranking_annual: row.get(4)?,
        category: parse_enum(row, 5)?,
        tournaments_played: row.get(6)?,
        tournaments_played_annual: row.get(7)?,
    })
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Player>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM players WHERE name = ?1");
    Ok(conn.query_row(&sql, params![name], parse_player_row).optional()?)
}

pub fn find_by_id(conn: &Connection, id: PlayerId) -> Result<Option<Player>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM players WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], parse_player_row).optional()?)
}

pub fn get(conn: &Connection, id: PlayerId) -> Result<Player, TournamentError> {
    find_by_id(conn, id)?.ok_or(TournamentError::not_found("Player", id))
}

/// Players ordered by national score, best first.
pub fn list_ranked(conn: &Connection) -> Result<Vec<Player>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM players ORDER BY ranking DESC, name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Zero every player's ranking ahead of a full recompute.
pub fn reset_rankings(conn: &Connection) -> Result<(), TournamentError> {
    conn.execute(
        "UPDATE players SET ranking = 0, ranking_annual = 0, category = 'C', tournaments_played = 0, tournaments_played_annual = 0",
        [],
    )?;
    Ok(())
}

pub fn update_ranking(conn: &Connection, r: &PlayerRanking) -> Result<(), TournamentError> {
    conn.execute(
        "UPDATE players SET ranking = ?1, ranking_annual = ?2, category = ?3, tournaments_played = ?4, tournaments_played_annual = ?5 WHERE id = ?6",
        params![
            r.national_score,
            r.annual_score,
            r.category.as_str(),
            r.national_count,
            r.annual_count,
            r.player_id,
        ],
    )?;
    Ok(())
}
