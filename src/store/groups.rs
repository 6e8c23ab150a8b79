use crate::models::{EntrantId, Group, GroupId, PhaseId, TournamentError};
use crate::store::parse_enum;
use rusqlite::{params, Connection, OptionalExtension};

const COLUMNS: &str = "id, phase_id, name, start_time, table_number, pairing_policy";

/// Insert a group and its seeded members.
pub fn insert_group(conn: &Connection, g: &Group) -> Result<(), TournamentError> {
    conn.execute(
        "INSERT INTO tournament_groups (id, phase_id, name, start_time, table_number, pairing_policy) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![g.id, g.phase_id, g.name, g.start_time, g.table_number, g.policy.as_str()],
    )?;
    for (seed, entrant_id) in g.members.iter().enumerate() {
        insert_member(conn, g.id, *entrant_id, seed as u32)?;
    }
    Ok(())
}

fn insert_member(conn: &Connection, group_id: GroupId, entrant_id: EntrantId, seed: u32) -> Result<(), TournamentError> {
    conn.execute(
        "INSERT INTO group_members (group_id, entrant_id, seed) VALUES (?1, ?2, ?3)",
        params![group_id, entrant_id, seed],
    )?;
    Ok(())
}

fn parse_group_row(row: &rusqlite::Row) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        phase_id: row.get(1)?,
        name: row.get(2)?,
        start_time: row.get(3)?,
        table_number: row.get(4)?,
        policy: parse_enum(row, 5)?,
        members: Vec::new(),
    })
}

fn load_members(conn: &Connection, group: &mut Group) -> Result<(), TournamentError> {
    let mut stmt =
        conn.prepare("SELECT entrant_id FROM group_members WHERE group_id = ?1 ORDER BY seed ASC")?;
    group.members = stmt
        .query_map(params![group.id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<EntrantId>>>()?;
    Ok(())
}

pub fn get(conn: &Connection, id: GroupId) -> Result<Group, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM tournament_groups WHERE id = ?1");
    let mut group = conn
        .query_row(&sql, params![id], parse_group_row)
        .optional()?
        .ok_or(TournamentError::not_found("Group", id))?;
    load_members(conn, &mut group)?;
    Ok(group)
}

/// Groups of a phase by name, members in seed order.
pub fn list_by_phase(conn: &Connection, phase_id: PhaseId) -> Result<Vec<Group>, TournamentError> {
    let sql = format!("SELECT {COLUMNS} FROM tournament_groups WHERE phase_id = ?1 ORDER BY name ASC");
    let mut stmt = conn.prepare(&sql)?;
    let mut groups = stmt
        .query_map(params![phase_id], parse_group_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for group in &mut groups {
        load_members(conn, group)?;
    }
    Ok(groups)
}

/// Exchange the group memberships (and seeds) of two entrants.
pub fn swap_members(conn: &Connection, a: EntrantId, b: EntrantId) -> Result<(), TournamentError> {
    let membership = |entrant: EntrantId| -> Result<Option<(GroupId, u32)>, TournamentError> {
        Ok(conn
            .query_row(
                "SELECT group_id, seed FROM group_members WHERE entrant_id = ?1",
                params![entrant],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    };
    let (slot_a, slot_b) = (membership(a)?, membership(b)?);
    conn.execute(
        "DELETE FROM group_members WHERE entrant_id IN (?1, ?2)",
        params![a, b],
    )?;
    if let Some((group_id, seed)) = slot_a {
        insert_member(conn, group_id, b, seed)?;
    }
    if let Some((group_id, seed)) = slot_b {
        insert_member(conn, group_id, a, seed)?;
    }
    Ok(())
}
