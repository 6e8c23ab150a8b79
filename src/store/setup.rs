use crate::models::TournamentError;
use rusqlite::Connection;

/// Create any missing table. Safe to run on every start.
pub fn init_schema(conn: &Connection) -> Result<(), TournamentError> {
    conn.execute_batch(include_str!("schema.sql"))?;
    log::info!("Database schema ready");
    Ok(())
}
