use crate::models::TournamentError;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = build_manager(database_path);
    r2d2::Pool::builder().build(manager)
}

fn build_manager(path: &str) -> SqliteConnectionManager {
    SqliteConnectionManager::file(path).with_init(|c| c.execute_batch(CONNECTION_PRAGMAS))
}

/// Fresh in-memory database with the schema applied.
pub fn open_in_memory() -> Result<Connection, TournamentError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(CONNECTION_PRAGMAS)?;
    super::setup::init_schema(&conn)?;
    Ok(conn)
}
