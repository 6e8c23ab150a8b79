//! Relational persistence on SQLite: one module per table.

pub mod connection;
pub mod entrants;
pub mod groups;
pub mod matches;
pub mod phases;
pub mod players;
pub mod rankings;
pub mod setup;
pub mod tournaments;

pub use connection::{create_pool, open_in_memory, DbPool};

use crate::models::ParseEnumError;
use rusqlite::types::Type;
use rusqlite::Row;
use std::str::FromStr;

/// Read a text column into one of the model enums.
pub(crate) fn parse_enum<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
