//! Roster filter: who may compete, who waits, and CSV roster parsing.

use crate::models::{Entrant, EntrantStatus, TournamentError};
use serde::Deserialize;
use std::io::Read;

/// Active entrants in registration order. Only these take part in group formation.
pub fn eligible(entrants: &[Entrant]) -> Vec<Entrant> {
    let mut active: Vec<Entrant> = entrants.iter().filter(|e| e.is_active()).cloned().collect();
    active.sort_by_key(|e| e.registration_order);
    active
}

/// Waitlisted entrants in the order they get promoted (earliest registration first).
pub fn promotable(entrants: &[Entrant]) -> Vec<&Entrant> {
    let mut waiting: Vec<&Entrant> = entrants
        .iter()
        .filter(|e| e.status == EntrantStatus::Waitlist)
        .collect();
    waiting.sort_by_key(|e| e.registration_order);
    waiting
}

/// Status of a new registration given how many entrants already hold a spot.
pub fn initial_status(active_count: usize, max_players: u32) -> EntrantStatus {
    if active_count < max_players as usize {
        EntrantStatus::Active
    } else {
        EntrantStatus::Waitlist
    }
}

/// One line of an imported roster file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RosterRow {
    pub name: String,
    #[serde(default)]
    pub club: Option<String>,
    pub handicap: u32,
    pub average: f64,
}

/// Parse `name,club,handicap,average` rows (header required).
pub fn parse_roster_csv<R: Read>(reader: R) -> Result<Vec<RosterRow>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        let mut row: RosterRow = record?;
        row.name = row.name.trim().to_string();
        if row.name.is_empty() {
            return Err(TournamentError::InvalidConfiguration(
                "roster row with an empty name".to_string(),
            ));
        }
        row.club = row.club.filter(|c| !c.is_empty());
        rows.push(row);
    }
    Ok(rows)
}
