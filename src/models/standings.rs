//! Derived per-player statistics; never stored.

use crate::models::entrant::EntrantId;
use serde::{Deserialize, Serialize};

/// One line of a standings table, produced by the standings calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub entrant_id: EntrantId,
    pub name: String,
    pub handicap: u32,
    /// 1-based position after sorting.
    pub rank: u32,
    /// Matches actually contested (walkovers excluded).
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: u32,
    pub carom_for: u32,
    pub carom_against: u32,
    pub innings: u32,
    pub high_run: u32,
    pub average: f64,
    pub weighted_average: f64,
    /// Best single-match average (global standings only; 0 in group tables).
    pub particular_average: f64,
}

impl StandingsRow {
    /// Matches with a result, walkovers included.
    pub fn decided(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn carom_difference(&self) -> i64 {
        i64::from(self.carom_for) - i64::from(self.carom_against)
    }
}
