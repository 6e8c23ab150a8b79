//! A player's registration in one tournament.

use crate::models::player::PlayerId;
use crate::models::tournament::{ParseEnumError, TournamentId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an entrant (used in matches and groups).
pub type EntrantId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrantStatus {
    #[default]
    Active,
    /// Registered beyond `max_players`; promoted when a spot opens.
    Waitlist,
    Disqualified,
    Eliminated,
}

impl EntrantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrantStatus::Active => "active",
            EntrantStatus::Waitlist => "waitlist",
            EntrantStatus::Disqualified => "disqualified",
            EntrantStatus::Eliminated => "eliminated",
        }
    }
}

impl FromStr for EntrantStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntrantStatus::Active),
            "waitlist" => Ok(EntrantStatus::Waitlist),
            "disqualified" => Ok(EntrantStatus::Disqualified),
            "eliminated" => Ok(EntrantStatus::Eliminated),
            other => Err(ParseEnumError::new("entrant status", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub name: String,
    pub club: Option<String>,
    /// Points target for this player when handicaps are in use.
    pub handicap: u32,
    /// Caroms per inning coming into the tournament; drives seeding.
    pub average: f64,
    pub status: EntrantStatus,
    /// Position in the registration sequence (0 = first to register).
    pub registration_order: u32,
    /// Player's national score at registration time.
    pub ranking_snapshot: u32,
}

impl Entrant {
    pub fn is_active(&self) -> bool {
        self.status == EntrantStatus::Active
    }
}
