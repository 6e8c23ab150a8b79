//! Global player identity and ranking.

use crate::models::tournament::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a player across tournaments.
pub type PlayerId = Uuid;

/// National ranking category, derived from recent participation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Category {
    A,
    B,
    #[default]
    C,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::A => "A",
            Category::B => "B",
            Category::C => "C",
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Category::A),
            "B" => Ok(Category::B),
            "C" => Ok(Category::C),
            other => Err(ParseEnumError::new("category", other)),
        }
    }
}

/// A player registered with the federation (not tied to one tournament).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub club: Option<String>,
    /// Rolling 12-month national score.
    pub ranking: u32,
    /// Score for the current calendar year.
    pub ranking_annual: u32,
    pub category: Category,
    pub tournaments_played: u32,
    pub tournaments_played_annual: u32,
}

impl Player {
    /// Create a new unranked player.
    pub fn new(name: impl Into<String>, club: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            club,
            ranking: 0,
            ranking_annual: 0,
            category: Category::C,
            tournaments_played: 0,
            tournaments_played_annual: 0,
        }
    }
}
