//! Ordered stages of competition.

use crate::models::tournament::{ParseEnumError, TournamentId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub type PhaseId = Uuid;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Group,
    Elimination,
    /// Repechage round that trims the qualifier count to the bracket size.
    EliminationPrelim,
    Final,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Group => "group",
            PhaseKind::Elimination => "elimination",
            PhaseKind::EliminationPrelim => "elimination_prelim",
            PhaseKind::Final => "final",
        }
    }

    pub fn is_elimination(&self) -> bool {
        !matches!(self, PhaseKind::Group)
    }
}

impl FromStr for PhaseKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(PhaseKind::Group),
            "elimination" => Ok(PhaseKind::Elimination),
            "elimination_prelim" => Ok(PhaseKind::EliminationPrelim),
            "final" => Ok(PhaseKind::Final),
            other => Err(ParseEnumError::new("phase kind", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub kind: PhaseKind,
    /// Monotonic within a tournament; defines progression.
    pub sequence_order: u32,
}

impl Phase {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        kind: PhaseKind,
        sequence_order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            kind,
            sequence_order,
        }
    }
}

/// Display name of an elimination round with `matches` matches.
pub fn round_name(matches: usize) -> String {
    match matches {
        1 => "Final".to_string(),
        2 => "Semifinals".to_string(),
        4 => "Quarterfinals".to_string(),
        n => format!("Round of {}", n * 2),
    }
}
