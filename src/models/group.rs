//! Group stage partitions and how their matches are paired.

use crate::models::entrant::EntrantId;
use crate::models::phase::PhaseId;
use crate::models::tournament::ParseEnumError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub type GroupId = Uuid;

/// Pairing policy resolved for a group when the group stage is generated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// One match per unordered pair.
    RoundRobin,
    /// Two-player group: home and away.
    DoubleRound,
    /// Four-player double-elimination mini-bracket.
    GslQuartet,
}

impl PairingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairingPolicy::RoundRobin => "round_robin",
            PairingPolicy::DoubleRound => "double_round",
            PairingPolicy::GslQuartet => "gsl_quartet",
        }
    }

    /// Whether a tied completed match stands as a draw.
    pub fn allows_draws(&self) -> bool {
        !matches!(self, PairingPolicy::GslQuartet)
    }
}

impl FromStr for PairingPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(PairingPolicy::RoundRobin),
            "double_round" => Ok(PairingPolicy::DoubleRound),
            "gsl_quartet" => Ok(PairingPolicy::GslQuartet),
            other => Err(ParseEnumError::new("pairing policy", other)),
        }
    }
}

/// A named group with its table, start time and seeded members (best seed first).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub phase_id: PhaseId,
    pub name: String,
    pub table_number: u32,
    pub start_time: NaiveDateTime,
    pub policy: PairingPolicy,
    pub members: Vec<EntrantId>,
}
