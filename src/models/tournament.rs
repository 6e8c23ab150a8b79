//! Tournament configuration, lifecycle status, and the crate error type.

use crate::models::phase::PhaseKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Broad class of a [`TournamentError`], used by callers to choose a response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    StateConflict,
    NotFound,
    InsufficientData,
    Storage,
}

/// Errors that can occur during tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// No active entrant to form groups with.
    #[error("There are no active players to form groups")]
    InsufficientPlayers,
    /// Group size other than 3 or 4.
    #[error("Group size must be 3 or 4 (got {0})")]
    InvalidGroupSize(u32),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid match result: {0}")]
    InvalidResult(String),
    /// The group stage was already generated for this tournament.
    #[error("Groups have already been generated for this tournament")]
    FixtureAlreadyExists,
    /// Matches of the current round are still open.
    #[error("There are {pending} matches still pending in the current round")]
    PendingMatches { pending: usize },
    /// The last round played was the final.
    #[error("The tournament is complete: the final has been played")]
    TournamentComplete,
    /// Tournament (or entity) is not in a state that allows this action.
    #[error("Invalid state for this action: {0}")]
    InvalidState(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    /// Fewer than two qualifiers could be drawn from the group stage.
    #[error("Not enough completed matches to select qualifiers")]
    InsufficientCompletedMatches,
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("Roster import error: {0}")]
    Csv(#[from] csv::Error),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            InsufficientPlayers | InvalidGroupSize(_) | InvalidConfiguration(_) | InvalidResult(_)
            | Csv(_) => ErrorKind::Validation,
            FixtureAlreadyExists | PendingMatches { .. } | TournamentComplete | InvalidState(_) => {
                ErrorKind::StateConflict
            }
            NotFound { .. } => ErrorKind::NotFound,
            InsufficientCompletedMatches => ErrorKind::InsufficientData,
            Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        TournamentError::NotFound { entity, id }
    }
}

/// A stored text value that does not name any variant of the target enum.
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting registrations; groups not generated yet.
    #[default]
    Registration,
    GroupStage,
    Playoffs,
    /// Final played and tournament closed; ranking points may be assigned.
    Finished,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Registration => "registration",
            TournamentStatus::GroupStage => "group_stage",
            TournamentStatus::Playoffs => "playoffs",
            TournamentStatus::Finished => "finished",
        }
    }
}

impl FromStr for TournamentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(TournamentStatus::Registration),
            "group_stage" => Ok(TournamentStatus::GroupStage),
            "playoffs" => Ok(TournamentStatus::Playoffs),
            "finished" => Ok(TournamentStatus::Finished),
            other => Err(ParseEnumError::new("tournament status", other)),
        }
    }
}

/// How four-player groups are played. Other group sizes do not depend on it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupFormat {
    #[default]
    RoundRobin,
    /// Double-elimination mini-bracket for groups of four.
    Gsl,
}

impl GroupFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupFormat::RoundRobin => "round_robin",
            GroupFormat::Gsl => "gsl",
        }
    }
}

impl FromStr for GroupFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(GroupFormat::RoundRobin),
            "gsl" => Ok(GroupFormat::Gsl),
            other => Err(ParseEnumError::new("group format", other)),
        }
    }
}

/// Operator-chosen settings of one tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Entrants above this count are waitlisted.
    pub max_players: u32,
    pub group_size: u32,
    pub group_format: GroupFormat,
    /// How many finishers of each group reach the playoffs (1-4).
    pub qualifiers_per_group: u32,
    /// Main elimination bracket size; a power of two.
    pub playoff_target_size: u32,
    pub group_points_limit: u32,
    pub group_innings_limit: u32,
    pub elimination_points_limit: u32,
    pub elimination_innings_limit: u32,
    pub final_points_limit: u32,
    pub final_innings_limit: u32,
    pub use_handicap: bool,
    pub tables_available: u32,
    /// Length of one scheduling block for the group stage.
    pub block_minutes: u32,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            max_players: 64,
            group_size: 4,
            group_format: GroupFormat::RoundRobin,
            qualifiers_per_group: 2,
            playoff_target_size: 16,
            group_points_limit: 20,
            group_innings_limit: 30,
            elimination_points_limit: 25,
            elimination_innings_limit: 35,
            final_points_limit: 30,
            final_innings_limit: 40,
            use_handicap: false,
            tables_available: 4,
            block_minutes: 90,
        }
    }
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        if !(3..=4).contains(&self.group_size) {
            return Err(TournamentError::InvalidGroupSize(self.group_size));
        }
        if !(1..=4).contains(&self.qualifiers_per_group) {
            return Err(TournamentError::InvalidConfiguration(format!(
                "qualifiers per group must be between 1 and 4 (got {})",
                self.qualifiers_per_group
            )));
        }
        if self.playoff_target_size < 2 || !self.playoff_target_size.is_power_of_two() {
            return Err(TournamentError::InvalidConfiguration(format!(
                "playoff target size must be a power of two (got {})",
                self.playoff_target_size
            )));
        }
        if self.max_players == 0 {
            return Err(TournamentError::InvalidConfiguration(
                "max players must be positive".to_string(),
            ));
        }
        if self.tables_available == 0 {
            return Err(TournamentError::InvalidConfiguration(
                "at least one table is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Points a match of this phase kind is played to.
    pub fn points_limit(&self, kind: PhaseKind) -> u32 {
        match kind {
            PhaseKind::Group => self.group_points_limit,
            PhaseKind::Elimination | PhaseKind::EliminationPrelim => self.elimination_points_limit,
            PhaseKind::Final => self.final_points_limit,
        }
    }

    pub fn innings_limit(&self, kind: PhaseKind) -> u32 {
        match kind {
            PhaseKind::Group => self.group_innings_limit,
            PhaseKind::Elimination | PhaseKind::EliminationPrelim => self.elimination_innings_limit,
            PhaseKind::Final => self.final_innings_limit,
        }
    }
}

/// A tournament: name, schedule anchor, configuration and lifecycle status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub start_time: NaiveDateTime,
    pub config: TournamentConfig,
    pub status: TournamentStatus,
}

impl Tournament {
    /// Create a new tournament in Registration status.
    pub fn new(name: impl Into<String>, start_time: NaiveDateTime, config: TournamentConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_time,
            config,
            status: TournamentStatus::Registration,
        }
    }

    /// Fail unless the tournament is in `expected` status.
    pub fn require_status(&self, expected: TournamentStatus) -> Result<(), TournamentError> {
        if self.status != expected {
            return Err(TournamentError::InvalidState(format!(
                "tournament is in {} status, expected {}",
                self.status.as_str(),
                expected.as_str()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TournamentConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_group_size_outside_three_and_four() {
        let config = TournamentConfig {
            group_size: 5,
            ..TournamentConfig::default()
        };
        assert!(matches!(config.validate(), Err(TournamentError::InvalidGroupSize(5))));
    }

    #[test]
    fn rejects_non_power_of_two_bracket() {
        let config = TournamentConfig {
            playoff_target_size: 24,
            ..TournamentConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            TournamentStatus::Registration,
            TournamentStatus::GroupStage,
            TournamentStatus::Playoffs,
            TournamentStatus::Finished,
        ] {
            assert_eq!(status.as_str().parse::<TournamentStatus>().unwrap(), status);
        }
    }
}
