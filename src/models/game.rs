//! Matches between two entrants, with deferred slots and walkovers.

use crate::models::entrant::EntrantId;
use crate::models::group::GroupId;
use crate::models::phase::PhaseId;
use crate::models::tournament::{ParseEnumError, TournamentError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "in_progress" => Ok(MatchStatus::InProgress),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(ParseEnumError::new("match status", other)),
        }
    }
}

/// Why a completed match has its winner.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// Played to the end.
    Win,
    /// Walkover: awarded without play.
    Wo,
}

impl WinReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            WinReason::Win => "win",
            WinReason::Wo => "wo",
        }
    }
}

impl FromStr for WinReason {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(WinReason::Win),
            "wo" => Ok(WinReason::Wo),
            other => Err(ParseEnumError::new("win reason", other)),
        }
    }
}

/// Where an unresolved participant slot gets its entrant from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "match_id")]
pub enum SlotSource {
    WinnerOf(MatchId),
    LoserOf(MatchId),
}

impl SlotSource {
    pub fn feeding_match(&self) -> MatchId {
        match self {
            SlotSource::WinnerOf(id) | SlotSource::LoserOf(id) => *id,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            SlotSource::WinnerOf(_) => "winner_of",
            SlotSource::LoserOf(_) => "loser_of",
        }
    }

    pub fn from_parts(kind: &str, match_id: MatchId) -> Result<Self, ParseEnumError> {
        match kind {
            "winner_of" => Ok(SlotSource::WinnerOf(match_id)),
            "loser_of" => Ok(SlotSource::LoserOf(match_id)),
            other => Err(ParseEnumError::new("slot source", other)),
        }
    }

    /// The entrant this source yields once `feeder` is decided.
    pub fn pick(&self, feeder: &GameMatch) -> Option<EntrantId> {
        match self {
            SlotSource::WinnerOf(_) => feeder.winner,
            SlotSource::LoserOf(_) => feeder.loser(),
        }
    }
}

/// Score sheet sent by the referee for one match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score1: u32,
    pub score2: u32,
    pub innings: u32,
    #[serde(default)]
    pub high_run1: u32,
    #[serde(default)]
    pub high_run2: u32,
    /// False while the match is still being played.
    #[serde(default = "default_finished")]
    pub finished: bool,
}

fn default_finished() -> bool {
    true
}

/// A single match: two participant slots, score sheet and outcome.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub phase_id: PhaseId,
    /// Set for group-stage matches only.
    pub group_id: Option<GroupId>,
    pub round_number: u32,
    /// Order within the round; bracket advancement pairs neighbours.
    pub bracket_position: u32,
    pub player1: Option<EntrantId>,
    pub player2: Option<EntrantId>,
    pub player1_source: Option<SlotSource>,
    pub player2_source: Option<SlotSource>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub innings: Option<u32>,
    pub high_run1: Option<u32>,
    pub high_run2: Option<u32>,
    /// None if not yet played, or a draw.
    pub winner: Option<EntrantId>,
    pub status: MatchStatus,
    pub win_reason: Option<WinReason>,
}

impl GameMatch {
    pub fn new(
        phase_id: PhaseId,
        group_id: Option<GroupId>,
        round_number: u32,
        bracket_position: u32,
        player1: Option<EntrantId>,
        player2: Option<EntrantId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase_id,
            group_id,
            round_number,
            bracket_position,
            player1,
            player2,
            player1_source: None,
            player2_source: None,
            score1: None,
            score2: None,
            innings: None,
            high_run1: None,
            high_run2: None,
            winner: None,
            status: MatchStatus::Scheduled,
            win_reason: None,
        }
    }

    /// Builder: mark slots as fed by earlier matches.
    pub fn fed_by(mut self, source1: Option<SlotSource>, source2: Option<SlotSource>) -> Self {
        self.player1_source = source1;
        self.player2_source = source2;
        self
    }

    /// A bracket slot with a single entrant, who advances without playing.
    pub fn bye(phase_id: PhaseId, round_number: u32, bracket_position: u32, player: EntrantId) -> Self {
        let mut m = Self::new(phase_id, None, round_number, bracket_position, Some(player), None);
        m.winner = Some(player);
        m.status = MatchStatus::Completed;
        m.win_reason = Some(WinReason::Wo);
        m
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn is_walkover(&self) -> bool {
        self.win_reason == Some(WinReason::Wo)
    }

    /// Completed with only one entrant present.
    pub fn is_bye(&self) -> bool {
        self.is_completed() && (self.player1.is_none() || self.player2.is_none())
    }

    pub fn is_draw(&self) -> bool {
        self.is_completed() && self.winner.is_none() && self.player1.is_some() && self.player2.is_some()
    }

    pub fn has_both_players(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }

    pub fn involves(&self, entrant: EntrantId) -> bool {
        self.player1 == Some(entrant) || self.player2 == Some(entrant)
    }

    pub fn opponent_of(&self, entrant: EntrantId) -> Option<EntrantId> {
        if self.player1 == Some(entrant) {
            self.player2
        } else if self.player2 == Some(entrant) {
            self.player1
        } else {
            None
        }
    }

    pub fn loser(&self) -> Option<EntrantId> {
        let winner = self.winner?;
        if !self.is_completed() {
            return None;
        }
        self.opponent_of(winner)
    }

    /// `(caroms for, caroms against, high run)` for `entrant`, zero where unrecorded.
    pub fn sheet_for(&self, entrant: EntrantId) -> Option<(u32, u32, u32)> {
        let s1 = self.score1.unwrap_or(0);
        let s2 = self.score2.unwrap_or(0);
        if self.player1 == Some(entrant) {
            Some((s1, s2, self.high_run1.unwrap_or(0)))
        } else if self.player2 == Some(entrant) {
            Some((s2, s1, self.high_run2.unwrap_or(0)))
        } else {
            None
        }
    }

    /// Fill every slot fed by `source` with `entrant`. Returns whether a slot changed.
    pub fn resolve_slot(&mut self, source: SlotSource, entrant: EntrantId) -> bool {
        let mut changed = false;
        if self.player1_source == Some(source) && self.player1 != Some(entrant) {
            self.player1 = Some(entrant);
            changed = true;
        }
        if self.player2_source == Some(source) && self.player2 != Some(entrant) {
            self.player2 = Some(entrant);
            changed = true;
        }
        changed
    }

    /// Exchange `a` and `b` in both slots and in the recorded winner.
    pub fn swap_entrants(&mut self, a: EntrantId, b: EntrantId) -> bool {
        let swap = |slot: &mut Option<EntrantId>| -> bool {
            match *slot {
                Some(x) if x == a => {
                    *slot = Some(b);
                    true
                }
                Some(x) if x == b => {
                    *slot = Some(a);
                    true
                }
                _ => false,
            }
        };
        let p1 = swap(&mut self.player1);
        let p2 = swap(&mut self.player2);
        let w = swap(&mut self.winner);
        p1 || p2 || w
    }

    /// Record a referee score sheet. Ties complete as draws only when `allow_draw`.
    pub fn apply_result(&mut self, result: &MatchResult, allow_draw: bool) -> Result<(), TournamentError> {
        let (Some(p1), Some(p2)) = (self.player1, self.player2) else {
            return Err(TournamentError::InvalidState(
                "both players must be known before recording a result".to_string(),
            ));
        };
        if result.high_run1 > result.score1 || result.high_run2 > result.score2 {
            return Err(TournamentError::InvalidResult(
                "high run cannot exceed the score".to_string(),
            ));
        }
        self.score1 = Some(result.score1);
        self.score2 = Some(result.score2);
        self.innings = Some(result.innings);
        self.high_run1 = Some(result.high_run1);
        self.high_run2 = Some(result.high_run2);

        if !result.finished {
            self.status = MatchStatus::InProgress;
            self.winner = None;
            self.win_reason = None;
            return Ok(());
        }

        self.winner = match result.score1.cmp(&result.score2) {
            std::cmp::Ordering::Greater => Some(p1),
            std::cmp::Ordering::Less => Some(p2),
            std::cmp::Ordering::Equal if allow_draw => None,
            std::cmp::Ordering::Equal => {
                return Err(TournamentError::InvalidResult(
                    "this match cannot end in a draw".to_string(),
                ))
            }
        };
        self.status = MatchStatus::Completed;
        self.win_reason = Some(WinReason::Win);
        Ok(())
    }

    /// Settle the match without play in favour of `winner`, who is credited `target` caroms.
    pub fn award_walkover(&mut self, winner: EntrantId, target: u32) -> Result<(), TournamentError> {
        let (score1, score2) = if self.player1 == Some(winner) {
            (target, 0)
        } else if self.player2 == Some(winner) {
            (0, target)
        } else {
            return Err(TournamentError::not_found("Entrant in match", winner));
        };
        self.score1 = Some(score1);
        self.score2 = Some(score2);
        self.innings = Some(0);
        self.high_run1 = Some(0);
        self.high_run2 = Some(0);
        self.winner = Some(winner);
        self.status = MatchStatus::Completed;
        self.win_reason = Some(WinReason::Wo);
        Ok(())
    }
}
