//! Ranking points per tournament and the aggregated national ranking.

use crate::models::entrant::EntrantId;
use crate::models::player::{Category, PlayerId};
use crate::models::tournament::TournamentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Points awarded by final position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointScale {
    /// `(last position of the tier, points)`, in ascending position order.
    pub tiers: Vec<(u32, u32)>,
    /// Points for any position past the last tier.
    pub floor: u32,
}

impl Default for PointScale {
    fn default() -> Self {
        Self {
            tiers: vec![(1, 60), (2, 50), (4, 40), (8, 30), (16, 20), (32, 10)],
            floor: 5,
        }
    }
}

impl PointScale {
    pub fn points_for(&self, position: u32) -> u32 {
        self.tiers
            .iter()
            .find(|(last, _)| position <= *last)
            .map(|(_, points)| *points)
            .unwrap_or(self.floor)
    }
}

/// Final position and points of one entrant in a finished tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub tournament_id: TournamentId,
    pub entrant_id: EntrantId,
    pub player_id: PlayerId,
    pub position: u32,
    pub points: u32,
}

/// A stored ranking record joined with its tournament, as the aggregator consumes it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    pub tournament_name: String,
    pub start_date: NaiveDate,
    pub points: u32,
}

/// Recomputed ranking of one player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerRanking {
    pub player_id: PlayerId,
    pub national_score: u32,
    pub category: Category,
    pub national_count: u32,
    pub annual_score: u32,
    pub annual_count: u32,
}
