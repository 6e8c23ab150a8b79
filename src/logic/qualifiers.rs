//! Qualifier selection: top finishers of every group merged into one seeding list.

use crate::logic::standings::group_standings;
use crate::models::{
    Entrant, EntrantId, EntrantStatus, GameMatch, Group, GroupId, StandingsRow, TournamentError,
};
use serde::Serialize;
use std::collections::HashMap;

/// A group finisher who goes through to the playoffs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Qualifier {
    pub entrant_id: EntrantId,
    pub group_id: GroupId,
    pub rank_in_group: u32,
    pub points: u32,
    pub weighted_average: f64,
    pub average: f64,
}

impl Qualifier {
    fn from_row(row: &StandingsRow, group_id: GroupId, rank_in_group: u32) -> Self {
        Self {
            entrant_id: row.entrant_id,
            group_id,
            rank_in_group,
            points: row.points,
            weighted_average: row.weighted_average,
            average: row.average,
        }
    }
}

/// Order within one finishing tier: points, weighted average, general average.
fn tier_order(a: &Qualifier, b: &Qualifier) -> std::cmp::Ordering {
    b.points
        .cmp(&a.points)
        .then(b.weighted_average.total_cmp(&a.weighted_average))
        .then(b.average.total_cmp(&a.average))
}

/// Pick the top `per_group` finishers of each group and return them as a single seed list:
/// all group winners first, then all runners-up, then everyone placed third or lower,
/// each tier sorted on its own. Disqualified entrants never qualify.
pub fn select_qualifiers(
    groups: &[Group],
    entrants: &[Entrant],
    matches: &[GameMatch],
    per_group: u32,
) -> Result<Vec<Qualifier>, TournamentError> {
    let by_id: HashMap<EntrantId, &Entrant> = entrants.iter().map(|e| (e.id, e)).collect();
    let mut tiers: [Vec<Qualifier>; 3] = Default::default();

    for group in groups {
        let members = group
            .members
            .iter()
            .map(|id| {
                by_id
                    .get(id)
                    .map(|e| (*e).clone())
                    .ok_or(TournamentError::not_found("Entrant", *id))
            })
            .collect::<Result<Vec<Entrant>, _>>()?;
        let group_matches: Vec<GameMatch> = matches
            .iter()
            .filter(|m| m.group_id == Some(group.id) && m.is_completed())
            .cloned()
            .collect();
        let standings = group_standings(&members, &group_matches);

        let finishers = standings
            .iter()
            .filter(|row| {
                by_id
                    .get(&row.entrant_id)
                    .is_some_and(|e| e.status != EntrantStatus::Disqualified)
            })
            .take(per_group as usize);
        for (i, row) in finishers.enumerate() {
            let rank = i as u32 + 1;
            let tier = (i).min(2);
            tiers[tier].push(Qualifier::from_row(row, group.id, rank));
        }
    }

    let mut seeded = Vec::new();
    for mut tier in tiers {
        tier.sort_by(tier_order);
        seeded.extend(tier);
    }
    if seeded.len() < 2 {
        return Err(TournamentError::InsufficientCompletedMatches);
    }
    Ok(seeded)
}
