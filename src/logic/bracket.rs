//! Bracket size normalization and seeded bracket layout.

use crate::models::{EntrantId, GameMatch, MatchId, PhaseId, SlotSource, TournamentError};
use serde::Serialize;

/// Occupant of a bracket seed position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Seed {
    Entrant(EntrantId),
    /// Whoever wins this (preliminary) match.
    WinnerOf(MatchId),
}

/// How the qualifier list maps onto an exact power-of-two main bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketPlan {
    /// Main bracket size.
    pub size: usize,
    /// Seeds that go straight into the main bracket, best first.
    pub direct: Vec<EntrantId>,
    /// Repechage pairings, best prelim seed against worst.
    pub prelim_pairs: Vec<(EntrantId, EntrantId)>,
}

impl BracketPlan {
    pub fn excess(&self) -> usize {
        self.prelim_pairs.len()
    }
}

fn require_bracket_size(size: usize) -> Result<(), TournamentError> {
    if size < 2 || !size.is_power_of_two() {
        return Err(TournamentError::InvalidConfiguration(format!(
            "bracket size must be a power of two (got {size})"
        )));
    }
    Ok(())
}

/// Reconcile `qualifiers` (best first) with the configured `target` bracket size.
///
/// With more qualifiers than slots, the bottom `2 * excess` seeds play a preliminary
/// round and the rest go through directly. With fewer, the bracket shrinks to the
/// smallest power of two that holds them; remaining slots are byes.
pub fn plan_bracket(qualifiers: &[EntrantId], target: usize) -> Result<BracketPlan, TournamentError> {
    require_bracket_size(target)?;
    let count = qualifiers.len();
    if count < 2 {
        return Err(TournamentError::InsufficientCompletedMatches);
    }

    let mut size = target;
    while count > size * 2 {
        size *= 2;
    }
    if size != target {
        log::warn!("{count} qualifiers exceed twice the bracket of {target}; using a bracket of {size}");
    }

    if count <= size {
        return Ok(BracketPlan {
            size: count.next_power_of_two().min(size),
            direct: qualifiers.to_vec(),
            prelim_pairs: Vec::new(),
        });
    }

    let excess = count - size;
    let (direct, prelim) = qualifiers.split_at(size - excess);
    let prelim_pairs = (0..excess)
        .map(|i| (prelim[i], prelim[prelim.len() - 1 - i]))
        .collect();
    Ok(BracketPlan {
        size,
        direct: direct.to_vec(),
        prelim_pairs,
    })
}

/// Preliminary round matches, in plan order.
pub fn prelim_matches(phase_id: PhaseId, round_number: u32, plan: &BracketPlan) -> Vec<GameMatch> {
    plan.prelim_pairs
        .iter()
        .enumerate()
        .map(|(i, (a, b))| GameMatch::new(phase_id, None, round_number, i as u32, Some(*a), Some(*b)))
        .collect()
}

/// Main-bracket seed list: direct qualifiers, then the winners of each preliminary match.
pub fn main_bracket_seeds(plan: &BracketPlan, prelims: &[GameMatch]) -> Vec<Seed> {
    plan.direct
        .iter()
        .map(|id| Seed::Entrant(*id))
        .chain(prelims.iter().map(|m| Seed::WinnerOf(m.id)))
        .collect()
}

/// Seed indices in bracket order; consecutive pairs meet in the first round.
///
/// Starting from `[0, 1]`, every doubling replaces each index `i` with `i, size - 1 - i`,
/// so the two best seeds can only meet in the final.
pub fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![0, 1];
    while order.len() < size {
        let next = order.len() * 2;
        order = order.iter().flat_map(|&i| [i, next - 1 - i]).collect();
    }
    order
}

fn slot(seed: Seed) -> (Option<EntrantId>, Option<SlotSource>) {
    match seed {
        Seed::Entrant(id) => (Some(id), None),
        Seed::WinnerOf(match_id) => (None, Some(SlotSource::WinnerOf(match_id))),
    }
}

/// First-round matches of a bracket of `size`. Missing seeds give byes to their opponents.
pub fn build_bracket(
    phase_id: PhaseId,
    round_number: u32,
    seeds: &[Seed],
    size: usize,
) -> Result<Vec<GameMatch>, TournamentError> {
    require_bracket_size(size)?;
    if seeds.len() > size {
        return Err(TournamentError::InvalidConfiguration(format!(
            "{} seeds do not fit a bracket of {size}",
            seeds.len()
        )));
    }

    seeding_order(size)
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let position = i as u32;
            match (seeds.get(pair[0]).copied(), seeds.get(pair[1]).copied()) {
                (Some(a), Some(b)) => {
                    let (player1, source1) = slot(a);
                    let (player2, source2) = slot(b);
                    Ok(GameMatch::new(phase_id, None, round_number, position, player1, player2)
                        .fed_by(source1, source2))
                }
                (Some(Seed::Entrant(id)), None) | (None, Some(Seed::Entrant(id))) => {
                    Ok(GameMatch::bye(phase_id, round_number, position, id))
                }
                _ => Err(TournamentError::InvalidConfiguration(format!(
                    "bracket of {size} is too large for {} seeds",
                    seeds.len()
                ))),
            }
        })
        .collect()
}
