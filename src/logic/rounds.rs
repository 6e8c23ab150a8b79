//! Round advancement and resolution of slots fed by earlier matches.

use crate::models::{EntrantId, GameMatch, MatchId, PhaseId, SlotSource, TournamentError};

/// Matches of a round that are not completed with a winner.
pub fn pending_count(round: &[GameMatch]) -> usize {
    round
        .iter()
        .filter(|m| !m.is_completed() || m.winner.is_none())
        .count()
}

/// Winners of `round` in bracket order, once every match has one.
fn round_winners(round: &[GameMatch]) -> Result<Vec<EntrantId>, TournamentError> {
    let pending = pending_count(round);
    if pending > 0 {
        return Err(TournamentError::PendingMatches { pending });
    }
    let mut ordered: Vec<&GameMatch> = round.iter().collect();
    ordered.sort_by_key(|m| m.bracket_position);
    Ok(ordered.iter().filter_map(|m| m.winner).collect())
}

/// Pair consecutive winners of a completed round into the next round's matches.
///
/// Bracket order is preserved: the winner of position `2i` meets the winner of `2i + 1`.
pub fn next_round(round: &[GameMatch], next_phase_id: PhaseId) -> Result<Vec<GameMatch>, TournamentError> {
    if round.is_empty() {
        return Err(TournamentError::InvalidState("the current round has no matches".to_string()));
    }
    let winners = round_winners(round)?;
    if round.len() == 1 {
        return Err(TournamentError::TournamentComplete);
    }
    if winners.len() % 2 != 0 {
        return Err(TournamentError::InvalidState(format!(
            "a round of {} matches cannot be paired",
            winners.len()
        )));
    }
    let round_number = round.iter().map(|m| m.round_number).max().unwrap_or(0) + 1;
    Ok(winners
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            GameMatch::new(next_phase_id, None, round_number, i as u32, Some(pair[0]), Some(pair[1]))
        })
        .collect())
}

/// Fill the slots that wait on `decided`. Returns the ids of matches that changed.
pub fn resolve_feeds(matches: &mut [GameMatch], decided: &GameMatch) -> Vec<MatchId> {
    if !decided.is_completed() {
        return Vec::new();
    }
    let mut changed = Vec::new();
    for source in [SlotSource::WinnerOf(decided.id), SlotSource::LoserOf(decided.id)] {
        let Some(entrant) = source.pick(decided) else {
            continue;
        };
        for m in matches.iter_mut().filter(|m| !m.is_completed()) {
            if m.resolve_slot(source, entrant) && !changed.contains(&m.id) {
                changed.push(m.id);
            }
        }
    }
    changed
}
