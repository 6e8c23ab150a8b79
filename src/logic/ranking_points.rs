//! Final positions and ranking points of a finished tournament.

use crate::models::{
    Entrant, EntrantId, EntrantStatus, GameMatch, PointScale, RankingRecord, TournamentError,
};
use std::collections::HashMap;

/// Assign every competing entrant a final position and its points.
///
/// `rounds` holds the matches of each elimination phase, Final first, then semifinals,
/// and so on back to the first elimination round (a preliminary round included). The
/// Final decides positions 1 and 2; every loser of the round `i` steps back from the
/// Final shares position `2^i + 1`; everyone else gets `2^rounds + 1`. Waitlisted
/// entrants never competed and get nothing. Disqualified entrants did compete: they keep
/// the tier of the round they lost in, or the trailing tier if they never reached the
/// bracket.
pub fn assign_positions(
    rounds: &[Vec<GameMatch>],
    entrants: &[Entrant],
    scale: &PointScale,
) -> Result<Vec<RankingRecord>, TournamentError> {
    let final_match = match rounds.first().map(Vec::as_slice) {
        Some([m]) => m,
        _ => {
            return Err(TournamentError::InvalidState(
                "the final round must hold exactly one match".to_string(),
            ))
        }
    };
    let (Some(champion), Some(runner_up)) = (final_match.winner, final_match.loser()) else {
        return Err(TournamentError::InvalidState("the final has not been decided".to_string()));
    };

    let mut positions: HashMap<EntrantId, u32> = HashMap::new();
    positions.insert(champion, 1);
    positions.insert(runner_up, 2);
    for (i, round) in rounds.iter().enumerate().skip(1) {
        let position = 2u32.pow(i as u32) + 1;
        for loser in round.iter().filter_map(GameMatch::loser) {
            positions.entry(loser).or_insert(position);
        }
    }
    let trailing = 2u32.pow(rounds.len() as u32) + 1;

    let mut records: Vec<(u32, &Entrant)> = entrants
        .iter()
        .filter(|e| e.status != EntrantStatus::Waitlist)
        .map(|e| (positions.get(&e.id).copied().unwrap_or(trailing), e))
        .collect();
    records.sort_by_key(|(position, e)| (*position, e.registration_order));

    Ok(records
        .into_iter()
        .map(|(position, e)| RankingRecord {
            tournament_id: e.tournament_id,
            entrant_id: e.id,
            player_id: e.player_id,
            position,
            points: scale.points_for(position),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchResult;
    use uuid::Uuid;

    fn entrants(n: usize) -> Vec<Entrant> {
        (0..n)
            .map(|i| Entrant {
                id: Uuid::new_v4(),
                tournament_id: Uuid::nil(),
                player_id: Uuid::new_v4(),
                name: format!("P{i}"),
                club: None,
                handicap: 20,
                average: 0.0,
                status: EntrantStatus::Active,
                registration_order: i as u32,
                ranking_snapshot: 0,
            })
            .collect()
    }

    fn won_by_first(a: &Entrant, b: &Entrant) -> GameMatch {
        let mut m = GameMatch::new(Uuid::nil(), None, 1, 0, Some(a.id), Some(b.id));
        m.apply_result(&MatchResult { score1: 25, score2: 10, innings: 20, finished: true, ..Default::default() }, false)
            .unwrap();
        m
    }

    fn position_of(records: &[RankingRecord], e: &Entrant) -> u32 {
        records.iter().find(|r| r.entrant_id == e.id).unwrap().position
    }

    #[test]
    fn four_player_bracket_with_group_stage_leftovers() {
        let e = entrants(6);
        let semis = vec![won_by_first(&e[0], &e[3]), won_by_first(&e[1], &e[2])];
        let fin = vec![won_by_first(&e[1], &e[0])];
        let records = assign_positions(&[fin, semis], &e, &PointScale::default()).unwrap();

        assert_eq!(records.len(), 6);
        assert_eq!(position_of(&records, &e[1]), 1);
        assert_eq!(position_of(&records, &e[0]), 2);
        assert_eq!(position_of(&records, &e[2]), 3);
        assert_eq!(position_of(&records, &e[3]), 3);
        assert_eq!(position_of(&records, &e[4]), 5);
        assert_eq!(records.iter().find(|r| r.entrant_id == e[5].id).unwrap().points, 30);
        assert_eq!(records[0].points, 60);
    }

    #[test]
    fn rerunning_gives_the_same_assignment() {
        let e = entrants(4);
        let rounds = vec![vec![won_by_first(&e[0], &e[1])], vec![won_by_first(&e[0], &e[2]), won_by_first(&e[1], &e[3])]];
        let first = assign_positions(&rounds, &e, &PointScale::default()).unwrap();
        let second = assign_positions(&rounds, &e, &PointScale::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn undecided_final_is_rejected() {
        let e = entrants(2);
        let open = GameMatch::new(Uuid::nil(), None, 1, 0, Some(e[0].id), Some(e[1].id));
        assert!(assign_positions(&[vec![open]], &e, &PointScale::default()).is_err());
    }

    #[test]
    fn waitlisted_entrants_are_not_ranked() {
        let mut e = entrants(3);
        e[2].status = EntrantStatus::Waitlist;
        let records = assign_positions(&[vec![won_by_first(&e[0], &e[1])]], &e, &PointScale::default()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn disqualified_entrants_keep_their_tier() {
        let mut e = entrants(5);
        e[3].status = EntrantStatus::Disqualified;
        e[4].status = EntrantStatus::Disqualified;
        let semis = vec![won_by_first(&e[0], &e[3]), won_by_first(&e[1], &e[2])];
        let fin = vec![won_by_first(&e[0], &e[1])];
        let records = assign_positions(&[fin, semis], &e, &PointScale::default()).unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(position_of(&records, &e[3]), 3);
        assert_eq!(position_of(&records, &e[4]), 5);
    }
}
