//! Intra-group match generation for each pairing policy.

use crate::models::{EntrantId, GameMatch, GroupId, PairingPolicy, PhaseId, SlotSource};

/// Emit the scheduled matches of one group. `members` is the seeded list, best first.
pub fn generate_group_matches(
    phase_id: PhaseId,
    group_id: GroupId,
    policy: PairingPolicy,
    members: &[EntrantId],
) -> Vec<GameMatch> {
    match (policy, members) {
        (PairingPolicy::DoubleRound, [a, b]) => double_round(phase_id, group_id, *a, *b),
        (PairingPolicy::GslQuartet, [s1, s2, s3, s4]) => {
            gsl_quartet(phase_id, group_id, [*s1, *s2, *s3, *s4])
        }
        _ => round_robin(phase_id, group_id, members),
    }
}

/// One match per unordered pair, all in round 1.
fn round_robin(phase_id: PhaseId, group_id: GroupId, members: &[EntrantId]) -> Vec<GameMatch> {
    let mut matches = Vec::new();
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            let position = matches.len() as u32;
            matches.push(GameMatch::new(phase_id, Some(group_id), 1, position, Some(*a), Some(*b)));
        }
    }
    matches
}

/// Home and away: the second match reverses who starts.
fn double_round(phase_id: PhaseId, group_id: GroupId, a: EntrantId, b: EntrantId) -> Vec<GameMatch> {
    vec![
        GameMatch::new(phase_id, Some(group_id), 1, 0, Some(a), Some(b)),
        GameMatch::new(phase_id, Some(group_id), 2, 1, Some(b), Some(a)),
    ]
}

/// Double-elimination mini-bracket:
/// 1v4 and 2v3, then winners' and losers' matches, then the decider
/// (loser of the winners' match against the winner of the losers' match).
fn gsl_quartet(phase_id: PhaseId, group_id: GroupId, seeds: [EntrantId; 4]) -> Vec<GameMatch> {
    let [s1, s2, s3, s4] = seeds;
    let opening_a = GameMatch::new(phase_id, Some(group_id), 1, 0, Some(s1), Some(s4));
    let opening_b = GameMatch::new(phase_id, Some(group_id), 1, 1, Some(s2), Some(s3));
    let winners = GameMatch::new(phase_id, Some(group_id), 2, 2, None, None).fed_by(
        Some(SlotSource::WinnerOf(opening_a.id)),
        Some(SlotSource::WinnerOf(opening_b.id)),
    );
    let losers = GameMatch::new(phase_id, Some(group_id), 2, 3, None, None).fed_by(
        Some(SlotSource::LoserOf(opening_a.id)),
        Some(SlotSource::LoserOf(opening_b.id)),
    );
    let decider = GameMatch::new(phase_id, Some(group_id), 3, 4, None, None).fed_by(
        Some(SlotSource::LoserOf(winners.id)),
        Some(SlotSource::WinnerOf(losers.id)),
    );
    vec![opening_a, opening_b, winners, losers, decider]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<EntrantId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn round_robin_covers_every_pair_once() {
        for size in [3usize, 4, 5, 6] {
            let members = ids(size);
            let matches = generate_group_matches(Uuid::new_v4(), Uuid::new_v4(), PairingPolicy::RoundRobin, &members);
            assert_eq!(matches.len(), size * (size - 1) / 2);
            let pairs: HashSet<(EntrantId, EntrantId)> = matches
                .iter()
                .map(|m| {
                    let (a, b) = (m.player1.unwrap(), m.player2.unwrap());
                    if a < b { (a, b) } else { (b, a) }
                })
                .collect();
            assert_eq!(pairs.len(), matches.len());
            assert!(matches.iter().all(|m| m.round_number == 1 && m.status == MatchStatus::Scheduled));
            assert!(matches.iter().all(|m| m.score1.is_none() && m.score2.is_none()));
        }
    }

    #[test]
    fn double_round_reverses_starter() {
        let members = ids(2);
        let matches = generate_group_matches(Uuid::new_v4(), Uuid::new_v4(), PairingPolicy::DoubleRound, &members);
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].player1, matches[0].player2), (Some(members[0]), Some(members[1])));
        assert_eq!((matches[1].player1, matches[1].player2), (Some(members[1]), Some(members[0])));
        assert_eq!((matches[0].round_number, matches[1].round_number), (1, 2));
    }

    #[test]
    fn gsl_opens_one_v_four_and_two_v_three() {
        let members = ids(4);
        let matches = generate_group_matches(Uuid::new_v4(), Uuid::new_v4(), PairingPolicy::GslQuartet, &members);
        assert_eq!(matches.len(), 5);
        assert_eq!((matches[0].player1, matches[0].player2), (Some(members[0]), Some(members[3])));
        assert_eq!((matches[1].player1, matches[1].player2), (Some(members[1]), Some(members[2])));
        assert_eq!(
            matches.iter().map(|m| m.round_number).collect::<Vec<_>>(),
            vec![1, 1, 2, 2, 3]
        );
        assert!(matches[2..].iter().all(|m| m.player1.is_none() && m.player2.is_none()));
        assert_eq!(matches[4].player1_source, Some(SlotSource::LoserOf(matches[2].id)));
        assert_eq!(matches[4].player2_source, Some(SlotSource::WinnerOf(matches[3].id)));
    }

    #[test]
    fn single_member_group_has_no_matches() {
        let members = ids(1);
        assert!(generate_group_matches(Uuid::new_v4(), Uuid::new_v4(), PairingPolicy::RoundRobin, &members).is_empty());
    }
}
