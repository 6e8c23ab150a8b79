//! National (rolling 12-month) and annual ranking, recomputed from the full history.

use crate::config::RankingSettings;
use crate::models::{Category, PlayerId, PlayerRanking, TournamentResult};
use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeMap;

/// Recompute the ranking of every player with at least one positive result.
///
/// Results from tournaments whose name marks them as test/practice are ignored.
/// National score: category A (enough recent tournaments) counts only the best
/// `top_results`; B and C count everything in the window. Annual score: every
/// result of `today`'s calendar year.
pub fn aggregate(
    results: &[TournamentResult],
    today: NaiveDate,
    settings: &RankingSettings,
) -> Vec<PlayerRanking> {
    let window_start = today
        .checked_sub_months(Months::new(settings.window_months))
        .unwrap_or(NaiveDate::MIN);

    let mut by_player: BTreeMap<PlayerId, Vec<&TournamentResult>> = BTreeMap::new();
    for r in results
        .iter()
        .filter(|r| !settings.is_excluded(&r.tournament_name))
    {
        by_player.entry(r.player_id).or_default().push(r);
    }

    by_player
        .into_iter()
        .filter(|(_, history)| history.iter().any(|r| r.points > 0))
        .map(|(player_id, history)| {
            let mut recent: Vec<u32> = history
                .iter()
                .filter(|r| r.start_date > window_start && r.start_date <= today)
                .map(|r| r.points)
                .collect();
            recent.sort_unstable_by(|a, b| b.cmp(a));
            let (category, national_score) = national_score(&recent, settings);

            let annual: Vec<u32> = history
                .iter()
                .filter(|r| r.start_date.year() == today.year())
                .map(|r| r.points)
                .collect();

            PlayerRanking {
                player_id,
                national_score,
                category,
                national_count: recent.len() as u32,
                annual_score: annual.iter().sum(),
                annual_count: annual.len() as u32,
            }
        })
        .collect()
}

/// Category and score from recent points, sorted best first.
fn national_score(recent: &[u32], settings: &RankingSettings) -> (Category, u32) {
    if recent.len() >= settings.category_a_min {
        (Category::A, recent.iter().take(settings.top_results).sum())
    } else if recent.len() >= settings.category_b_min {
        (Category::B, recent.iter().sum())
    } else {
        (Category::C, recent.iter().sum())
    }
}
