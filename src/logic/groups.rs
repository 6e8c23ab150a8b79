//! Group formation: snake seeding of active entrants and table/time scheduling.

use crate::models::{Entrant, GroupFormat, PairingPolicy, Tournament, TournamentError};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Operator override for one group's table or start time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSchedule {
    pub table_number: Option<u32>,
    pub start_time: Option<NaiveDateTime>,
}

/// A group as it will be (or was) created: members best seed first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupPlan {
    pub name: String,
    pub table_number: u32,
    pub start_time: NaiveDateTime,
    pub policy: PairingPolicy,
    pub members: Vec<Entrant>,
}

/// Number of groups needed for `players` at `group_size` per group.
pub fn group_count(players: usize, group_size: u32) -> usize {
    players.div_ceil(group_size as usize)
}

/// Group a seed index lands in: forward on even waves, reversed on odd ones.
pub fn snake_target(index: usize, groups: usize) -> usize {
    let wave = index / groups;
    let offset = index % groups;
    if wave % 2 == 0 {
        offset
    } else {
        groups - 1 - offset
    }
}

/// "A", "B", ..., "Z", "AA", "AB", ...
pub fn group_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Pairing policy for a group of `size` under the tournament's format.
pub fn resolve_policy(size: usize, format: GroupFormat) -> PairingPolicy {
    match (size, format) {
        (2, _) => PairingPolicy::DoubleRound,
        (4, GroupFormat::Gsl) => PairingPolicy::GslQuartet,
        _ => PairingPolicy::RoundRobin,
    }
}

/// Entrants strongest first: average descending, earlier registration first on ties.
pub fn seed_order(entrants: &[Entrant]) -> Vec<Entrant> {
    let mut seeded = entrants.to_vec();
    seeded.sort_by(|a, b| {
        b.average
            .total_cmp(&a.average)
            .then(a.registration_order.cmp(&b.registration_order))
    });
    seeded
}

/// Partition `active` entrants into scheduled groups without persisting anything.
///
/// Groups are filled by snake seeding over the seed order, then laid out over the
/// tournament's tables: group `i` gets table `i % tables + 1` and starts
/// `i / tables` blocks after the tournament start. Overrides are keyed by group name.
pub fn plan_groups(
    tournament: &Tournament,
    active: &[Entrant],
    overrides: &HashMap<String, GroupSchedule>,
) -> Result<Vec<GroupPlan>, TournamentError> {
    let config = &tournament.config;
    if !(3..=4).contains(&config.group_size) {
        return Err(TournamentError::InvalidGroupSize(config.group_size));
    }
    if active.is_empty() {
        return Err(TournamentError::InsufficientPlayers);
    }
    if config.tables_available == 0 {
        return Err(TournamentError::InvalidConfiguration(
            "at least one table is required".to_string(),
        ));
    }

    let groups = group_count(active.len(), config.group_size);
    let mut buckets: Vec<Vec<Entrant>> = vec![Vec::new(); groups];
    for (index, entrant) in seed_order(active).into_iter().enumerate() {
        buckets[snake_target(index, groups)].push(entrant);
    }

    let tables = config.tables_available as usize;
    let plans = buckets
        .into_iter()
        .enumerate()
        .map(|(i, members)| {
            let name = group_name(i);
            let block = (i / tables) as i64;
            let mut table_number = (i % tables) as u32 + 1;
            let mut start_time =
                tournament.start_time + Duration::minutes(block * i64::from(config.block_minutes));
            if let Some(schedule) = overrides.get(&name) {
                table_number = schedule.table_number.unwrap_or(table_number);
                start_time = schedule.start_time.unwrap_or(start_time);
            }
            GroupPlan {
                policy: resolve_policy(members.len(), config.group_format),
                name,
                table_number,
                start_time,
                members,
            }
        })
        .collect();
    Ok(plans)
}
