//! Tournament algorithms: pure functions over entrants and the match log.

pub mod bracket;
pub mod global_ranking;
pub mod group_matches;
pub mod groups;
pub mod qualifiers;
pub mod ranking_points;
pub mod roster;
pub mod rounds;
pub mod standings;

pub use bracket::{build_bracket, plan_bracket, seeding_order, BracketPlan, Seed};
pub use global_ranking::aggregate;
pub use group_matches::generate_group_matches;
pub use groups::{plan_groups, GroupPlan, GroupSchedule};
pub use qualifiers::{select_qualifiers, Qualifier};
pub use ranking_points::assign_positions;
pub use roster::{eligible, parse_roster_csv, RosterRow};
pub use rounds::{next_round, pending_count, resolve_feeds};
pub use standings::{global_standings, group_standings};
