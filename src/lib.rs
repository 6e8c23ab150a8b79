//! Carom billiards tournament engine: library with models, logic, storage and services.

pub mod config;
pub mod logic;
pub mod models;
pub mod services;
pub mod store;

pub use config::{RankingSettings, ServerSettings, Settings};
pub use models::{
    Entrant, EntrantId, EntrantStatus, ErrorKind, GameMatch, Group, GroupId, MatchId, MatchResult,
    Phase, PhaseKind, Player, PlayerId, StandingsRow, Tournament, TournamentConfig, TournamentError,
    TournamentId, TournamentStatus,
};
pub use services::{
    assign_ranking_points, create_player, create_tournament, disqualify_entrant, finalize_tournament,
    generate_groups, generate_next_round, generate_playoffs, group_standings, import_roster_csv,
    preview_groups, record_match_result, recompute_global_ranking, register_entrant, remove_entrants,
    swap_entrants, tournament_standings, Registration,
};
