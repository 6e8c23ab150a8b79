//! Boundary operations: load from the store, run the pure logic, write back in one transaction.

pub mod group_stage;
pub mod playoffs;
pub mod ranking;
pub mod registration;
pub mod results;

pub use group_stage::{generate_groups, group_standings, preview_groups, tournament_standings, GroupStage};
pub use playoffs::{finalize_tournament, generate_next_round, generate_playoffs, Playoffs, RoundAdvance};
pub use ranking::{assign_ranking_points, recompute_global_ranking};
pub use registration::{
    create_player, create_tournament, import_roster_csv, register_entrant, remove_entrants, Registration,
};
pub use results::{disqualify_entrant, record_match_result, swap_entrants};

use crate::models::{Entrant, EntrantId, TournamentError, TournamentId};
use crate::store;
use rusqlite::Connection;

/// Load an entrant and make sure it belongs to `tournament_id`.
pub(crate) fn entrant_of(
    conn: &Connection,
    tournament_id: TournamentId,
    entrant_id: EntrantId,
) -> Result<Entrant, TournamentError> {
    let entrant = store::entrants::get(conn, entrant_id)?;
    if entrant.tournament_id != tournament_id {
        return Err(TournamentError::not_found("Entrant", entrant_id));
    }
    Ok(entrant)
}
