//! Data structures for carom tournaments: entrants, groups, phases, matches, rankings.

mod entrant;
mod game;
mod group;
mod phase;
mod player;
mod ranking;
mod standings;
mod tournament;

pub use entrant::{Entrant, EntrantId, EntrantStatus};
pub use game::{GameMatch, MatchId, MatchResult, MatchStatus, SlotSource, WinReason};
pub use group::{Group, GroupId, PairingPolicy};
pub use phase::{round_name, Phase, PhaseId, PhaseKind};
pub use player::{Category, Player, PlayerId};
pub use ranking::{PlayerRanking, PointScale, RankingRecord, TournamentResult};
pub use standings::StandingsRow;
pub use tournament::{
    ErrorKind, GroupFormat, ParseEnumError, Tournament, TournamentConfig, TournamentError,
    TournamentId, TournamentStatus,
};
