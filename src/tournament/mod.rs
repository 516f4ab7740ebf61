//! Single-elimination tournaments
//!
//! - `types`: tournament formats, the AI roster, participants
//! - `bracket`: pairing, winner advancement, placement
//! - `manager`: lifecycle, auto-progression of AI-only matches, views
//! - `history`: player profile and finished-tournament summaries

pub mod bracket;
pub mod history;
pub mod manager;
pub mod types;

pub use bracket::{Bracket, BracketMatch};
pub use history::{HistoryEntry, PlayerProfile, TournamentHistory};
pub use manager::{
    BracketView, CurrentSummary, Tournament, TournamentManager, TournamentStats, simulate_scores,
};
pub use types::{
    MatchStatus, Participant, ParticipantId, ParticipantKind, ROSTER, RosterEntry,
    TournamentConfig, TournamentKind, TournamentStatus,
};
