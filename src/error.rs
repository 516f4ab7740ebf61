//! Error types
//!
//! Physics and AI never fail; only configuration, the tournament layer and
//! persistence can reject a call.

/// Invalid configuration supplied by the caller
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid tournament type: {0}")]
    UnknownTournamentType(String),
    #[error("participant count {0} is not a power of two")]
    ParticipantCount(usize),
    #[error("{participants} participants cannot fill {rounds} rounds")]
    RoundMismatch { participants: usize, rounds: u32 },
}

/// Rejected tournament/bracket operation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TournamentError {
    #[error("no active tournament")]
    NoActiveTournament,
    #[error("tournament already completed")]
    AlreadyCompleted,
    #[error("match {0} does not have both participants yet")]
    MatchNotReady(String),
    #[error("tie score {0}-{0} cannot decide a match")]
    TieScore(u32),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure saving or loading a snapshot
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("store error: {0}")]
    Store(String),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}
