//! Tournament configuration, roster and participants

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ai::{AiSelection, Difficulty, Personality};
use crate::error::ConfigError;

/// Fixed shape of a tournament type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentConfig {
    pub name: &'static str,
    pub participants: usize,
    pub rounds: u32,
    pub score_limit: u32,
    pub description: &'static str,
}

/// Supported single-elimination formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentKind {
    Quick,
    Standard,
    Championship,
}

impl TournamentKind {
    pub const ALL: [TournamentKind; 3] = [
        TournamentKind::Quick,
        TournamentKind::Standard,
        TournamentKind::Championship,
    ];

    pub fn config(&self) -> TournamentConfig {
        match self {
            TournamentKind::Quick => TournamentConfig {
                name: "Quick Tournament",
                participants: 4,
                rounds: 2,
                score_limit: 5,
                description: "Fast-paced 4-player tournament",
            },
            TournamentKind::Standard => TournamentConfig {
                name: "Standard Tournament",
                participants: 8,
                rounds: 3,
                score_limit: 7,
                description: "Classic 8-player tournament",
            },
            TournamentKind::Championship => TournamentConfig {
                name: "Championship",
                participants: 16,
                rounds: 4,
                score_limit: 11,
                description: "Ultimate 16-player challenge",
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentKind::Quick => "quick",
            TournamentKind::Standard => "standard",
            TournamentKind::Championship => "championship",
        }
    }

    /// Unknown keys are a configuration error, there is no fallback type
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(TournamentKind::Quick),
            "standard" => Ok(TournamentKind::Standard),
            "championship" => Ok(TournamentKind::Championship),
            _ => Err(ConfigError::UnknownTournamentType(s.to_string())),
        }
    }
}

/// A named computer opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: &'static str,
    pub difficulty: Difficulty,
    pub personality: Personality,
}

const fn entry(name: &'static str, difficulty: Difficulty, personality: Personality) -> RosterEntry {
    RosterEntry {
        name,
        difficulty,
        personality,
    }
}

/// Opponents tournaments draw from, weakest first
pub const ROSTER: [RosterEntry; 8] = [
    entry("Nova", Difficulty::Easy, Personality::Defensive),
    entry("Quasar", Difficulty::Easy, Personality::Balanced),
    entry("Nebula", Difficulty::Normal, Personality::Aggressive),
    entry("Cosmos", Difficulty::Normal, Personality::Adaptive),
    entry("Vortex", Difficulty::Hard, Personality::Unpredictable),
    entry("Stellar", Difficulty::Hard, Personality::Aggressive),
    entry("Galaxia", Difficulty::Insane, Personality::Adaptive),
    entry("Zenith", Difficulty::Insane, Personality::Balanced),
];

/// Stable participant handle within one tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParticipantId {
    Human,
    Ai(u32),
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantId::Human => write!(f, "player"),
            ParticipantId::Ai(i) => write!(f, "ai_{}", i),
        }
    }
}

/// Who controls a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantKind {
    Human,
    Ai(AiSelection),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub kind: ParticipantKind,
    pub wins: u32,
    pub losses: u32,
}

impl Participant {
    pub fn human(name: &str) -> Self {
        Self {
            id: ParticipantId::Human,
            name: name.to_string(),
            kind: ParticipantKind::Human,
            wins: 0,
            losses: 0,
        }
    }

    pub fn ai(index: u32, name: &str, selection: AiSelection) -> Self {
        Self {
            id: ParticipantId::Ai(index),
            name: name.to_string(),
            kind: ParticipantKind::Ai(selection),
            wins: 0,
            losses: 0,
        }
    }

    pub fn from_roster(index: u32, entry: &RosterEntry) -> Self {
        Self::ai(
            index,
            entry.name,
            AiSelection {
                difficulty: entry.difficulty,
                personality: entry.personality,
            },
        )
    }

    pub fn is_human(&self) -> bool {
        self.kind == ParticipantKind::Human
    }

    pub fn selection(&self) -> Option<AiSelection> {
        match self.kind {
            ParticipantKind::Ai(selection) => Some(selection),
            ParticipantKind::Human => None,
        }
    }

    /// Strength used by simulated matches; humans rate as normal
    pub fn tier(&self) -> u32 {
        self.selection()
            .map(|s| s.difficulty.tier())
            .unwrap_or(Difficulty::Normal.tier())
    }
}

/// Lifecycle of one bracket match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Lifecycle of a whole tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TournamentStatus {
    #[default]
    Ready,
    InProgress,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(TournamentKind::from_str("Quick"), Ok(TournamentKind::Quick));
        assert_eq!(
            TournamentKind::from_str("gauntlet"),
            Err(ConfigError::UnknownTournamentType("gauntlet".to_string()))
        );
    }

    #[test]
    fn test_configs_form_brackets() {
        for kind in TournamentKind::ALL {
            let config = kind.config();
            assert_eq!(config.participants, 1 << config.rounds, "{}", kind.as_str());
        }
    }

    #[test]
    fn test_participant_ids_display() {
        assert_eq!(ParticipantId::Human.to_string(), "player");
        assert_eq!(ParticipantId::Ai(3).to_string(), "ai_3");
    }

    #[test]
    fn test_tiers() {
        let nova = Participant::from_roster(0, &ROSTER[0]);
        let zenith = Participant::from_roster(1, &ROSTER[7]);
        assert_eq!(nova.tier(), 1);
        assert_eq!(zenith.tier(), 4);
        assert_eq!(Participant::human("Ada").tier(), 2);
        assert!(!nova.is_human());
    }
}
