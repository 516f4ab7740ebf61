//! Player profile and finished-tournament history
//!
//! Both are plain serializable records handed to the persistence layer.

use serde::{Deserialize, Serialize};

use super::types::TournamentKind;

/// Maximum number of finished tournaments to keep
pub const MAX_HISTORY: usize = 50;
/// Entries shown by the statistics view
pub const RECENT_HISTORY: usize = 10;

/// Career record of the human player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub tournaments_played: u32,
    pub tournaments_won: u32,
    /// Shortest finished tournament, in seconds of play
    pub best_time: Option<f64>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            wins: 0,
            losses: 0,
            tournaments_played: 0,
            tournaments_won: 0,
            best_time: None,
        }
    }
}

impl PlayerProfile {
    /// Fold a finished tournament into the record
    pub fn record_tournament(&mut self, won: bool, wins: u32, losses: u32, duration: f64) {
        self.tournaments_played += 1;
        if won {
            self.tournaments_won += 1;
        }
        self.wins += wins;
        self.losses += losses;
        if self.best_time.is_none_or(|best| duration < best) {
            self.best_time = Some(duration);
        }
    }

    pub fn win_rate(&self) -> f32 {
        let played = self.wins + self.losses;
        if played == 0 {
            0.0
        } else {
            self.wins as f32 / played as f32
        }
    }
}

/// Summary of one finished tournament (no bracket)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub kind: TournamentKind,
    pub won: bool,
    pub placement: u32,
    /// Seconds of play across the player's matches
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentHistory {
    pub entries: Vec<HistoryEntry>,
}

impl TournamentHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append, dropping the oldest entries past the cap
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY {
            let excess = self.entries.len() - MAX_HISTORY;
            self.entries.drain(..excess);
        }
    }

    /// Most recent entries, oldest first
    pub fn recent(&self) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(RECENT_HISTORY);
        &self.entries[start..]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Best (lowest) placement ever reached
    pub fn best_placement(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.placement).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize, placement: u32) -> HistoryEntry {
        HistoryEntry {
            id: format!("t{}", i),
            kind: TournamentKind::Quick,
            won: placement == 1,
            placement,
            duration: 60.0,
        }
    }

    #[test]
    fn test_profile_records_tournaments() {
        let mut profile = PlayerProfile::default();
        profile.record_tournament(false, 1, 1, 120.0);
        profile.record_tournament(true, 2, 0, 90.0);
        profile.record_tournament(false, 0, 1, 200.0);

        assert_eq!(profile.tournaments_played, 3);
        assert_eq!(profile.tournaments_won, 1);
        assert_eq!(profile.wins, 3);
        assert_eq!(profile.losses, 2);
        assert_eq!(profile.best_time, Some(90.0));
        assert!((profile.win_rate() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = TournamentHistory::new();
        assert!(history.is_empty());
        for i in 0..(MAX_HISTORY + 5) {
            history.push(entry(i, 4));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.entries[0].id, "t5");
    }

    #[test]
    fn test_recent_returns_last_ten() {
        let mut history = TournamentHistory::new();
        for i in 0..15 {
            history.push(entry(i, if i == 3 { 1 } else { 2 }));
        }
        let recent = history.recent();
        assert_eq!(recent.len(), RECENT_HISTORY);
        assert_eq!(recent[0].id, "t5");
        assert_eq!(recent[9].id, "t14");
        assert_eq!(history.best_placement(), Some(1));
    }
}
