//! Match settings and preference keys
//!
//! Persisted through the store collaborator alongside the AI selection.

use serde::{Deserialize, Serialize};

use crate::ai::{Difficulty, Personality};
use crate::consts::*;

/// Settings for a single match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Court size in pixels
    pub court_width: f32,
    pub court_height: f32,
    /// First side to reach this score wins
    pub score_to_win: u32,

    // === Powerups ===
    pub powerups_enabled: bool,
    /// Seconds of rally time between spawns
    pub powerup_spawn_interval: f32,
    /// Seconds an uncollected powerup stays on court
    pub powerup_lifetime: f32,

    /// Pause between a point and the next serve (seconds)
    pub serve_pause: f32,

    // === Opponent ===
    pub difficulty: Difficulty,
    pub personality: Personality,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            court_width: COURT_WIDTH,
            court_height: COURT_HEIGHT,
            score_to_win: DEFAULT_SCORE_TO_WIN,

            powerups_enabled: true,
            powerup_spawn_interval: POWERUP_SPAWN_INTERVAL,
            powerup_lifetime: POWERUP_LIFETIME,

            serve_pause: SERVE_PAUSE,

            difficulty: Difficulty::Normal,
            personality: Personality::Balanced,
        }
    }
}

impl MatchSettings {
    /// Settings for a tournament match against a specific opponent
    pub fn for_opponent(
        &self,
        score_to_win: u32,
        difficulty: Difficulty,
        personality: Personality,
    ) -> Self {
        Self {
            score_to_win,
            difficulty,
            personality,
            ..self.clone()
        }
    }

    /// Apply preference keys as the menu hands them over.
    ///
    /// Unknown keys fall back to `normal` / `balanced`.
    pub fn apply_keys(&mut self, difficulty: &str, personality: &str) {
        self.difficulty = Difficulty::from_key(difficulty);
        self.personality = Personality::from_key(personality);
    }
}
