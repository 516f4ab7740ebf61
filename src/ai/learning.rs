//! Player modelling for adaptive opponents

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::profile::Tuning;

/// Number of recent hit angles remembered
pub const ANGLE_HISTORY: usize = 10;
/// Weight of a new sample in the running hit-height average
pub const HIT_HEIGHT_SMOOTHING: f32 = 0.1;
/// A player contact younger than this (seconds) counts as "just hit"
pub const HIT_WINDOW: f64 = 0.1;

/// Score ratio beyond which the opponent adjusts itself
const LEAD_RATIO: f32 = 2.0;
const ACCURACY_STEP: f32 = 0.01;
const REACTION_STEP: f32 = 0.005;
const ACCURACY_FLOOR: f32 = 0.5;
const ACCURACY_CEILING: f32 = 0.9;
const REACTION_FLOOR: f32 = 0.1;
const REACTION_CEILING: f32 = 0.5;

/// What the opponent has learned about the human player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerModel {
    /// Running average of where the player strikes, 0 (top) to 1 (bottom)
    pub average_hit_height: f32,
    /// Most recent hit angles (radians), oldest first
    pub recent_angles: VecDeque<f32>,
    /// Match time of the last contact already learned from
    pub last_learned_hit: Option<f64>,
}

impl Default for PlayerModel {
    fn default() -> Self {
        Self {
            average_hit_height: 0.5,
            recent_angles: VecDeque::with_capacity(ANGLE_HISTORY),
            last_learned_hit: None,
        }
    }
}

impl PlayerModel {
    /// Record one player hit
    pub fn record_hit(&mut self, height: f32, angle: f32) {
        self.average_hit_height = self.average_hit_height * (1.0 - HIT_HEIGHT_SMOOTHING)
            + height * HIT_HEIGHT_SMOOTHING;
        self.recent_angles.push_back(angle);
        while self.recent_angles.len() > ANGLE_HISTORY {
            self.recent_angles.pop_front();
        }
    }

    pub fn last_angle(&self) -> Option<f32> {
        self.recent_angles.back().copied()
    }

    /// Whether a contact at `last_hit` should be learned from at `now`
    pub fn is_fresh_hit(&self, last_hit: Option<f64>, now: f64) -> bool {
        match last_hit {
            Some(hit) => now - hit < HIT_WINDOW && self.last_learned_hit != Some(hit),
            None => false,
        }
    }
}

/// Ease off when the human is well behind, tighten up when well ahead.
///
/// Each call moves accuracy and reaction time by one small step, so the
/// opponent drifts rather than snapping.
pub fn adapt_to_score(tuning: &mut Tuning, human_score: u32, ai_score: u32) {
    let human = human_score as f32;
    let ai = ai_score as f32;

    if human / ai.max(1.0) > LEAD_RATIO {
        tuning.accuracy = (tuning.accuracy - ACCURACY_STEP).max(ACCURACY_FLOOR.min(tuning.accuracy));
        tuning.reaction_time =
            (tuning.reaction_time + REACTION_STEP).min(REACTION_CEILING.max(tuning.reaction_time));
    } else if ai / human.max(1.0) > LEAD_RATIO {
        tuning.accuracy = (tuning.accuracy + ACCURACY_STEP).min(ACCURACY_CEILING.max(tuning.accuracy));
        tuning.reaction_time =
            (tuning.reaction_time - REACTION_STEP).max(REACTION_FLOOR.min(tuning.reaction_time));
    }
}
