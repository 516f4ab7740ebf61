//! Difficulty presets and personality modifiers
//!
//! A difficulty sets the base numbers; a personality scales them. The
//! combination resolves into a [`Tuning`] the opponent actually plays with.

use serde::{Deserialize, Serialize};

/// Base numbers for a difficulty level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Seconds between fresh decisions
    pub reaction_time: f32,
    /// 0-1, chance of executing a movement cleanly
    pub accuracy: f32,
    /// Paddle speed cap, pixels per nominal frame
    pub max_speed: f32,
    /// 0-1, how close the landing prediction is to the truth
    pub prediction_accuracy: f32,
    /// Chance per decision of a deliberate error
    pub mistake_chance: f32,
}

/// AI difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                reaction_time: 0.4,
                accuracy: 0.6,
                max_speed: 4.0,
                prediction_accuracy: 0.5,
                mistake_chance: 0.3,
            },
            Difficulty::Normal => DifficultyProfile {
                reaction_time: 0.25,
                accuracy: 0.75,
                max_speed: 5.5,
                prediction_accuracy: 0.7,
                mistake_chance: 0.15,
            },
            Difficulty::Hard => DifficultyProfile {
                reaction_time: 0.15,
                accuracy: 0.85,
                max_speed: 7.0,
                prediction_accuracy: 0.85,
                mistake_chance: 0.08,
            },
            Difficulty::Insane => DifficultyProfile {
                reaction_time: 0.1,
                accuracy: 0.95,
                max_speed: 8.5,
                prediction_accuracy: 0.95,
                mistake_chance: 0.03,
            },
        }
    }

    /// Strength ranking used when simulating AI-only matches
    pub fn tier(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
            Difficulty::Insane => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Relaxed gameplay for beginners",
            Difficulty::Normal => "Balanced challenge for most players",
            Difficulty::Hard => "Challenging for experienced players",
            Difficulty::Insane => "Nearly impossible challenge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "insane" => Some(Difficulty::Insane),
            _ => None,
        }
    }

    /// Parse a preference key, falling back to `Normal` for unknown keys
    pub fn from_key(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown difficulty '{}', using normal", s);
            Difficulty::Normal
        })
    }
}

/// Behavioural multipliers layered on a difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityTraits {
    /// >1 reacts faster, <1 slower
    pub reaction_speed: f32,
    /// Multiplier on the difficulty's accuracy
    pub accuracy: f32,
    pub aggressiveness: f32,
    /// Learning from the player is enabled above 0.5
    pub adaptability: f32,
}

/// AI personality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    #[default]
    Balanced,
    Defensive,
    Aggressive,
    Adaptive,
    Unpredictable,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Balanced,
        Personality::Defensive,
        Personality::Aggressive,
        Personality::Adaptive,
        Personality::Unpredictable,
    ];

    pub fn traits(&self) -> PersonalityTraits {
        let (reaction_speed, accuracy, aggressiveness, adaptability) = match self {
            Personality::Balanced => (1.0, 0.8, 0.5, 0.5),
            Personality::Defensive => (1.2, 0.9, 0.2, 0.3),
            Personality::Aggressive => (0.9, 0.7, 0.9, 0.4),
            Personality::Adaptive => (1.0, 0.8, 0.6, 0.9),
            Personality::Unpredictable => (0.8, 0.6, 0.7, 0.3),
        };
        PersonalityTraits {
            reaction_speed,
            accuracy,
            aggressiveness,
            adaptability,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Balanced => "balanced",
            Personality::Defensive => "defensive",
            Personality::Aggressive => "aggressive",
            Personality::Adaptive => "adaptive",
            Personality::Unpredictable => "unpredictable",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Personality::Balanced => "Balanced",
            Personality::Defensive => "Defensive",
            Personality::Aggressive => "Aggressive",
            Personality::Adaptive => "Adaptive",
            Personality::Unpredictable => "Unpredictable",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Personality::Balanced => "Well-rounded player",
            Personality::Defensive => "Focuses on blocking shots",
            Personality::Aggressive => "Takes risks for powerful shots",
            Personality::Adaptive => "Learns and adapts to player",
            Personality::Unpredictable => "Random and chaotic playstyle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "balanced" => Some(Personality::Balanced),
            "defensive" => Some(Personality::Defensive),
            "aggressive" => Some(Personality::Aggressive),
            "adaptive" => Some(Personality::Adaptive),
            "unpredictable" => Some(Personality::Unpredictable),
            _ => None,
        }
    }

    /// Parse a preference key, falling back to `Balanced` for unknown keys
    pub fn from_key(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown personality '{}', using balanced", s);
            Personality::Balanced
        })
    }
}

/// Effective parameters after applying a personality to a difficulty.
/// Learning nudges `accuracy` and `reaction_time` during play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub reaction_time: f32,
    pub accuracy: f32,
    pub max_speed: f32,
    pub prediction_accuracy: f32,
    pub mistake_chance: f32,
    pub aggressiveness: f32,
    pub adaptability: f32,
}

impl Tuning {
    pub fn new(difficulty: Difficulty, personality: Personality) -> Self {
        let base = difficulty.profile();
        let traits = personality.traits();
        Self {
            reaction_time: base.reaction_time * (2.0 - traits.reaction_speed),
            accuracy: base.accuracy * traits.accuracy,
            max_speed: base.max_speed,
            prediction_accuracy: base.prediction_accuracy,
            mistake_chance: base.mistake_chance,
            aggressiveness: traits.aggressiveness,
            adaptability: traits.adaptability,
        }
    }

    /// Whether the opponent models the player at all
    pub fn learns(&self) -> bool {
        self.adaptability > 0.5
    }
}
