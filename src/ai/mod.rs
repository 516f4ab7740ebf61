//! AI opponent
//!
//! - `profile`: difficulty presets, personality modifiers and the resolved tuning
//! - `learning`: player modelling and score-based self-adjustment
//! - `opponent`: prediction, target selection and movement commands

pub mod learning;
pub mod opponent;
pub mod profile;

pub use learning::PlayerModel;
pub use opponent::{AiOpponent, AiSelection, AiStatus, MovementCommand};
pub use profile::{Difficulty, DifficultyProfile, Personality, PersonalityTraits, Tuning};
