//! Cosmic Pong - simulation core for the portfolio mini-game
//!
//! Core modules:
//! - `sim`: Ball/paddle physics, powerups, deferred effects and the match state machine
//! - `ai`: Computer opponent (prediction, personalities, learning)
//! - `tournament`: Single-elimination brackets, player profile and history
//! - `session`: `GameSession`, the object graph wiring everything to collaborators
//! - `platform`: Narrow traits for input, rendering and audio
//! - `persistence`: Versioned JSON snapshots over a key/value store

pub mod ai;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tournament;

pub use ai::{AiOpponent, Difficulty, MovementCommand, Personality};
pub use error::{ConfigError, PersistenceError, TournamentError};
pub use session::GameSession;
pub use settings::MatchSettings;
pub use tournament::{TournamentKind, TournamentManager};

/// Game configuration constants
pub mod consts {
    /// Velocities are expressed in pixels per nominal frame at this rate
    pub const TIME_SCALE: f32 = 60.0;
    /// Largest step the caller may feed the simulation (avoids tunneling on hitches)
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Court dimensions
    pub const COURT_WIDTH: f32 = 1200.0;
    pub const COURT_HEIGHT: f32 = 800.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 12.0;
    pub const BALL_BASE_SPEED: f32 = 5.0;
    pub const BALL_MAX_SPEED: f32 = 15.0;
    /// Rally acceleration per paddle hit
    pub const RALLY_ACCELERATION: f32 = 1.05;
    /// Half-angle of the serve cone (30 degrees)
    pub const SERVE_CONE: f32 = std::f32::consts::PI / 6.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 12.0;
    pub const PADDLE_HEIGHT: f32 = 80.0;
    pub const PADDLE_SPEED: f32 = 6.0;
    /// Gap between the court edge and each paddle
    pub const PADDLE_MARGIN: f32 = 30.0;

    /// Powerups
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const POWERUP_SPAWN_INTERVAL: f32 = 10.0;
    pub const POWERUP_LIFETIME: f32 = 8.0;
    pub const SPEED_BOOST_FACTOR: f32 = 1.5;
    pub const SPEED_BOOST_DURATION: f32 = 3.0;
    pub const SIZE_INCREASE_FACTOR: f32 = 1.5;
    pub const SIZE_INCREASE_DURATION: f32 = 5.0;
    pub const FREEZE_FACTOR: f32 = 0.3;
    pub const FREEZE_DURATION: f32 = 2.0;

    /// Match flow
    pub const DEFAULT_SCORE_TO_WIN: u32 = 11;
    /// Pause between a point and the next serve (seconds)
    pub const SERVE_PAUSE: f32 = 1.0;
}

/// Sign of `v` with zero mapped to zero (unlike `f32::signum`)
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Fold `value` into `[lo, hi]` by mirroring it off both bounds, as a ball
/// bouncing between two walls would.
#[inline]
pub fn reflect_into_range(value: f32, lo: f32, hi: f32) -> f32 {
    let span = hi - lo;
    if span <= 0.0 {
        return lo;
    }
    let folded = (value - lo).rem_euclid(2.0 * span);
    if folded > span {
        hi - (folded - span)
    } else {
        lo + folded
    }
}
