//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick(dt)`
//! - Seeded RNG only
//! - Deferred work runs off the match clock, never a wall clock
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod schedule;
pub mod state;
pub mod tick;

pub use collision::{
    Aabb, CollisionResult, PaddleContact, ball_paddle_collision, ball_paddle_sweep,
    ball_wall_collision,
};
pub use physics::{ActiveEffect, EffectSlot, PhysicsEngine, PowerupEffects, StepOutcome};
pub use schedule::{Deferred, Scheduler};
pub use state::{
    Ball, Controller, GameEvent, GameSnapshot, MatchPhase, Paddle, Powerup, PowerupKind,
    SNAPSHOT_VERSION, Scores, ScreenShake, Side, SoundCue,
};
pub use tick::{AUTOPILOT, MatchController, MatchResult, PaddleInput, TickInput};
