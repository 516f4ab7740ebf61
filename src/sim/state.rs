//! Match state and core simulation types
//!
//! Everything the render collaborator and the AI read each tick lives here,
//! bundled into a versioned [`GameSnapshot`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current snapshot layout version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Which end of the court a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign of `vx` for a ball travelling toward this side's paddle
    pub fn approach_sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Who moves a paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai,
}

/// The ball. `pos` is the top-left corner of its bounding square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Pixels per nominal frame
    pub vel: Vec2,
    pub size: f32,
    /// Speed used for serves and paddle deflection
    pub base_speed: f32,
    /// Hard cap on the velocity magnitude
    pub max_speed: f32,
}

impl Ball {
    /// A stationary ball centred on the court
    pub fn new(court: Vec2) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: BALL_SIZE,
            base_speed: BALL_BASE_SPEED,
            max_speed: BALL_MAX_SPEED,
        };
        ball.center_on(court * 0.5);
        ball
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn center_on(&mut self, point: Vec2) {
        self.pos = point - Vec2::splat(self.size / 2.0);
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Rescale velocity to `speed`, keeping direction, never above the cap
    pub fn set_speed(&mut self, speed: f32) {
        let current = self.vel.length();
        if current > 0.0 {
            self.vel *= speed.min(self.max_speed) / current;
        }
    }

    /// Resize around the current centre
    pub fn resize(&mut self, size: f32) {
        let center = self.center();
        self.size = size;
        self.center_on(center);
    }
}

/// A paddle. `pos` is the top-left corner; x never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub pos: Vec2,
    pub size: Vec2,
    /// Full speed for human input, pixels per nominal frame
    pub speed: f32,
    /// Signed vertical movement applied this tick (pixels per nominal frame)
    pub velocity: f32,
    /// Match clock (seconds) of the last ball contact
    pub last_hit: Option<f64>,
    pub controller: Controller,
}

impl Paddle {
    pub fn new(side: Side, controller: Controller, court: Vec2) -> Self {
        let x = match side {
            Side::Left => PADDLE_MARGIN,
            Side::Right => court.x - PADDLE_MARGIN - PADDLE_WIDTH,
        };
        Self {
            side,
            pos: Vec2::new(x, court.y / 2.0 - PADDLE_HEIGHT / 2.0),
            size: Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            speed: PADDLE_SPEED,
            velocity: 0.0,
            last_hit: None,
            controller,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// x-coordinate of the face the ball strikes
    pub fn face_x(&self) -> f32 {
        match self.side {
            Side::Left => self.pos.x + self.size.x,
            Side::Right => self.pos.x,
        }
    }

    /// Move by `velocity` (pixels per nominal frame) and keep within the court
    pub fn shift(&mut self, velocity: f32, dt: f32, court_height: f32) {
        self.velocity = velocity;
        self.pos.y += velocity * TIME_SCALE * dt;
        self.clamp_to_court(court_height);
    }

    pub fn clamp_to_court(&mut self, court_height: f32) {
        self.pos.y = self.pos.y.clamp(0.0, (court_height - self.size.y).max(0.0));
    }
}

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    SpeedBoost,
    SizeIncrease,
    Multiball,
    Freeze,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 4] = [
        PowerupKind::SpeedBoost,
        PowerupKind::SizeIncrease,
        PowerupKind::Multiball,
        PowerupKind::Freeze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::SpeedBoost => "speedBoost",
            PowerupKind::SizeIncrease => "sizeIncrease",
            PowerupKind::Multiball => "multiball",
            PowerupKind::Freeze => "freeze",
        }
    }
}

/// A collectible on the court
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub kind: PowerupKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    /// Seconds until it disappears uncollected
    pub remaining: f32,
}

/// Phase of the per-round state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Ball parked at centre, waiting for the serve
    Serve,
    /// Ball in play
    Rally,
    /// Match is paused
    Paused,
    /// Win threshold reached, simulation frozen
    Ended,
}

/// Points per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub left: u32,
    pub right: u32,
}

impl Scores {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn add_point(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }

    /// Side with the strictly higher score
    pub fn leader(&self) -> Option<Side> {
        if self.left > self.right {
            Some(Side::Left)
        } else if self.right > self.left {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Named audio cues handed to the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    PaddleHit,
    WallHit,
    Score,
    Powerup,
    GameStart,
    GameOver,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::PaddleHit => "paddleHit",
            SoundCue::WallHit => "wallHit",
            SoundCue::Score => "score",
            SoundCue::Powerup => "powerup",
            SoundCue::GameStart => "gameStart",
            SoundCue::GameOver => "gameOver",
        }
    }
}

/// Screen-shake request for the render collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenShake {
    pub intensity: f32,
    pub duration_ms: u32,
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStart,
    Served { toward: Side },
    WallHit { pos: Vec2 },
    PaddleHit { side: Side, pos: Vec2 },
    /// `side` scored the point
    Scored { side: Side, scores: Scores },
    PowerupSpawned { id: u32, kind: PowerupKind },
    PowerupExpired { id: u32 },
    PowerupCollected { kind: PowerupKind, pos: Vec2 },
    EffectEnded { kind: PowerupKind },
    GameOver { winner: Side, scores: Scores, elapsed: f64 },
}

impl GameEvent {
    /// Audio cue for this event, if any
    pub fn sound(&self) -> Option<SoundCue> {
        match self {
            GameEvent::GameStart => Some(SoundCue::GameStart),
            GameEvent::WallHit { .. } => Some(SoundCue::WallHit),
            GameEvent::PaddleHit { .. } => Some(SoundCue::PaddleHit),
            GameEvent::Scored { .. } => Some(SoundCue::Score),
            GameEvent::PowerupCollected { .. } => Some(SoundCue::Powerup),
            GameEvent::GameOver { .. } => Some(SoundCue::GameOver),
            _ => None,
        }
    }

    pub fn shake(&self) -> Option<ScreenShake> {
        match self {
            GameEvent::WallHit { .. } => Some(ScreenShake {
                intensity: 2.0,
                duration_ms: 100,
            }),
            GameEvent::PaddleHit { .. } => Some(ScreenShake {
                intensity: 3.0,
                duration_ms: 150,
            }),
            _ => None,
        }
    }

    /// Where a particle burst should appear, if anywhere
    pub fn impact_at(&self) -> Option<Vec2> {
        match self {
            GameEvent::WallHit { pos }
            | GameEvent::PaddleHit { pos, .. }
            | GameEvent::PowerupCollected { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

/// Read-only view of a match handed to the AI and the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub court: Vec2,
    pub phase: MatchPhase,
    /// Seconds of match time elapsed
    pub clock: f64,
    pub ball: Ball,
    /// Indexed by [`Side::index`]
    pub paddles: [Paddle; 2],
    pub powerups: Vec<Powerup>,
    pub scores: Scores,
    pub score_to_win: u32,
}

impl GameSnapshot {
    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paddle_layout() {
        let court = Vec2::new(COURT_WIDTH, COURT_HEIGHT);
        let left = Paddle::new(Side::Left, Controller::Human, court);
        let right = Paddle::new(Side::Right, Controller::Ai, court);
        assert_eq!(left.pos, Vec2::new(30.0, 360.0));
        assert_eq!(right.pos.x, 1158.0);
        assert_eq!(left.face_x(), 42.0);
        assert_eq!(right.face_x(), 1158.0);
        assert_eq!(left.center_y(), 400.0);
    }

    #[test]
    fn test_paddle_shift_clamps() {
        let court = Vec2::new(COURT_WIDTH, COURT_HEIGHT);
        let mut paddle = Paddle::new(Side::Left, Controller::Human, court);
        paddle.shift(-1000.0, MAX_DT, court.y);
        assert_eq!(paddle.pos.y, 0.0);
        paddle.shift(1000.0, MAX_DT, court.y);
        assert_eq!(paddle.pos.y, COURT_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_ball_resize_keeps_center() {
        let mut ball = Ball::new(Vec2::new(COURT_WIDTH, COURT_HEIGHT));
        let before = ball.center();
        ball.resize(18.0);
        assert_eq!(ball.center(), before);
        assert_eq!(ball.size, 18.0);
    }

    #[test]
    fn test_set_speed_respects_cap() {
        let mut ball = Ball::new(Vec2::new(COURT_WIDTH, COURT_HEIGHT));
        ball.vel = Vec2::new(3.0, 4.0);
        ball.set_speed(100.0);
        assert!((ball.speed() - BALL_MAX_SPEED).abs() < 1e-4);
        ball.set_speed(2.5);
        assert!((ball.vel.x - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_scores_leader() {
        let mut scores = Scores::default();
        assert_eq!(scores.leader(), None);
        scores.add_point(Side::Right);
        assert_eq!(scores.leader(), Some(Side::Right));
        assert_eq!(scores.get(Side::Right), 1);
    }

    #[test]
    fn test_event_cues() {
        assert_eq!(
            GameEvent::WallHit { pos: Vec2::ZERO }.sound().map(|c| c.name()),
            Some("wallHit")
        );
        assert!(GameEvent::PowerupExpired { id: 1 }.sound().is_none());
        let shake = GameEvent::PaddleHit {
            side: Side::Left,
            pos: Vec2::ZERO,
        }
        .shake();
        assert_eq!(shake.map(|s| s.duration_ms), Some(150));
    }
}
