//! Computer-controlled paddle
//!
//! Polled every tick with the current snapshot. Ball tracking and prediction
//! run every tick; a fresh target is only chosen once per reaction window.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::learning::{PlayerModel, adapt_to_score};
use super::profile::{Difficulty, Personality, Tuning};
use crate::consts::TIME_SCALE;
use crate::sim::state::{GameSnapshot, Paddle, Side};
use crate::sign;

/// Scale of the landing-point error at zero prediction accuracy
const PREDICTION_NOISE: f32 = 100.0;
/// Scale of the target error injected by a mistake at zero accuracy
const MISTAKE_NOISE: f32 = 100.0;
/// No movement is issued inside this distance of the target
const DEAD_ZONE: f32 = 5.0;
/// Fraction of the remaining distance covered per nominal frame
const APPROACH_GAIN: f32 = 0.1;
/// A tracked ball moving faster than this many times its cap teleported
const TELEPORT_FACTOR: f32 = 2.0;

/// Paddle movement requested for this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementCommand {
    pub up: bool,
    pub down: bool,
    /// Pixels per nominal frame, never negative
    pub speed: f32,
}

impl MovementCommand {
    pub fn idle() -> Self {
        Self::default()
    }

    fn from_movement(movement: f32) -> Self {
        Self {
            up: movement < 0.0,
            down: movement > 0.0,
            speed: movement.abs(),
        }
    }

    /// Signed vertical velocity (negative is up)
    pub fn velocity(&self) -> f32 {
        if self.up {
            -self.speed
        } else if self.down {
            self.speed
        } else {
            0.0
        }
    }
}

/// Difficulty/personality pair as persisted between sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSelection {
    pub difficulty: Difficulty,
    pub personality: Personality,
}

/// Debug view of the opponent's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiStatus {
    pub difficulty: Difficulty,
    pub personality: Personality,
    pub reaction_time: f32,
    pub accuracy: f32,
    pub target_y: f32,
    pub prediction: Option<Vec2>,
    pub player_model: PlayerModel,
}

/// AI opponent for one paddle
#[derive(Debug, Clone)]
pub struct AiOpponent {
    side: Side,
    selection: AiSelection,
    tuning: Tuning,
    court_height: f32,
    /// Desired paddle centre
    target_y: f32,
    /// Predicted point where the ball meets this paddle's face
    prediction: Option<Vec2>,
    last_ball: Option<Vec2>,
    decision_timer: f32,
    model: PlayerModel,
    rng: Pcg32,
}

impl AiOpponent {
    pub fn new(side: Side, selection: AiSelection, court: Vec2, seed: u64) -> Self {
        Self {
            side,
            selection,
            tuning: Tuning::new(selection.difficulty, selection.personality),
            court_height: court.y,
            target_y: court.y / 2.0,
            prediction: None,
            last_ball: None,
            decision_timer: 0.0,
            model: PlayerModel::default(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn selection(&self) -> AiSelection {
        self.selection
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn prediction(&self) -> Option<Vec2> {
        self.prediction
    }

    pub fn player_model(&self) -> &PlayerModel {
        &self.model
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.selection.difficulty = difficulty;
        self.tuning = Tuning::new(difficulty, self.selection.personality);
    }

    pub fn set_personality(&mut self, personality: Personality) {
        self.selection.personality = personality;
        self.tuning = Tuning::new(self.selection.difficulty, personality);
    }

    /// Clear target, prediction, timer and everything learned. The
    /// difficulty/personality selection is kept and its tuning restored.
    pub fn reset(&mut self) {
        self.tuning = Tuning::new(self.selection.difficulty, self.selection.personality);
        self.target_y = self.court_height / 2.0;
        self.prediction = None;
        self.last_ball = None;
        self.decision_timer = 0.0;
        self.model = PlayerModel::default();
    }

    pub fn status(&self) -> AiStatus {
        AiStatus {
            difficulty: self.selection.difficulty,
            personality: self.selection.personality,
            reaction_time: self.tuning.reaction_time,
            accuracy: self.tuning.accuracy,
            target_y: self.target_y,
            prediction: self.prediction,
            player_model: self.model.clone(),
        }
    }

    /// Advance the opponent by `dt` seconds and return its movement
    pub fn decide(&mut self, dt: f32, snapshot: &GameSnapshot) -> MovementCommand {
        self.decision_timer += dt;

        self.track_ball(dt, snapshot);

        if self.decision_timer >= self.tuning.reaction_time {
            self.decision_timer = 0.0;
            self.make_decision(snapshot);
        }

        if self.tuning.learns() {
            self.learn_from_player(snapshot);
        }

        self.movement_command(snapshot.paddle(self.side))
    }

    fn approaching(&self, vx: f32) -> bool {
        vx * self.side.approach_sign() > 0.0
    }

    /// Estimate ball velocity from consecutive snapshots and re-predict the
    /// landing point while the ball heads this way.
    fn track_ball(&mut self, dt: f32, snapshot: &GameSnapshot) {
        let center = snapshot.ball.center();
        let previous = self.last_ball.replace(center);
        let Some(previous) = previous else {
            return;
        };
        if dt <= 0.0 {
            return;
        }

        let velocity = (center - previous) / (dt * TIME_SCALE);
        if velocity.length() > snapshot.ball.max_speed * TELEPORT_FACTOR {
            // Re-serve or reset between snapshots
            self.prediction = None;
            return;
        }
        if self.approaching(velocity.x) {
            self.predict_landing(center, velocity, snapshot);
        } else {
            self.prediction = None;
        }
    }

    /// Extrapolate to this paddle's face, mirroring off the walls
    fn predict_landing(&mut self, center: Vec2, velocity: Vec2, snapshot: &GameSnapshot) {
        let face_x = snapshot.paddle(self.side).face_x();
        let time_to_reach = (face_x - center.x) / (velocity.x * TIME_SCALE);
        if time_to_reach < 0.0 {
            self.prediction = None;
            return;
        }

        let half = snapshot.ball.size / 2.0;
        let raw_y = center.y + velocity.y * TIME_SCALE * time_to_reach;
        let mut predicted_y = crate::reflect_into_range(raw_y, half, self.court_height - half);

        let noise = (1.0 - self.tuning.prediction_accuracy) * PREDICTION_NOISE;
        predicted_y += noise * self.jitter();

        self.prediction = Some(Vec2::new(face_x, predicted_y));
    }

    fn make_decision(&mut self, snapshot: &GameSnapshot) {
        if self.approaching(snapshot.ball.vel.x) {
            self.target_y = self.attack_target(snapshot);
        } else {
            self.target_y = self.resting_target();
        }

        if self.rng.random::<f32>() < self.tuning.mistake_chance {
            self.introduce_mistake();
        }

        self.target_y = self.target_y.clamp(0.0, self.court_height);
        log::debug!(
            "AI {:?} decided target {:.1} (prediction {:?})",
            self.side,
            self.target_y,
            self.prediction
        );
    }

    /// Target while the ball is approaching: the predicted landing point
    /// shaded by personality.
    fn attack_target(&mut self, snapshot: &GameSnapshot) -> f32 {
        let ball_y = snapshot.ball.center().y;
        let base = self.prediction.map(|p| p.y).unwrap_or(ball_y);
        let edge_band = self.court_height / 4.0;

        match self.selection.personality {
            Personality::Aggressive => {
                if ball_y < edge_band {
                    base - 20.0
                } else if ball_y > self.court_height - edge_band {
                    base + 20.0
                } else {
                    base
                }
            }
            Personality::Adaptive => match self.model.last_angle() {
                Some(angle) if angle > 0.0 => base - 30.0,
                Some(_) => base + 30.0,
                None => base,
            },
            Personality::Unpredictable => base + self.jitter() * 60.0,
            Personality::Balanced | Personality::Defensive => base,
        }
    }

    /// Target while the ball is receding: court centre plus a small
    /// personality offset.
    fn resting_target(&mut self) -> f32 {
        let center = self.court_height / 2.0;
        match self.selection.personality {
            Personality::Aggressive => center + self.jitter() * 40.0,
            Personality::Adaptive => {
                let favoured = self.model.average_hit_height * self.court_height;
                center + (favoured - center) * 0.3
            }
            _ => center,
        }
    }

    /// Misjudge the target, and sometimes stall: the timer restarts at
    /// minus one reaction window, so the next decision takes twice as long.
    fn introduce_mistake(&mut self) {
        let error = (1.0 - self.tuning.accuracy) * MISTAKE_NOISE;
        self.target_y += error * self.jitter();

        if self.rng.random::<f32>() < self.tuning.mistake_chance * 0.5 {
            self.decision_timer = -self.tuning.reaction_time;
            log::debug!("AI {:?} stalled", self.side);
        }
    }

    fn learn_from_player(&mut self, snapshot: &GameSnapshot) {
        let player = snapshot.paddle(self.side.opponent());
        let ball = &snapshot.ball;

        if self.approaching(ball.vel.x) && self.model.is_fresh_hit(player.last_hit, snapshot.clock) {
            let height = ball.center().y / self.court_height;
            let angle = ball.vel.y.atan2(ball.vel.x);
            self.model.record_hit(height, angle);
            self.model.last_learned_hit = player.last_hit;
        }

        adapt_to_score(
            &mut self.tuning,
            snapshot.scores.get(self.side.opponent()),
            snapshot.scores.get(self.side),
        );
    }

    fn movement_command(&mut self, paddle: &Paddle) -> MovementCommand {
        let diff = self.target_y - paddle.center_y();
        if diff.abs() <= DEAD_ZONE {
            return MovementCommand::idle();
        }

        let mut movement = sign(diff) * self.tuning.max_speed.min(diff.abs() * APPROACH_GAIN);
        if self.rng.random::<f32>() > self.tuning.accuracy {
            movement *= self.rng.random::<f32>() * 0.5;
        }
        MovementCommand::from_movement(movement)
    }

    /// Uniform in [-0.5, 0.5)
    fn jitter(&mut self) -> f32 {
        self.rng.random::<f32>() - 0.5
    }
}
