//! Per-round match state machine
//!
//! Serve -> Rally -> (point -> Serve) | Ended. Drives the physics every tick,
//! polls AI opponents for computer-controlled paddles, spawns and expires
//! powerups, and runs deferred effects off the match clock.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::{PhysicsEngine, PowerupEffects};
use super::schedule::{Deferred, Scheduler};
use super::state::{
    Ball, Controller, GameEvent, GameSnapshot, MatchPhase, Paddle, Powerup, PowerupKind,
    SNAPSHOT_VERSION, Scores, Side,
};
use crate::ai::{AiOpponent, AiSelection, Difficulty, MovementCommand, Personality};
use crate::consts::*;
use crate::settings::MatchSettings;

/// Opponent used when a human paddle is put on autopilot
pub const AUTOPILOT: AiSelection = AiSelection {
    difficulty: Difficulty::Hard,
    personality: Personality::Balanced,
};

/// Up/down state of one human paddle for a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaddleInput {
    pub up: bool,
    pub down: bool,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Indexed by [`Side::index`]; ignored for AI paddles
    pub paddles: [PaddleInput; 2],
    /// Let the AI drive a human paddle (demo mode)
    pub autopilot: [bool; 2],
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn for_side(side: Side, input: PaddleInput) -> Self {
        let mut tick = Self::default();
        tick.paddles[side.index()] = input;
        tick
    }
}

/// Final outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: Side,
    pub scores: Scores,
    /// Seconds of match time
    pub elapsed: f64,
}

/// Owns the ball, paddles and powerups for the lifetime of one match
#[derive(Debug, Clone)]
pub struct MatchController {
    settings: MatchSettings,
    physics: PhysicsEngine,
    phase: MatchPhase,
    /// Phase to return to when unpausing
    resume_phase: MatchPhase,
    clock: f64,
    ball: Ball,
    paddles: [Paddle; 2],
    powerups: Vec<Powerup>,
    effects: PowerupEffects,
    scheduler: Scheduler,
    scores: Scores,
    spawn_timer: f32,
    next_powerup_id: u32,
    opponents: [AiOpponent; 2],
    rng: Pcg32,
    result: Option<MatchResult>,
}

impl MatchController {
    /// Human on the left against the configured AI on the right
    pub fn new(settings: MatchSettings, seed: u64) -> Self {
        Self::with_controllers(settings, [Controller::Human, Controller::Ai], seed)
    }

    pub fn with_controllers(settings: MatchSettings, controllers: [Controller; 2], seed: u64) -> Self {
        let court = Vec2::new(settings.court_width, settings.court_height);
        let configured = AiSelection {
            difficulty: settings.difficulty,
            personality: settings.personality,
        };
        let opponent = |side: Side, salt: u64| {
            let selection = match controllers[side.index()] {
                Controller::Ai => configured,
                Controller::Human => AUTOPILOT,
            };
            AiOpponent::new(side, selection, court, seed.wrapping_add(salt))
        };
        let opponents = [opponent(Side::Left, 1), opponent(Side::Right, 2)];

        Self {
            physics: PhysicsEngine::new(court),
            phase: MatchPhase::Serve,
            resume_phase: MatchPhase::Serve,
            clock: 0.0,
            ball: Ball::new(court),
            paddles: [
                Paddle::new(Side::Left, controllers[0], court),
                Paddle::new(Side::Right, controllers[1], court),
            ],
            powerups: Vec::new(),
            effects: PowerupEffects::default(),
            scheduler: Scheduler::new(),
            scores: Scores::default(),
            spawn_timer: 0.0,
            next_powerup_id: 1,
            opponents,
            rng: Pcg32::seed_from_u64(seed),
            result: None,
            settings,
        }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn powerups(&self) -> &[Powerup] {
        &self.powerups
    }

    pub fn effects(&self) -> &PowerupEffects {
        &self.effects
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn opponent(&self, side: Side) -> &AiOpponent {
        &self.opponents[side.index()]
    }

    /// Final result once the match has ended
    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    /// Read-only view for the renderer and the AI
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            court: self.physics.court,
            phase: self.phase,
            clock: self.clock,
            ball: self.ball.clone(),
            paddles: self.paddles.clone(),
            powerups: self.powerups.clone(),
            scores: self.scores,
            score_to_win: self.settings.score_to_win,
        }
    }

    /// Kick off the match: announce it and serve the first ball
    pub fn start(&mut self) -> Vec<GameEvent> {
        log::info!(
            "Match start: first to {}, AI {} / {}",
            self.settings.score_to_win,
            self.settings.difficulty.as_str(),
            self.settings.personality.as_str()
        );
        let mut events = vec![GameEvent::GameStart];
        self.serve(&mut events);
        events
    }

    /// Back to a fresh 0-0 match. Anything still scheduled is invalidated.
    pub fn reset(&mut self) {
        self.scheduler.cancel_all();
        let court = self.physics.court;
        self.phase = MatchPhase::Serve;
        self.resume_phase = MatchPhase::Serve;
        self.clock = 0.0;
        self.ball = Ball::new(court);
        for paddle in &mut self.paddles {
            *paddle = Paddle::new(paddle.side, paddle.controller, court);
        }
        self.powerups.clear();
        self.effects.clear();
        self.scores = Scores::default();
        self.spawn_timer = 0.0;
        self.result = None;
        for opponent in &mut self.opponents {
            opponent.reset();
        }
    }

    /// Stop the match without a result (back to menu)
    pub fn abandon(&mut self) {
        self.scheduler.cancel_all();
        self.phase = MatchPhase::Ended;
        log::info!("Match abandoned at {:.1}s", self.clock);
    }

    /// Advance the match by one frame
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        debug_assert!(dt.is_finite(), "non-finite dt");
        let dt = dt.clamp(0.0, MAX_DT);
        let mut events = Vec::new();

        if input.pause {
            self.toggle_pause();
        }
        if matches!(self.phase, MatchPhase::Paused | MatchPhase::Ended) {
            return events;
        }

        self.clock += f64::from(dt);
        self.run_deferred(&mut events);
        self.move_paddles(input, dt);

        if self.phase == MatchPhase::Rally {
            self.update_powerups(dt, &mut events);

            let outcome = self
                .physics
                .advance(&mut self.ball, &mut self.paddles, self.clock, dt);
            events.extend(outcome.events);

            match outcome.scored {
                Some(side) => self.score_point(side, &mut events),
                None => self.collect_powerups(&mut events),
            }
        }

        events
    }

    fn toggle_pause(&mut self) {
        match self.phase {
            MatchPhase::Serve | MatchPhase::Rally => {
                self.resume_phase = self.phase;
                self.phase = MatchPhase::Paused;
            }
            MatchPhase::Paused => self.phase = self.resume_phase,
            MatchPhase::Ended => {}
        }
    }

    fn run_deferred(&mut self, events: &mut Vec<GameEvent>) {
        for action in self.scheduler.take_due(self.clock) {
            match action {
                Deferred::RevertEffect { slot, token } => {
                    if let Some(kind) = self.effects.revert(&mut self.ball, slot, token) {
                        log::debug!("{} wore off", kind.as_str());
                        events.push(GameEvent::EffectEnded { kind });
                    }
                }
                Deferred::Serve => {
                    if self.phase == MatchPhase::Serve {
                        self.serve(events);
                    }
                }
            }
        }
    }

    fn move_paddles(&mut self, input: &TickInput, dt: f32) {
        let snapshot = self.snapshot();
        let court_height = self.physics.court.y;

        for side in Side::BOTH {
            let i = side.index();
            let driven_by_ai =
                self.paddles[i].controller == Controller::Ai || input.autopilot[i];
            let velocity = if driven_by_ai {
                self.opponents[i].decide(dt, &snapshot).velocity()
            } else {
                human_command(input.paddles[i], self.paddles[i].speed).velocity()
            };
            self.paddles[i].shift(velocity, dt, court_height);
        }
    }

    /// Centre the ball and launch it within ±30° of a random horizontal heading
    fn serve(&mut self, events: &mut Vec<GameEvent>) {
        self.ball.center_on(self.physics.court * 0.5);
        let angle = (self.rng.random::<f32>() - 0.5) * 2.0 * SERVE_CONE;
        let direction = if self.rng.random::<f32>() < 0.5 { 1.0 } else { -1.0 };
        let speed = self.ball.base_speed;
        self.ball.vel = Vec2::new(angle.cos() * speed * direction, angle.sin() * speed);

        let toward = if direction > 0.0 { Side::Right } else { Side::Left };
        self.phase = MatchPhase::Rally;
        events.push(GameEvent::Served { toward });
    }

    fn score_point(&mut self, side: Side, events: &mut Vec<GameEvent>) {
        self.scores.add_point(side);
        events.push(GameEvent::Scored {
            side,
            scores: self.scores,
        });
        log::debug!(
            "Point to {:?}: {}-{}",
            side,
            self.scores.left,
            self.scores.right
        );

        // Parked ball; any speed modifier dies with the rally
        self.ball.center_on(self.physics.court * 0.5);
        self.ball.vel = Vec2::ZERO;
        self.effects.clear_speed();

        if self.scores.get(side) >= self.settings.score_to_win {
            self.finish(side, events);
        } else {
            self.phase = MatchPhase::Serve;
            self.scheduler
                .schedule(self.clock, self.settings.serve_pause, Deferred::Serve);
        }
    }

    fn finish(&mut self, winner: Side, events: &mut Vec<GameEvent>) {
        self.phase = MatchPhase::Ended;
        self.scheduler.cancel_all();
        let result = MatchResult {
            winner,
            scores: self.scores,
            elapsed: self.clock,
        };
        self.result = Some(result);
        log::info!(
            "Match over: {:?} wins {}-{} in {:.1}s",
            winner,
            self.scores.left,
            self.scores.right,
            self.clock
        );
        events.push(GameEvent::GameOver {
            winner,
            scores: self.scores,
            elapsed: self.clock,
        });
    }

    /// Spawn on the interval, age and expire what is on court
    fn update_powerups(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if !self.settings.powerups_enabled {
            return;
        }

        self.spawn_timer += dt;
        if self.spawn_timer >= self.settings.powerup_spawn_interval {
            self.spawn_timer -= self.settings.powerup_spawn_interval;
            self.spawn_powerup(events);
        }

        for powerup in &mut self.powerups {
            powerup.remaining -= dt;
        }
        self.powerups.retain(|p| {
            if p.remaining <= 0.0 {
                events.push(GameEvent::PowerupExpired { id: p.id });
                false
            } else {
                true
            }
        });
    }

    /// One powerup somewhere in the central play area
    fn spawn_powerup(&mut self, events: &mut Vec<GameEvent>) {
        let court = self.physics.court;
        let kind = PowerupKind::ALL[self.rng.random_range(0..PowerupKind::ALL.len())];
        let pos = Vec2::new(
            court.x * 0.3 + self.rng.random::<f32>() * court.x * 0.4,
            court.y * 0.2 + self.rng.random::<f32>() * court.y * 0.6,
        );
        let id = self.next_powerup_id;
        self.next_powerup_id += 1;
        self.powerups.push(Powerup {
            id,
            kind,
            pos,
            size: POWERUP_SIZE,
            remaining: self.settings.powerup_lifetime,
        });
        events.push(GameEvent::PowerupSpawned { id, kind });
    }

    fn collect_powerups(&mut self, events: &mut Vec<GameEvent>) {
        if !self.settings.powerups_enabled {
            return;
        }
        for powerup in self.physics.collect_powerups(&self.ball, &mut self.powerups) {
            if let Some((slot, token, duration)) = self.effects.apply(&mut self.ball, powerup.kind) {
                self.scheduler
                    .schedule(self.clock, duration, Deferred::RevertEffect { slot, token });
            }
            log::debug!("Collected {}", powerup.kind.as_str());
            events.push(GameEvent::PowerupCollected {
                kind: powerup.kind,
                pos: powerup.pos + Vec2::splat(powerup.size / 2.0),
            });
        }
    }
}

/// Full speed in the pressed direction; both or neither pressed is still
fn human_command(input: PaddleInput, speed: f32) -> MovementCommand {
    match (input.up, input.down) {
        (true, false) => MovementCommand {
            up: true,
            down: false,
            speed,
        },
        (false, true) => MovementCommand {
            up: false,
            down: true,
            speed,
        },
        _ => MovementCommand::idle(),
    }
}
