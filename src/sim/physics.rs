//! Ball/paddle motion integration and collision response
//!
//! Pure functions of the state passed in: no I/O, no randomness, and nothing
//! here can fail. Non-finite input is a programmer error and trips a debug
//! assertion.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{
    ball_paddle_sweep, ball_powerup_collision, ball_wall_collision, reflect_velocity,
};
use super::state::{Ball, GameEvent, Paddle, Powerup, PowerupKind, Side};
use crate::consts::*;

/// Result of advancing the ball one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    /// Side that won the point, if the ball left the court
    pub scored: Option<Side>,
}

/// Integrates motion and resolves collisions for one match court
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsEngine {
    pub court: Vec2,
}

impl PhysicsEngine {
    pub fn new(court: Vec2) -> Self {
        Self { court }
    }

    /// Advance the ball by `dt` seconds and resolve walls, paddles and scoring.
    ///
    /// `dt` is expected to be clamped by the caller (see [`MAX_DT`]).
    pub fn advance(
        &self,
        ball: &mut Ball,
        paddles: &mut [Paddle; 2],
        clock: f64,
        dt: f32,
    ) -> StepOutcome {
        debug_assert!(dt.is_finite() && dt >= 0.0, "invalid dt {dt}");
        debug_assert!(ball.pos.is_finite() && ball.vel.is_finite(), "non-finite ball {ball:?}");

        let mut outcome = StepOutcome::default();

        let from = ball.pos;
        self.integrate(ball, dt);
        if let Some(event) = self.resolve_walls(ball) {
            outcome.events.push(event);
        }
        for paddle in paddles.iter_mut() {
            if let Some(event) = self.resolve_paddle_sweep(ball, from, paddle, clock) {
                outcome.events.push(event);
            }
        }
        outcome.scored = self.check_score(ball);
        outcome
    }

    /// Move the ball along its velocity
    pub fn integrate(&self, ball: &mut Ball, dt: f32) {
        ball.pos += ball.vel * TIME_SCALE * dt;
    }

    /// Bounce off the top or bottom edge. Reflection only flips a velocity
    /// heading into the wall, so |vy| is preserved.
    pub fn resolve_walls(&self, ball: &mut Ball) -> Option<GameEvent> {
        let result = ball_wall_collision(ball, self.court.y);
        if !result.hit {
            return None;
        }
        ball.pos.y = if result.normal.y > 0.0 {
            0.0
        } else {
            self.court.y - ball.size
        };
        if ball.vel.dot(result.normal) < 0.0 {
            ball.vel = reflect_velocity(ball.vel, result.normal);
        }
        Some(GameEvent::WallHit { pos: result.point })
    }

    /// Deflect off a paddle the ball currently overlaps
    pub fn resolve_paddle(
        &self,
        ball: &mut Ball,
        paddle: &mut Paddle,
        clock: f64,
    ) -> Option<GameEvent> {
        let from = ball.pos;
        self.resolve_paddle_sweep(ball, from, paddle, clock)
    }

    /// Deflect off a paddle touched anywhere on the way from `from` to the
    /// ball's position: reverse x, set the angle from where the ball struck,
    /// accelerate the rally, and park the ball flush with the face.
    pub fn resolve_paddle_sweep(
        &self,
        ball: &mut Ball,
        from: Vec2,
        paddle: &mut Paddle,
        clock: f64,
    ) -> Option<GameEvent> {
        let contact = ball_paddle_sweep(ball, from, paddle)?;

        ball.vel.x = -ball.vel.x;
        ball.vel.y = contact.offset * ball.base_speed * 0.5;

        let speed = ball.speed();
        if speed > ball.max_speed {
            ball.vel *= ball.max_speed / speed;
        } else if speed > 0.0 {
            ball.vel *= RALLY_ACCELERATION.min(ball.max_speed / speed);
        }

        ball.pos.x = match paddle.side {
            Side::Left => paddle.face_x(),
            Side::Right => paddle.face_x() - ball.size,
        };
        ball.pos.y = contact.pos.y.clamp(0.0, (self.court.y - ball.size).max(0.0));
        paddle.last_hit = Some(clock);

        Some(GameEvent::PaddleHit {
            side: paddle.side,
            pos: ball.center(),
        })
    }

    /// Side that wins the point if the ball has left the court
    pub fn check_score(&self, ball: &Ball) -> Option<Side> {
        if ball.pos.x <= -ball.size {
            Some(Side::Right)
        } else if ball.pos.x >= self.court.x {
            Some(Side::Left)
        } else {
            None
        }
    }

    /// Remove every powerup the ball touches and return them
    pub fn collect_powerups(&self, ball: &Ball, powerups: &mut Vec<Powerup>) -> Vec<Powerup> {
        let mut collected = Vec::new();
        powerups.retain(|p| {
            if ball_powerup_collision(ball, p) {
                collected.push(p.clone());
                false
            } else {
                true
            }
        });
        collected
    }
}

/// Which ball property an effect modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectSlot {
    Speed,
    Size,
}

/// An applied effect and the value to restore when it ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerupKind,
    /// Ball speed or size before any effect in this slot was applied
    pub original: f32,
    /// Identifies the most recent application; older reverts are ignored
    pub token: u64,
}

/// Time-bounded ball modifiers from collected powerups.
///
/// Effects in the same slot do not stack: a second pickup re-derives the
/// value from the stored original and takes over the expiry, so the revert
/// always lands on the pre-effect value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerupEffects {
    pub speed: Option<ActiveEffect>,
    pub size: Option<ActiveEffect>,
    next_token: u64,
}

impl PowerupEffects {
    /// Apply `kind` to the ball. Returns the slot, token and duration to
    /// schedule the revert with, or `None` for kinds with no ball modifier.
    pub fn apply(&mut self, ball: &mut Ball, kind: PowerupKind) -> Option<(EffectSlot, u64, f32)> {
        let (slot, factor, duration) = match kind {
            PowerupKind::SpeedBoost => (EffectSlot::Speed, SPEED_BOOST_FACTOR, SPEED_BOOST_DURATION),
            PowerupKind::Freeze => (EffectSlot::Speed, FREEZE_FACTOR, FREEZE_DURATION),
            PowerupKind::SizeIncrease => {
                (EffectSlot::Size, SIZE_INCREASE_FACTOR, SIZE_INCREASE_DURATION)
            }
            PowerupKind::Multiball => return None,
        };

        self.next_token += 1;
        let token = self.next_token;
        let active = match slot {
            EffectSlot::Speed => &mut self.speed,
            EffectSlot::Size => &mut self.size,
        };
        let original = match active {
            Some(effect) => effect.original,
            None => match slot {
                EffectSlot::Speed => ball.speed(),
                EffectSlot::Size => ball.size,
            },
        };
        *active = Some(ActiveEffect {
            kind,
            original,
            token,
        });

        match slot {
            EffectSlot::Speed => ball.set_speed(original * factor),
            EffectSlot::Size => ball.resize(original * factor),
        }
        Some((slot, token, duration))
    }

    /// Restore the stored original if `token` is still the live application.
    /// Returns the kind that ended.
    pub fn revert(&mut self, ball: &mut Ball, slot: EffectSlot, token: u64) -> Option<PowerupKind> {
        let active = match slot {
            EffectSlot::Speed => &mut self.speed,
            EffectSlot::Size => &mut self.size,
        };
        let effect = (*active).filter(|e| e.token == token)?;
        *active = None;
        match slot {
            EffectSlot::Speed => ball.set_speed(effect.original),
            EffectSlot::Size => ball.resize(effect.original),
        }
        Some(effect.kind)
    }

    /// Forget the speed effect without restoring (the ball was re-served)
    pub fn clear_speed(&mut self) {
        self.speed = None;
    }

    pub fn clear(&mut self) {
        self.speed = None;
        self.size = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Controller;
    use proptest::prelude::*;

    fn court() -> Vec2 {
        Vec2::new(COURT_WIDTH, COURT_HEIGHT)
    }

    fn paddles() -> [Paddle; 2] {
        [
            Paddle::new(Side::Left, Controller::Human, court()),
            Paddle::new(Side::Right, Controller::Ai, court()),
        ]
    }

    #[test]
    fn test_integrate_uses_time_scale() {
        let engine = PhysicsEngine::new(court());
        let mut ball = Ball::new(court());
        let start = ball.pos;
        ball.vel = Vec2::new(3.0, 1.0);
        engine.integrate(&mut ball, 1.0 / 60.0);
        assert!((ball.pos - start - Vec2::new(3.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_wall_bounce_clamps_and_flips() {
        let engine = PhysicsEngine::new(court());
        let mut ball = Ball::new(court());
        ball.pos.y = 1.0;
        ball.vel = Vec2::new(2.0, -4.0);
        let mut pads = paddles();
        let outcome = engine.advance(&mut ball, &mut pads, 0.0, 1.0 / 60.0);
        assert_eq!(ball.pos.y, 0.0);
        assert_eq!(ball.vel.y, 4.0);
        assert!(matches!(outcome.events[0], GameEvent::WallHit { .. }));
    }

    #[test]
    fn test_paddle_hit_records_timestamp_and_repositions() {
        let engine = PhysicsEngine::new(court());
        let mut pads = paddles();
        let mut ball = Ball::new(court());
        ball.center_on(Vec2::new(pads[1].face_x() + 1.0, pads[1].center_y()));
        ball.vel = Vec2::new(5.0, 0.0);

        let event = engine.resolve_paddle(&mut ball, &mut pads[1], 12.5);
        assert!(event.is_some());
        assert_eq!(pads[1].last_hit, Some(12.5));
        assert!(ball.vel.x < 0.0);
        assert_eq!(ball.pos.x + ball.size, pads[1].face_x());
        // Centre hit: flat return, 5% faster
        assert!(ball.vel.y.abs() < 1e-6);
        assert!((ball.speed() - 5.25).abs() < 1e-4);
    }

    #[test]
    fn test_top_speed_ball_cannot_pass_through_paddle() {
        let engine = PhysicsEngine::new(court());
        for side in [Side::Left, Side::Right] {
            // Every start offset within one step of the face
            for step in 0..30 {
                let mut pads = paddles();
                let paddle = pads[side.index()].clone();
                let mut ball = Ball::new(court());
                let gap = 1.0 + step as f32;
                let x = match side {
                    Side::Left => paddle.face_x() + gap,
                    Side::Right => paddle.face_x() - ball.size - gap,
                };
                ball.pos = Vec2::new(x, paddle.center_y() - ball.size / 2.0);
                ball.vel = Vec2::new(BALL_MAX_SPEED * side.approach_sign(), 0.0);

                let mut hit = false;
                for _ in 0..4 {
                    let outcome = engine.advance(&mut ball, &mut pads, 0.0, MAX_DT);
                    assert!(outcome.scored.is_none(), "{side:?} gap {gap}: ball got through");
                    hit |= outcome
                        .events
                        .iter()
                        .any(|e| matches!(e, GameEvent::PaddleHit { .. }));
                }
                assert!(hit, "{side:?} gap {gap}: no paddle hit");
                assert!(ball.vel.x * side.approach_sign() < 0.0);
                assert!(pads[side.index()].last_hit.is_some());
            }
        }
    }

    #[test]
    fn test_scoring_boundaries() {
        let engine = PhysicsEngine::new(court());
        let mut ball = Ball::new(court());
        ball.pos.x = -ball.size;
        assert_eq!(engine.check_score(&ball), Some(Side::Right));
        ball.pos.x = COURT_WIDTH;
        assert_eq!(engine.check_score(&ball), Some(Side::Left));
        ball.pos.x = 500.0;
        assert_eq!(engine.check_score(&ball), None);
    }

    #[test]
    fn test_collect_powerups_removes_touched() {
        let engine = PhysicsEngine::new(court());
        let ball = Ball::new(court());
        let mut powerups = vec![
            Powerup {
                id: 1,
                kind: PowerupKind::SpeedBoost,
                pos: ball.pos,
                size: POWERUP_SIZE,
                remaining: 4.0,
            },
            Powerup {
                id: 2,
                kind: PowerupKind::Freeze,
                pos: Vec2::new(10.0, 10.0),
                size: POWERUP_SIZE,
                remaining: 4.0,
            },
        ];
        let collected = engine.collect_powerups(&ball, &mut powerups);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].id, 1);
        assert_eq!(powerups.len(), 1);
    }

    #[test]
    fn test_size_effect_reverts_exactly() {
        let mut ball = Ball::new(court());
        let mut effects = PowerupEffects::default();
        let original = ball.size;
        let (slot, token, duration) = effects.apply(&mut ball, PowerupKind::SizeIncrease).unwrap();
        assert_eq!(slot, EffectSlot::Size);
        assert_eq!(duration, SIZE_INCREASE_DURATION);
        assert_eq!(ball.size, original * SIZE_INCREASE_FACTOR);
        assert_eq!(effects.revert(&mut ball, slot, token), Some(PowerupKind::SizeIncrease));
        assert_eq!(ball.size, original);
    }

    #[test]
    fn test_overlapping_speed_effects_do_not_drift() {
        let mut ball = Ball::new(court());
        ball.vel = Vec2::new(4.0, 3.0);
        let mut effects = PowerupEffects::default();

        let (_, boost_token, _) = effects.apply(&mut ball, PowerupKind::SpeedBoost).unwrap();
        assert!((ball.speed() - 7.5).abs() < 1e-4);
        let (_, freeze_token, _) = effects.apply(&mut ball, PowerupKind::Freeze).unwrap();
        assert!((ball.speed() - 1.5).abs() < 1e-4);

        // The boost's expiry is stale and must not touch the ball
        assert_eq!(effects.revert(&mut ball, EffectSlot::Speed, boost_token), None);
        assert!((ball.speed() - 1.5).abs() < 1e-4);

        assert_eq!(
            effects.revert(&mut ball, EffectSlot::Speed, freeze_token),
            Some(PowerupKind::Freeze)
        );
        assert!((ball.speed() - 5.0).abs() < 1e-4);
        assert!(effects.speed.is_none());
    }

    #[test]
    fn test_speed_boost_respects_cap() {
        let mut ball = Ball::new(court());
        ball.vel = Vec2::new(14.0, 0.0);
        let mut effects = PowerupEffects::default();
        let (slot, token, _) = effects.apply(&mut ball, PowerupKind::SpeedBoost).unwrap();
        assert!(ball.speed() <= ball.max_speed + 1e-4);
        effects.revert(&mut ball, slot, token);
        assert!((ball.speed() - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_multiball_has_no_modifier() {
        let mut ball = Ball::new(court());
        let before = ball.clone();
        let mut effects = PowerupEffects::default();
        assert!(effects.apply(&mut ball, PowerupKind::Multiball).is_none());
        assert_eq!(ball, before);
    }

    proptest! {
        /// Ball speed never exceeds the cap however many paddle hits occur
        #[test]
        fn prop_speed_never_exceeds_cap(
            vx in 0.5f32..15.0f32,
            vy in -10.0f32..10.0f32,
            offset in -60.0f32..60.0f32,
            hits in 1usize..40,
        ) {
            let engine = PhysicsEngine::new(court());
            let mut pads = paddles();
            let mut ball = Ball::new(court());
            ball.vel = Vec2::new(vx, vy);
            ball.set_speed(ball.vel.length());
            for i in 0..hits {
                let side = if i % 2 == 0 { Side::Right } else { Side::Left };
                let paddle = &mut pads[side.index()];
                let y = paddle.center_y() + offset;
                ball.center_on(Vec2::new(paddle.face_x(), y));
                if ball.vel.x * side.approach_sign() < 0.0 {
                    ball.vel.x = -ball.vel.x;
                }
                engine.resolve_paddle(&mut ball, paddle, i as f64);
                prop_assert!(ball.speed() <= ball.max_speed + 1e-3);
            }
        }

        /// Wall contact flips vy and keeps its magnitude
        #[test]
        fn prop_wall_reflection_preserves_vy(
            vx in -10.0f32..10.0f32,
            vy in 0.1f32..10.0f32,
            top in any::<bool>(),
        ) {
            let engine = PhysicsEngine::new(court());
            let mut ball = Ball::new(court());
            if top {
                ball.pos.y = -1.0;
                ball.vel = Vec2::new(vx, -vy);
            } else {
                ball.pos.y = COURT_HEIGHT - ball.size + 1.0;
                ball.vel = Vec2::new(vx, vy);
            }
            let before = ball.vel.y;
            prop_assert!(engine.resolve_walls(&mut ball).is_some());
            prop_assert!((ball.vel.y.abs() - before.abs()).abs() < 1e-5);
            prop_assert!(ball.vel.y.signum() == -before.signum());
            prop_assert_eq!(ball.vel.x, vx);
        }

        /// Paddle contact reverses the horizontal direction
        #[test]
        fn prop_paddle_reverses_x(
            speed in 0.5f32..15.0f32,
            offset in -45.0f32..45.0f32,
            right in any::<bool>(),
        ) {
            let engine = PhysicsEngine::new(court());
            let mut pads = paddles();
            let side = if right { Side::Right } else { Side::Left };
            let paddle = &mut pads[side.index()];
            let mut ball = Ball::new(court());
            ball.center_on(Vec2::new(paddle.face_x(), paddle.center_y() + offset));
            ball.vel = Vec2::new(speed * side.approach_sign(), 1.0);
            let before = ball.vel.x;
            prop_assert!(engine.resolve_paddle(&mut ball, paddle, 0.0).is_some());
            prop_assert!(ball.vel.x.signum() == -before.signum());
        }

        /// Applying then expiring any effect restores the exact original
        #[test]
        fn prop_effects_fully_reversible(
            vx in 0.5f32..14.0f32,
            vy in -5.0f32..5.0f32,
            kind_index in 0usize..4,
        ) {
            let mut ball = Ball::new(court());
            ball.vel = Vec2::new(vx, vy);
            let speed = ball.speed().min(ball.max_speed);
            ball.set_speed(speed);
            let size = ball.size;
            let mut effects = PowerupEffects::default();
            if let Some((slot, token, _)) = effects.apply(&mut ball, PowerupKind::ALL[kind_index]) {
                let stored = match slot {
                    EffectSlot::Speed => effects.speed.unwrap().original,
                    EffectSlot::Size => effects.size.unwrap().original,
                };
                effects.revert(&mut ball, slot, token);
                match slot {
                    EffectSlot::Speed => {
                        prop_assert!((stored - speed).abs() < 1e-5);
                        prop_assert!((ball.speed() - stored).abs() < 1e-3);
                    }
                    EffectSlot::Size => prop_assert_eq!(ball.size, stored),
                }
            }
            prop_assert_eq!(ball.size, size);
        }
    }
}
