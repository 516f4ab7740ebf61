//! Collision detection for axis-aligned court geometry
//!
//! Ball, paddles and powerups are all boxes; walls are the horizontal court
//! edges. Detection lives here, response lives in `physics`.

use glam::Vec2;

use super::state::{Ball, Paddle, Powerup, Side};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn of_ball(ball: &Ball) -> Self {
        Self::new(ball.pos, Vec2::splat(ball.size))
    }

    pub fn of_paddle(paddle: &Paddle) -> Self {
        Self::new(paddle.pos, paddle.size)
    }

    pub fn of_powerup(powerup: &Powerup) -> Self {
        Self::new(powerup.pos, Vec2::splat(powerup.size))
    }

    /// Strict overlap; boxes that only touch do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Surface normal, pointing back into the court
    pub normal: Vec2,
    /// How far the ball crossed the surface
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check the ball against the top and bottom court edges
pub fn ball_wall_collision(ball: &Ball, court_height: f32) -> CollisionResult {
    let center_x = ball.center().x;
    if ball.pos.y <= 0.0 {
        return CollisionResult {
            hit: true,
            point: Vec2::new(center_x, 0.0),
            normal: Vec2::Y,
            penetration: -ball.pos.y,
        };
    }
    let bottom = court_height - ball.size;
    if ball.pos.y >= bottom {
        return CollisionResult {
            hit: true,
            point: Vec2::new(center_x, court_height),
            normal: Vec2::NEG_Y,
            penetration: ball.pos.y - bottom,
        };
    }
    CollisionResult::miss()
}

/// Contact between ball and paddle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleContact {
    /// Where along the paddle the ball struck, -1 (top) to 1 (bottom)
    pub offset: f32,
    /// Face normal, pointing toward the far side of the court
    pub normal: Vec2,
    /// Ball position (top-left) at the moment of contact
    pub pos: Vec2,
}

impl PaddleContact {
    fn at(pos: Vec2, ball_size: f32, paddle: &Paddle) -> Self {
        let half_height = paddle.size.y / 2.0;
        let center_y = pos.y + ball_size / 2.0;
        let offset = ((center_y - paddle.center_y()) / half_height).clamp(-1.0, 1.0);
        let normal = match paddle.side {
            Side::Left => Vec2::X,
            Side::Right => Vec2::NEG_X,
        };
        Self {
            offset,
            normal,
            pos,
        }
    }
}

/// Check the ball against a paddle.
///
/// Only a ball travelling toward the paddle can hit it, so a ball that has
/// already been deflected cannot trigger a second contact.
pub fn ball_paddle_collision(ball: &Ball, paddle: &Paddle) -> Option<PaddleContact> {
    if ball.vel.x * paddle.side.approach_sign() <= 0.0 {
        return None;
    }
    if !Aabb::of_ball(ball).overlaps(&Aabb::of_paddle(paddle)) {
        return None;
    }
    Some(PaddleContact::at(ball.pos, ball.size, paddle))
}

/// Check a ball that moved from `from` to its current position against a
/// paddle, including steps that carried it clean through the paddle.
///
/// A contact found only by the sweep reports the position where the ball's
/// leading edge crossed the face.
pub fn ball_paddle_sweep(ball: &Ball, from: Vec2, paddle: &Paddle) -> Option<PaddleContact> {
    if let Some(contact) = ball_paddle_collision(ball, paddle) {
        return Some(contact);
    }
    let dir = paddle.side.approach_sign();
    if ball.vel.x * dir <= 0.0 {
        return None;
    }

    let lead = |x: f32| match paddle.side {
        Side::Left => x,
        Side::Right => x + ball.size,
    };
    let face = paddle.face_x();
    let (start, end) = (lead(from.x), lead(ball.pos.x));
    // Leading edge must start in front of the face and finish past it
    if (start - face) * dir > 0.0 || (end - face) * dir <= 0.0 {
        return None;
    }

    let t = (face - start) / (end - start);
    let pos = from + (ball.pos - from) * t;
    let y_overlap = pos.y < paddle.pos.y + paddle.size.y && pos.y + ball.size > paddle.pos.y;
    y_overlap.then(|| PaddleContact::at(pos, ball.size, paddle))
}

/// Check the ball against a powerup
pub fn ball_powerup_collision(ball: &Ball, powerup: &Powerup) -> bool {
    Aabb::of_ball(ball).overlaps(&Aabb::of_powerup(powerup))
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{Controller, PowerupKind};

    fn court() -> Vec2 {
        Vec2::new(COURT_WIDTH, COURT_HEIGHT)
    }

    #[test]
    fn test_aabb_touching_is_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::new(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b));
        let c = Aabb::new(Vec2::new(9.0, 9.0), Vec2::splat(10.0));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_wall_collision_top_and_bottom() {
        let mut ball = Ball::new(court());
        assert!(!ball_wall_collision(&ball, COURT_HEIGHT).hit);

        ball.pos.y = -3.0;
        let top = ball_wall_collision(&ball, COURT_HEIGHT);
        assert!(top.hit);
        assert_eq!(top.normal, Vec2::Y);
        assert_eq!(top.penetration, 3.0);

        ball.pos.y = COURT_HEIGHT - ball.size + 2.0;
        let bottom = ball_wall_collision(&ball, COURT_HEIGHT);
        assert!(bottom.hit);
        assert_eq!(bottom.normal, Vec2::NEG_Y);
    }

    #[test]
    fn test_paddle_collision_offset() {
        let paddle = Paddle::new(Side::Left, Controller::Human, court());
        let mut ball = Ball::new(court());
        ball.vel = Vec2::new(-5.0, 0.0);
        // Centre of ball level with top edge of the paddle
        ball.center_on(Vec2::new(paddle.face_x() - 2.0, paddle.pos.y));
        let contact = ball_paddle_collision(&ball, &paddle).expect("hit");
        assert!((contact.offset + 1.0).abs() < 1e-4);
        assert_eq!(contact.normal, Vec2::X);
    }

    #[test]
    fn test_paddle_collision_requires_approach() {
        let paddle = Paddle::new(Side::Right, Controller::Ai, court());
        let mut ball = Ball::new(court());
        ball.center_on(Vec2::new(paddle.face_x() + 2.0, paddle.center_y()));
        ball.vel = Vec2::new(-5.0, 0.0);
        assert!(ball_paddle_collision(&ball, &paddle).is_none());
        ball.vel = Vec2::new(5.0, 0.0);
        assert!(ball_paddle_collision(&ball, &paddle).is_some());
    }

    #[test]
    fn test_paddle_sweep_catches_step_through_paddle() {
        let paddle = Paddle::new(Side::Left, Controller::Human, court());
        let mut ball = Ball::new(court());
        ball.vel = Vec2::new(-15.0, 0.0);
        let from = Vec2::new(paddle.face_x() + 1.0, paddle.center_y() - ball.size / 2.0);
        // One 1/30 s step at 15 px/frame lands the ball behind the paddle
        ball.pos = from + Vec2::new(-30.0, 0.0);
        assert!(ball_paddle_collision(&ball, &paddle).is_none());

        let contact = ball_paddle_sweep(&ball, from, &paddle).expect("swept hit");
        assert!((contact.pos.x - paddle.face_x()).abs() < 1e-3);
        assert!(contact.offset.abs() < 1e-4);
        assert_eq!(contact.normal, Vec2::X);
    }

    #[test]
    fn test_paddle_sweep_misses_above_and_behind() {
        let paddle = Paddle::new(Side::Right, Controller::Ai, court());
        let mut ball = Ball::new(court());
        ball.vel = Vec2::new(15.0, 0.0);

        // Crosses the face's x but well above the paddle
        let from = Vec2::new(paddle.face_x() - ball.size - 1.0, paddle.pos.y - 40.0);
        ball.pos = from + Vec2::new(30.0, 0.0);
        assert!(ball_paddle_sweep(&ball, from, &paddle).is_none());

        // Already past the face before the step
        let from = Vec2::new(paddle.face_x() + 20.0, paddle.center_y());
        ball.pos = from + Vec2::new(30.0, 0.0);
        assert!(ball_paddle_sweep(&ball, from, &paddle).is_none());

        // Receding
        let from = Vec2::new(paddle.face_x() - ball.size - 1.0, paddle.center_y());
        ball.vel = Vec2::new(-15.0, 0.0);
        ball.pos = from + Vec2::new(30.0, 0.0);
        assert!(ball_paddle_sweep(&ball, from, &paddle).is_none());
    }

    #[test]
    fn test_powerup_collision() {
        let ball = Ball::new(court());
        let mut powerup = Powerup {
            id: 1,
            kind: PowerupKind::Freeze,
            pos: ball.pos - Vec2::splat(5.0),
            size: POWERUP_SIZE,
            remaining: POWERUP_LIFETIME,
        };
        assert!(ball_powerup_collision(&ball, &powerup));
        powerup.pos = Vec2::new(100.0, 100.0);
        assert!(!ball_powerup_collision(&ball, &powerup));
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(3.0, -4.0), Vec2::Y);
        assert!((reflected.x - 3.0).abs() < 1e-6);
        assert!((reflected.y - 4.0).abs() < 1e-6);
    }
}
