//! Agent state and per-tick steering
//!
//! Each agent combines a slowly drifting wander force with a seek force
//! toward its exit target. The seek is weighted well above the wander so
//! paths look purposeful rather than meandering, while the wander keeps
//! them organic.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;

use crate::config::MotionConfig;
use crate::route::{self, Route};
use crate::stage::SpriteId;

/// Unique identifier for agents, allocated per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bug({})", self.0)
    }
}

/// One creature sprite crossing a surface.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    /// Host-side visual element
    pub sprite: SpriteId,
    /// Position in surface-local coordinates (sprite top-left)
    pub position: Vec2,
    /// Velocity in pixels/sec
    pub velocity: Vec2,
    /// Wander heading in radians, drifts a little every tick
    pub wander_angle: f32,
    /// Exit target beyond the opposite edge
    pub exit: Vec2,
    /// Current animation frame index
    pub frame: usize,
    /// Cleared when the agent crosses the despawn threshold; position is
    /// frozen from then on
    pub alive: bool,
}

impl Agent {
    /// Create an agent seeded with a planned route.
    pub fn new(id: AgentId, sprite: SpriteId, route: &Route) -> Self {
        Self {
            id,
            sprite,
            position: route.entry,
            velocity: route.velocity,
            wander_angle: route.wander_angle,
            exit: route.exit,
            frame: 0,
            alive: true,
        }
    }

    /// Advance steering and integration by `dt` seconds.
    ///
    /// `speed_scale` widens the speed band during a scatter window; it is
    /// 1.0 otherwise.
    pub fn steer(&mut self, dt: f32, motion: &MotionConfig, speed_scale: f32, rng: &mut impl Rng) {
        let lo = motion.speed_min * speed_scale;
        let hi = motion.speed_max * speed_scale;

        // Wander: drift the heading, push along it
        let max_delta = motion.wander_turn_rate * dt;
        let drift =
            route::uniform(rng, -max_delta, max_delta) * (0.5 + 0.5 * motion.wander_jitter);
        self.wander_angle += drift;
        let wander = Vec2::from_angle(self.wander_angle) * motion.wander_strength;

        // Seek: desired velocity toward the exit at the current in-band speed
        let desired_speed = self.velocity.length().clamp(lo, hi);
        let desired = (self.exit - self.position).normalize_or_zero() * desired_speed;
        let seek = (desired - self.velocity).clamp_length_max(motion.accel_max);

        let accel = (wander + seek * motion.path_bias).clamp_length_max(motion.accel_max);

        // Integrate velocity with inertia, clamp speed preserving direction
        self.velocity = self.velocity * motion.inertia + accel * dt;
        let speed = self.velocity.length();
        if speed > 0.0 {
            self.velocity *= speed.clamp(lo, hi) / speed;
        }

        self.position += self.velocity * dt;
    }

    /// Visual rotation in radians. Sprite artwork is drawn facing up, so
    /// the travel direction gets a quarter-turn offset.
    pub fn rotation(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x) + FRAC_PI_2
    }

    /// Whether the agent has moved beyond the `w` x `h` surface bounds by
    /// more than `clearance` pixels on either axis.
    pub fn has_left(&self, w: f32, h: f32, size: f32, clearance: f32) -> bool {
        self.position.x < -size - clearance
            || self.position.x > w + clearance
            || self.position.y < -size - clearance
            || self.position.y > h + clearance
    }

    /// Cycle to the next animation frame.
    pub fn advance_frame(&mut self, frame_count: usize) -> usize {
        if frame_count > 0 {
            self.frame = (self.frame + 1) % frame_count;
        }
        self.frame
    }
}
