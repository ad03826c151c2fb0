//! Route planning for newly spawned agents
//!
//! A route is computed once at spawn time: an entry point flush with a
//! random edge, an exit target just beyond the opposite edge, and the
//! initial kinematics aiming at it. All randomness flows through the
//! caller's RNG so routes are reproducible under a fixed seed.

use glam::Vec2;
use rand::Rng;

use crate::config::{MotionConfig, SpriteConfig};

/// How far past the surface bounds the exit target sits, so agents walk
/// fully off the surface before the despawn check fires.
const EXIT_OVERSHOOT: f32 = 6.0;

/// Spread of the random offset seeding the wander heading (radians).
const WANDER_SEED_SPREAD: f32 = 0.4;

/// Entry side of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Bottom,
    Top,
    Left,
    Right,
}

impl Edge {
    /// Pick one of the four edges uniformly at random.
    pub fn pick(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..4) {
            0 => Edge::Bottom,
            1 => Edge::Top,
            2 => Edge::Left,
            _ => Edge::Right,
        }
    }
}

/// Entry point, exit target and initial kinematics assigned to an agent at
/// spawn.
#[derive(Debug, Clone)]
pub struct Route {
    /// Spawn position in surface-local coordinates
    pub entry: Vec2,
    /// Target point beyond the opposite edge
    pub exit: Vec2,
    /// Initial velocity, aimed entry-to-exit at a random in-band speed
    pub velocity: Vec2,
    /// Initial wander heading in radians
    pub wander_angle: f32,
}

impl Route {
    /// Plan a route across a `w` x `h` surface.
    ///
    /// Degenerate surfaces (too small to hold the sprite plus padding,
    /// typically a transient mid-turn measurement) get a fixed safe
    /// diagonal route instead of failing; geometry is re-evaluated on the
    /// next cycle anyway.
    pub fn plan(
        rng: &mut impl Rng,
        w: f32,
        h: f32,
        sprite: &SpriteConfig,
        motion: &MotionConfig,
    ) -> Self {
        let size = sprite.size;
        let pad = sprite.edge_pad;

        if w < size + pad * 2.0 || h < size + pad * 2.0 {
            let entry = Vec2::new(pad, pad);
            let exit = Vec2::new(w - size - pad, h - size - pad);
            return Self::with_kinematics(rng, entry, exit, motion);
        }

        let edge = Edge::pick(rng);
        Self::plan_from_edge(rng, edge, w, h, sprite, motion)
    }

    /// Plan a route entering from a specific edge. The exit sits on the
    /// opposite edge at an independently drawn perpendicular position, so
    /// paths are diagonal-ish rather than straight-through.
    pub fn plan_from_edge(
        rng: &mut impl Rng,
        edge: Edge,
        w: f32,
        h: f32,
        sprite: &SpriteConfig,
        motion: &MotionConfig,
    ) -> Self {
        let size = sprite.size;
        let pad = sprite.edge_pad;

        let (entry, exit) = match edge {
            Edge::Bottom => (
                Vec2::new(span(rng, pad, w - size - pad), h - size),
                Vec2::new(span(rng, pad, w - size - pad), -size - EXIT_OVERSHOOT),
            ),
            Edge::Top => (
                Vec2::new(span(rng, pad, w - size - pad), 0.0),
                Vec2::new(span(rng, pad, w - size - pad), h + EXIT_OVERSHOOT),
            ),
            Edge::Left => (
                Vec2::new(0.0, span(rng, pad, h - size - pad)),
                Vec2::new(w + EXIT_OVERSHOOT, span(rng, pad, h - size - pad)),
            ),
            Edge::Right => (
                Vec2::new(w - size, span(rng, pad, h - size - pad)),
                Vec2::new(-size - EXIT_OVERSHOOT, span(rng, pad, h - size - pad)),
            ),
        };

        Self::with_kinematics(rng, entry, exit, motion)
    }

    /// Seed velocity and wander heading from the entry-to-exit direction.
    fn with_kinematics(rng: &mut impl Rng, entry: Vec2, exit: Vec2, motion: &MotionConfig) -> Self {
        let to_exit = exit - entry;
        let heading = to_exit.y.atan2(to_exit.x);
        let speed = uniform(rng, motion.speed_min, motion.speed_max);
        let velocity = Vec2::from_angle(heading) * speed;
        let wander_angle = heading + uniform(rng, -WANDER_SEED_SPREAD, WANDER_SEED_SPREAD);

        Self {
            entry,
            exit,
            velocity,
            wander_angle,
        }
    }
}

/// Uniform draw in `[lo, hi]`, independently clamped. A collapsed range
/// (surface exactly as wide as the sprite plus padding) yields `lo`.
fn span(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    uniform(rng, lo, hi).clamp(lo, hi.max(lo))
}

pub(crate) fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}
