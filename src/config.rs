//! Engine configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest
//! priority):
//! 1. Compiled defaults
//! 2. `config.ron` file (if exists)
//! 3. Environment variables prefixed with `BOOKBUGS_`
//!
//! Example environment variable: `BOOKBUGS_MOTION__SPEED_MAX=500`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BugConfig {
    #[serde(default)]
    pub spawn: SpawnConfig,

    #[serde(default)]
    pub motion: MotionConfig,

    #[serde(default)]
    pub sprite: SpriteConfig,

    #[serde(default)]
    pub surface: SurfaceConfig,
}

/// Spawn burst cadence and capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Delay before the first automatic burst in seconds
    pub startup_delay_secs: f32,
    /// Interval between automatic bursts in seconds
    pub burst_every_secs: f32,
    /// Number of agents a burst attempts to place
    pub burst_size: usize,
    /// Maximum simultaneous agents per surface
    pub max_per_surface: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            startup_delay_secs: 0.6,
            burst_every_secs: 15.0,
            burst_size: 2,
            max_per_surface: 2,
        }
    }
}

/// Steering and integration tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Minimum speed in pixels/sec
    pub speed_min: f32,
    /// Maximum speed in pixels/sec
    pub speed_max: f32,
    /// Acceleration magnitude limit in pixels/sec^2
    pub accel_max: f32,
    /// Velocity retained per tick before new acceleration (< 1)
    pub inertia: f32,
    /// Wander force magnitude in pixels/sec^2
    pub wander_strength: f32,
    /// Maximum wander heading drift in radians/sec
    pub wander_turn_rate: f32,
    /// Jitter factor scaling the heading drift (0..1)
    pub wander_jitter: f32,
    /// Seek force weight relative to wander (> 1 keeps paths purposeful)
    pub path_bias: f32,
    /// Speed band multiplier while a page turn is in progress
    pub scatter_boost: f32,
    /// Duration of the scatter window in seconds
    pub scatter_secs: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed_min: 300.0,
            speed_max: 420.0,
            accel_max: 800.0,
            inertia: 0.88,
            wander_strength: 120.0,
            wander_turn_rate: 2.0,
            wander_jitter: 0.7,
            path_bias: 1.8,
            scatter_boost: 1.6,
            scatter_secs: 0.8,
        }
    }
}

/// Sprite visuals and animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// Square sprite side length in pixels
    pub size: f32,
    /// Padding from surface edges when placing entry/exit points
    pub edge_pad: f32,
    /// Animation frame image paths, cycled in order
    pub frames: Vec<String>,
    /// Frame cycle period in milliseconds
    pub frame_period_ms: f32,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            size: 46.0,
            edge_pad: 6.0,
            frames: vec!["craw-2.png".to_string(), "craw-3.png".to_string()],
            frame_period_ms: 90.0,
        }
    }
}

/// Surface acceptance thresholds and despawn timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Minimum page rect side for visibility, excludes mid-turn boxes
    pub min_rect_px: f32,
    /// Minimum measured overlay side for spawning and integration
    pub min_usable_px: f32,
    /// Margin beyond surface bounds before an agent despawns
    pub despawn_clearance_px: f32,
    /// Delay between despawn and sprite removal in seconds
    pub removal_delay_secs: f32,
    /// Polling refresh interval when turn events are unavailable
    pub poll_interval_secs: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            min_rect_px: 20.0,
            min_usable_px: 30.0,
            despawn_clearance_px: 64.0,
            removal_delay_secs: 0.16,
            poll_interval_secs: 0.8,
        }
    }
}

impl BugConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `config.ron` file (if exists)
    /// 3. Environment variables prefixed with `BOOKBUGS_` (highest priority)
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("spawn.startup_delay_secs", 0.6)?
            .set_default("spawn.burst_every_secs", 15.0)?
            .set_default("spawn.burst_size", 2_i64)?
            .set_default("spawn.max_per_surface", 2_i64)?
            .set_default("motion.speed_min", 300.0)?
            .set_default("motion.speed_max", 420.0)?
            .set_default("motion.accel_max", 800.0)?
            .set_default("motion.inertia", 0.88)?
            .set_default("motion.wander_strength", 120.0)?
            .set_default("motion.wander_turn_rate", 2.0)?
            .set_default("motion.wander_jitter", 0.7)?
            .set_default("motion.path_bias", 1.8)?
            .set_default("motion.scatter_boost", 1.6)?
            .set_default("motion.scatter_secs", 0.8)?
            .set_default("sprite.size", 46.0)?
            .set_default("sprite.edge_pad", 6.0)?
            .set_default("sprite.frames", vec!["craw-2.png", "craw-3.png"])?
            .set_default("sprite.frame_period_ms", 90.0)?
            .set_default("surface.min_rect_px", 20.0)?
            .set_default("surface.min_usable_px", 30.0)?
            .set_default("surface.despawn_clearance_px", 64.0)?
            .set_default("surface.removal_delay_secs", 0.16)?
            .set_default("surface.poll_interval_secs", 0.8)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name("config")
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (BOOKBUGS_MOTION__SPEED_MAX, etc.)
            .add_source(Environment::with_prefix("BOOKBUGS").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BugConfig::default();
        assert_eq!(config.spawn.burst_size, 2);
        assert_eq!(config.spawn.max_per_surface, 2);
        assert_eq!(config.motion.speed_min, 300.0);
        assert_eq!(config.motion.speed_max, 420.0);
        assert_eq!(config.sprite.size, 46.0);
        assert_eq!(config.sprite.frames.len(), 2);
        assert_eq!(config.surface.despawn_clearance_px, 64.0);
    }

    #[test]
    fn test_speed_band_is_sane() {
        let config = BugConfig::default();
        assert!(config.motion.speed_min <= config.motion.speed_max);
        assert!(config.motion.inertia < 1.0);
        assert!(config.motion.path_bias > 1.0);
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config = BugConfig::load().expect("Failed to load config");
        assert_eq!(config.spawn.burst_size, 2);
        assert_eq!(config.motion.speed_max, 420.0);
    }
}
