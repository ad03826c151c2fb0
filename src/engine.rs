//! Engine controller
//!
//! Owns every piece of mutable state in the system: the surface registry,
//! the seeded RNG, the spawn and animation clocks, queued stage events and
//! scheduled removals. The host drives it from a single recurring
//! animation-frame callback via [`Engine::tick`]; the engine never spawns
//! timers or threads of its own, so all state is single-writer.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::agent::{Agent, AgentId};
use crate::animation::FrameClock;
use crate::assets;
use crate::config::BugConfig;
use crate::lifecycle::RemovalQueue;
use crate::registry::SurfaceRegistry;
use crate::route::Route;
use crate::stage::{PageId, PageStage, StageEvent};
use crate::visibility;

/// Longest interval one tick will integrate. Hides tab-switch sized
/// stalls in the host's frame callback.
const MAX_TICK_SECS: f32 = 0.05;

/// The creature engine. Construct once, `start` it, then `tick` it from
/// the host's frame callback and `notify` it about stage changes.
pub struct Engine {
    config: BugConfig,
    rng: Xoshiro256StarStar,
    registry: SurfaceRegistry,
    removals: RemovalQueue,
    events: Vec<StageEvent>,
    frame_clock: FrameClock,
    burst_countdown: f32,
    poll_countdown: f32,
    scatter_countdown: f32,
    /// Engine clock in seconds, sum of clamped tick deltas
    clock: f64,
    next_agent: u64,
    started: bool,
    running: bool,
    spawned_total: u64,
    removed_total: u64,
}

impl Engine {
    /// Engine with an entropy-seeded RNG.
    pub fn new(config: BugConfig) -> Self {
        Self::from_rng(config, Xoshiro256StarStar::from_entropy())
    }

    /// Engine with a fixed seed for reproducible runs.
    pub fn with_seed(config: BugConfig, seed: u64) -> Self {
        Self::from_rng(config, Xoshiro256StarStar::seed_from_u64(seed))
    }

    fn from_rng(config: BugConfig, rng: Xoshiro256StarStar) -> Self {
        let frame_clock = FrameClock::new(config.sprite.frame_period_ms);
        let burst_countdown = config.spawn.startup_delay_secs;
        let poll_countdown = config.surface.poll_interval_secs;

        Self {
            config,
            rng,
            registry: SurfaceRegistry::new(),
            removals: RemovalQueue::new(),
            events: Vec::new(),
            frame_clock,
            burst_countdown,
            poll_countdown,
            scatter_countdown: 0.0,
            clock: 0.0,
            next_agent: 1,
            started: false,
            running: false,
            spawned_total: 0,
            removed_total: 0,
        }
    }

    /// Idempotent bootstrap: preload sprite frames (best-effort), register
    /// currently visible surfaces, arm the first burst, and read the
    /// host's reduced-motion preference. With reduced motion active the
    /// engine stays inert apart from registry upkeep.
    pub fn start(&mut self, stage: &mut impl PageStage) {
        if self.started {
            return;
        }
        self.started = true;

        assets::preload_frames(&self.config.sprite.frames);

        self.running = !stage.reduced_motion();
        if !self.running {
            log::info!("Reduced-motion preference active; engine stays inert");
        }

        self.refresh(stage);
        self.burst_countdown = self.config.spawn.startup_delay_secs;
        self.poll_countdown = self.config.surface.poll_interval_secs;

        log::info!(
            "Engine started with {} registered surface(s)",
            self.registry.surface_count()
        );
    }

    /// Queue a host notification. Consumed once at the start of the next
    /// tick; nothing happens at call time.
    pub fn notify(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    /// Force an immediate spawn attempt (manual testing hook). Works even
    /// under reduced motion; the placed agents simply never move.
    pub fn burst(&mut self, stage: &mut impl PageStage) {
        if !self.started {
            return;
        }
        self.spawn_burst(stage);
    }

    /// One cooperative update step with elapsed seconds `dt` (clamped to
    /// [`MAX_TICK_SECS`]). Drains queued events and runs due removals
    /// first; unless the engine is inert, this is followed by the spawn
    /// cadence, frame animation and steering for every alive agent, all
    /// against a single geometry snapshot taken at tick start.
    pub fn tick(&mut self, stage: &mut impl PageStage, dt: f32) {
        if !self.started {
            return;
        }
        let dt = dt.min(MAX_TICK_SECS);
        self.clock += dt as f64;

        // Stage events, consumed once per tick
        let mut refresh = false;
        for event in std::mem::take(&mut self.events) {
            match event {
                StageEvent::Resized | StageEvent::PageTurned => refresh = true,
                StageEvent::PageTurning => {
                    self.scatter_countdown = self.config.motion.scatter_secs;
                }
            }
        }

        // Polling fallback when the collaborator has no turn events
        if !stage.supports_turn_events() {
            self.poll_countdown -= dt;
            if self.poll_countdown <= 0.0 {
                self.poll_countdown = self.config.surface.poll_interval_secs;
                refresh = true;
            }
        }

        if refresh {
            self.refresh(stage);
        }

        // Automatic spawn cadence (gated off while inert)
        if self.running {
            self.burst_countdown -= dt;
            if self.burst_countdown <= 0.0 {
                self.burst_countdown = self.config.spawn.burst_every_secs;
                self.spawn_burst(stage);
            }
        }

        // Due sprite removals from earlier despawns
        while let Some((page, agent)) = self.removals.pop_due(self.clock) {
            if let Some(agent) = self.registry.remove_agent(page, agent) {
                stage.remove_sprite(agent.sprite);
                self.removed_total += 1;
                log::debug!(
                    "Removed {} from {} ({} agents remain)",
                    agent.id,
                    page,
                    self.registry.agent_count()
                );
            }
        }

        if !self.running {
            return;
        }

        if self.scatter_countdown > 0.0 {
            self.scatter_countdown -= dt;
        }
        let speed_scale = if self.scatter_countdown > 0.0 {
            self.config.motion.scatter_boost
        } else {
            1.0
        };

        // Frame animation on its own fixed cadence
        let frame_count = self.config.sprite.frames.len();
        if self.frame_clock.advance(dt) && frame_count > 0 {
            for (_, surface) in self.registry.iter_mut() {
                for agent in surface.agents.values_mut().filter(|a| a.alive) {
                    let frame = agent.advance_frame(frame_count);
                    stage.set_sprite_frame(agent.sprite, frame);
                }
            }
        }

        // One geometry snapshot for the whole tick: every agent on every
        // surface integrates against the same measurements and dt
        let sizes: Vec<(PageId, (f32, f32))> = self
            .registry
            .iter()
            .map(|(&page, surface)| (page, stage.overlay_size(surface.overlay)))
            .collect();

        let sprite_size = self.config.sprite.size;
        let clearance = self.config.surface.despawn_clearance_px;
        let min_usable = self.config.surface.min_usable_px;
        let removal_due = self.clock + self.config.surface.removal_delay_secs as f64;

        for (page, (w, h)) in sizes {
            if w < min_usable || h < min_usable {
                // Mid-turn zero-size box; skip so position math stays sane
                continue;
            }
            let Some(surface) = self.registry.get_mut(page) else {
                continue;
            };

            let mut departed: Vec<AgentId> = Vec::new();
            for agent in surface.agents.values_mut() {
                if !agent.alive {
                    continue;
                }
                agent.steer(dt, &self.config.motion, speed_scale, &mut self.rng);
                stage.place_sprite(agent.sprite, agent.position, agent.rotation());

                if agent.has_left(w, h, sprite_size, clearance) {
                    agent.alive = false;
                    stage.begin_exit(agent.sprite);
                    departed.push(agent.id);
                }
            }

            for id in departed {
                self.removals.schedule(removal_due, page, id);
                log::debug!("{id} left {page}; sprite removal scheduled");
            }
        }
    }

    /// Re-scan visibility and reconcile the registry.
    fn refresh(&mut self, stage: &mut impl PageStage) {
        let visible = visibility::visible_surfaces(stage, &self.config.surface);
        self.registry.ensure(stage, &visible);
    }

    /// Attempt to place `spawn.burst_size` agents on the visible surfaces,
    /// visiting them in random order. Surfaces at capacity or with
    /// degenerate measured size are skipped; one extra pass runs if the
    /// first could not place the full quota.
    fn spawn_burst(&mut self, stage: &mut impl PageStage) {
        let mut visible = visibility::visible_surfaces(stage, &self.config.surface);
        self.registry.ensure(stage, &visible);
        if visible.is_empty() {
            return;
        }

        visible.shuffle(&mut self.rng);

        let mut remaining = self.config.spawn.burst_size;
        for _pass in 0..2 {
            for &page in &visible {
                if remaining == 0 {
                    break;
                }
                if self.try_spawn(stage, page).is_some() {
                    remaining -= 1;
                }
            }
            if remaining == 0 {
                break;
            }
        }
    }

    /// Spawn a single agent on one surface, or `None` if the surface is
    /// unregistered, at capacity, or currently degenerate. Agents awaiting
    /// removal still count toward capacity.
    fn try_spawn(&mut self, stage: &mut impl PageStage, page: PageId) -> Option<AgentId> {
        let max = self.config.spawn.max_per_surface;
        let min_usable = self.config.surface.min_usable_px;

        let surface = self.registry.get(page)?;
        if surface.agents.len() >= max {
            return None;
        }
        let overlay = surface.overlay;
        let (w, h) = stage.overlay_size(overlay);
        if w < min_usable || h < min_usable {
            return None;
        }

        let route = Route::plan(&mut self.rng, w, h, &self.config.sprite, &self.config.motion);
        let sprite = stage.create_sprite(overlay);
        let id = AgentId(self.next_agent);
        self.next_agent += 1;

        let agent = Agent::new(id, sprite, &route);
        stage.place_sprite(sprite, agent.position, agent.rotation());

        let surface = self.registry.get_mut(page)?;
        surface.agents.insert(id, agent);
        self.spawned_total += 1;
        log::debug!(
            "Spawned {} on {} ({}/{})",
            id,
            page,
            surface.agents.len(),
            max
        );

        Some(id)
    }

    /// Whether the physics/animation loop is active (false under reduced
    /// motion).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Registered surfaces, visible or not.
    pub fn surface_count(&self) -> usize {
        self.registry.surface_count()
    }

    /// All agents, including despawned ones awaiting removal.
    pub fn agent_count(&self) -> usize {
        self.registry.agent_count()
    }

    /// Agents still crossing their surface.
    pub fn alive_count(&self) -> usize {
        self.registry.alive_count()
    }

    /// Agents spawned over the engine's lifetime.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Sprites removed over the engine's lifetime.
    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }

    /// Positions of all alive agents, surface-local.
    pub fn agent_positions(&self) -> Vec<Vec2> {
        self.registry
            .iter()
            .flat_map(|(_, surface)| {
                surface
                    .agents
                    .values()
                    .filter(|a| a.alive)
                    .map(|a| a.position)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoBook;

    const DT: f32 = 1.0 / 60.0;

    fn engine() -> Engine {
        Engine::with_seed(BugConfig::default(), 1234)
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut book = DemoBook::spread(400.0, 300.0);
        let mut engine = engine();

        engine.start(&mut book);
        engine.start(&mut book);
        engine.start(&mut book);

        assert_eq!(engine.surface_count(), 2);
        assert_eq!(book.overlays_created(), 2);
    }

    #[test]
    fn test_burst_respects_capacity() {
        let mut book = DemoBook::spread(400.0, 300.0);
        let mut engine = engine();
        engine.start(&mut book);

        let max = 2 * 2; // two surfaces, two agents each
        for _ in 0..10 {
            engine.burst(&mut book);
            assert!(engine.agent_count() <= max);
        }
        assert_eq!(engine.agent_count(), max);
    }

    #[test]
    fn test_burst_before_start_is_a_noop() {
        let mut book = DemoBook::spread(400.0, 300.0);
        let mut engine = engine();

        engine.burst(&mut book);
        assert_eq!(engine.agent_count(), 0);
    }

    #[test]
    fn test_automatic_bursts_follow_startup_delay() {
        let mut book = DemoBook::spread(400.0, 300.0);
        let mut engine = engine();
        engine.start(&mut book);

        // Before the startup delay elapses: nothing
        for _ in 0..30 {
            engine.tick(&mut book, DT);
        }
        assert_eq!(engine.spawned_total(), 0);

        // Past the delay: the first burst lands
        for _ in 0..12 {
            engine.tick(&mut book, DT);
        }
        assert_eq!(engine.spawned_total(), 2);
    }

    #[test]
    fn test_reduced_motion_keeps_engine_inert() {
        let mut book = DemoBook::spread(400.0, 300.0);
        book.set_reduced_motion(true);
        let mut engine = engine();
        engine.start(&mut book);

        assert!(!engine.is_running());

        for _ in 0..300 {
            engine.tick(&mut book, DT);
        }
        assert_eq!(engine.spawned_total(), 0);

        // Manual bursts still place agents, but they never move
        engine.burst(&mut book);
        assert!(engine.agent_count() > 0);
        let before = book.sprite_positions();
        for _ in 0..60 {
            engine.tick(&mut book, DT);
        }
        assert_eq!(book.sprite_positions(), before);
    }

    #[test]
    fn test_poll_fallback_refreshes_registry() {
        let mut book = DemoBook::spread(400.0, 300.0);
        book.set_turn_events(false);
        let mut engine = engine();
        engine.start(&mut book);

        let overlay = crate::stage::OverlayId(0);
        book.detach_overlay(overlay);

        // No notify() call; only the polling fallback can notice
        for _ in 0..60 {
            engine.tick(&mut book, DT);
        }
        assert!(book.overlay_attached(overlay, crate::stage::PageId(0)));
    }

    #[test]
    fn test_degenerate_surface_freezes_integration() {
        let mut book = DemoBook::spread(400.0, 300.0);
        let mut engine = engine();
        engine.start(&mut book);
        engine.burst(&mut book);
        assert!(engine.alive_count() > 0);

        // Hold the left page collapsed mid-turn
        book.begin_turn(0, 10.0);
        book.update(5.0); // page 0 at zero width
        let before = book.sprite_positions();
        for _ in 0..5 {
            engine.tick(&mut book, DT);
        }
        // Page 1 agents still move; page 0 agents are frozen. Verify no
        // NaN or runaway positions appeared anywhere.
        for pos in book.sprite_positions() {
            assert!(pos.x.is_finite() && pos.y.is_finite());
        }
        assert_eq!(before.len(), book.sprite_positions().len());
    }

    #[test]
    fn test_turning_event_opens_scatter_window() {
        let cfg = BugConfig::default();
        let mut book = DemoBook::spread(400.0, 300.0);
        let mut engine = engine();
        engine.start(&mut book);
        engine.burst(&mut book);

        engine.notify(StageEvent::PageTurning);
        engine.tick(&mut book, DT);

        // Inside the scatter window the lower clamp is boosted, so every
        // alive agent runs faster than the normal ceiling.
        assert!(engine.alive_count() > 0);
        for (_, surface) in engine.registry.iter() {
            for agent in surface.agents.values().filter(|a| a.alive) {
                let speed = agent.velocity.length();
                assert!(speed >= cfg.motion.speed_min * cfg.motion.scatter_boost - 1e-2);
                assert!(speed <= cfg.motion.speed_max * cfg.motion.scatter_boost + 1e-2);
            }
        }
    }
}
