use glam::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{
    SceneMode, Settings, DROPLET_WAVE_STRENGTH, PRIMARY_WAVE_STRENGTH, SECONDARY_WAVE_OFFSET,
    SECONDARY_WAVE_STEP, SECONDARY_WAVE_STRENGTH,
};
use crate::simulation::{AutoClick, Droplet, Pool, ScheduledWave, Scheduler, Wave, WaveId};

/// Live simulation state: waves, droplets, pending spawns and the optional
/// pool surface.
///
/// A tick always runs in the same order: due spawns fire, droplets move
/// (landings append waves), every wave pair interacts, then every wave
/// updates and the dead ones are dropped.
pub struct World {
    waves: Vec<Wave>,
    droplets: Vec<Droplet>,
    pool: Pool,
    scheduler: Scheduler,
    auto_click: Option<AutoClick>,
    rng: StdRng,
    next_id: WaveId,
    /// Logical surface size, used for auto-click positions
    bounds: Vec2,
    due: Vec<ScheduledWave>,
    landings: Vec<Vec2>,
}

impl World {
    pub fn new(bounds: Vec2) -> Self {
        Self::with_rng(bounds, StdRng::from_entropy())
    }

    pub fn with_rng(bounds: Vec2, rng: StdRng) -> Self {
        Self {
            waves: Vec::new(),
            droplets: Vec::new(),
            pool: Pool::new(bounds.x, bounds.y),
            scheduler: Scheduler::new(),
            auto_click: None,
            rng,
            next_id: 0,
            bounds,
            due: Vec::new(),
            landings: Vec::new(),
        }
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn droplets(&self) -> &[Droplet] {
        &self.droplets
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn pending_spawns(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn is_auto_clicking(&self) -> bool {
        self.auto_click.is_some()
    }

    /// Append one wave and return its id
    pub fn add_wave(&mut self, pos: Vec2, strength: f32, settings: &Settings) -> WaveId {
        let id = self.next_id;
        self.next_id += 1;
        self.waves.push(Wave::new(id, pos, strength, settings));
        id
    }

    /// Splash at a surface position: one full-strength wave, a burst of
    /// droplets and a few jittered secondary waves, possibly staggered.
    ///
    /// With random shapes on, the active shape is re-rolled first so the new
    /// waves pick it up.
    pub fn spawn(&mut self, pos: Vec2, settings: &mut Settings, now: f32) -> WaveId {
        if settings.random_shape {
            if let Some(&shape) = settings.available_shapes.choose(&mut self.rng) {
                settings.shape = shape;
            }
        }

        let primary = self.add_wave(pos, PRIMARY_WAVE_STRENGTH, settings);

        if settings.particles {
            for _ in 0..settings.droplet_count {
                let droplet = Droplet::launch(pos, settings, &mut self.rng);
                self.droplets.push(droplet);
            }
        }

        let offset = SECONDARY_WAVE_OFFSET * settings.splash_spread;
        for i in 0..settings.secondary_waves {
            let jitter = Vec2::new(
                (self.rng.gen::<f32>() - 0.5) * offset,
                (self.rng.gen::<f32>() - 0.5) * offset,
            );
            let strength = SECONDARY_WAVE_STRENGTH - i as f32 * SECONDARY_WAVE_STEP;
            if settings.splash_delay > 0.0 {
                let due = now + settings.splash_delay * (i + 1) as f32;
                self.scheduler.schedule(due, pos + jitter, strength);
            } else {
                self.add_wave(pos + jitter, strength, settings);
            }
        }

        if settings.scene == SceneMode::Pool {
            self.pool.disturb(pos);
        }

        log::debug!(
            "Splash #{} at ({:.0}, {:.0}) shape={} waves={} droplets={} pending={}",
            primary,
            pos.x,
            pos.y,
            settings.shape.name(),
            self.waves.len(),
            self.droplets.len(),
            self.pending_spawns()
        );

        primary
    }

    /// Run one simulation tick at frame-clock time `now` (seconds)
    pub fn tick(&mut self, now: f32, settings: &mut Settings) {
        self.fire_due(now, settings);
        self.advance_droplets(settings);
        if settings.scene == SceneMode::Pool {
            self.pool.step();
        }
        self.advance_waves(settings);
        log::trace!(
            "tick t={:.2} waves={} droplets={}",
            now,
            self.waves.len(),
            self.droplets.len()
        );
    }

    /// Fire scheduled secondary waves and any auto-click that has come due
    fn fire_due(&mut self, now: f32, settings: &mut Settings) {
        let mut due = std::mem::take(&mut self.due);
        self.scheduler.take_due(now, &mut due);
        for spawn in &due {
            self.add_wave(spawn.pos, spawn.strength, settings);
        }
        self.due = due;

        let click = match self.auto_click.as_mut() {
            Some(auto) => auto.poll(now),
            None => false,
        };
        if click {
            let pos = Vec2::new(
                self.rng.gen_range(0.0..self.bounds.x.max(1.0)),
                self.rng.gen_range(0.0..self.bounds.y.max(1.0)),
            );
            self.spawn(pos, settings, now);
        }
    }

    /// Droplet engine: move every droplet, turning landings into small waves
    fn advance_droplets(&mut self, settings: &Settings) {
        self.landings.clear();
        self.droplets.retain_mut(|droplet| {
            let step = droplet.update();
            if let Some(at) = step.landed_at {
                self.landings.push(at);
            }
            step.alive
        });

        let landings = std::mem::take(&mut self.landings);
        for &at in &landings {
            self.add_wave(at, DROPLET_WAVE_STRENGTH, settings);
        }
        self.landings = landings;
    }

    /// Wave engine: all pairwise contacts first, then physics and retirement
    fn advance_waves(&mut self, settings: &Settings) {
        for j in 1..self.waves.len() {
            let (left, right) = self.waves.split_at_mut(j);
            let b = &mut right[0];
            for a in left.iter_mut() {
                a.interact(b, settings, &mut self.rng);
            }
        }
        self.waves.retain_mut(|wave| wave.update());
    }

    /// Clear everything, restart ids, cancel pending spawns and auto-click
    pub fn reset(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.waves.clear();
        self.droplets.clear();
        self.pool.clear();
        self.next_id = 0;
        self.auto_click = None;
        log::debug!("World reset, {} pending spawns cancelled", cancelled);
    }

    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        self.pool.resize(bounds.x, bounds.y);
    }

    /// Start the repeating auto-click, replacing any running one
    pub fn start_auto_click(&mut self, interval: f32, now: f32) {
        self.auto_click = Some(AutoClick::new(interval, now));
    }

    pub fn stop_auto_click(&mut self) {
        self.auto_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMode;
    use crate::simulation::ShapeKind;

    fn world() -> World {
        World::with_rng(Vec2::new(800.0, 600.0), StdRng::seed_from_u64(42))
    }

    fn quiet_settings() -> Settings {
        Settings {
            particles: false,
            secondary_waves: 0,
            ..Settings::default()
        }
    }

    #[test]
    fn test_spawn_with_defaults() {
        let mut world = world();
        let mut settings = Settings::default();
        let primary = world.spawn(Vec2::new(100.0, 100.0), &mut settings, 0.0);

        let waves = world.waves();
        assert_eq!(waves.len(), 4);
        let main = &waves[0];
        assert_eq!(main.id, primary);
        assert_eq!(main.pos, Vec2::new(100.0, 100.0));
        assert_eq!(main.radius, 0.0);
        assert_eq!(main.strength, 1.0);
        assert_eq!(main.energy, 1.0);
        assert_eq!(main.shape, ShapeKind::Circle);

        let expected = [0.7, 0.5, 0.3];
        for (wave, strength) in waves[1..].iter().zip(expected) {
            assert!((wave.strength - strength).abs() < 1e-6);
            assert!((wave.pos - main.pos).abs().max_element() <= 2.5);
        }
        assert_eq!(world.droplets().len(), settings.droplet_count as usize);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut world = world();
        let mut settings = Settings::default();
        world.spawn(Vec2::new(10.0, 10.0), &mut settings, 0.0);
        world.spawn(Vec2::new(300.0, 10.0), &mut settings, 0.0);
        let ids: Vec<WaveId> = world.waves().iter().map(|w| w.id).collect();
        assert!(ids.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_droplet_landing_adds_one_wave() {
        let mut world = world();
        let settings = quiet_settings();
        world
            .droplets
            .push(Droplet::new(Vec2::new(50.0, 200.0), Vec2::new(0.2, -15.0), 2.0, &settings));

        let mut landed_ticks = 0;
        for _ in 0..200 {
            let before = world.waves.len();
            world.advance_droplets(&settings);
            let added = world.waves.len() - before;
            if added > 0 {
                landed_ticks += 1;
                assert_eq!(added, 1);
                let wave = world.waves.last().expect("landing wave");
                assert!((wave.strength - DROPLET_WAVE_STRENGTH).abs() < 1e-6);
                assert_eq!(world.droplets.len(), 1);
                assert!(world.droplets[0].landed);
                assert_eq!(wave.pos, world.droplets[0].pos);
                assert!(wave.pos.y > 200.0);
            }
            world.advance_waves(&settings);
        }
        assert_eq!(landed_ticks, 1);
        assert!(world.droplets.is_empty());
    }

    #[test]
    fn test_landing_wave_joins_same_tick_update() {
        let mut world = world();
        let mut settings = quiet_settings();
        let mut droplet = Droplet::new(Vec2::new(50.0, 200.0), Vec2::new(0.0, 1.0), 2.0, &settings);
        droplet.pos.y = 200.5;
        world.droplets.push(droplet);
        world.tick(0.0, &mut settings);
        assert_eq!(world.waves().len(), 1);
        // Landed and updated in the same tick
        assert!(world.waves()[0].radius > 0.0);
    }

    #[test]
    fn test_waves_die_permanently() {
        let mut world = world();
        let mut settings = quiet_settings();
        world.spawn(Vec2::new(100.0, 100.0), &mut settings, 0.0);
        let mut last_radius = 0.0;
        let mut ticks = 0;
        while !world.waves().is_empty() {
            world.tick(ticks as f32 / 60.0, &mut settings);
            for wave in world.waves() {
                assert!(wave.strength > 0.01 && wave.energy > 0.01);
                assert!(wave.radius >= last_radius);
                last_radius = wave.radius;
            }
            ticks += 1;
            assert!(ticks < 2000);
        }
        for i in 0..100 {
            world.tick(100.0 + i as f32, &mut settings);
            assert!(world.waves().is_empty());
        }
    }

    #[test]
    fn test_staggered_secondaries_fire_on_time() {
        let mut world = world();
        let mut settings = Settings {
            particles: false,
            splash_delay: 0.1,
            ..Settings::default()
        };
        world.spawn(Vec2::new(100.0, 100.0), &mut settings, 0.0);
        assert_eq!(world.waves().len(), 1);
        assert_eq!(world.pending_spawns(), 3);

        world.tick(0.15, &mut settings);
        assert_eq!(world.waves().len(), 2);
        world.tick(0.35, &mut settings);
        assert_eq!(world.waves().len(), 4);
        assert_eq!(world.pending_spawns(), 0);
    }

    #[test]
    fn test_reset_cancels_pending_spawns() {
        let mut world = world();
        let mut settings = Settings {
            splash_delay: 0.5,
            ..Settings::default()
        };
        world.spawn(Vec2::new(100.0, 100.0), &mut settings, 0.0);
        world.start_auto_click(0.25, 0.0);
        world.reset();
        world.tick(0.01, &mut settings);
        assert!(world.waves().is_empty());
        assert!(world.droplets().is_empty());
        for i in 1..20 {
            world.tick(i as f32, &mut settings);
            assert!(world.waves().is_empty());
        }
        assert!(!world.is_auto_clicking());
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut world = world();
        let mut settings = quiet_settings();
        world.spawn(Vec2::ZERO, &mut settings, 0.0);
        world.spawn(Vec2::ZERO, &mut settings, 0.0);
        world.reset();
        assert_eq!(world.spawn(Vec2::ZERO, &mut settings, 0.0), 0);
    }

    #[test]
    fn test_monochrome_never_recolors() {
        let mut world = world();
        let mut settings = quiet_settings();
        for i in 0..6 {
            world.spawn(Vec2::new(100.0 + i as f32 * 15.0, 100.0), &mut settings, 0.0);
        }
        for t in 0..600 {
            world.tick(t as f32, &mut settings);
            for wave in world.waves() {
                assert_eq!(wave.color, [255, 255, 255]);
            }
        }
    }

    #[test]
    fn test_colorful_pairs_react_once() {
        let mut world = world();
        let mut settings = Settings {
            color_mode: ColorMode::Colorful,
            ..quiet_settings()
        };
        world.add_wave(Vec2::new(100.0, 100.0), 1.0, &settings);
        world.add_wave(Vec2::new(101.0, 100.0), 1.0, &settings);
        world.tick(0.0, &mut settings);
        let colors: Vec<_> = world.waves().iter().map(|w| w.color).collect();
        assert!(world.waves().iter().all(|w| w.reacted));
        assert!(world.waves()[0].has_touched(1));
        for t in 1..300 {
            world.tick(t as f32, &mut settings);
            let now: Vec<_> = world.waves().iter().map(|w| w.color).collect();
            if !now.is_empty() {
                assert_eq!(now, colors);
            }
        }
    }

    #[test]
    fn test_random_shape_rerolls_active_shape() {
        let mut world = world();
        let mut settings = Settings {
            random_shape: true,
            available_shapes: vec![ShapeKind::Spiral],
            ..quiet_settings()
        };
        world.spawn(Vec2::ZERO, &mut settings, 0.0);
        assert_eq!(settings.shape, ShapeKind::Spiral);
        assert_eq!(world.waves()[0].shape, ShapeKind::Spiral);
    }

    #[test]
    fn test_random_shape_with_empty_set_keeps_shape() {
        let mut world = world();
        let mut settings = Settings {
            random_shape: true,
            available_shapes: Vec::new(),
            shape: ShapeKind::Fractal,
            ..quiet_settings()
        };
        world.spawn(Vec2::ZERO, &mut settings, 0.0);
        assert_eq!(world.waves()[0].shape, ShapeKind::Fractal);
    }

    #[test]
    fn test_shape_change_does_not_touch_live_waves() {
        let mut world = world();
        let mut settings = quiet_settings();
        world.spawn(Vec2::ZERO, &mut settings, 0.0);
        settings.shape = ShapeKind::Mandala;
        world.tick(0.0, &mut settings);
        assert_eq!(world.waves()[0].shape, ShapeKind::Circle);
    }

    #[test]
    fn test_auto_click_spawns_inside_bounds() {
        let mut world = world();
        let mut settings = quiet_settings();
        world.start_auto_click(1.0, 0.0);
        world.start_auto_click(1.0, 0.0);
        world.tick(1.0, &mut settings);
        assert_eq!(world.waves().len(), 1);
        let pos = world.waves()[0].pos;
        assert!(pos.x >= 0.0 && pos.x < 800.0);
        assert!(pos.y >= 0.0 && pos.y < 600.0);

        world.stop_auto_click();
        world.tick(2.0, &mut settings);
        assert_eq!(world.waves().len(), 1);
    }

    #[test]
    fn test_zero_gravity_droplets_do_not_accumulate() {
        let mut world = world();
        let mut settings = Settings {
            gravity_intensity: 0.0,
            secondary_waves: 0,
            ..Settings::default()
        };
        for i in 0..50 {
            world.spawn(Vec2::new(10.0 + i as f32, 300.0), &mut settings, 0.0);
        }
        assert_eq!(world.droplets().len(), 50 * settings.droplet_count as usize);
        for t in 0..10 {
            world.tick(t as f32 / 60.0, &mut settings);
        }
        assert!(world.droplets().is_empty());
    }

    #[test]
    fn test_particles_disabled_spawns_no_droplets() {
        let mut world = world();
        let mut settings = Settings {
            particles: false,
            ..Settings::default()
        };
        world.spawn(Vec2::new(10.0, 10.0), &mut settings, 0.0);
        assert!(world.droplets().is_empty());
    }
}
