use glam::Vec2;
use rand::Rng;

use crate::config::{
    Settings, DROPLET_DRIFT, DROPLET_FADE, DROPLET_GRAVITY, DROPLET_RECENTER, DROPLET_SIZE_MAX,
    DROPLET_SIZE_MIN,
};
use crate::simulation::Rgb;

/// Ballistic splash particle thrown up from a click and falling back through
/// its launch height.
#[derive(Clone, Debug)]
pub struct Droplet {
    pub pos: Vec2,
    /// Launch point, never changes
    pub start: Vec2,
    pub vel: Vec2,
    /// Per-tick vertical acceleration captured at launch
    pub gravity: f32,
    pub size: f32,
    pub alpha: f32,
    pub landed: bool,
    pub color: Rgb,
}

/// Outcome of one droplet tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropletStep {
    pub alive: bool,
    /// Set on the single tick the droplet passes back through its launch height
    pub landed_at: Option<Vec2>,
}

impl Droplet {
    /// Launch a droplet from `pos` with randomized drift and upward velocity
    pub fn launch<R: Rng + ?Sized>(pos: Vec2, settings: &Settings, rng: &mut R) -> Self {
        let vel = Vec2::new(
            rng.gen::<f32>() - 0.5,
            -settings.droplet_velocity - rng.gen::<f32>(),
        );
        let size = rng.gen_range(DROPLET_SIZE_MIN..DROPLET_SIZE_MAX);
        Self::new(pos, vel, size, settings)
    }

    pub fn new(pos: Vec2, vel: Vec2, size: f32, settings: &Settings) -> Self {
        Self {
            pos,
            start: pos,
            vel,
            gravity: DROPLET_GRAVITY * settings.gravity_intensity,
            size,
            alpha: 1.0,
            landed: false,
            color: settings.palette.rgb(),
        }
    }

    pub fn update(&mut self) -> DropletStep {
        if self.landed {
            self.alpha -= DROPLET_FADE;
            return DropletStep {
                alive: self.alpha > 0.0,
                landed_at: None,
            };
        }

        self.vel.x += (self.start.x - self.pos.x) * DROPLET_RECENTER;
        self.pos.x += self.vel.x * DROPLET_DRIFT;
        self.pos.y += self.vel.y;
        self.vel.y += self.gravity;

        if self.vel.y > 0.0 && self.pos.y > self.start.y {
            self.landed = true;
            return DropletStep {
                alive: true,
                landed_at: Some(self.pos),
            };
        }

        // Rising with no pull back down: it can never land
        let stranded = self.vel.y <= 0.0 && self.gravity <= 0.0;
        DropletStep {
            alive: self.alpha > 0.0 && !stranded && self.pos.is_finite(),
            landed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_launch_goes_up() {
        let mut rng = StdRng::seed_from_u64(5);
        let settings = Settings::default();
        for _ in 0..50 {
            let droplet = Droplet::launch(Vec2::new(50.0, 200.0), &settings, &mut rng);
            assert!(droplet.vel.y <= -settings.droplet_velocity);
            assert!(droplet.vel.x.abs() <= 0.5);
            assert!(droplet.size >= DROPLET_SIZE_MIN && droplet.size < DROPLET_SIZE_MAX);
            assert_eq!(droplet.start, Vec2::new(50.0, 200.0));
        }
    }

    #[test]
    fn test_lands_exactly_once() {
        let settings = Settings::default();
        let mut droplet = Droplet::new(Vec2::new(50.0, 200.0), Vec2::new(0.3, -15.5), 2.0, &settings);
        let mut landings = Vec::new();
        let mut ticks = 0;
        loop {
            let step = droplet.update();
            if let Some(at) = step.landed_at {
                landings.push(at);
            }
            if !step.alive {
                break;
            }
            ticks += 1;
            assert!(ticks < 1000, "droplet never retired");
        }
        assert_eq!(landings.len(), 1);
        assert!(landings[0].y > 200.0);
        assert!(droplet.landed);
    }

    #[test]
    fn test_velocity_accumulates_gravity_in_flight() {
        let settings = Settings::default();
        let mut droplet = Droplet::new(Vec2::new(0.0, 100.0), Vec2::new(0.0, -10.0), 2.0, &settings);
        let mut last_vy = droplet.vel.y;
        while !droplet.landed {
            droplet.update();
            if !droplet.landed {
                assert!((droplet.vel.y - last_vy - DROPLET_GRAVITY).abs() < 1e-4);
            }
            last_vy = droplet.vel.y;
        }
    }

    #[test]
    fn test_fade_after_landing() {
        let settings = Settings::default();
        let mut droplet = Droplet::new(Vec2::ZERO, Vec2::ZERO, 2.0, &settings);
        droplet.landed = true;
        let mut alphas = vec![droplet.alpha];
        while droplet.update().alive {
            alphas.push(droplet.alpha);
        }
        assert!(alphas.windows(2).all(|w| w[1] < w[0]));
        assert!(droplet.alpha <= 0.0);
        assert!(droplet.landed);
    }

    #[test]
    fn test_recenters_horizontally() {
        let settings = Settings::default();
        let mut droplet = Droplet::new(Vec2::new(0.0, 0.0), Vec2::new(0.5, -20.0), 2.0, &settings);
        droplet.update();
        droplet.update();
        // Drift to the right is pulled back toward the launch column
        assert!(droplet.vel.x < 0.5);
    }

    #[test]
    fn test_weightless_droplet_retires_without_landing() {
        let settings = Settings {
            gravity_intensity: 0.0,
            ..Settings::default()
        };
        let mut droplet = Droplet::new(Vec2::new(50.0, 200.0), Vec2::new(0.1, -15.0), 2.0, &settings);
        let step = droplet.update();
        assert!(!step.alive);
        assert_eq!(step.landed_at, None);
        assert!(!droplet.landed);
    }

    #[test]
    fn test_gravity_multiplier_captured() {
        let settings = Settings {
            gravity_intensity: 2.0,
            ..Settings::default()
        };
        let droplet = Droplet::new(Vec2::ZERO, Vec2::ZERO, 2.0, &settings);
        assert!((droplet.gravity - 1.6).abs() < 1e-6);
    }
}
