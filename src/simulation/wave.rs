use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;

use crate::config::{
    ColorMode, Settings, COLLISION_ENERGY_LOSS, COLLISION_SPEED_LOSS, COLLISION_STRENGTH_LOSS,
    DEATH_THRESHOLD, ENERGY_DECAY, STRENGTH_DECAY, WAVE_BASE_COLOR, WAVE_STROKE_WIDTH,
};
use crate::simulation::ShapeKind;

pub type WaveId = u64;

/// Channel triple, 0-255 each
pub type Rgb = [u8; 3];

/// One expanding ring.
///
/// Shape, speed and stroke width are captured from the settings at creation
/// so later control changes never reshape a ring that is already running.
#[derive(Clone, Debug)]
pub struct Wave {
    /// Unique for the lifetime of the world (until reset)
    pub id: WaveId,

    /// Center in logical surface pixels
    pub pos: Vec2,

    /// Current ring radius, never shrinks
    pub radius: f32,

    /// Amplitude, decays by `STRENGTH_DECAY` per tick
    pub strength: f32,

    /// Drives growth rate and liveness, decays by `ENERGY_DECAY` per tick
    pub energy: f32,

    /// Radius gained per tick at full energy
    pub speed: f32,

    /// Base line thickness for every shape
    pub width: f32,

    pub color: Rgb,

    /// Peers this ring has already touched
    pub collisions: HashSet<WaveId>,

    pub shape: ShapeKind,

    /// Set once a collision has recolored this ring
    pub reacted: bool,
}

impl Wave {
    /// Create a ring at `pos`; `strength` is scaled by the configured multiplier
    pub fn new(id: WaveId, pos: Vec2, strength: f32, settings: &Settings) -> Self {
        Self {
            id,
            pos,
            radius: 0.0,
            strength: strength * settings.wave_strength,
            energy: 1.0,
            speed: settings.wave_speed,
            width: WAVE_STROKE_WIDTH,
            color: WAVE_BASE_COLOR,
            collisions: HashSet::new(),
            shape: settings.shape,
            reacted: false,
        }
    }

    /// Composite fade driver used by every shape
    pub fn intensity(&self) -> f32 {
        self.strength * self.energy
    }

    pub fn is_alive(&self) -> bool {
        self.strength > DEATH_THRESHOLD && self.energy > DEATH_THRESHOLD
    }

    pub fn has_touched(&self, other: WaveId) -> bool {
        self.collisions.contains(&other)
    }

    /// Whether the two ring boundaries currently overlap within the stroke band
    pub fn is_touching(&self, other: &Wave) -> bool {
        let distance = self.pos.distance(other.pos);
        (distance - (self.radius + other.radius)).abs() < self.width * 2.0
    }

    /// Resolve a first contact between two rings; `self` is the older one.
    ///
    /// Returns true when the pair touched for the first time this call.
    pub fn interact<R: Rng + ?Sized>(
        &mut self,
        other: &mut Wave,
        settings: &Settings,
        rng: &mut R,
    ) -> bool {
        if self.has_touched(other.id) || other.has_touched(self.id) {
            return false;
        }
        if !self.is_touching(other) {
            return false;
        }

        self.collisions.insert(other.id);
        other.collisions.insert(self.id);

        if settings.color_mode == ColorMode::Colorful {
            self.react(rng);
            other.react(rng);
        }

        // Only the older ring of the pair loses momentum, and only when it
        // is the stronger one
        if settings.collision_damping && self.strength > other.strength {
            self.absorb_impact(other.strength);
        }

        true
    }

    fn react<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.reacted {
            return;
        }
        self.color = [rng.gen(), rng.gen(), rng.gen()];
        self.reacted = true;
    }

    fn absorb_impact(&mut self, weaker_strength: f32) {
        self.energy *= COLLISION_ENERGY_LOSS;
        self.speed *= COLLISION_SPEED_LOSS;
        self.strength = (self.strength * COLLISION_STRENGTH_LOSS).max(weaker_strength);
    }

    /// Advance one tick; returns whether the ring is still alive
    pub fn update(&mut self) -> bool {
        self.radius += self.speed * self.energy;
        self.energy *= ENERGY_DECAY;
        self.strength *= STRENGTH_DECAY;
        self.is_alive()
    }
}
