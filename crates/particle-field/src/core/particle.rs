use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Container extents in container units (CSS pixels in the browser).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Build bounds from measured extents.
    /// Non-finite or non-positive extents collapse to 1.0 so seeding never produces NaN.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    pub fn from_size(size: Vec2) -> Self {
        Self::new(size.x, size.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Inclusive containment: `[0, width] × [0, height]`.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

fn sanitize_extent(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        1.0
    }
}

/// Range particle radii are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusRange {
    pub min: f32,
    pub max: f32,
}

impl RadiusRange {
    /// Breakpoints match the small/medium/large screen classes of the login pages.
    pub fn for_width(width: f32) -> Self {
        if width < 640.0 {
            Self { min: 0.75, max: 2.0 }
        } else if width < 768.0 {
            Self { min: 1.0, max: 2.5 }
        } else {
            Self { min: 1.0, max: 3.0 }
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

/// A point mass. Velocity is in container units per simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }
}

/// Ordered particle store for the current frame.
/// Replaced as a whole on reseed; particles are never added or removed one at a time.
#[derive(Debug, Clone, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `count` particles uniformly inside `bounds`.
    /// Velocity components are drawn from `[-initial_speed, initial_speed]`.
    pub fn seed<R: Rng>(
        count: usize,
        bounds: Bounds,
        radius: RadiusRange,
        initial_speed: f32,
        rng: &mut R,
    ) -> Self {
        let speed = if initial_speed.is_finite() {
            initial_speed.abs()
        } else {
            0.0
        };
        let particles = (0..count)
            .map(|_| {
                let position = Vec2::new(
                    rng.gen_range(0.0..bounds.width),
                    rng.gen_range(0.0..bounds.height),
                );
                let velocity = Vec2::new(
                    rng.gen_range(-speed..=speed),
                    rng.gen_range(-speed..=speed),
                );
                Particle::new(position, velocity, radius.sample(rng))
            })
            .collect();
        Self { particles }
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
