use glam::Vec2;

use crate::core::particle::{Bounds, Particle, ParticleSet};
use crate::systems::forces::ForceModel;

/// Advances the particle store by one fixed step.
///
/// Implementations own whatever per-run state they need (the rigid-body
/// strategy keeps a physics world) and are rebuilt through `reset` whenever
/// the store is reseeded.
pub trait Integrator {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Rebuild internal state for a freshly seeded store.
    fn reset(&mut self, _particles: &ParticleSet, _bounds: Bounds) {}

    /// Advance every particle once. After this returns every position lies in
    /// `bounds` and every speed is at most `forces.max_velocity`.
    fn step(
        &mut self,
        particles: &mut ParticleSet,
        forces: &ForceModel,
        pointer: Option<Vec2>,
        bounds: Bounds,
    );
}

/// Axes on which a particle bounced during `reflect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

impl Bounce {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Reflect a particle that left `bounds`: clamp it back onto the wall and point
/// the offending velocity component inward.
pub fn reflect(particle: &mut Particle, bounds: Bounds) -> Bounce {
    let mut bounce = Bounce::default();
    let p = &mut particle.position;
    let v = &mut particle.velocity;

    if p.x < 0.0 {
        p.x = 0.0;
        v.x = v.x.abs();
        bounce.x = true;
    } else if p.x > bounds.width {
        p.x = bounds.width;
        v.x = -v.x.abs();
        bounce.x = true;
    }

    if p.y < 0.0 {
        p.y = 0.0;
        v.y = v.y.abs();
        bounce.y = true;
    } else if p.y > bounds.height {
        p.y = bounds.height;
        v.y = -v.y.abs();
        bounce.y = true;
    }

    // A non-finite position has nowhere sensible to go; park it at the centre.
    if !p.is_finite() {
        *p = bounds.center();
        *v = Vec2::ZERO;
    }
    bounce
}

/// Explicit Euler with velocity-sign reflection at the container edges.
#[derive(Debug, Default)]
pub struct KinematicIntegrator;

impl KinematicIntegrator {
    pub fn new() -> Self {
        Self
    }

    /// One particle, one step. Returns the bounce so callers can observe wall hits.
    pub fn step_particle(
        particle: &mut Particle,
        forces: &ForceModel,
        pointer: Option<Vec2>,
        bounds: Bounds,
    ) -> Bounce {
        let force = forces.net_force(particle, pointer);
        particle.velocity = forces.settle(particle.velocity + force);
        particle.position += particle.velocity;
        reflect(particle, bounds)
    }
}

impl Integrator for KinematicIntegrator {
    fn name(&self) -> &'static str {
        "kinematic"
    }

    fn step(
        &mut self,
        particles: &mut ParticleSet,
        forces: &ForceModel,
        pointer: Option<Vec2>,
        bounds: Bounds,
    ) {
        for particle in particles.iter_mut() {
            Self::step_particle(particle, forces, pointer, bounds);
        }
    }
}
