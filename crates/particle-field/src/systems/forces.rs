//! Force model: pointer field, exclusion-zone repulsion, static attractor,
//! damping and speed cap.
//!
//! Everything here is pure. Forces are velocity deltas for one step
//! (explicit Euler, `v += f`), so there is no mass or time scale involved.

use glam::Vec2;

use crate::api::config::{Attractor, ExclusionZone, FieldConfig};
use crate::core::particle::{Bounds, Particle};

#[derive(Debug, Clone, PartialEq)]
pub struct ForceModel {
    pub pointer_radius: f32,
    /// Sign selects attraction (+) or repulsion (-).
    pub pointer_strength: f32,
    pub zone: Option<ExclusionZone>,
    pub attractor: Option<Attractor>,
    pub damping: f32,
    pub max_velocity: f32,
}

impl ForceModel {
    /// Build the model for a run, resolving the exclusion zone against `bounds`.
    pub fn from_config(config: &FieldConfig, bounds: Bounds) -> Self {
        Self {
            pointer_radius: config.pointer_field_radius,
            pointer_strength: config.pointer_strength,
            zone: config.exclusion_zone.as_ref().map(|z| z.resolve(bounds)),
            attractor: config.attractor.as_ref().map(|a| a.resolve(bounds)),
            damping: config.damping,
            max_velocity: config.max_velocity,
        }
    }

    /// Radial pointer field with a linear falloff to zero at `pointer_radius`.
    ///
    /// The returned vector has magnitude `strength * (1 - d / radius)`, pointing
    /// at the pointer for positive strength. Zero outside the radius, at the
    /// pointer itself, and when there is no pointer yet.
    pub fn pointer_force(&self, position: Vec2, pointer: Option<Vec2>) -> Vec2 {
        let Some(pointer) = pointer else {
            return Vec2::ZERO;
        };
        let delta = pointer - position;
        let distance = delta.length();
        if distance <= 0.0 || distance >= self.pointer_radius {
            return Vec2::ZERO;
        }
        let scale = self.pointer_strength * (1.0 - distance / self.pointer_radius) / distance;
        finite_or_zero(delta * scale)
    }

    /// Push away from the zone centre while inside the zone's influence band.
    ///
    /// Strength ramps from `repel` at the vertical edges up to `2 * repel` on
    /// the zone's vertical centre line, where overlaid text sits.
    pub fn zone_force(&self, position: Vec2) -> Vec2 {
        let Some(zone) = &self.zone else {
            return Vec2::ZERO;
        };
        if zone.half_width <= 0.0 || !zone.influence_contains(position) {
            return Vec2::ZERO;
        }
        let delta = position - zone.center;
        let distance = delta.length();
        if distance <= 0.0 {
            // No meaningful direction at the exact centre.
            return Vec2::ZERO;
        }
        let hw = zone.half_width;
        let magnitude = zone.repel_strength * (1.0 + (hw - delta.x.abs().min(hw)) / hw);
        finite_or_zero(delta / distance * magnitude)
    }

    /// Linear spring towards the attractor: `(point - position) * strength`.
    /// Inactive unless the strength is positive.
    pub fn attractor_force(&self, position: Vec2) -> Vec2 {
        match &self.attractor {
            Some(a) if a.strength > 0.0 => finite_or_zero((a.point - position) * a.strength),
            _ => Vec2::ZERO,
        }
    }

    /// Total force on a particle for one step.
    pub fn net_force(&self, particle: &Particle, pointer: Option<Vec2>) -> Vec2 {
        self.pointer_force(particle.position, pointer)
            + self.zone_force(particle.position)
            + self.attractor_force(particle.position)
    }

    pub fn damp(&self, velocity: Vec2) -> Vec2 {
        velocity * self.damping
    }

    /// Rescale to exactly `max_velocity` when faster, keeping direction.
    pub fn clamp_velocity(&self, velocity: Vec2) -> Vec2 {
        if !velocity.is_finite() {
            return Vec2::ZERO;
        }
        let speed = velocity.length();
        if speed > self.max_velocity {
            velocity * (self.max_velocity / speed)
        } else {
            velocity
        }
    }

    /// Damping followed by the speed cap.
    pub fn settle(&self, velocity: Vec2) -> Vec2 {
        self.clamp_velocity(self.damp(velocity))
    }
}

fn finite_or_zero(v: Vec2) -> Vec2 {
    if v.is_finite() {
        v
    } else {
        Vec2::ZERO
    }
}
