use glam::Vec2;
use rapier2d::prelude::*;

use crate::core::particle::{Bounds, ParticleSet};
use crate::systems::forces::ForceModel;
use crate::systems::integrator::{reflect, Integrator};

/// Wall slab thickness. Walls sit just outside the container.
const WALL_THICKNESS: f32 = 100.0;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam <-> nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Shape description for a collider.
#[derive(Debug, Clone, Copy)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl ColliderMaterial {
    /// Perfectly elastic and frictionless, matching the reflect boundary mode.
    pub const ELASTIC: ColliderMaterial = ColliderMaterial {
        restitution: 1.0,
        friction: 0.0,
        density: 1.0,
    };
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self::ELASTIC
    }
}

/// Body description: either a particle (dynamic ball) or a wall (fixed cuboid).
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub dynamic: bool,
    pub position: Vec2,
    /// Linear velocity in units per second.
    pub velocity: Vec2,
    pub collider: ColliderDesc,
}

impl BodyDesc {
    /// A dynamic body with rotation locked.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            dynamic: true,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            collider,
        }
    }

    /// A fixed (static) body.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            dynamic: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            collider,
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Rapier2D pipeline with zero gravity, wrapped behind glam types.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    pub fn new(dt: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;
        Self {
            gravity: vec2_to_na(Vec2::ZERO),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body + collider and return the body handle.
    pub fn create_body(&mut self, desc: &BodyDesc, material: ColliderMaterial) -> RigidBodyHandle {
        let builder = if desc.dynamic {
            RigidBodyBuilder::dynamic()
        } else {
            RigidBodyBuilder::fixed()
        };
        let rb = builder
            .translation(vec2_to_na(desc.position))
            .linvel(vec2_to_na(desc.velocity))
            .gravity_scale(0.0)
            .locked_axes(LockedAxes::ROTATION_LOCKED)
            .build();
        let handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Linear velocity in units per second.
    pub fn velocity(&self, handle: RigidBodyHandle) -> Vec2 {
        self.bodies
            .get(handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    pub fn position(&self, handle: RigidBodyHandle) -> Vec2 {
        self.bodies
            .get(handle)
            .map(|rb| na_to_vec2(rb.translation()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_position(&mut self, handle: RigidBodyHandle, pos: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_translation(vec2_to_na(pos), true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

// ---------------------------------------------------------------------------
// RigidBodyIntegrator
// ---------------------------------------------------------------------------

/// Integrator backed by rapier: particles are dynamic balls, the container is
/// three or four static walls (the top one is optional). Forces are applied to the store's per-step velocities
/// before the physics step; positions and velocities are synced back after it.
pub struct RigidBodyIntegrator {
    world: PhysicsWorld,
    /// Body handle per particle, in store order.
    particles: Vec<RigidBodyHandle>,
    walls: Vec<RigidBodyHandle>,
    top_wall: bool,
}

impl RigidBodyIntegrator {
    /// `dt` is the fixed step length in seconds.
    pub fn new(dt: f32) -> Self {
        Self {
            world: PhysicsWorld::new(dt),
            particles: Vec::new(),
            walls: Vec::new(),
            top_wall: true,
        }
    }

    /// Without a top wall bodies may leave through the top edge inside the
    /// physics step; `reflect` still brings them back into the store.
    pub fn with_top_wall(mut self, enabled: bool) -> Self {
        self.top_wall = enabled;
        self
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    fn build_walls(&mut self, bounds: Bounds) {
        let (w, h) = (bounds.width, bounds.height);
        let t = WALL_THICKNESS;
        let horizontal = ColliderDesc::Cuboid {
            half_width: w / 2.0 + t,
            half_height: t / 2.0,
        };
        let vertical = ColliderDesc::Cuboid {
            half_width: t / 2.0,
            half_height: h / 2.0 + t,
        };
        let mut slabs = vec![
            (horizontal, Vec2::new(w / 2.0, h + t / 2.0)),
            (vertical, Vec2::new(-t / 2.0, h / 2.0)),
            (vertical, Vec2::new(w + t / 2.0, h / 2.0)),
        ];
        if self.top_wall {
            slabs.push((horizontal, Vec2::new(w / 2.0, -t / 2.0)));
        }
        for (shape, pos) in slabs {
            let handle = self
                .world
                .create_body(&BodyDesc::fixed(shape).with_position(pos), ColliderMaterial::ELASTIC);
            self.walls.push(handle);
        }
    }
}

impl Integrator for RigidBodyIntegrator {
    fn name(&self) -> &'static str {
        "rigid-body"
    }

    fn reset(&mut self, particles: &ParticleSet, bounds: Bounds) {
        let dt = self.world.dt();
        self.world = PhysicsWorld::new(dt);
        self.particles.clear();
        self.walls.clear();
        self.build_walls(bounds);

        for p in particles.iter() {
            let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: p.radius })
                .with_position(p.position)
                .with_velocity(p.velocity / dt);
            let handle = self.world.create_body(&desc, ColliderMaterial::ELASTIC);
            self.particles.push(handle);
        }
    }

    fn step(
        &mut self,
        particles: &mut ParticleSet,
        forces: &ForceModel,
        pointer: Option<Vec2>,
        bounds: Bounds,
    ) {
        if self.particles.len() != particles.len() {
            log::warn!(
                "rigid-body integrator out of sync ({} bodies, {} particles); rebuilding",
                self.particles.len(),
                particles.len()
            );
            self.reset(particles, bounds);
        }
        let dt = self.world.dt();

        for (particle, &handle) in particles.iter_mut().zip(&self.particles) {
            let force = forces.net_force(particle, pointer);
            particle.velocity = forces.settle(particle.velocity + force);
            self.world.set_velocity(handle, particle.velocity / dt);
        }

        self.world.step();

        for (particle, &handle) in particles.iter_mut().zip(&self.particles) {
            particle.position = self.world.position(handle);
            let synced = self.world.velocity(handle) * dt;
            particle.velocity = forces.clamp_velocity(synced);
            let bounced = reflect(particle, bounds).any();
            if bounced {
                self.world.set_position(handle, particle.position);
            }
            if bounced || particle.velocity != synced {
                self.world.set_velocity(handle, particle.velocity / dt);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::{Particle, RadiusRange};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn forces() -> ForceModel {
        ForceModel {
            pointer_radius: 150.0,
            pointer_strength: -0.5,
            zone: None,
            attractor: None,
            damping: 0.99,
            max_velocity: 2.0,
        }
    }

    #[test]
    fn reset_builds_walls_and_balls() {
        let mut rng = SmallRng::seed_from_u64(1);
        let bounds = Bounds::new(400.0, 300.0);
        let set = ParticleSet::seed(25, bounds, RadiusRange::for_width(400.0), 0.25, &mut rng);
        let mut integrator = RigidBodyIntegrator::new(DT);
        integrator.reset(&set, bounds);

        assert_eq!(integrator.wall_count(), 4);
        assert_eq!(integrator.world().body_count(), 29);
    }

    #[test]
    fn reset_replaces_previous_bodies() {
        let bounds = Bounds::new(100.0, 100.0);
        let set = ParticleSet::from_particles(vec![Particle::new(Vec2::new(50.0, 50.0), Vec2::ZERO, 2.0)]);
        let mut integrator = RigidBodyIntegrator::new(DT);
        integrator.reset(&set, bounds);
        integrator.reset(&set, bounds);
        assert_eq!(integrator.world().body_count(), 5);
    }

    #[test]
    fn free_particle_moves_one_velocity_per_step() {
        let bounds = Bounds::new(200.0, 200.0);
        let mut set = ParticleSet::from_particles(vec![Particle::new(
            Vec2::new(100.0, 100.0),
            Vec2::new(1.0, 0.0),
            2.0,
        )]);
        let f = ForceModel { damping: 1.0, ..forces() };
        let mut integrator = RigidBodyIntegrator::new(DT);
        integrator.reset(&set, bounds);
        integrator.step(&mut set, &f, None, bounds);

        let p = set.get(0).expect("particle");
        assert!((p.position.x - 101.0).abs() < 0.05, "x = {}", p.position.x);
        assert!((p.position.y - 100.0).abs() < 0.05, "y = {}", p.position.y);
    }

    #[test]
    fn wall_reverses_velocity() {
        let bounds = Bounds::new(200.0, 200.0);
        let mut set = ParticleSet::from_particles(vec![Particle::new(
            Vec2::new(190.0, 100.0),
            Vec2::new(2.0, 0.0),
            2.0,
        )]);
        let f = ForceModel { damping: 1.0, ..forces() };
        let mut integrator = RigidBodyIntegrator::new(DT);
        integrator.reset(&set, bounds);

        let mut bounced = false;
        for _ in 0..30 {
            integrator.step(&mut set, &f, None, bounds);
            if set.get(0).map(|p| p.velocity.x < 0.0).unwrap_or(false) {
                bounced = true;
                break;
            }
        }
        assert!(bounced, "particle should bounce off the right wall");
    }

    #[test]
    fn bounded_and_capped_with_pointer_and_zone() {
        use crate::api::config::{FieldConfig, ZoneConfig};

        let mut rng = SmallRng::seed_from_u64(4);
        let bounds = Bounds::new(400.0, 300.0);
        let config = FieldConfig {
            pointer_strength: 2.0,
            exclusion_zone: Some(ZoneConfig {
                width: 200.0,
                height: 80.0,
                ..ZoneConfig::default()
            }),
            ..FieldConfig::default()
        };
        let f = ForceModel::from_config(&config, bounds);
        let mut set = ParticleSet::seed(40, bounds, RadiusRange::for_width(400.0), 0.25, &mut rng);
        let mut integrator = RigidBodyIntegrator::new(DT);
        integrator.reset(&set, bounds);

        for frame in 0..300 {
            let pointer = Some(Vec2::new((frame * 3 % 400) as f32, 150.0));
            integrator.step(&mut set, &f, pointer, bounds);
            for p in set.iter() {
                assert!(bounds.contains(p.position), "frame {}: {:?}", frame, p.position);
                assert!(
                    p.velocity.length() <= config.max_velocity + 1e-3,
                    "frame {}: |v| = {}",
                    frame,
                    p.velocity.length()
                );
            }
        }
    }

    #[test]
    fn step_rebuilds_when_store_changes_size() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut integrator = RigidBodyIntegrator::new(DT);
        let mut set = ParticleSet::from_particles(vec![Particle::new(Vec2::new(50.0, 50.0), Vec2::ZERO, 1.0); 3]);
        integrator.step(&mut set, &forces(), None, bounds);
        assert_eq!(integrator.world().body_count(), 7);
    }

    #[test]
    fn top_wall_is_optional() {
        let bounds = Bounds::new(200.0, 200.0);
        let mut set = ParticleSet::from_particles(vec![Particle::new(
            Vec2::new(100.0, 6.0),
            Vec2::new(0.0, -2.0),
            2.0,
        )]);
        let mut integrator = RigidBodyIntegrator::new(DT).with_top_wall(false);
        integrator.reset(&set, bounds);
        assert_eq!(integrator.wall_count(), 3);
        assert_eq!(integrator.world().body_count(), 4);

        let f = ForceModel { damping: 1.0, ..forces() };
        let mut bounced = false;
        for _ in 0..20 {
            integrator.step(&mut set, &f, None, bounds);
            let p = set.get(0).expect("particle");
            assert!(bounds.contains(p.position), "{:?}", p.position);
            bounced |= p.velocity.y > 0.0;
        }
        assert!(bounced, "the top edge still reflects without a wall");
    }

    #[test]
    fn exclusion_zone_clears_with_contacts() {
        use crate::api::config::{FieldConfig, ZoneConfig};

        let bounds = Bounds::new(800.0, 600.0);
        let config = FieldConfig {
            exclusion_zone: Some(ZoneConfig {
                repel_strength: 0.2,
                ..ZoneConfig::default()
            }),
            ..FieldConfig::default()
        };
        let f = ForceModel::from_config(&config, bounds);
        let zone = f.zone.expect("zone resolved");
        let mut rng = SmallRng::seed_from_u64(8);
        let mut set = ParticleSet::seed(80, bounds, RadiusRange::for_width(800.0), 0.25, &mut rng);
        let mut integrator = RigidBodyIntegrator::new(DT);
        integrator.reset(&set, bounds);

        let inside_fraction = |set: &ParticleSet| {
            set.iter().filter(|p| zone.core_contains(p.position)).count() as f32 / set.len() as f32
        };

        let mut early = 0.0;
        for _ in 0..30 {
            integrator.step(&mut set, &f, None, bounds);
            early += inside_fraction(&set);
        }
        early /= 30.0;

        for _ in 0..400 {
            integrator.step(&mut set, &f, None, bounds);
        }

        let mut late = 0.0;
        for _ in 0..200 {
            integrator.step(&mut set, &f, None, bounds);
            late += inside_fraction(&set);
        }
        late /= 200.0;

        assert!(late <= early, "late {} should not exceed early {}", late, early);
        assert!(late < 0.01, "zone should be (nearly) clear, got {}", late);
    }

    #[test]
    fn ten_balls_all_bounce_within_a_hundred_steps() {
        let mut rng = SmallRng::seed_from_u64(42);
        let bounds = Bounds::new(200.0, 200.0);
        let mut set = ParticleSet::seed(10, bounds, RadiusRange::for_width(200.0), 0.25, &mut rng);
        // Full speed towards the nearer side wall, each ball on its own row so
        // every sign flip comes from a wall.
        for (i, p) in set.iter_mut().enumerate() {
            p.position.y = 10.0 + 20.0 * i as f32;
            p.velocity = Vec2::new(if p.position.x < 100.0 { -2.0 } else { 2.0 }, 0.0);
        }
        let f = ForceModel { damping: 1.0, max_velocity: 2.0, ..forces() };
        let pointer = Some(Vec2::new(-1000.0, -1000.0));
        let initial: Vec<f32> = set.iter().map(|p| p.velocity.x.signum()).collect();
        let mut flipped = vec![false; set.len()];
        let mut integrator = RigidBodyIntegrator::new(DT);
        integrator.reset(&set, bounds);

        for step in 0..100 {
            integrator.step(&mut set, &f, pointer, bounds);
            for (i, p) in set.iter().enumerate() {
                if (p.velocity.x < 0.0 && initial[i] > 0.0) || (p.velocity.x > 0.0 && initial[i] < 0.0) {
                    flipped[i] = true;
                }
                assert!(bounds.contains(p.position), "step {}: {:?}", step, p.position);
                assert!(p.velocity.length() <= 2.0 + 1e-4);
            }
        }

        for (i, f) in flipped.iter().enumerate() {
            assert!(f, "ball {} never bounced", i);
        }
    }
}
