pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::config::{
    recommended_particle_count, Attractor, AttractorConfig, BoundaryMode, ConfigError,
    Coordinate, ExclusionZone, FieldConfig, RenderStyle, Strategy, ZoneConfig,
};
pub use api::field::{FieldState, ParticleField};
pub use api::host::Host;
pub use api::types::{FrameHandle, HostEvent, ListenerHandle, Rgba};
pub use core::particle::{Bounds, Particle, ParticleSet, RadiusRange};
pub use core::time::FrameClock;
pub use input::pointer::{InputAdapter, PointerState};
pub use renderer::{DrawCommand, DrawList, RecordingSurface, Surface};
pub use systems::forces::ForceModel;
pub use systems::integrator::{Integrator, KinematicIntegrator};
pub use systems::render::{connections, render, Connection};

#[cfg(feature = "physics")]
pub use core::physics::{PhysicsWorld, RigidBodyIntegrator};
