use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::api::config::{ConfigError, FieldConfig, Strategy};
use crate::api::host::Host;
use crate::api::types::{FrameHandle, HostEvent, ListenerHandle};
use crate::core::particle::{Bounds, ParticleSet};
use crate::core::time::FrameClock;
use crate::input::pointer::{InputAdapter, PointerState};
use crate::renderer::draw_list::DrawList;
use crate::systems::forces::ForceModel;
use crate::systems::integrator::{Integrator, KinematicIntegrator};
use crate::systems::render::render;

/// Whether a field currently owns host registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Stopped,
    Running,
}

/// Everything a running field has registered with its host.
/// Released as a unit by `stop`.
#[derive(Debug, Default)]
struct Registration {
    frame: Option<FrameHandle>,
    listeners: Vec<ListenerHandle>,
}

/// The simulation loop: owns the particle store and drives
/// integrate + render once per host frame.
///
/// The host calls back into the field through `on_frame`, `on_resize` and
/// `on_pointer_move`. Dropping the field stops it.
pub struct ParticleField<H: Host> {
    host: H,
    config: FieldConfig,
    registration: Option<Registration>,
    particles: ParticleSet,
    pointer: PointerState,
    forces: ForceModel,
    integrator: Box<dyn Integrator>,
    bounds: Bounds,
    clock: FrameClock,
    draw_list: DrawList,
    rng: SmallRng,
    frames_rendered: u64,
}

impl<H: Host> ParticleField<H> {
    /// A stopped field. `seed` drives particle placement; hosts pass a random one.
    pub fn new(host: H, seed: u64) -> Self {
        let config = FieldConfig::default();
        let bounds = Bounds::default();
        Self {
            host,
            forces: ForceModel::from_config(&config, bounds),
            clock: FrameClock::new(config.step_rate),
            config,
            registration: None,
            particles: ParticleSet::new(),
            pointer: PointerState::new(),
            integrator: Box::new(KinematicIntegrator::new()),
            bounds,
            draw_list: DrawList::new(),
            rng: SmallRng::seed_from_u64(seed),
            frames_rendered: 0,
        }
    }

    /// Validate `config`, seed the store and start the frame loop.
    ///
    /// A running field is stopped first, so calling this twice never leaves
    /// two loops behind. A rejected config changes nothing: a stopped field
    /// stays stopped and a running one keeps its current run.
    pub fn start(&mut self, config: FieldConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.stop();

        self.clock = FrameClock::new(config.step_rate);
        self.integrator = make_integrator(&config, self.clock.step());
        self.config = config;
        self.pointer.clear();
        self.frames_rendered = 0;
        self.reseed();

        let mut listeners = Vec::with_capacity(HostEvent::ALL.len());
        for event in HostEvent::ALL {
            match self.host.listen(event) {
                Some(handle) => listeners.push(handle),
                None => log::warn!("particle field: host refused {:?} listener", event),
            }
        }
        self.registration = Some(Registration {
            frame: None,
            listeners,
        });
        self.schedule();

        log::info!(
            "particle field: started {} particles in {}x{} ({} integrator)",
            self.particles.len(),
            self.bounds.width,
            self.bounds.height,
            self.integrator.name()
        );
        Ok(())
    }

    /// Release every host registration and drop the particles. Safe to call
    /// any number of times.
    pub fn stop(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };
        if let Some(frame) = registration.frame {
            self.host.cancel_frame(frame);
        }
        for listener in registration.listeners {
            self.host.unlisten(listener);
        }
        self.host.surface().clear(self.bounds.width, self.bounds.height);
        self.particles.clear();
        self.pointer.clear();
        self.draw_list.clear();
        log::info!("particle field: stopped after {} frames", self.frames_rendered);
    }

    /// Host frame callback. Runs the steps owed since the last frame, then
    /// draws one frame and schedules the next.
    ///
    /// Handles that are not the currently scheduled frame (cancelled or from
    /// a previous run) are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) {
        let Some(registration) = self.registration.as_mut() else {
            return;
        };
        if registration.frame != Some(handle) {
            log::debug!("particle field: ignoring stale frame {:?}", handle);
            return;
        }
        registration.frame = None;

        let steps = self.clock.advance(now_ms);
        let pointer = self.pointer.position();
        for _ in 0..steps {
            self.integrator
                .step(&mut self.particles, &self.forces, pointer, self.bounds);
        }

        render(
            &self.particles,
            &self.config.style,
            self.config.connection_distance,
            self.bounds,
            &mut self.draw_list,
        );
        self.draw_list.paint(self.host.surface());
        self.frames_rendered += 1;

        self.schedule();
    }

    /// Container resized: re-measure and reseed in place. Listeners stay
    /// registered; the pending frame is replaced so the old one can never run.
    /// Ignored when the config turns `reset_on_resize` off.
    pub fn on_resize(&mut self) {
        if !self.config.reset_on_resize {
            return;
        }
        let Some(registration) = self.registration.as_mut() else {
            return;
        };
        if let Some(frame) = registration.frame.take() {
            self.host.cancel_frame(frame);
        }
        self.reseed();
        self.schedule();
        log::debug!(
            "particle field: resized to {}x{}, reseeded {} particles",
            self.bounds.width,
            self.bounds.height,
            self.particles.len()
        );
    }

    /// Pointer moved. `client` and `container_origin` are in the same
    /// (viewport) coordinate space.
    pub fn on_pointer_move(&mut self, client: Vec2, container_origin: Vec2) {
        if self.is_running() {
            InputAdapter::pointer_moved(&mut self.pointer, client, container_origin);
        }
    }

    fn reseed(&mut self) {
        self.bounds = Bounds::from_size(self.host.container_size());
        self.host.surface().resize(self.bounds.width, self.bounds.height);
        self.particles = ParticleSet::seed(
            self.config.particle_count,
            self.bounds,
            self.config.radius_range(self.host.viewport_width()),
            self.config.initial_speed,
            &mut self.rng,
        );
        self.forces = ForceModel::from_config(&self.config, self.bounds);
        self.integrator.reset(&self.particles, self.bounds);
        self.clock.reset();
    }

    fn schedule(&mut self) {
        let Some(registration) = self.registration.as_mut() else {
            return;
        };
        registration.frame = self.host.request_frame();
        if registration.frame.is_none() {
            log::warn!("particle field: host refused a frame; animation halted");
        }
    }

    // ---- Accessors ----

    pub fn state(&self) -> FieldState {
        if self.registration.is_some() {
            FieldState::Running
        } else {
            FieldState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == FieldState::Running
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer.position()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Commands of the most recently rendered frame.
    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host> Drop for ParticleField<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn make_integrator(config: &FieldConfig, dt: f32) -> Box<dyn Integrator> {
    match config.strategy {
        Strategy::Kinematic => Box::new(KinematicIntegrator::new()),
        #[cfg(feature = "physics")]
        Strategy::RigidBody => Box::new(
            crate::core::physics::RigidBodyIntegrator::new(dt).with_top_wall(config.add_top_wall),
        ),
        #[cfg(not(feature = "physics"))]
        Strategy::RigidBody => {
            let _ = dt;
            log::warn!("particle field: built without `physics`; using the kinematic integrator");
            Box::new(KinematicIntegrator::new())
        }
    }
}
