use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::Rgba;
use crate::core::particle::{Bounds, RadiusRange};

/// Rejected configuration. The only error the crate surfaces.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("particle count must be greater than zero")]
    ZeroParticles,
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("damping must be in (0, 1] (got {0})")]
    Damping(f32),
    #[error("exclusion zone repel strength must be >= 0 (got {0})")]
    NegativeRepel(f32),
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be an alpha in [0, 1] (got {value})")]
    Alpha { field: &'static str, value: f32 },
}

/// How particles interact with the container edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryMode {
    /// Flip the velocity component and clamp the position back inside.
    #[default]
    Reflect,
}

/// Which integrator advances the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    /// Explicit Euler with velocity-sign reflection.
    Kinematic,
    /// Rapier-backed rigid bodies with static walls (requires the `physics` feature).
    RigidBody,
}

impl Default for Strategy {
    fn default() -> Self {
        if cfg!(feature = "physics") {
            Strategy::RigidBody
        } else {
            Strategy::Kinematic
        }
    }
}

/// Rectangular no-go region as configured by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneConfig {
    /// Centre in container coordinates. `None` keeps the zone centred in the container.
    pub center: Option<[f32; 2]>,
    /// Full width of the protected rectangle.
    pub width: f32,
    /// Full height of the protected rectangle.
    pub height: f32,
    pub repel_strength: f32,
    /// Extra influence band around the rectangle.
    pub margin: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            center: None,
            width: 400.0,
            height: 150.0,
            repel_strength: 0.15,
            margin: 50.0,
        }
    }
}

impl ZoneConfig {
    /// Resolve against the current container.
    pub fn resolve(&self, bounds: Bounds) -> ExclusionZone {
        let center = self
            .center
            .map(|[x, y]| Vec2::new(x, y))
            .unwrap_or_else(|| bounds.center());
        ExclusionZone {
            center,
            half_width: self.width * 0.5,
            half_height: self.height * 0.5,
            repel_strength: self.repel_strength,
            margin: self.margin,
        }
    }
}

/// A resolved exclusion zone in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionZone {
    pub center: Vec2,
    pub half_width: f32,
    pub half_height: f32,
    pub repel_strength: f32,
    pub margin: f32,
}

impl ExclusionZone {
    /// Strictly inside the visible rectangle (margin excluded).
    pub fn core_contains(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        d.x < self.half_width && d.y < self.half_height
    }

    /// Strictly inside the rectangle widened by the margin.
    pub fn influence_contains(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        d.x < self.half_width + self.margin && d.y < self.half_height + self.margin
    }
}

/// One axis of a position given either in container units or as a percentage
/// of the container extent. JSON accepts `120`, `"120"` or `"50%"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub enum Coordinate {
    Units(f32),
    Percent(f32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f32),
    Text(String),
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = String;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        match raw {
            RawCoordinate::Number(v) => Ok(Coordinate::Units(v)),
            RawCoordinate::Text(text) => {
                let text = text.trim();
                let (digits, percent) = match text.strip_suffix('%') {
                    Some(digits) => (digits, true),
                    None => (text, false),
                };
                let value: f32 = digits
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid coordinate {:?}", text))?;
                Ok(if percent {
                    Coordinate::Percent(value)
                } else {
                    Coordinate::Units(value)
                })
            }
        }
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        match c {
            Coordinate::Units(v) => RawCoordinate::Number(v),
            Coordinate::Percent(p) => RawCoordinate::Text(format!("{}%", p)),
        }
    }
}

impl Coordinate {
    /// Position along an axis of length `extent`.
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Coordinate::Units(v) => v,
            Coordinate::Percent(p) => p / 100.0 * extent,
        }
    }

    fn value(self) -> f32 {
        match self {
            Coordinate::Units(v) | Coordinate::Percent(v) => v,
        }
    }
}

/// Static point every particle is pulled towards, proportionally to its distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttractorConfig {
    pub x: Coordinate,
    pub y: Coordinate,
    /// Pull per unit of distance per step. Zero disables the attractor.
    pub strength: f32,
}

impl Default for AttractorConfig {
    fn default() -> Self {
        Self {
            x: Coordinate::Percent(50.0),
            y: Coordinate::Percent(50.0),
            strength: 0.0,
        }
    }
}

impl AttractorConfig {
    /// Resolve against the current container.
    pub fn resolve(&self, bounds: Bounds) -> Attractor {
        Attractor {
            point: Vec2::new(self.x.resolve(bounds.width), self.y.resolve(bounds.height)),
            strength: self.strength,
        }
    }
}

/// A resolved attractor in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    pub point: Vec2,
    pub strength: f32,
}

/// Render styling for particles and connection lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderStyle {
    pub particle_color: Rgba,
    /// Line colour; alpha is replaced per line by the distance falloff.
    pub line_color: Rgba,
    /// Alpha of a line between two coincident particles.
    pub max_line_alpha: f32,
    pub line_width: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            particle_color: Rgba::white(0.5),
            line_color: Rgba::white(1.0),
            max_line_alpha: 0.2,
            line_width: 0.5,
        }
    }
}

/// Simulation configuration. Immutable for the lifetime of a run;
/// changing it means stop + start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    pub particle_count: usize,
    pub pointer_field_radius: f32,
    /// Positive attracts towards the pointer, negative repels.
    pub pointer_strength: f32,
    pub connection_distance: f32,
    /// Speed cap in container units per step.
    pub max_velocity: f32,
    /// Per-step velocity multiplier.
    pub damping: f32,
    /// Seed velocity components are drawn from `[-initial_speed, initial_speed]`.
    pub initial_speed: f32,
    /// Fixed simulation steps per second.
    pub step_rate: f32,
    pub boundary_mode: BoundaryMode,
    pub strategy: Strategy,
    pub exclusion_zone: Option<ZoneConfig>,
    pub attractor: Option<AttractorConfig>,
    /// Rigid-body strategy only: add a static wall along the top edge.
    /// Without it the top edge is a plain reflecting boundary.
    pub add_top_wall: bool,
    /// Reseed when the container resizes. When false, resizes are ignored.
    pub reset_on_resize: bool,
    pub style: RenderStyle,
    /// Overrides the radius range derived from the container width.
    pub radius: Option<RadiusRange>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 80,
            pointer_field_radius: 150.0,
            pointer_strength: -0.5,
            connection_distance: 100.0,
            max_velocity: 2.0,
            damping: 0.99,
            initial_speed: 0.25,
            step_rate: 60.0,
            boundary_mode: BoundaryMode::Reflect,
            strategy: Strategy::default(),
            exclusion_zone: None,
            attractor: None,
            add_top_wall: true,
            reset_on_resize: true,
            style: RenderStyle::default(),
            radius: None,
        }
    }
}

impl FieldConfig {
    /// Parse and validate a camelCase JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FieldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        positive("pointerFieldRadius", self.pointer_field_radius)?;
        finite("pointerStrength", self.pointer_strength)?;
        positive("connectionDistance", self.connection_distance)?;
        positive("maxVelocity", self.max_velocity)?;
        positive("stepRate", self.step_rate)?;
        finite("initialSpeed", self.initial_speed)?;
        finite("damping", self.damping)?;
        if self.damping <= 0.0 || self.damping > 1.0 {
            return Err(ConfigError::Damping(self.damping));
        }
        if let Some(zone) = &self.exclusion_zone {
            positive("exclusionZone.width", zone.width)?;
            positive("exclusionZone.height", zone.height)?;
            non_negative("exclusionZone.margin", zone.margin)?;
            finite("exclusionZone.repelStrength", zone.repel_strength)?;
            if zone.repel_strength < 0.0 {
                return Err(ConfigError::NegativeRepel(zone.repel_strength));
            }
            if let Some([x, y]) = zone.center {
                finite("exclusionZone.center", x)?;
                finite("exclusionZone.center", y)?;
            }
        }
        if let Some(radius) = &self.radius {
            positive("radius.min", radius.min)?;
            positive("radius.max", radius.max)?;
            if radius.max < radius.min {
                return Err(ConfigError::NonPositive {
                    field: "radius.max - radius.min",
                    value: radius.max - radius.min,
                });
            }
        }
        if let Some(attractor) = &self.attractor {
            finite("attractor.x", attractor.x.value())?;
            finite("attractor.y", attractor.y.value())?;
            non_negative("attractor.strength", attractor.strength)?;
        }
        alpha("style.particleColor.a", self.style.particle_color.a)?;
        alpha("style.lineColor.a", self.style.line_color.a)?;
        alpha("style.maxLineAlpha", self.style.max_line_alpha)?;
        finite("style.lineWidth", self.style.line_width)?;
        Ok(())
    }

    /// Radius range for a container of the given width.
    pub fn radius_range(&self, width: f32) -> RadiusRange {
        self.radius.unwrap_or_else(|| RadiusRange::for_width(width))
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn alpha(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Alpha { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Particle count the login pages use for a viewport width
/// (fewer particles on phones and tablets). Hosts pick this before `start`.
pub fn recommended_particle_count(viewport_width: f32) -> usize {
    if viewport_width < 600.0 {
        40
    } else if viewport_width < 900.0 {
        60
    } else {
        80
    }
}
