use crate::api::config::RenderStyle;
use crate::core::particle::{Bounds, Particle, ParticleSet};
use crate::renderer::draw_list::{DrawCommand, DrawList};

/// Undirected link between two particles closer than the connection distance.
/// `a < b` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
}

/// All pairs closer than `max_distance`.
///
/// Plain O(n²) scan over unordered pairs. Fine for the tens of particles the
/// field runs with; a spatial grid would be the next step for thousands.
pub fn connections(particles: &[Particle], max_distance: f32) -> impl Iterator<Item = Connection> + '_ {
    let max_sq = max_distance * max_distance;
    (0..particles.len()).flat_map(move |a| {
        ((a + 1)..particles.len()).filter_map(move |b| {
            let d_sq = particles[a].position.distance_squared(particles[b].position);
            (d_sq < max_sq).then(|| Connection {
                a,
                b,
                distance: d_sq.sqrt(),
            })
        })
    })
}

/// Line alpha for a pair at `distance`: full at zero, fading linearly to zero at the cutoff.
pub fn line_alpha(style: &RenderStyle, distance: f32, max_distance: f32) -> f32 {
    if max_distance <= 0.0 {
        return 0.0;
    }
    (style.max_line_alpha * (1.0 - distance / max_distance)).max(0.0)
}

/// Build the full frame: clear, one circle per particle, then the connection lines.
pub fn render(
    particles: &ParticleSet,
    style: &RenderStyle,
    connection_distance: f32,
    bounds: Bounds,
    out: &mut DrawList,
) {
    out.clear();
    out.push(DrawCommand::Clear {
        width: bounds.width,
        height: bounds.height,
    });

    for p in particles.iter() {
        out.push(DrawCommand::Circle {
            center: p.position,
            radius: p.radius,
            color: style.particle_color,
        });
    }

    let slice = particles.as_slice();
    for link in connections(slice, connection_distance) {
        out.push(DrawCommand::Line {
            from: slice[link.a].position,
            to: slice[link.b].position,
            width: style.line_width,
            color: style
                .line_color
                .with_alpha(line_alpha(style, link.distance, connection_distance)),
        });
    }
}
