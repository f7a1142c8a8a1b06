use glam::Vec2;

use crate::api::types::Rgba;
use crate::renderer::traits::Surface;

/// One drawing operation, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Wipe the whole surface.
    Clear { width: f32, height: f32 },
    /// Filled circle.
    Circle { center: Vec2, radius: f32, color: Rgba },
    /// Stroked segment.
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba },
}

/// Commands for one frame, replayed onto a `Surface` in order.
/// Rebuilt from scratch every frame; the allocation is reused.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(512),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    /// Replay every command onto `surface`.
    pub fn paint(&self, surface: &mut dyn Surface) {
        for command in &self.commands {
            match *command {
                DrawCommand::Clear { width, height } => surface.clear(width, height),
                DrawCommand::Circle { center, radius, color } => {
                    surface.fill_circle(center, radius, color)
                }
                DrawCommand::Line { from, to, width, color } => {
                    surface.stroke_line(from, to, width, color)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::traits::RecordingSurface;

    #[test]
    fn paint_replays_in_order() {
        let mut list = DrawList::new();
        list.push(DrawCommand::Clear { width: 10.0, height: 10.0 });
        list.push(DrawCommand::Circle {
            center: Vec2::new(1.0, 2.0),
            radius: 1.5,
            color: Rgba::white(0.5),
        });
        list.push(DrawCommand::Line {
            from: Vec2::ZERO,
            to: Vec2::ONE,
            width: 0.5,
            color: Rgba::white(0.1),
        });

        let mut surface = RecordingSurface::new();
        list.paint(&mut surface);
        assert_eq!(surface.commands(), list.commands());
        assert_eq!(list.circle_count(), 1);
        assert_eq!(list.line_count(), 1);
    }
}
