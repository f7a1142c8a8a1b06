//! Drawing target contract.
//!
//! The browser bridge implements `Surface` on a canvas 2D context.
//! `RecordingSurface` keeps commands in memory for tests and headless hosts.

use glam::Vec2;

use crate::api::types::Rgba;
use crate::renderer::draw_list::DrawCommand;

/// A 2D surface the renderer paints onto.
pub trait Surface {
    /// Match the backing store to the container size.
    fn resize(&mut self, width: f32, height: f32);

    fn clear(&mut self, width: f32, height: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
}

/// Surface that records what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: Vec2,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands since the most recent clear, followed by that clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Total clears seen, i.e. frames painted.
    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    fn clear(&mut self, width: f32, height: f32) {
        self.commands.clear();
        self.clears += 1;
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }
}
