//! Draw commands emitted by entities
//!
//! The simulation never touches a graphics API; each frame it fills a
//! [`DrawList`] the host composites in order.

use std::rc::Rc;

use glam::Vec2;

use crate::raster::Raster;

/// Compositing mode for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard source-over alpha blending
    #[default]
    Alpha,
    /// Additive ("lighter") blending for explosion glow
    Additive,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Blit a raster with its top-left at `pos + pivot`, rotated about `pivot`
    Image {
        raster: Rc<Raster>,
        pivot: Vec2,
        pos: Vec2,
        rotation: f32,
        alpha: f32,
        blend: BlendMode,
    },
    /// Filled circle
    Circle {
        center: Vec2,
        radius: f32,
        color: [u8; 3],
        blend: BlendMode,
    },
    /// Full-screen white flash (bomb)
    Flash { alpha: f32 },
}

/// Ordered draw commands for one frame
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain opaque blit at a top-left position (snapped to whole pixels)
    pub fn image(&mut self, raster: &Rc<Raster>, top_left: Vec2) {
        self.image_alpha(raster, top_left, 1.0);
    }

    pub fn image_alpha(&mut self, raster: &Rc<Raster>, top_left: Vec2, alpha: f32) {
        self.commands.push(DrawCommand::Image {
            raster: Rc::clone(raster),
            pivot: Vec2::ZERO,
            pos: top_left.round(),
            rotation: 0.0,
            alpha,
            blend: BlendMode::Alpha,
        });
    }

    /// Blit at `offset` from `pivot` after rotating the frame about `pivot`
    pub fn image_rotated(
        &mut self,
        raster: &Rc<Raster>,
        pivot: Vec2,
        offset: Vec2,
        rotation: f32,
        alpha: f32,
    ) {
        self.commands.push(DrawCommand::Image {
            raster: Rc::clone(raster),
            pivot,
            pos: offset.round(),
            rotation,
            alpha,
            blend: BlendMode::Alpha,
        });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [u8; 3], blend: BlendMode) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            blend,
        });
    }

    pub fn flash(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Flash { alpha });
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

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Hand the frame's commands to the host, leaving the list empty
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}
