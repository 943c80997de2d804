//! Circle entity

use glam::Vec2;

use super::color::Rgba;
use crate::cartesian_to_polar;

/// A single glowing circle.
///
/// `radius` always equals `base_radius * scale_factor` of the surface it was
/// last sized for. `base_radius` is the radius at reference scale and is
/// never modified after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    /// Center, logical units
    pub pos: Vec2,
    /// Units per frame
    pub vel: Vec2,
    pub radius: f32,
    base_radius: f32,
    pub color: Rgba,
    /// Layer-wide alpha multiplier, 0.15-0.35
    pub opacity: f32,
}

impl Circle {
    pub fn new(pos: Vec2, vel: Vec2, base_radius: f32, scale_factor: f32, color: Rgba, opacity: f32) -> Self {
        Self {
            pos,
            vel,
            radius: base_radius * scale_factor,
            base_radius,
            color,
            opacity,
        }
    }

    #[inline]
    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Direction of travel, radians (`atan2(dy, dx)`)
    #[inline]
    pub fn heading(&self) -> f32 {
        cartesian_to_polar(self.vel).1
    }

    /// Whether the circle lies fully inside a `size` container
    pub fn is_contained(&self, size: Vec2) -> bool {
        let r = self.radius;
        self.pos.x >= r && self.pos.x <= size.x - r && self.pos.y >= r && self.pos.y <= size.y - r
    }
}
