//! Initial circle population

use glam::Vec2;
use rand::Rng;

use super::circle::Circle;
use super::color::PALETTE;
use super::surface::Surface;
use crate::consts::*;

/// Number of circles for a surface: one per `AREA_PER_CIRCLE`, clamped
pub fn circle_count(surface: &Surface) -> usize {
    let by_area = (surface.width * surface.height / AREA_PER_CIRCLE).floor() as usize;
    by_area.clamp(MIN_CIRCLES, MAX_CIRCLES)
}

/// Seed the circle set for a freshly initialized surface.
///
/// The count stays fixed for the life of the surface; resizes only rescale.
pub fn generate<R: Rng + ?Sized>(surface: &Surface, rng: &mut R) -> Vec<Circle> {
    let count = circle_count(surface);
    let scale = surface.scale_factor;
    let max_speed = MAX_AXIS_SPEED * scale;

    (0..count)
        .map(|_| {
            let base_radius = rng.random_range(MIN_BASE_RADIUS..=MAX_BASE_RADIUS);
            let radius = base_radius * scale;
            let pos = Vec2::new(
                rng.random_range(radius..=surface.width - radius),
                rng.random_range(radius..=surface.height - radius),
            );
            // Axes drawn independently, then the diagonal trimmed to the bound
            let vel = Vec2::new(
                rng.random_range(-max_speed..=max_speed),
                rng.random_range(-max_speed..=max_speed),
            )
            .clamp_length_max(max_speed);
            let color = PALETTE[rng.random_range(0..PALETTE.len())];
            let opacity = rng.random_range(MIN_OPACITY..=MAX_OPACITY);
            Circle::new(pos, vel, base_radius, scale, color, opacity)
        })
        .collect()
}
