//! Responsive rescaling when the container settles at a new size

use super::circle::Circle;
use super::surface::Surface;
use crate::consts::MIN_RESCALED_SPEED;
use crate::polar_to_cartesian;

/// Rescale every circle from `old` to `new` surface geometry.
///
/// Radius is recomputed from the immutable base radius, so repeated resizes
/// never compound. Speed scales with the scale-factor ratio (floored at
/// `MIN_RESCALED_SPEED`) and keeps its heading. Positions are clamped so each
/// circle ends fully inside the new container. Circles are never added or
/// removed.
pub fn rescale(circles: &mut [Circle], old: &Surface, new: &Surface) {
    let ratio = new.scale_factor / old.scale_factor;

    for circle in circles.iter_mut() {
        circle.radius = circle.base_radius() * new.scale_factor;

        let speed = (circle.speed() * ratio).max(MIN_RESCALED_SPEED);
        circle.vel = polar_to_cartesian(speed, circle.heading());

        let r = circle.radius;
        circle.pos.x = circle.pos.x.clamp(r, new.width - r);
        circle.pos.y = circle.pos.y.clamp(r, new.height - r);
    }
}
