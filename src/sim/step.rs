//! Per-frame physics step
//!
//! Circles move in a straight line and bounce elastically off the container
//! walls. Only the sign of the component perpendicular to the wall changes;
//! speed is preserved.

use super::circle::Circle;
use super::surface::Surface;

/// Advance every circle by one frame and resolve wall collisions
pub fn step(circles: &mut [Circle], surface: &Surface) {
    for circle in circles.iter_mut() {
        circle.pos += circle.vel;
        let r = circle.radius;
        (circle.pos.x, circle.vel.x) = bounce_axis(circle.pos.x, circle.vel.x, r, surface.width);
        (circle.pos.y, circle.vel.y) = bounce_axis(circle.pos.y, circle.vel.y, r, surface.height);
    }
}

/// Resolve one axis against walls at `0` and `extent`.
///
/// Touching a wall sends the velocity component back into the container and
/// clamps the position so the circle is fully inside.
#[inline]
fn bounce_axis(pos: f32, vel: f32, radius: f32, extent: f32) -> (f32, f32) {
    let max = extent - radius;
    if pos <= radius {
        (pos.clamp(radius, max), vel.abs())
    } else if pos >= max {
        (pos.clamp(radius, max), -vel.abs())
    } else {
        (pos, vel)
    }
}
