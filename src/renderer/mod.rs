//! Frame renderer and drawing backends
//!
//! `render` turns the circle set into layered disc draws on any `Canvas`.
//! Backends:
//! - `PixelCanvas`: software RGBA8 rasterizer (native, tests)
//! - `SdfCanvas`: WebGPU, all discs shaded in one fullscreen SDF pass

pub mod sdf_pipeline;
pub mod software;

pub use sdf_pipeline::SdfCanvas;
pub use software::PixelCanvas;

use std::fmt;

use glam::{UVec2, Vec2};

use crate::consts::*;
use crate::sim::{Circle, Rgba, Surface};

/// Drawing surface failures. Every variant is treated as "surface
/// unavailable" by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// No drawing context could be obtained
    Unavailable,
    /// Backing buffer would have no pixels
    ZeroSized,
    /// The surface was lost and must be reconfigured
    Lost,
    /// Backend-specific failure
    Backend(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::Unavailable => write!(f, "drawing surface unavailable"),
            SurfaceError::ZeroSized => write!(f, "drawing surface has zero size"),
            SurfaceError::Lost => write!(f, "drawing surface lost"),
            SurfaceError::Backend(msg) => write!(f, "drawing backend error: {}", msg),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// A color stop; `offset` is a fraction of the disc radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

/// How a disc is filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Centered on the disc, stops sorted by offset
    Radial([GradientStop; 3]),
}

impl Paint {
    /// Color at `t` = distance from center / radius
    pub fn sample(&self, t: f32) -> Rgba {
        match self {
            Paint::Solid(color) => *color,
            Paint::Radial(stops) => {
                if t <= stops[0].offset {
                    return stops[0].color;
                }
                for pair in stops.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if t <= b.offset {
                        let span = (b.offset - a.offset).max(f32::EPSILON);
                        return a.color.lerp(b.color, (t - a.offset) / span);
                    }
                }
                stops[2].color
            }
        }
    }
}

/// A drawing backend working in logical units
pub trait Canvas {
    /// Largest backing buffer size, per axis, this canvas accepts
    fn max_dimension(&self) -> u32 {
        u32::MAX
    }

    /// Size the backing buffer and set the logical-to-device scale
    fn configure(&mut self, backing: UVec2, device_scale: f32) -> Result<(), SurfaceError>;

    /// Clear a logical area starting at the origin to transparent
    fn clear(&mut self, size: Vec2);

    /// Composite a disc over what is already drawn
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);

    /// Finish the frame
    fn present(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Which optional layers to draw. The fill layer is always drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    pub glow: bool,
    pub highlight: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            glow: true,
            highlight: true,
        }
    }
}

/// Glow paint: base color at the center, dim at 70%, clear at the edge
fn glow_paint(color: Rgba, opacity: f32) -> Paint {
    Paint::Radial([
        GradientStop {
            offset: 0.0,
            color: color.fade(opacity),
        },
        GradientStop {
            offset: GLOW_MID_STOP,
            color: color.with_alpha(GLOW_MID_ALPHA).fade(opacity),
        },
        GradientStop {
            offset: 1.0,
            color: color.with_alpha(0.0),
        },
    ])
}

/// Paint one frame. Reads the circles, never mutates them.
pub fn render<C: Canvas>(surface: &Surface, circles: &[Circle], canvas: &mut C, layers: Layers) -> Result<(), SurfaceError> {
    canvas.clear(surface.size());

    for circle in circles {
        let r = circle.radius;
        let opacity = circle.opacity;

        // Fill -> glow -> highlight; later layers composite over earlier ones
        canvas.fill_circle(circle.pos, r, &Paint::Solid(circle.color.fade(opacity)));

        if layers.glow {
            let glow = glow_paint(circle.color, opacity);
            canvas.fill_circle(circle.pos, r * GLOW_RADIUS_SCALE, &glow);
        }

        if layers.highlight {
            let center = circle.pos - Vec2::splat(r * HIGHLIGHT_OFFSET);
            let color = circle.color.with_alpha(HIGHLIGHT_ALPHA).fade(opacity);
            canvas.fill_circle(center, r * HIGHLIGHT_RADIUS_SCALE, &Paint::Solid(color));
        }
    }

    canvas.present()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{PALETTE, SurfaceInfo};

    /// Records draw calls instead of rasterizing
    #[derive(Default)]
    struct RecordingCanvas {
        clears: Vec<Vec2>,
        discs: Vec<(Vec2, f32, Paint)>,
        presents: usize,
    }

    impl Canvas for RecordingCanvas {
        fn configure(&mut self, _backing: UVec2, _device_scale: f32) -> Result<(), SurfaceError> {
            Ok(())
        }

        fn clear(&mut self, size: Vec2) {
            self.clears.push(size);
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
            self.discs.push((center, radius, *paint));
        }

        fn present(&mut self) -> Result<(), SurfaceError> {
            self.presents += 1;
            Ok(())
        }
    }

    fn scene() -> (Surface, Vec<Circle>) {
        let surface = Surface::from_info(&SurfaceInfo::new(400.0, 300.0, 1.0)).unwrap();
        let circles = vec![
            Circle::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 20.0, 1.0, PALETTE[0], 0.2),
            Circle::new(Vec2::new(250.0, 150.0), Vec2::ZERO, 30.0, 1.0, PALETTE[3], 0.3),
        ];
        (surface, circles)
    }

    #[test]
    fn test_layers_in_fixed_order() {
        let (surface, circles) = scene();
        let mut canvas = RecordingCanvas::default();
        render(&surface, &circles, &mut canvas, Layers::default()).unwrap();

        assert_eq!(canvas.clears, vec![Vec2::new(400.0, 300.0)]);
        assert_eq!(canvas.discs.len(), 6);
        assert_eq!(canvas.presents, 1);

        let (fill_c, fill_r, fill_p) = canvas.discs[0];
        assert_eq!(fill_c, Vec2::new(100.0, 100.0));
        assert_eq!(fill_r, 20.0);
        assert!(matches!(fill_p, Paint::Solid(_)));

        let (glow_c, glow_r, glow_p) = canvas.discs[1];
        assert_eq!(glow_c, Vec2::new(100.0, 100.0));
        assert!((glow_r - 26.0).abs() < 1e-4);
        assert!(matches!(glow_p, Paint::Radial(_)));

        let (hl_c, hl_r, _) = canvas.discs[2];
        assert!((hl_c - Vec2::new(94.0, 94.0)).length() < 1e-4);
        assert!((hl_r - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_glow_gradient_stops() {
        let base = PALETTE[5];
        let Paint::Radial(stops) = glow_paint(base, 1.0) else {
            panic!("glow must be radial");
        };
        assert_eq!(stops[0].color, base);
        assert!((stops[1].offset - 0.7).abs() < 1e-6);
        assert!((stops[1].color.a - 0.1).abs() < 1e-6);
        assert_eq!(stops[2].color.a, 0.0);
        assert_eq!(stops[2].color.r, base.r);
    }

    #[test]
    fn test_glow_respects_opacity() {
        let Paint::Radial(stops) = glow_paint(Rgba::new(0.2, 0.4, 0.6, 0.3), 0.5) else {
            panic!("glow must be radial");
        };
        assert!((stops[0].color.a - 0.15).abs() < 1e-6);
        assert!((stops[1].color.a - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_layers_skip_draws() {
        let (surface, circles) = scene();
        let mut canvas = RecordingCanvas::default();
        let layers = Layers {
            glow: false,
            highlight: false,
        };
        render(&surface, &circles, &mut canvas, layers).unwrap();
        assert_eq!(canvas.discs.len(), 2);
    }

    #[test]
    fn test_render_does_not_mutate_circles() {
        let (surface, circles) = scene();
        let before = circles.clone();
        let mut canvas = RecordingCanvas::default();
        render(&surface, &circles, &mut canvas, Layers::default()).unwrap();
        assert_eq!(circles, before);
    }

    #[test]
    fn test_paint_sample_interpolates() {
        let paint = glow_paint(Rgba::new(1.0, 0.0, 0.0, 0.5), 1.0);
        assert_eq!(paint.sample(0.0).a, 0.5);
        assert!((paint.sample(0.35).a - 0.3).abs() < 1e-5);
        assert!((paint.sample(0.85).a - 0.05).abs() < 1e-5);
        assert_eq!(paint.sample(1.5).a, 0.0);
    }
}
