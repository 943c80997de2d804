//! Halo Field - decorative glowing circles behind a dashboard header
//!
//! Core modules:
//! - `sim`: Circle simulation (population, physics, resize rescaling)
//! - `renderer`: Frame renderer and drawing backends (software, WebGPU)
//! - `engine`: Lifecycle and frame/resize scheduling
//! - `platform`: Host implementations (virtual clock, browser)

pub mod engine;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{Engine, EngineState, FrameToken, Host, TimerToken};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    use std::time::Duration;

    /// Container size at which circles are drawn at their base radius
    pub const REFERENCE_SIZE: f32 = 400.0;

    /// Circle count bounds
    pub const MIN_CIRCLES: usize = 6;
    pub const MAX_CIRCLES: usize = 12;
    /// Container area (logical px²) per circle
    pub const AREA_PER_CIRCLE: f32 = 15000.0;

    /// Base radius range, at reference scale
    pub const MIN_BASE_RADIUS: f32 = 15.0;
    pub const MAX_BASE_RADIUS: f32 = 35.0;
    /// Initial speed bound, per axis and in magnitude (units/frame at reference scale)
    pub const MAX_AXIS_SPEED: f32 = 0.5;
    /// Speed floor applied when a resize settles
    pub const MIN_RESCALED_SPEED: f32 = 0.2;

    /// Opacity range
    pub const MIN_OPACITY: f32 = 0.15;
    pub const MAX_OPACITY: f32 = 0.35;

    /// Quiet period before a burst of resize notifications settles
    pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

    /// Glow layer
    pub const GLOW_RADIUS_SCALE: f32 = 1.3;
    pub const GLOW_MID_STOP: f32 = 0.7;
    pub const GLOW_MID_ALPHA: f32 = 0.1;

    /// Highlight layer (offset is toward the upper-left light source)
    pub const HIGHLIGHT_RADIUS_SCALE: f32 = 0.4;
    pub const HIGHLIGHT_OFFSET: f32 = 0.3;
    pub const HIGHLIGHT_ALPHA: f32 = 0.4;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(v: Vec2) -> (f32, f32) {
    (v.length(), v.y.atan2(v.x))
}
