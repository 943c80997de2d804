//! Circle simulation
//!
//! Pure and deterministic given its inputs:
//! - Seeded RNG only (population)
//! - Fixed per-frame step (no wall-clock dependence)
//! - No platform dependencies; the surface manager only sees the `Canvas` trait

pub mod circle;
pub mod color;
pub mod population;
pub mod resize;
pub mod step;
pub mod surface;

pub use circle::Circle;
pub use color::{PALETTE, Rgba};
pub use population::{circle_count, generate};
pub use resize::rescale;
pub use step::step;
pub use surface::{Surface, SurfaceInfo, initialize_surface};
