//! Surface state: logical container size, device scale and scale factor

use glam::{UVec2, Vec2};

use crate::consts::REFERENCE_SIZE;
use crate::renderer::Canvas;

/// What the host reports about its container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    /// Logical container width
    pub width: f32,
    /// Logical container height
    pub height: f32,
    /// Physical pixels per logical unit
    pub device_pixel_ratio: f32,
}

impl SurfaceInfo {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Cap the device pixel ratio (quality presets limit backing size)
    pub fn with_max_device_scale(mut self, max: f32) -> Self {
        if self.device_pixel_ratio > max {
            self.device_pixel_ratio = max;
        }
        self
    }
}

/// Surface geometry shared by physics, rendering and rescaling.
///
/// Replaced wholesale on every resize settle, so `scale_factor` is always
/// derived from the current size and never accumulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
    pub device_scale: f32,
    pub scale_factor: f32,
}

impl Surface {
    /// Validate container geometry. Returns `None` for degenerate containers
    /// and for backings too large to address in `u32` pixels.
    pub fn from_info(info: &SurfaceInfo) -> Option<Self> {
        let SurfaceInfo {
            width,
            height,
            device_pixel_ratio,
        } = *info;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return None;
        }
        let device_scale = if device_pixel_ratio.is_finite() && device_pixel_ratio >= 1.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let max_px = u32::MAX as f32;
        if width * device_scale > max_px || height * device_scale > max_px {
            log::debug!(
                "Backing for {}x{} @{}x is not addressable",
                width,
                height,
                device_scale
            );
            return None;
        }
        Some(Self {
            width,
            height,
            device_scale,
            scale_factor: width.min(height) / REFERENCE_SIZE,
        })
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Lower the device scale until the backing fits `max_dimension` pixels
    /// per axis, but never below one pixel per logical unit. `None` when
    /// the logical size alone is too large.
    pub fn fit_backing(mut self, max_dimension: u32) -> Option<Self> {
        let limit = max_dimension as f32;
        let largest = self.width.max(self.height);
        if largest.round() > limit {
            return None;
        }
        if (largest * self.device_scale).round() > limit {
            self.device_scale = (limit / largest).max(1.0);
        }
        Some(self)
    }

    /// Backing buffer size in physical pixels (at least 1x1)
    pub fn backing_size(&self) -> UVec2 {
        let px = (self.size() * self.device_scale).round();
        UVec2::new((px.x as u32).max(1), (px.y as u32).max(1))
    }
}

/// Surface manager entry point.
///
/// Sizes the canvas backing buffer and installs the logical-to-device
/// transform. Returns `None` when the container or canvas is unavailable;
/// callers stay idle in that case.
pub fn initialize_surface<C: Canvas>(canvas: Option<&mut C>, info: &SurfaceInfo) -> Option<Surface> {
    let Some(canvas) = canvas else {
        log::debug!("No drawing surface; staying idle");
        return None;
    };
    let Some(surface) = Surface::from_info(info) else {
        log::debug!(
            "Container unavailable ({}x{}); staying idle",
            info.width,
            info.height
        );
        return None;
    };
    let Some(surface) = surface.fit_backing(canvas.max_dimension()) else {
        log::debug!(
            "Container {}x{} exceeds the canvas limit of {} px; staying idle",
            info.width,
            info.height,
            canvas.max_dimension()
        );
        return None;
    };
    if let Err(e) = canvas.configure(surface.backing_size(), surface.device_scale) {
        log::debug!("Canvas configure failed: {}", e);
        return None;
    }
    Some(surface)
}
