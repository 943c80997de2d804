//! Structured circle colors
//!
//! Colors are kept as channels plus a base alpha so the renderer can derive
//! its glow and highlight variants with arithmetic instead of string edits.

use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA, channels in 0-1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and a float alpha
    pub const fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }

    /// Same hue, different alpha
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Multiply alpha (layer-wide opacity)
    #[inline]
    pub fn fade(self, opacity: f32) -> Self {
        self.with_alpha(self.a * opacity)
    }

    /// Component-wise linear interpolation
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Translucent palette the population generator draws from
pub const PALETTE: [Rgba; 12] = [
    Rgba::from_rgb8(99, 102, 241, 0.3),  // indigo
    Rgba::from_rgb8(139, 92, 246, 0.3),  // violet
    Rgba::from_rgb8(236, 72, 153, 0.3),  // pink
    Rgba::from_rgb8(59, 130, 246, 0.3),  // blue
    Rgba::from_rgb8(16, 185, 129, 0.3),  // emerald
    Rgba::from_rgb8(245, 158, 11, 0.3),  // amber
    Rgba::from_rgb8(239, 68, 68, 0.3),   // red
    Rgba::from_rgb8(6, 182, 212, 0.3),   // cyan
    Rgba::from_rgb8(168, 85, 247, 0.3),  // purple
    Rgba::from_rgb8(34, 197, 94, 0.3),   // green
    Rgba::from_rgb8(251, 146, 60, 0.3),  // orange
    Rgba::from_rgb8(20, 184, 166, 0.3),  // teal
];
