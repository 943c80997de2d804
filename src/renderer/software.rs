//! Software canvas: an RGBA8 backing buffer with source-over compositing

use glam::{UVec2, Vec2};

use super::{Canvas, Paint, SurfaceError};
use crate::sim::Rgba;

/// Largest backing buffer side (256 MiB of RGBA at the limit)
const MAX_DIMENSION: u32 = 8192;

/// RGBA8 (straight alpha) pixel buffer sized in device pixels.
///
/// Draw calls arrive in logical units and are scaled by `device_scale`.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    device_scale: f32,
}

impl Default for PixelCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelCanvas {
    /// Unconfigured (0x0) canvas
    pub fn new() -> Self {
        Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
            device_scale: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn device_scale(&self) -> f32 {
        self.device_scale
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at device coordinates; transparent when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = self.index(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Count of pixels with any coverage
    pub fn painted_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] > 0).count()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over blend of `src` (scaled by `coverage`) into one pixel
    #[inline]
    fn blend(&mut self, x: u32, y: u32, src: Rgba, coverage: f32) {
        let sa = (src.a * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        let dst = &mut self.pixels[i..i + 4];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let channel = |s: f32, d: u8| {
            let d = d as f32 / 255.0;
            ((s * sa + d * da * (1.0 - sa)) / out_a * 255.0).round().clamp(0.0, 255.0) as u8
        };
        dst[0] = channel(src.r, dst[0]);
        dst[1] = channel(src.g, dst[1]);
        dst[2] = channel(src.b, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }
}

impl Canvas for PixelCanvas {
    fn max_dimension(&self) -> u32 {
        MAX_DIMENSION
    }

    fn configure(&mut self, backing: UVec2, device_scale: f32) -> Result<(), SurfaceError> {
        if backing.x == 0 || backing.y == 0 {
            return Err(SurfaceError::ZeroSized);
        }
        if backing.x > MAX_DIMENSION || backing.y > MAX_DIMENSION {
            return Err(SurfaceError::Backend(format!(
                "{}x{} backing exceeds {} px",
                backing.x, backing.y, MAX_DIMENSION
            )));
        }
        if (backing.x, backing.y) != (self.width, self.height) {
            let len = (backing.x as usize)
                .checked_mul(backing.y as usize)
                .and_then(|n| n.checked_mul(4))
                .ok_or_else(|| SurfaceError::Backend(format!("{}x{} backing overflows", backing.x, backing.y)))?;
            self.width = backing.x;
            self.height = backing.y;
            self.pixels = vec![0; len];
        }
        self.device_scale = device_scale;
        Ok(())
    }

    fn clear(&mut self, size: Vec2) {
        let px = (size * self.device_scale).ceil();
        let w = (px.x.max(0.0) as u32).min(self.width) as usize;
        let h = (px.y.max(0.0) as u32).min(self.height) as usize;
        let stride = self.width as usize * 4;
        for row in self.pixels.chunks_exact_mut(stride).take(h) {
            row[..w * 4].fill(0);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if radius <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let c = center * self.device_scale;
        let r = radius * self.device_scale;

        // Bounding box with a one pixel fringe for the anti-aliased edge
        let x0 = (c.x - r - 1.0).floor().max(0.0) as u32;
        let y0 = (c.y - r - 1.0).floor().max(0.0) as u32;
        let x1 = ((c.x + r + 1.0).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((c.y + r + 1.0).ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = p.distance(c);
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let color = paint.sample(d / r);
                self.blend(x, y, color, coverage);
            }
        }
    }
}
