//! Off-screen pixel surface.
//!
//! A software ARGB buffer the compositor paints into. The surface is kept
//! at least as large as the visible pixel area and at most four times it
//! in either dimension; growth doubles the allocation and preserves prior
//! content at the origin, amortizing reallocation across live resizes.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// A pixel-space size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        PixelSize { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A pixel-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Maximum allocated-to-visible ratio before the surface is shrunk.
const MAX_OVERALLOCATION: u32 = 4;

/// A persistent software pixel buffer (one `u32` ARGB value per pixel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl Surface {
    /// Allocate a surface of exactly the given size, filled with opaque black.
    pub fn new(size: PixelSize) -> Self {
        Surface {
            pixels: vec![0xFF00_0000; (size.width as usize) * (size.height as usize)],
            width: size.width,
            height: size.height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Raw pixel data, row-major, `width` pixels per row.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Read one pixel. Out-of-bounds reads return `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Whether an allocation of this size satisfies the sizing policy for
    /// a `visible` pixel area: at least 1x and at most 4x in each dimension.
    pub fn fits_policy(&self, visible: PixelSize) -> bool {
        self.width >= visible.width
            && self.height >= visible.height
            && self.width <= visible.width.saturating_mul(MAX_OVERALLOCATION)
            && self.height <= visible.height.saturating_mul(MAX_OVERALLOCATION)
    }

    /// Grow to cover `visible`, doubling each undersized dimension until it
    /// fits. Prior content is preserved at the origin.
    pub fn grow_to(&mut self, visible: PixelSize) {
        debug_assert!(visible.width > self.width || visible.height > self.height);
        let mut new_width = self.width.max(1);
        while new_width < visible.width {
            new_width *= 2;
        }
        let mut new_height = self.height.max(1);
        while new_height < visible.height {
            new_height *= 2;
        }

        log::debug!(
            "surface grow {}x{} -> {}x{}",
            self.width,
            self.height,
            new_width,
            new_height
        );

        let mut grown = Surface::new(PixelSize::new(new_width, new_height));
        for y in 0..self.height {
            let src_start = (y * self.width) as usize;
            let dst_start = (y * new_width) as usize;
            let row = self.width as usize;
            grown.pixels[dst_start..dst_start + row]
                .copy_from_slice(&self.pixels[src_start..src_start + row]);
        }
        *self = grown;
    }

    /// Fill a rectangle. Pixels outside the surface are skipped.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        let pixel = color.to_pixel();
        for dy in 0..rect.height as i32 {
            let py = rect.y + dy;
            if py < 0 || py >= self.height as i32 {
                continue;
            }
            for dx in 0..rect.width as i32 {
                let px = rect.x + dx;
                if px < 0 || px >= self.width as i32 {
                    continue;
                }
                let idx = (py as u32 * self.width + px as u32) as usize;
                self.pixels[idx] = pixel;
            }
        }
    }

    /// Draw a one-pixel line between two points (Bresenham). Pixels outside
    /// the surface are skipped.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
        let pixel = color.to_pixel();
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                let idx = (y as u32 * self.width + x as u32) as usize;
                self.pixels[idx] = pixel;
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}
