//! Raster surface abstraction and the software pixmap backend.
//!
//! The renderer draws through the [`RasterSurface`] trait, so the
//! rasterization logic stays independent of any particular backend.
//! [`PixmapSurface`] is the in-memory implementation used by the render
//! thread, the demos, and the PNG snapshot endpoint.

use crate::Rgba;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

// ── Trait ──────────────────────────────────────────────────────────

/// A 2D surface that can be filled with rectangles of RGBA color.
///
/// Coordinates are in backing-store pixels, origin top-left. The displayed
/// size is bookkeeping for hosts that blit the surface at a different scale
/// than its backing resolution; it has no effect on drawing.
pub trait RasterSurface {
    /// Set the backing resolution. Resizing discards the surface contents.
    fn resize(&mut self, width: u32, height: u32);

    /// Set the size the surface is displayed at.
    fn set_display_size(&mut self, width: u32, height: u32);

    /// The size the surface is displayed at.
    fn display_size(&self) -> (u32, u32);

    /// Composite a filled rectangle over the surface. Out-of-bounds parts
    /// are clipped.
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Enable a shadow that subsequent fills cast around themselves.
    fn set_shadow(&mut self, blur: u32, color: Rgba);

    /// Disable the shadow.
    fn clear_shadow(&mut self);
}

// ── Pixmap backend ─────────────────────────────────────────────────

/// Software raster surface backed by an RGBA pixel buffer.
pub struct PixmapSurface {
    pixels: RgbaImage,
    display_size: (u32, u32),
    shadow: Option<(u32, Rgba)>,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            display_size: (width, height),
            shadow: None,
        }
    }

    /// Backing width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Backing height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Read a single pixel. Panics if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let px = self.pixels.get_pixel(x, y);
        Rgba::new(px[0], px[1], px[2], px[3])
    }

    /// Encode the surface contents as PNG bytes.
    pub fn snapshot_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Cursor::new(Vec::new());
        self.pixels.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// Write the surface contents to a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.pixels.save_with_format(path, ImageFormat::Png)
    }

    /// Source-over composite `src` onto one pixel (straight alpha storage,
    /// so channels are weighted by both alphas before renormalizing).
    fn blend(dst: &mut image::Rgba<u8>, src: Rgba) {
        match src.a {
            0 => {}
            255 => *dst = image::Rgba([src.r, src.g, src.b, 255]),
            _ => {
                let sa = src.a as u32;
                let inv = 255 - sa;
                let [dr, dg, db, da] = dst.0;
                let da = da as u32;
                let out_a = sa + da * inv / 255;
                if out_a == 0 {
                    *dst = image::Rgba([0, 0, 0, 0]);
                    return;
                }
                let over = |s: u8, d: u8| {
                    let num = s as u32 * sa + d as u32 * da * inv / 255;
                    ((num + out_a / 2) / out_a).min(255) as u8
                };
                *dst = image::Rgba([
                    over(src.r, dr),
                    over(src.g, dg),
                    over(src.b, db),
                    out_a as u8,
                ]);
            }
        }
    }

    /// Blend a clipped rectangle of `color` over the backing store.
    fn blend_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let x1 = x.saturating_add(width).min(self.pixels.width());
        let y1 = y.saturating_add(height).min(self.pixels.height());
        for py in y..y1 {
            for px in x..x1 {
                Self::blend(self.pixels.get_pixel_mut(px, py), color);
            }
        }
    }

    /// Paint a soft halo around a rectangle: the shadow color with alpha
    /// falling off linearly from the rect edge out to the blur radius.
    fn paint_halo(&mut self, x: u32, y: u32, width: u32, height: u32, blur: u32, color: Rgba) {
        if blur == 0 || color.a == 0 {
            return;
        }

        let x0 = x.saturating_sub(blur);
        let y0 = y.saturating_sub(blur);
        let x1 = x.saturating_add(width + blur).min(self.pixels.width());
        let y1 = y.saturating_add(height + blur).min(self.pixels.height());

        for py in y0..y1 {
            for px in x0..x1 {
                // Chebyshev distance from the rectangle; 0 inside it
                let dx = if px < x {
                    x - px
                } else if px >= x + width {
                    px - (x + width - 1)
                } else {
                    0
                };
                let dy = if py < y {
                    y - py
                } else if py >= y + height {
                    py - (y + height - 1)
                } else {
                    0
                };
                let dist = dx.max(dy);
                if dist == 0 || dist > blur {
                    continue;
                }

                let alpha = color.a as u32 * (blur + 1 - dist) / ((blur + 1) * 2);
                Self::blend(
                    self.pixels.get_pixel_mut(px, py),
                    Rgba::new(color.r, color.g, color.b, alpha as u8),
                );
            }
        }
    }
}

impl RasterSurface for PixmapSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
    }

    fn set_display_size(&mut self, width: u32, height: u32) {
        self.display_size = (width, height);
    }

    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some((blur, shadow_color)) = self.shadow {
            self.paint_halo(x, y, width, height, blur, shadow_color);
        }
        self.blend_rect(x, y, width, height, color);
    }

    fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = image::Rgba([0, 0, 0, 0]);
        }
    }

    fn set_shadow(&mut self, blur: u32, color: Rgba) {
        self.shadow = if blur == 0 {
            None
        } else {
            Some((blur, color))
        };
    }

    fn clear_shadow(&mut self) {
        self.shadow = None;
    }
}

// ── Tests ──────────────────────────────────────────────────────────
