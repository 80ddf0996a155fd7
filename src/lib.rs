//! Shared types for the LED matrix simulator.
//!
//! This module provides the pieces everything else builds on:
//! - Matrix layout options with partial-override construction
//! - RGBA color and cell types
//! - Raw-frame decoding helpers
//! - Signal handling for clean shutdown in the standalone demos
//!
//! It also re-exports the matrix, surface, render, and server modules
//! used by the main binary (HTTP API server).

pub mod font;
pub mod matrix;
pub mod render;
pub mod server;
pub mod surface;
pub mod symbols;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Layout options ─────────────────────────────────────────────────

/// Grid and cell layout for the matrix.
///
/// `width`/`height` count LED cells; `pixel_width`/`pixel_height` are the
/// drawn size of one cell in surface pixels; `margin` is the gap between
/// cells. Start from [`MatrixOptions::default`] and override the fields you
/// care about:
///
/// ```
/// use led_sim::MatrixOptions;
///
/// let opts = MatrixOptions::default().grid(8, 8).glow(true);
/// assert_eq!(opts.margin, 4); // untouched fields keep their defaults
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixOptions {
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Drawn cell width in surface pixels
    pub pixel_width: u32,
    /// Drawn cell height in surface pixels
    pub pixel_height: u32,
    /// Gap between cells in surface pixels
    pub margin: u32,
    /// Draw a soft shadow around lit cells
    pub glow: bool,
}

impl MatrixOptions {
    /// Override the grid dimensions.
    pub fn grid(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Override the drawn cell size.
    pub fn pixel_size(mut self, width: u32, height: u32) -> Self {
        self.pixel_width = width;
        self.pixel_height = height;
        self
    }

    /// Override the inter-cell gap.
    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Enable or disable the glow effect.
    pub fn glow(mut self, glow: bool) -> Self {
        self.glow = glow;
        self
    }

    /// Total number of cells on the grid.
    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Backing surface width in pixels: every cell plus its margin.
    pub fn surface_width(&self) -> u32 {
        self.width * (self.pixel_width + self.margin)
    }

    /// Backing surface height in pixels.
    pub fn surface_height(&self) -> u32 {
        self.height * (self.pixel_height + self.margin)
    }

    /// Number of bytes in a raw RGBA frame (4 bytes per cell).
    pub fn frame_byte_count(&self) -> usize {
        self.cell_count() * 4
    }
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            width: 32,
            height: 16,
            pixel_width: 10,
            pixel_height: 10,
            margin: 4,
            glow: false,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// An RGBA color. Alpha is a full channel (0 = transparent, 255 = opaque)
/// so translucent paints survive the trip through the pixmap backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// A fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create an opaque color from a hue value (0-360), with full saturation
    /// and brightness. Useful for rainbow effects.
    pub fn from_hue(hue: u16) -> Self {
        let hue = hue % 360;
        let sector = hue / 60;
        let fraction = ((hue % 60) as f32) / 60.0;
        let rising = (fraction * 255.0) as u8;
        let falling = ((1.0 - fraction) * 255.0) as u8;

        match sector {
            0 => Self::opaque(255, rising, 0),  // Red → Yellow
            1 => Self::opaque(falling, 255, 0), // Yellow → Green
            2 => Self::opaque(0, 255, rising),  // Green → Cyan
            3 => Self::opaque(0, falling, 255), // Cyan → Blue
            4 => Self::opaque(rising, 0, 255),  // Blue → Magenta
            5 => Self::opaque(255, 0, falling), // Magenta → Red
            _ => Self::opaque(255, 0, 0),       // Unreachable, but match must be exhaustive
        }
    }
}

// ── Cells ──────────────────────────────────────────────────────────

/// One LED: lit or not, and its color when lit.
///
/// The color is only meaningful while `on` is true; the renderer paints a
/// fixed dim color for unlit cells regardless of what `color` holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub on: bool,
    pub color: Rgba,
}

impl Cell {
    /// A lit cell in the given color.
    pub const fn lit(color: Rgba) -> Self {
        Self { on: true, color }
    }

    /// An unlit cell.
    pub const fn off() -> Self {
        Self {
            on: false,
            color: Rgba::TRANSPARENT,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::off()
    }
}

/// Decode a raw RGBA frame (4 bytes per cell, row-major) into cells.
///
/// A cell is lit iff its alpha byte is nonzero. Trailing bytes that do not
/// form a full quad are ignored; length validation against the grid happens
/// where the frame meets the renderer.
pub fn cells_from_rgba(data: &[u8]) -> Vec<Cell> {
    data.chunks_exact(4)
        .map(|px| {
            if px[3] == 0 {
                Cell::off()
            } else {
                Cell::lit(Rgba::new(px[0], px[1], px[2], px[3]))
            }
        })
        .collect()
}

// ── Signal handling ────────────────────────────────────────────────

/// Set up a Ctrl+C handler that sets `running` to false.
///
/// Used by the standalone demos, which loop until interrupted. The HTTP
/// server binary doesn't need this; it lives until the process is killed.
pub fn setup_signal_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    running
}

/// Check if the main loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
