//! # Marquee Example
//!
//! Marches a line of text across the grid one column per frame, writing
//! each frame to `marquee.png` so you can watch it with any auto-reloading
//! image viewer.
//!
//! ## Run it
//! ```sh
//! cargo run --example marquee
//! ```

use led_sim::matrix::LedMatrix;
use led_sim::surface::PixmapSurface;
use led_sim::{MatrixOptions, Rgba, font, is_running, setup_signal_handler};
use std::path::Path;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Setup ──────────────────────────────────────────────────────
    let opts = MatrixOptions::default();
    let mut matrix = LedMatrix::new(PixmapSurface::new(0, 0), opts);
    let running = setup_signal_handler();

    let text = "HELLO WORLD";
    let span = font::text_width(text) as i32;
    let out = Path::new("marquee.png");

    let mut offset = opts.width as i32;
    let mut frame: u32 = 0;

    // ── Main loop ──────────────────────────────────────────────────
    while is_running(&running) {
        let hue = ((frame * 3) % 360) as u16;
        let cells = font::render_text_at(text, Rgba::from_hue(hue), &opts, offset);

        matrix.clear();
        matrix.draw(&cells)?;
        matrix.surface().save_png(out)?;

        // off the left edge: wrap back around to the right
        offset -= 1;
        if offset < -span {
            offset = opts.width as i32;
        }

        frame = frame.wrapping_add(1);
        thread::sleep(Duration::from_millis(80));
    }

    println!("\nShutting down cleanly.");
    Ok(())
}
