//! # Pulsing Colors Example
//!
//! Fills the entire grid with color that smoothly cycles through the
//! rainbow while pulsing translucency up and down, writing each frame to
//! `pulsing.png`.
//!
//! ## Run it
//! ```sh
//! cargo run --example pulsing
//! ```

use led_sim::matrix::LedMatrix;
use led_sim::surface::PixmapSurface;
use led_sim::{Cell, MatrixOptions, Rgba, is_running, setup_signal_handler};
use std::path::Path;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = MatrixOptions::default().glow(true);
    let mut matrix = LedMatrix::new(PixmapSurface::new(0, 0), opts);
    let running = setup_signal_handler();
    let out = Path::new("pulsing.png");
    let mut frame: u32 = 0;

    while is_running(&running) {
        let hue = ((frame / 2) % 360) as u16;
        let base = Rgba::from_hue(hue);

        // Triangle wave alpha: 0 → 255 → 0 over 200 frames
        let cycle = frame % 200;
        let alpha = if cycle < 100 {
            cycle * 255 / 100
        } else {
            (200 - cycle) * 255 / 100
        };

        let color = Rgba::new(base.r, base.g, base.b, alpha as u8);
        let cells = vec![Cell::lit(color); opts.cell_count()];

        matrix.clear();
        matrix.draw(&cells)?;
        matrix.surface().save_png(out)?;

        frame = frame.wrapping_add(1);
        thread::sleep(Duration::from_millis(16));
    }

    println!("\nShutting down cleanly.");
    Ok(())
}
