//! # Symbol Gallery Example
//!
//! Cycles through every built-in symbol, each in a different hue, writing
//! the current one to `gallery.png`.
//!
//! ## Run it
//! ```sh
//! cargo run --example gallery
//! ```

use led_sim::matrix::LedMatrix;
use led_sim::surface::PixmapSurface;
use led_sim::{MatrixOptions, Rgba, is_running, setup_signal_handler, symbols};
use std::path::Path;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = MatrixOptions::default();
    let mut matrix = LedMatrix::new(PixmapSurface::new(0, 0), opts);
    let running = setup_signal_handler();
    let out = Path::new("gallery.png");

    let names = symbols::names();
    let mut hue: u16 = 0;

    'gallery: loop {
        for name in &names {
            if !is_running(&running) {
                break 'gallery;
            }

            let symbol = symbols::get(name).expect("name came from the table");
            let cells = symbol.render(Rgba::from_hue(hue), &opts);

            matrix.clear();
            matrix.draw(&cells)?;
            matrix.surface().save_png(out)?;

            hue = (hue + 47) % 360;
            thread::sleep(Duration::from_secs(1));
        }
    }

    println!("\nShutting down cleanly.");
    Ok(())
}
