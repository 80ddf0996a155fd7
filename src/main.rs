//! LED Matrix Simulator HTTP Server
//!
//! Runs a web server that accepts commands to drive a simulated LED matrix.
//! Any client can render text, show symbols, push raw frames, and fetch a
//! PNG snapshot of the result via simple HTTP requests.
//!
//! ## Architecture
//! - **Render thread** (std::thread): owns the matrix and its surface,
//!   processes commands
//! - **HTTP server** (tokio/axum): accepts API requests, sends commands via
//!   channel
//!
//! ## Usage
//! ```sh
//! ./target/release/led-sim --port 8080 --width 32 --height 16
//! ```

use clap::Parser;
use led_sim::MatrixOptions;
use led_sim::render::{DisplayStatus, render_loop};
use led_sim::server::{self, AppState};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// LED Matrix Simulator HTTP Server
#[derive(Parser)]
#[command(name = "led-sim")]
#[command(about = "HTTP server driving a simulated RGB LED matrix")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Grid width in cells
    #[arg(long, default_value = "32")]
    width: u32,

    /// Grid height in cells
    #[arg(long, default_value = "16")]
    height: u32,

    /// Drawn cell width in surface pixels
    #[arg(long, default_value = "10")]
    pixel_width: u32,

    /// Drawn cell height in surface pixels
    #[arg(long, default_value = "10")]
    pixel_height: u32,

    /// Gap between cells in surface pixels
    #[arg(long, default_value = "4")]
    margin: u32,

    /// Enable the glow effect
    #[arg(long)]
    glow: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing subscriber for request logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let opts = MatrixOptions::default()
        .grid(args.width, args.height)
        .pixel_size(args.pixel_width, args.pixel_height)
        .margin(args.margin)
        .glow(args.glow);

    tracing::info!("LED Matrix Simulator v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Grid: {}x{} cells", opts.width, opts.height);
    tracing::info!(
        "Surface: {}x{} px (displayed {}x{})",
        opts.surface_width(),
        opts.surface_height(),
        opts.surface_width() / 2,
        opts.surface_height() / 2
    );
    tracing::info!("Port: {}", args.port);

    // Channel for sending commands to the render thread.
    let (tx, rx) = mpsc::channel();

    // Shared state — render thread writes, HTTP handlers read.
    let status = Arc::new(Mutex::new(DisplayStatus::new(&opts)));
    let snapshot = Arc::new(Mutex::new(Vec::new()));

    // Spawn the render thread.
    let render_status = status.clone();
    let render_snapshot = snapshot.clone();
    let render_handle = std::thread::spawn(move || {
        render_loop(rx, render_status, render_snapshot, opts);
    });

    // Build the HTTP server
    let app_state = AppState {
        command_tx: tx,
        status,
        snapshot,
    };

    let app = server::create_router(app_state);

    // Start listening
    let addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("API Documentation: http://localhost:{}/docs", args.port);
    tracing::info!("Try: curl http://localhost:{}/api/v1/status", args.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    // Run the server — this blocks until the process is killed
    axum::serve(listener, app).await.expect("Server error");

    drop(render_handle);
}
