//! Render thread: owns the simulated matrix and processes commands.
//!
//! The renderer and its surface are single-threaded by design, so all
//! drawing happens on one dedicated thread. The async HTTP server
//! communicates with it by sending [`RenderCommand`] values through an
//! `mpsc` channel and reads results back through two shared handles: the
//! [`DisplayStatus`] and the PNG snapshot buffer, each behind `Arc<Mutex>`.

use crate::matrix::LedMatrix;
use crate::surface::PixmapSurface;
use crate::{MatrixOptions, Rgba, cells_from_rgba, font, symbols};
use serde::Serialize;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

// ── Commands ─────────────────────────────────────────────────────────

/// Commands sent from the HTTP server to the render thread.
pub enum RenderCommand {
    /// Render a line of text with the built-in font
    ShowText { text: String, color: Rgba },
    /// Render a named symbol from the built-in table
    ShowSymbol { name: String, color: Rgba },
    /// Display a raw RGBA frame (width*height*4 bytes)
    ShowFrame(Vec<u8>),
    /// Erase the surface and go idle
    Clear,
    /// Change the grid dimensions (other layout options are kept)
    SetDimensions { width: u32, height: u32 },
    /// Toggle the glow effect for subsequent frames
    SetGlow(bool),
}

// ── Status ───────────────────────────────────────────────────────────

/// What the display is currently showing.
#[derive(Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Idle,
    ShowingText,
    ShowingSymbol,
    Streaming,
}

/// Shared status that the HTTP server reads to report current state.
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct DisplayStatus {
    /// Current display state
    pub state: DisplayState,
    /// Currently displayed content (text or symbol name, if any)
    pub content: Option<String>,
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Whether the glow effect is on
    pub glow: bool,
    /// Server version
    pub version: String,
}

impl DisplayStatus {
    pub fn new(opts: &MatrixOptions) -> Self {
        Self {
            state: DisplayState::Idle,
            content: None,
            width: opts.width,
            height: opts.height,
            glow: opts.glow,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn set_idle(&mut self) {
        self.state = DisplayState::Idle;
        self.content = None;
    }
}

// ── Command execution ────────────────────────────────────────────────

/// Execute one command against the matrix, updating shared status.
///
/// Failures (an undersized frame, a name that vanished between the HTTP
/// check and here) are logged and leave the previous surface contents
/// intact.
pub fn execute(
    matrix: &mut LedMatrix<PixmapSurface>,
    cmd: RenderCommand,
    status: &Mutex<DisplayStatus>,
) {
    match cmd {
        RenderCommand::ShowText { text, color } => {
            let cells = font::render_text(&text, color, matrix.opts());
            matrix.clear();
            if let Err(e) = matrix.draw(&cells) {
                tracing::error!("Failed to draw text: {}", e);
                return;
            }
            let mut s = status.lock().unwrap();
            s.state = DisplayState::ShowingText;
            s.content = Some(text);
        }

        RenderCommand::ShowSymbol { name, color } => {
            let Some(symbol) = symbols::get(&name) else {
                tracing::warn!("Unknown symbol: {}", name);
                return;
            };
            let cells = symbol.render(color, matrix.opts());
            matrix.clear();
            if let Err(e) = matrix.draw(&cells) {
                tracing::error!("Failed to draw symbol {}: {}", name, e);
                return;
            }
            let mut s = status.lock().unwrap();
            s.state = DisplayState::ShowingSymbol;
            s.content = Some(name);
        }

        RenderCommand::ShowFrame(data) => {
            let expected = matrix.opts().frame_byte_count();
            if data.len() != expected {
                tracing::error!(
                    "Invalid frame size: expected {} bytes, got {}",
                    expected,
                    data.len()
                );
                return;
            }
            let cells = cells_from_rgba(&data);
            matrix.clear();
            if let Err(e) = matrix.draw(&cells) {
                tracing::error!("Failed to draw frame: {}", e);
            }
        }

        RenderCommand::Clear => {
            matrix.clear();
            status.lock().unwrap().set_idle();
        }

        RenderCommand::SetDimensions { width, height } => {
            matrix.set_dimensions(width, height);
            // the re-sized surface starts from a blank frame
            matrix.clear();
            let mut s = status.lock().unwrap();
            s.width = width;
            s.height = height;
            s.set_idle();
            tracing::info!("Grid resized to {}x{}", width, height);
        }

        RenderCommand::SetGlow(glow) => {
            matrix.set_glow(glow);
            status.lock().unwrap().glow = glow;
        }
    }
}

// ── Render loop ──────────────────────────────────────────────────────

/// Main render loop — runs on a dedicated thread, owns the matrix.
///
/// Receives commands until the channel closes (sender dropped), executing
/// each and then republishing the PNG snapshot that the HTTP side serves.
pub fn render_loop(
    rx: Receiver<RenderCommand>,
    status: Arc<Mutex<DisplayStatus>>,
    snapshot: Arc<Mutex<Vec<u8>>>,
    opts: MatrixOptions,
) {
    // LedMatrix::new sizes the surface from the options
    let mut matrix = LedMatrix::new(PixmapSurface::new(0, 0), opts);
    publish_snapshot(&matrix, &snapshot);

    tracing::info!(
        "Render thread started: {}x{} grid, {}x{} surface",
        opts.width,
        opts.height,
        opts.surface_width(),
        opts.surface_height()
    );

    loop {
        let cmd = match rx.recv() {
            Ok(cmd) => cmd,
            Err(_) => {
                tracing::info!("Render thread: channel closed, shutting down.");
                break;
            }
        };

        execute(&mut matrix, cmd, &status);
        publish_snapshot(&matrix, &snapshot);
    }
}

/// Re-encode the surface and swap it into the shared snapshot buffer.
fn publish_snapshot(matrix: &LedMatrix<PixmapSurface>, snapshot: &Mutex<Vec<u8>>) {
    match matrix.surface().snapshot_png() {
        Ok(png) => *snapshot.lock().unwrap() = png,
        Err(e) => tracing::error!("Failed to encode snapshot: {}", e),
    }
}

// ── Tests ──────────────────────────────────────────────────────────
