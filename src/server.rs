//! HTTP API server: axum router and request handlers.
//!
//! The server runs on the tokio async runtime while the render thread runs
//! on a plain `std::thread`. Commands travel over `std::sync::mpsc`; the
//! display status and the PNG snapshot come back through shared
//! `Arc<Mutex<_>>` handles that the render thread keeps up to date.

use crate::render::{DisplayState, DisplayStatus, RenderCommand};
use crate::{Rgba, symbols};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use serde::Deserialize;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// ── App State ────────────────────────────────────────────────────────

/// Shared application state, passed to every handler via axum's `State`.
#[derive(Clone)]
pub struct AppState {
    /// Channel to send commands to the render thread
    pub command_tx: Sender<RenderCommand>,
    /// Shared display status (render thread writes, handlers read)
    pub status: Arc<Mutex<DisplayStatus>>,
    /// Latest PNG encoding of the surface (render thread writes)
    pub snapshot: Arc<Mutex<Vec<u8>>>,
}

// ── OpenAPI Documentation ────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    paths(
        get_status,
        get_symbols,
        get_snapshot,
        post_display_text,
        post_display_symbol,
        post_display_clear,
        post_dimensions,
        post_glow,
    ),
    components(schemas(
        DisplayStatus,
        DisplayState,
        TextRequest,
        SymbolRequest,
        DimensionsRequest,
        GlowRequest,
    )),
    tags(
        (name = "display", description = "Display control endpoints"),
        (name = "system", description = "System status endpoints"),
    ),
    info(
        title = "LED Matrix Simulator API",
        version = env!("CARGO_PKG_VERSION"),
        description = "HTTP API for driving a simulated RGB LED matrix"
    )
)]
pub struct ApiDoc;

// ── Request types ────────────────────────────────────────────────────

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TextRequest {
    /// Text to render with the built-in 5x7 font
    #[schema(example = "HELLO")]
    text: String,
    /// Color as [r, g, b] or [r, g, b, a], each 0-255. Defaults to white.
    #[serde(default)]
    #[schema(value_type = Option<Vec<u8>>, example = "[255, 0, 0]")]
    color: Option<Vec<u8>>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SymbolRequest {
    /// Symbol name. Use GET /api/v1/symbols to list available names.
    #[schema(example = "heart")]
    name: String,
    /// Color as [r, g, b] or [r, g, b, a], each 0-255. Defaults to white.
    #[serde(default)]
    #[schema(value_type = Option<Vec<u8>>, example = "[255, 0, 0]")]
    color: Option<Vec<u8>>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct DimensionsRequest {
    /// Grid width in cells
    #[schema(example = 32, minimum = 1)]
    width: u32,
    /// Grid height in cells
    #[schema(example = 16, minimum = 1)]
    height: u32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GlowRequest {
    /// Enable the glow effect
    enabled: bool,
}

/// Interpret an optional `[r, g, b]` / `[r, g, b, a]` array, defaulting to
/// opaque white.
fn parse_color(components: Option<&[u8]>) -> Result<Rgba, (StatusCode, String)> {
    match components {
        None => Ok(Rgba::WHITE),
        Some([r, g, b]) => Ok(Rgba::opaque(*r, *g, *b)),
        Some([r, g, b, a]) => Ok(Rgba::new(*r, *g, *b, *a)),
        Some(other) => Err((
            StatusCode::BAD_REQUEST,
            format!("Color must have 3 or 4 components, got {}", other.len()),
        )),
    }
}

// ── Router ───────────────────────────────────────────────────────────

/// Build the axum router with all API endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(
            SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
                .config(
                    utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
                        .validator_url("none"),
                ),
        )
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/symbols", get(get_symbols))
        .route("/api/v1/snapshot", get(get_snapshot))
        .route("/api/v1/display/text", post(post_display_text))
        .route("/api/v1/display/symbol", post(post_display_symbol))
        .route("/api/v1/display/frame", post(post_display_frame))
        .route("/api/v1/display/stream", get(ws_display_stream))
        .route("/api/v1/display/clear", post(post_display_clear))
        .route("/api/v1/dimensions", post(post_dimensions))
        .route("/api/v1/glow", post(post_glow))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Hand a command to the render thread.
fn send_command(
    state: &AppState,
    cmd: RenderCommand,
) -> Result<StatusCode, (StatusCode, String)> {
    state.command_tx.send(cmd).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Render thread gone".to_string(),
        )
    })?;
    Ok(StatusCode::OK)
}

// ── Handlers ─────────────────────────────────────────────────────────

/// GET /api/v1/status — return current display state
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "system",
    responses(
        (status = 200, description = "Current display status", body = DisplayStatus)
    )
)]
async fn get_status(State(state): State<AppState>) -> Json<DisplayStatus> {
    let status = state.status.lock().unwrap().clone();
    Json(status)
}

/// GET /api/v1/symbols — list available symbol names
#[utoipa::path(
    get,
    path = "/api/v1/symbols",
    tag = "display",
    responses(
        (status = 200, description = "List of available symbol names", body = Vec<String>)
    )
)]
async fn get_symbols() -> Json<Vec<&'static str>> {
    Json(symbols::names())
}

/// GET /api/v1/snapshot — the current surface as a PNG
#[utoipa::path(
    get,
    path = "/api/v1/snapshot",
    tag = "display",
    responses(
        (status = 200, description = "PNG rendering of the current surface", content_type = "image/png"),
        (status = 503, description = "No frame rendered yet")
    )
)]
async fn get_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    let png = state.snapshot.lock().unwrap().clone();
    if png.is_empty() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Snapshot not ready".to_string(),
        ));
    }
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// POST /api/v1/display/text — render text with the built-in font
#[utoipa::path(
    post,
    path = "/api/v1/display/text",
    tag = "display",
    request_body = TextRequest,
    responses(
        (status = 200, description = "Text displayed"),
        (status = 400, description = "Invalid color")
    )
)]
async fn post_display_text(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let color = parse_color(req.color.as_deref())?;
    send_command(
        &state,
        RenderCommand::ShowText {
            text: req.text,
            color,
        },
    )
}

/// POST /api/v1/display/symbol — render a named symbol
#[utoipa::path(
    post,
    path = "/api/v1/display/symbol",
    tag = "display",
    request_body = SymbolRequest,
    responses(
        (status = 200, description = "Symbol displayed"),
        (status = 404, description = "Unknown symbol"),
        (status = 400, description = "Invalid color")
    )
)]
async fn post_display_symbol(
    State(state): State<AppState>,
    Json(req): Json<SymbolRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let color = parse_color(req.color.as_deref())?;
    if symbols::get(&req.name).is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Unknown symbol: {}", req.name),
        ));
    }
    send_command(
        &state,
        RenderCommand::ShowSymbol {
            name: req.name,
            color,
        },
    )
}

/// POST /api/v1/display/frame — push a raw RGBA frame
///
/// Expects `application/octet-stream` body with exactly width*height*4
/// bytes for the current grid; a cell is lit iff its alpha byte is nonzero.
async fn post_display_frame(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    let (width, height) = {
        let status = state.status.lock().unwrap();
        (status.width, status.height)
    };
    let expected = (width * height * 4) as usize;
    if body.len() != expected {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Expected {} bytes ({}x{}x4 RGBA), got {} bytes",
                expected,
                width,
                height,
                body.len()
            ),
        ));
    }

    send_command(&state, RenderCommand::ShowFrame(body.to_vec()))
}

/// POST /api/v1/display/clear — erase the display
#[utoipa::path(
    post,
    path = "/api/v1/display/clear",
    tag = "display",
    responses(
        (status = 200, description = "Display cleared"),
    )
)]
async fn post_display_clear(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    send_command(&state, RenderCommand::Clear)
}

/// POST /api/v1/dimensions — change the grid dimensions
#[utoipa::path(
    post,
    path = "/api/v1/dimensions",
    tag = "display",
    request_body = DimensionsRequest,
    responses(
        (status = 200, description = "Dimensions updated"),
        (status = 400, description = "Zero dimension")
    )
)]
async fn post_dimensions(
    State(state): State<AppState>,
    Json(req): Json<DimensionsRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if req.width == 0 || req.height == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Dimensions must be at least 1x1".to_string(),
        ));
    }
    send_command(
        &state,
        RenderCommand::SetDimensions {
            width: req.width,
            height: req.height,
        },
    )
}

/// POST /api/v1/glow — toggle the glow effect
#[utoipa::path(
    post,
    path = "/api/v1/glow",
    tag = "display",
    request_body = GlowRequest,
    responses(
        (status = 200, description = "Glow updated"),
    )
)]
async fn post_glow(
    State(state): State<AppState>,
    Json(req): Json<GlowRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    send_command(&state, RenderCommand::SetGlow(req.enabled))
}

// ── WebSocket streaming ─────────────────────────────────────────────

/// GET /api/v1/display/stream — WebSocket endpoint for streaming raw frames.
///
/// Connect with a WebSocket client and send binary messages of exactly
/// width*height*4 bytes (RGBA). Each message is rendered as one frame.
/// Text messages are ignored. The connection sets status to `Streaming`
/// on connect and back to `Idle` on disconnect.
async fn ws_display_stream(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_stream_socket(socket, state))
}

async fn handle_stream_socket(mut socket: WebSocket, state: AppState) {
    tracing::info!("WebSocket stream client connected");

    {
        let mut s = state.status.lock().unwrap();
        s.state = DisplayState::Streaming;
        s.content = Some("websocket".to_string());
    }

    let mut frame_count: u64 = 0;

    while let Some(msg) = socket.recv().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("WebSocket receive error: {}", e);
                break;
            }
        };

        match msg {
            Message::Binary(data) => {
                let expected = {
                    let status = state.status.lock().unwrap();
                    (status.width * status.height * 4) as usize
                };
                if data.len() != expected {
                    tracing::warn!(
                        "WebSocket frame: expected {} bytes, got {}",
                        expected,
                        data.len()
                    );
                    continue;
                }

                if state
                    .command_tx
                    .send(RenderCommand::ShowFrame(data.to_vec()))
                    .is_err()
                {
                    tracing::error!("Render thread gone, closing WebSocket");
                    break;
                }

                frame_count += 1;
            }
            Message::Close(_) => break,
            _ => {} // Ignore text, ping/pong handled by axum
        }
    }

    tracing::info!(
        "WebSocket stream client disconnected ({} frames received)",
        frame_count
    );
    state.status.lock().unwrap().set_idle();
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatrixOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_color_defaults_to_white() {
        assert_eq!(parse_color(None).unwrap(), Rgba::WHITE);
    }

    #[test]
    fn parse_color_accepts_rgb_and_rgba() {
        assert_eq!(
            parse_color(Some(&[1, 2, 3])).unwrap(),
            Rgba::opaque(1, 2, 3)
        );
        assert_eq!(
            parse_color(Some(&[1, 2, 3, 4])).unwrap(),
            Rgba::new(1, 2, 3, 4)
        );
    }

    #[test]
    fn parse_color_rejects_other_lengths() {
        assert!(parse_color(Some(&[])).is_err());
        assert!(parse_color(Some(&[1, 2])).is_err());
        assert!(parse_color(Some(&[1, 2, 3, 4, 5])).is_err());
    }

    #[test]
    fn status_serializes_snake_case_state() {
        let status = DisplayStatus::new(&MatrixOptions::default());
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["state"], "idle");
        assert_eq!(value["width"], 32);
        assert_eq!(value["height"], 16);
        assert_eq!(value["glow"], false);
    }
}
