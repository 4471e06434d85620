//! Axum server for the single-page chat surface.
//!
//! One WebSocket connection is one session: the socket handler owns the
//! transcript, so sessions are isolated without any locking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    serve, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::constants;
use crate::gemini::TextGenerator;
use crate::session::{Role, Session};

/// Messages the chat page sends over the WebSocket.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Chat { text: String },
}

/// Events the server sends back to the page.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Info { message: String },
    Turn { role: Role, content: String },
    Error { message: String },
}

// Shared application state
#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
    generator: Arc<dyn TextGenerator>,
}

// Minijinja Environment setup
fn create_minijinja_env() -> AutoReloader {
    // Use AutoReloader for development convenience
    AutoReloader::new(|notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader("templates"));
        // Watch the templates directory for changes
        notifier.watch_path("templates", true);
        Ok(env)
    })
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<axum::response::Html<String>, axum::response::Html<String>> {
    // Acquire env, get template, and render within the same block
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => constants::PAGE_TITLE,
                    description => constants::PAGE_DESCRIPTION,
                    placeholder => constants::INPUT_PLACEHOLDER,
                    busy_message => constants::BUSY_MESSAGE,
                })
            })
        })
        .map(axum::response::Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            axum::response::Html(format!("Internal Server Error: {}", e))
        })
}

// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// One connection == one session with its own transcript.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    info!(%session_id, "Chat session opened");

    let mut session = Session::new(state.generator.clone());

    let welcome = ServerEvent::Info {
        message: format!("Connected to {}", constants::PAGE_TITLE),
    };
    if send_event(&mut socket, &welcome).await.is_err() {
        warn!(%session_id, "Failed to send welcome message");
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Chat { text }) => match session.submit(&text).await {
                        Ok(turn) => ServerEvent::Turn {
                            role: turn.role,
                            content: turn.content,
                        },
                        Err(err) => {
                            warn!(%session_id, %err, "Submission failed");
                            ServerEvent::Error {
                                message: err.to_string(),
                            }
                        }
                    },
                    Err(err) => ServerEvent::Error {
                        message: format!("malformed message: {err}"),
                    },
                };
                if send_event(&mut socket, &event).await.is_err() {
                    warn!(%session_id, "Client disconnected mid-reply");
                    break;
                }
            }
            Message::Binary(_) => {
                warn!(%session_id, "Ignoring unexpected binary message");
            }
            Message::Close(_) => break,
            // Axum answers pings automatically
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    info!(%session_id, turns = session.transcript().len(), "Chat session closed");
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json)).await,
        Err(e) => {
            error!("Failed to serialize server event: {}", e);
            Ok(())
        }
    }
}

/// Builds the application router; split out so tests can drive it in-process.
pub fn build_router(generator: Arc<dyn TextGenerator>) -> Router {
    let state = AppState {
        templates: Arc::new(create_minijinja_env()),
        generator,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws_handler))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, generator: Arc<dyn TextGenerator>) -> Result<()> {
    let app = build_router(generator);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
