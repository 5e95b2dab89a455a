mod config;
mod connection;
mod hub;
mod router;
mod state;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::ws::WebSocket;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engine::view;

use crate::config::load_config;
use crate::connection::serve_connection;
use crate::state::AppState;

#[tokio::main]
/// Activates error tracing, spawns a watchdog that sweeps stale games,
/// then wires the REST game-creation endpoint and the websocket route
/// and starts serving on the configured address.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let config = match load_config().await {
        Ok(config) => config,
        Err(message) => {
            tracing::error!(message, "configuration error");
            panic!("Configuration error: {}", message);
        }
    };
    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::new(config));

    let watchdog_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(1200)); // 20 min
        loop {
            interval.tick().await;
            watchdog_state.cleanup_stale_games().await;
        }
    });

    let app = Router::new()
        .route("/api/v1/games", post(create_game_handler))
        .route("/ws", get(websocket_handler))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", bind_addr, e));
    tracing::info!(%bind_addr, "server listening");

    axum::serve(listener, app).await.unwrap();
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGameRequest {
    max_players: u32,
}

/// `POST /api/v1/games` creates an empty lobby and returns its public
/// projection.
async fn create_game_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateGameRequest>,
) -> impl IntoResponse {
    if !(2..=5).contains(&request.max_players) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "maxPlayers must be between 2 and 5"})),
        );
    }
    let (id, game) = state.create_game(request.max_players).await;
    let snapshot = {
        let game = game.read().await;
        view::project(&game, None)
    };
    tracing::debug!(game = %id, "lobby ready");
    (StatusCode::CREATED, Json(json!({ "game": snapshot })))
}

/// Upgrades the request and hands the socket to the connection pumps.
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket(socket, state))
}

async fn websocket(stream: WebSocket, state: Arc<AppState>) {
    serve_connection(state, stream).await;
}
