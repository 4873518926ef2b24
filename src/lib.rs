pub mod types;
pub mod config;
pub mod error;
pub mod shuffle;
pub mod bracket;
pub mod ledger;
pub mod roster;
pub mod session;
pub mod bracket_commands;

use types::*;
use config::*;
use session::BracketSession;

use serde::Serialize;
use serde_json::json;
use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ── Responses ──────────────────────────────────────────────────────────

fn json_response<T: Serialize>(result: Result<T, String>) -> Response {
    match result {
        Ok(payload) => {
            let body = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());
            (
                [
                    ("Content-Type", "application/json"),
                    ("Cache-Control", "no-store"),
                    ("Pragma", "no-cache"),
                    ("Expires", "0"),
                ],
                body,
            )
                .into_response()
        }
        Err(message) => {
            warn!("Request rejected: {message}");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    }
}

// ── Handlers ───────────────────────────────────────────────────────────

async fn get_state_json(State(state): State<ServerState>) -> Response {
    json_response(Ok(bracket_commands::bracket_state(&state.session)))
}

async fn get_active_match(State(state): State<ServerState>) -> Response {
    json_response(bracket_commands::bracket_active_match(&state.session))
}

async fn post_competitor(
    State(state): State<ServerState>,
    Json(payload): Json<CompetitorPayload>,
) -> Response {
    json_response(bracket_commands::bracket_add_competitor(&state.session, &payload.name))
}

async fn put_competitor(
    State(state): State<ServerState>,
    Path(index): Path<usize>,
    Json(payload): Json<CompetitorPayload>,
) -> Response {
    json_response(bracket_commands::bracket_rename_competitor(&state.session, index, &payload.name))
}

async fn delete_competitor(State(state): State<ServerState>, Path(index): Path<usize>) -> Response {
    json_response(bracket_commands::bracket_remove_competitor(&state.session, index))
}

async fn post_start(State(state): State<ServerState>) -> Response {
    json_response(bracket_commands::bracket_start(&state.session))
}

async fn post_reset(State(state): State<ServerState>) -> Response {
    json_response(bracket_commands::bracket_reset(&state.session))
}

async fn post_score(
    State(state): State<ServerState>,
    Path((round_index, match_index)): Path<(usize, usize)>,
    Json(payload): Json<ScorePayload>,
) -> Response {
    json_response(bracket_commands::bracket_submit_score(
        &state.session,
        round_index,
        match_index,
        payload.side,
        &payload.value,
    ))
}

async fn post_finalize(
    State(state): State<ServerState>,
    Path((round_index, match_index)): Path<(usize, usize)>,
) -> Response {
    json_response(bracket_commands::bracket_finalize_match(&state.session, round_index, match_index))
}

// ── Router / server ────────────────────────────────────────────────────

pub fn bracket_router(state: ServerState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/state.json", get(get_state_json))
        .route("/active", get(get_active_match))
        .route("/competitors", post(post_competitor))
        .route("/competitors/:index", put(put_competitor).delete(delete_competitor))
        .route("/start", post(post_start))
        .route("/reset", post(post_reset))
        .route("/matches/:round/:match/scores", post(post_score))
        .route("/matches/:round/:match/finalize", post(post_finalize))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

async fn start_bracket_server(state: ServerState, static_dir: PathBuf, addr: &str) {
    let app = bracket_router(state, static_dir);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Bracket server failed to bind {addr}: {e}");
            return;
        }
    };
    info!("Bracket server listening at http://{addr}/");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Bracket server error: {e}");
    }
}

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() {
    load_env_file();

    // Initialize tracing with daily rolling file output
    let logs_dir = logs_dir();
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, DEFAULT_LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("Knockout bracket starting");

    let config = load_config_inner().unwrap_or_else(|e| {
        error!("{e}; falling back to default config");
        AppConfig::default()
    });
    log_env_warnings(&config);

    let static_dir = resolve_repo_path(&config.static_dir);
    fs::create_dir_all(&static_dir).ok();

    let state = ServerState {
        session: Arc::new(Mutex::new(BracketSession::new(&config))),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {e}");
            return;
        }
    };
    runtime.block_on(start_bracket_server(state, static_dir, &config.bind_addr));
}
