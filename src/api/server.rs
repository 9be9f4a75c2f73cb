use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::clock::StreamClock;
use crate::config::ServerConfig;
use crate::playlist::{self, Rendered, PROXY_PATH};

use super::proxy::{self, ProxyError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub clock: Arc<StreamClock>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            clock: Arc::new(StreamClock::new()),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ProxyQuery {
    url: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PROXY_PATH, get(proxy_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

pub async fn start_server(state: AppState, host: &str, port: u16) -> Result<(), std::io::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("started on http://{}:{}", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn proxy_handler(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ProxyError> {
    let url = proxy::parse_target(query.url)?;
    tracing::debug!(url = %url, "got request");

    let upstream = match proxy::fetch(&state.client, &url).await {
        Ok(upstream) => upstream,
        Err(e) => {
            tracing::error!(url = %url, error = %e, "error proxying request");
            return Err(e);
        }
    };

    tracing::debug!(url = %url, status = %upstream.status, "got response from upstream");
    if !upstream.status.is_success() {
        tracing::warn!(url = %url, status = %upstream.status, "upstream returned non-success status");
    }

    let body = if proxy::is_playlist_url(&url) {
        tracing::debug!(url = %url, "handling playlist request");
        render_playlist(&state, url.as_str(), upstream.body)
    } else {
        upstream.body
    };

    let mut response = (upstream.status, body).into_response();
    match upstream.content_type {
        Some(content_type) => {
            response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        None => {
            response.headers_mut().remove(header::CONTENT_TYPE);
        }
    }
    Ok(response)
}

fn render_playlist(state: &AppState, url: &str, body: Bytes) -> Bytes {
    let Ok(text) = std::str::from_utf8(&body) else {
        tracing::warn!(url = %url, "playlist is not valid UTF-8, passing through");
        return body;
    };

    match playlist::render_manifest(text, url, &state.config, &state.clock) {
        Rendered::Media(rendered) => {
            tracing::debug!(url = %url, "built playlist response");
            Bytes::from(rendered)
        }
        Rendered::Master(rendered) => {
            tracing::debug!(url = %url, "built variant playlist response");
            Bytes::from(rendered)
        }
        Rendered::PassThrough => {
            tracing::warn!(url = %url, "unable to parse playlist");
            body
        }
    }
}

async fn reset_handler(State(state): State<AppState>) -> StatusCode {
    state.clock.reset();
    tracing::info!("stream reset");
    StatusCode::NO_CONTENT
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    let elapsed = state.clock.peek(config.initial_duration);

    axum::Json(serde_json::json!({
        "started": state.clock.is_started(),
        "elapsed_secs": elapsed,
        "mode": if config.window_size.is_some() { "live" } else { "event" },
        "window_size": config.window_size,
        "loop": config.loop_playback,
    }))
}
