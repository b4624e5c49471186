//! HTTP boundary. [routes::route_request] is a pure function from
//! (method, path, body) to a response; the axum layer only moves requests onto
//! the blocking pool and back.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::DispatchConfig;

pub mod api;
pub mod routes;

/// Directory of a built frontend, served under `/app` when present.
pub const FRONTEND_DIST_DIR: &str = "frontend/dist";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DispatchConfig>,
}

impl IntoResponse for routes::HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

async fn delegate(State(state): State<AppState>, method: Method, uri: Uri, body: String) -> Response {
    let method = method.as_str().to_string();
    let path = uri.path().to_string();
    let config = Arc::clone(&state.config);
    tracing::debug!(%method, %path, "handling request");

    // Solving blocks for up to one time budget per tier.
    let handled =
        tokio::task::spawn_blocking(move || routes::route_request(&config, &method, &path, &body)).await;
    match handled {
        Ok(response) => response.into_response(),
        Err(err) => {
            tracing::error!(%err, "request handler panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

pub fn router(config: DispatchConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };
    let mut app = Router::new()
        .route("/", get(delegate))
        .route("/api/health", get(delegate))
        .route("/api/config", get(delegate))
        .route("/optimise", post(delegate))
        .route("/optimise/", post(delegate))
        .route("/api/optimize", post(delegate))
        .fallback(delegate);
    if Path::new(FRONTEND_DIST_DIR).is_dir() {
        app = app.nest_service("/app", ServeDir::new(FRONTEND_DIST_DIR));
    }
    app.layer(CorsLayer::permissive()).with_state(state)
}

pub fn run_server(config: DispatchConfig) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let bind = config.server.bind.clone();
        let listener = tokio::net::TcpListener::bind(bind.as_str()).await?;
        tracing::info!(%bind, "tiered-dispatch server listening");
        axum::serve(listener, router(config)).await
    })
}
