//! HTTP surface of the quote service.
//!
//! Routes:
//! - `GET /favicon.ico` — empty icon, so browsers do not consume quotes.
//! - `GET /` and `GET /{file}` — one quote, rendered in the negotiated format. The
//!   path extension (`/index.xml`) wins over the `Accept` header; an extension the
//!   service cannot render is answered with 400.
//!
//! `Resolver::resolve` may block on a direct upstream fetch, so it runs on tokio's
//! blocking pool instead of an async worker thread.
use std::io;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use quote_common::OutputFormat;
use serde_json::json;
use tokio::net::TcpListener;

use crate::resolver::Resolver;

#[derive(Clone)]
struct AppState {
    resolver: Arc<Resolver>,
}

/// Build the application router around a shared resolver.
pub fn router(resolver: Arc<Resolver>) -> Router {
    Router::new()
        .route("/favicon.ico", get(favicon))
        .route("/", get(quote))
        .route("/{file}", get(quote))
        .with_state(AppState { resolver })
}

/// Serve until Ctrl+C (or SIGTERM on unix) is received.
pub async fn serve(listener: TcpListener, resolver: Arc<Resolver>) -> io::Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn favicon() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/x-icon")], Vec::<u8>::new())
}

async fn quote(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    let format = match OutputFormat::negotiate(uri.path(), accept) {
        Ok(format) => format,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": err.to_string() })),
            )
                .into_response();
        }
    };

    let resolver = Arc::clone(&state.resolver);
    let quote = match tokio::task::spawn_blocking(move || resolver.resolve()).await {
        Ok(quote) => quote,
        Err(err) => {
            error!("Resolver task failed: {err}");
            state.resolver.fallback()
        }
    };

    match format.render(&quote) {
        Ok(body) => ([(header::CONTENT_TYPE, format.content_type())], body).into_response(),
        Err(err) => {
            error!("Failed to render quote as {format}: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "failed to render quote" })),
            )
                .into_response()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
