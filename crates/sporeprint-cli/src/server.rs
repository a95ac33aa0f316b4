//! HTTP front end of the dashboard, built on axum.
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::config::DashboardConfig;
use crate::dashboard::{page, Dashboard, FormState};

pub type SharedDashboard = Arc<Dashboard>;

/// Build an axum Router with `/` and `/health` routes.
pub fn router(dashboard: SharedDashboard) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard)
}

fn error_response(status: StatusCode, heading: &str, message: &str) -> Response {
    let body = page::render_error(heading, message).into_string();
    (status, Html(body)).into_response()
}

/// Parse the form from the query string and run the request handler on a blocking
/// thread, since fitting a model is CPU bound.
async fn dashboard_handler(
    State(dashboard): State<SharedDashboard>,
    RawQuery(query): RawQuery,
) -> Response {
    let form = match FormState::from_query(query.as_deref().unwrap_or_default()) {
        Ok(form) => form,
        Err(e) => {
            log::warn!("[Sporeprint::Server] Rejected form input: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid input", &e.to_string());
        }
    };

    let rendered = tokio::task::spawn_blocking(move || {
        dashboard
            .handle(&form)
            .map(|description| page::render(&description).into_string())
    })
    .await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => {
            log::error!("[Sporeprint::Server] Request failed: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                &format!("{:#}", e),
            )
        }
        Err(e) => {
            log::error!("[Sporeprint::Server] Request handler panicked: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "The request handler stopped unexpectedly.",
            )
        }
    }
}

/// Health check endpoint.
async fn health_handler(State(dashboard): State<SharedDashboard>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "dataset_loaded": dashboard.cache().is_loaded(),
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("[Sporeprint::Server] Shutting down");
}

/// Serve the dashboard on `config.bind` until interrupted.
pub async fn run(config: DashboardConfig) -> Result<()> {
    let addr = config.bind.clone();
    let dashboard = Arc::new(Dashboard::new(config));
    let app = router(dashboard);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("[Sporeprint::Server] Dashboard listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}
