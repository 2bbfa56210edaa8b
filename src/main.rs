//! Ermes gateway binary.
//!
//! Serves a demo session endpoint behind request admission, backed by an
//! in-memory session node.

use std::sync::Arc;

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ermes_gateway::adapters::http::admission::{create_handler, HandlerError};
use ermes_gateway::adapters::node::InMemoryNode;
use ermes_gateway::config::{AppConfig, ServerConfig};
use ermes_gateway::domain::session::SessionToken;
use ermes_gateway::ports::SessionNode;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let mut node =
        InMemoryNode::new(config.node.host()?).with_relocation_ttl(config.node.relocation_ttl());
    if let Some(parent) = config.node.parent_host() {
        node = node.with_parent(parent);
    }
    let purge = node.spawn_purge_task(config.node.purge_interval());
    let node: Arc<dyn SessionNode> = Arc::new(node);

    let app = Router::new()
        .route(
            "/session",
            any(create_handler(
                Arc::clone(&node),
                config.admission.handler_options(),
                session_info,
            )),
        )
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.server.request_timeout()))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    let addr = config.server.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        node = %node.host(),
        log_json = config.server.log_json,
        "Ermes gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    tracing::info!("Ermes gateway stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Demo handler: reports which session served the request.
async fn session_info(request: Request, token: SessionToken) -> Result<Response, HandlerError> {
    Ok(Json(json!({
        "host": token.host().as_str(),
        "session_id": token.session_id().as_str(),
        "method": request.method().as_str(),
        "path": request.uri().path(),
    }))
    .into_response())
}

async fn health() -> &'static str {
    "ok"
}
