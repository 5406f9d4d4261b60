// Module: http
// Plugin routes the host calls under /api/v1/<api_prefix>

pub mod auth;
pub mod discover;
pub mod error;
pub mod health;
pub mod medal;
pub mod webhook;

use axum::{routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use explore_core::SourceRegistry;
use explore_media_providers::MedalWall;

pub use error::{AppError, AppResult};

/// Largest accepted webhook body
const MAX_MESSAGE_BODY: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SourceRegistry>,
    pub api_token: Arc<str>,
    pub api_prefix: Arc<str>,
    /// `None` disables the external message route
    pub message_sink: Option<Arc<dyn webhook::MessageSink>>,
    /// `None` disables the medal routes
    pub medal_wall: Option<Arc<MedalWall>>,
}

impl AppState {
    pub fn new(registry: SourceRegistry, api_token: &str, api_prefix: &str) -> Self {
        Self {
            registry: Arc::new(registry),
            api_token: Arc::from(api_token),
            api_prefix: Arc::from(api_prefix.trim_matches('/')),
            message_sink: None,
            medal_wall: None,
        }
    }

    #[must_use]
    pub fn with_message_sink(mut self, sink: Arc<dyn webhook::MessageSink>) -> Self {
        self.message_sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_medal_wall(mut self, wall: Arc<MedalWall>) -> Self {
        self.medal_wall = Some(wall);
        self
    }

    /// Mount point of the token-guarded routes
    #[must_use]
    pub fn mount_path(&self) -> String {
        if self.api_prefix.is_empty() {
            "/api/v1".to_string()
        } else {
            format!("/api/v1/{}", self.api_prefix)
        }
    }
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    let mut plugin_routes = discover::discover_routes(&state.registry);

    if state.message_sink.is_some() {
        plugin_routes = plugin_routes.route(
            "/external_message",
            post(webhook::external_message).layer(RequestBodyLimitLayer::new(MAX_MESSAGE_BODY)),
        );
    }

    if state.medal_wall.is_some() {
        plugin_routes = plugin_routes.merge(medal::medal_routes());
    }

    let plugin_routes = plugin_routes.route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    Router::new()
        .nest(&state.mount_path(), plugin_routes)
        .merge(health::create_health_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
